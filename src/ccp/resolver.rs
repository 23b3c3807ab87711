//! Connection and variable lookups backed by the CCP.
//!
//! A vault object whose `AccountDescription` names another object does not
//! hold the usable password itself: the named service-account object does.
//! `fetch_object` follows such chains and substitutes the final password.

use crate::ccp::{CcpClient, CcpConfig, CcpError, CredentialRecord};
use crate::connection::Connection;
use crate::interface::SecretsBackend;
use std::collections::HashSet;
use tracing::{debug, info};

/// Secrets backend resolving connections and variables from one CCP safe.
///
/// Holds no mutable state after construction and can be shared across threads.
pub struct CyberArkSecretsBackend {
    client: CcpClient,
}

impl CyberArkSecretsBackend {
    pub fn new(config: CcpConfig) -> Self {
        Self {
            client: CcpClient::new(config),
        }
    }

    /// Build the backend from the host framework's JSON kwargs.
    pub fn from_backend_kwargs(kwargs: &str) -> Result<Self, CcpError> {
        CcpConfig::from_backend_kwargs(kwargs).map(Self::new)
    }

    pub fn config(&self) -> &CcpConfig {
        self.client.config()
    }

    /// Fetch `object` and resolve its service-account chain.
    ///
    /// The returned record never carries `svc_account`. An empty record means
    /// the object has none of the recognized properties.
    pub fn fetch_object(&self, object: &str) -> Result<CredentialRecord, CcpError> {
        let mut record = self.fetch_record(object)?;
        let Some(mut next) = record.svc_account.take() else {
            return Ok(record);
        };

        let limit = self.config().max_indirection_depth();
        let mut visited = HashSet::from([object.to_string()]);
        let mut current = object.to_string();
        loop {
            if visited.len() > limit || !visited.insert(next.clone()) {
                return Err(CcpError::IndirectionLoop {
                    start: object.to_string(),
                    limit,
                });
            }
            info!(
                "Object '{}' takes its password from service account '{}'",
                current, next
            );
            let hop = self.fetch_record(&next)?;
            match hop.svc_account {
                Some(following) => {
                    current = std::mem::replace(&mut next, following);
                }
                None => {
                    let password = hop.password.ok_or(CcpError::MissingField {
                        object: next,
                        field: "password",
                    })?;
                    record.password = Some(password);
                    return Ok(record);
                }
            }
        }
    }

    /// Connection stored under `conn_id`, or `None` when the object is unknown.
    pub fn resolve_connection(&self, conn_id: &str) -> Result<Option<Connection>, CcpError> {
        let record = self.fetch_object(conn_id)?;
        if record.is_empty() {
            debug!("No connection found for '{}'", conn_id);
            return Ok(None);
        }
        Ok(Some(Connection::from_record(conn_id, record)))
    }

    /// Secret content of `key`, or `None` when the object is unknown.
    pub fn resolve_variable(&self, key: &str) -> Result<Option<String>, CcpError> {
        let record = self.fetch_object(key)?;
        if record.is_empty() {
            debug!("No variable found for '{}'", key);
            return Ok(None);
        }
        record
            .password
            .map(Some)
            .ok_or_else(|| CcpError::MissingField {
                object: key.to_string(),
                field: "password",
            })
    }

    fn fetch_record(&self, object: &str) -> Result<CredentialRecord, CcpError> {
        let raw = self.client.fetch_raw(object)?;
        CredentialRecord::from_raw(&raw)
    }
}

impl SecretsBackend for CyberArkSecretsBackend {
    type Error = CcpError;

    fn get_connections(&self, conn_id: &str) -> Result<Option<Vec<Connection>>, CcpError> {
        Ok(self.resolve_connection(conn_id)?.map(|conn| vec![conn]))
    }

    fn get_variable(&self, key: &str) -> Result<Option<String>, CcpError> {
        self.resolve_variable(key)
    }
}
