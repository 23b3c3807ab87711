//! Connection handed to callers of the secrets backend.

use crate::ccp::CredentialRecord;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// A resolved connection. Every attribute except `conn_id` is optional and
/// stays unset when the vault object has no matching property.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub conn_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

impl Connection {
    pub fn new(conn_id: &str) -> Self {
        Self {
            conn_id: conn_id.to_string(),
            ..Default::default()
        }
    }

    /// Build a connection from a fully resolved record.
    pub fn from_record(conn_id: &str, record: CredentialRecord) -> Self {
        Self {
            conn_id: conn_id.to_string(),
            host: record.host,
            schema: record.schema,
            login: record.login,
            password: record.password,
            port: record.port,
            extra: record.extra,
        }
    }

    /// `extra` parsed as a JSON object. Absent or non-object extras yield an empty map.
    pub fn extra_dejson(&self) -> Map<String, Value> {
        let Some(extra) = self.extra.as_deref() else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(extra) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => {
                warn!("Failed to parse extra of connection '{}': {}", self.conn_id, e);
                Map::new()
            }
        }
    }

    /// Copy with the password replaced by a mask, for display.
    pub fn masked(&self) -> Self {
        Self {
            password: self.password.as_ref().map(|_| "***".to_string()),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("conn_id", &self.conn_id)
            .field("host", &self.host)
            .field("schema", &self.schema)
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("port", &self.port)
            .field("extra", &self.extra)
            .finish()
    }
}
