//! CyberArk Central Credential Provider (CCP) module
//!
//! This module implements lookups against a CCP `AIMWebService` endpoint.
//!
//! ## Architectural role:
//! - `client` performs the single HTTP round trip for one vault object
//! - `record` maps the vault's native field names to connection fields
//! - `resolver` follows service-account indirection and exposes the lookups
//!
//! ## Testing strategy:
//! - Each module contains its own unit tests within a `#[cfg(test)] mod tests` block
//! - Integration tests in the `tests/` directory run the resolver against a mock CCP server

pub mod client;
pub mod error;
pub mod record;
pub mod resolver;

pub use client::CcpClient;
pub use error::CcpError;
pub use record::{CredentialRecord, RawVaultRecord};
pub use resolver::CyberArkSecretsBackend;

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding a CA bundle path, used when no verify policy is given.
pub const CYBERARK_SSL_ENV: &str = "CYBERARK_SSL";

/// Default ceiling on the number of service-account hops followed for one lookup.
pub const DEFAULT_MAX_INDIRECTION_DEPTH: usize = 5;

/// How the TLS certificate of the CCP endpoint is verified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "VerifySetting")]
pub enum VerifyPolicy {
    /// Accept any certificate.
    Disabled,
    /// Verify against the system trust store.
    System,
    /// Verify against the PEM bundle at this path.
    CaBundle(PathBuf),
}

/// Wire form of `verify`: either a boolean or a CA bundle path.
#[derive(Deserialize)]
#[serde(untagged)]
enum VerifySetting {
    Flag(bool),
    Path(PathBuf),
}

impl From<VerifySetting> for VerifyPolicy {
    fn from(setting: VerifySetting) -> Self {
        match setting {
            VerifySetting::Flag(true) => VerifyPolicy::System,
            VerifySetting::Flag(false) => VerifyPolicy::Disabled,
            VerifySetting::Path(path) => VerifyPolicy::CaBundle(path),
        }
    }
}

impl FromStr for VerifyPolicy {
    type Err = std::convert::Infallible;

    /// `true` and `false` select the boolean policies, anything else is a bundle path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "true" => VerifyPolicy::System,
            "false" => VerifyPolicy::Disabled,
            path => VerifyPolicy::CaBundle(PathBuf::from(path)),
        })
    }
}

impl VerifyPolicy {
    /// Resolve the effective policy: explicit value, then `CYBERARK_SSL`, then disabled.
    pub fn resolve(explicit: Option<VerifyPolicy>) -> Self {
        Self::resolve_with(explicit, || {
            std::env::var_os(CYBERARK_SSL_ENV).map(PathBuf::from)
        })
    }

    /// `env_bundle` is only consulted when no explicit policy is given.
    fn resolve_with<F>(explicit: Option<VerifyPolicy>, env_bundle: F) -> Self
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        if let Some(policy) = explicit {
            return policy;
        }
        match env_bundle() {
            Some(path) => {
                debug!("Using CA bundle from {}: {}", CYBERARK_SSL_ENV, path.display());
                VerifyPolicy::CaBundle(path)
            }
            None => VerifyPolicy::Disabled,
        }
    }
}

/// CCP connection settings. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CcpConfig {
    app_id: String,
    ccp_url: String,
    safe: String,
    verify: VerifyPolicy,
    timeout: Option<Duration>,
    max_indirection_depth: usize,
}

/// Backend kwargs as supplied by the host framework. Unknown keys are ignored.
#[derive(Deserialize)]
struct BackendKwargs {
    app_id: String,
    ccp_url: String,
    safe: String,
    #[serde(default)]
    verify: Option<VerifyPolicy>,
}

impl CcpConfig {
    /// Create a config. A trailing `?` on `ccp_url` is dropped and a missing
    /// `verify` falls back to `CYBERARK_SSL`, then to disabled verification.
    pub fn new(app_id: &str, ccp_url: &str, safe: &str, verify: Option<VerifyPolicy>) -> Self {
        let ccp_url = ccp_url.strip_suffix('?').unwrap_or(ccp_url);
        Self {
            app_id: app_id.to_string(),
            ccp_url: ccp_url.to_string(),
            safe: safe.to_string(),
            verify: VerifyPolicy::resolve(verify),
            timeout: None,
            max_indirection_depth: DEFAULT_MAX_INDIRECTION_DEPTH,
        }
    }

    /// Build a config from the host framework's JSON kwargs, e.g.
    /// `{"app_id": "airflow", "ccp_url": "https://ccp/AIMWebService/api/Accounts", "safe": "db"}`.
    pub fn from_backend_kwargs(kwargs: &str) -> Result<Self, CcpError> {
        let kwargs: BackendKwargs = serde_json::from_str(kwargs)?;
        Ok(Self::new(
            &kwargs.app_id,
            &kwargs.ccp_url,
            &kwargs.safe,
            kwargs.verify,
        ))
    }

    /// Set a request timeout. Without one the resolver waits indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum number of service-account hops followed per lookup.
    pub fn with_max_indirection_depth(mut self, depth: usize) -> Self {
        self.max_indirection_depth = depth;
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn ccp_url(&self) -> &str {
        &self.ccp_url
    }

    pub fn safe(&self) -> &str {
        &self.safe
    }

    pub fn verify(&self) -> &VerifyPolicy {
        &self.verify
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn max_indirection_depth(&self) -> usize {
        self.max_indirection_depth
    }

    /// Full request URL for one object. Query values are inserted verbatim.
    pub fn object_url(&self, object: &str) -> String {
        format!(
            "{}?AppID={}&Safe={}&Object={}",
            self.ccp_url, self.app_id, self.safe, object
        )
    }
}
