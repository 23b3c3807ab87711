//! Client implementation for CCP `GetPassword` requests.
//!
//! This module issues the blocking HTTP request for one vault object and
//! returns its raw account properties.

use crate::ccp::{CcpConfig, CcpError, RawVaultRecord, VerifyPolicy};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::Certificate;
use serde_json::Value;
use std::fs;
use tracing::{debug, warn};

/// Client for the CCP REST endpoint.
///
/// The underlying HTTP client is built on first use, so creating a
/// `CcpClient` never touches the network or the filesystem.
pub struct CcpClient {
    config: CcpConfig,
    http: OnceCell<Client>,
}

impl CcpClient {
    pub fn new(config: CcpConfig) -> Self {
        Self {
            config,
            http: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &CcpConfig {
        &self.config
    }

    fn user_agent() -> String {
        format!("cyberark-secrets-backend/{}", env!("CARGO_PKG_VERSION"))
    }

    fn http(&self) -> Result<&Client, CcpError> {
        self.http.get_or_try_init(|| build_http_client(&self.config))
    }

    /// Fetch the account properties of `object` with a single GET request.
    ///
    /// A non-success status is not an error on its own: the CCP reports
    /// lookup failures as JSON bodies without account properties.
    pub fn fetch_raw(&self, object: &str) -> Result<RawVaultRecord, CcpError> {
        let url = self.config.object_url(object);
        debug!(
            "Requesting object '{}' from safe '{}' at {}",
            object,
            self.config.safe(),
            self.config.ccp_url()
        );

        let response = self.http()?.get(&url).send()?;
        let status = response.status();
        let body = response.text()?;

        let raw = parse_body(object, &body)?;
        if !status.is_success() {
            let code = raw.get("ErrorCode").and_then(Value::as_str).unwrap_or("-");
            let message = raw.get("ErrorMsg").and_then(Value::as_str).unwrap_or("");
            warn!(
                "CCP returned status {} for object '{}': {} {}",
                status, object, code, message
            );
        }
        Ok(raw)
    }
}

fn build_http_client(config: &CcpConfig) -> Result<Client, CcpError> {
    let builder = Client::builder()
        .user_agent(CcpClient::user_agent())
        .timeout(config.timeout());

    let builder = match config.verify() {
        VerifyPolicy::Disabled => builder.danger_accept_invalid_certs(true),
        VerifyPolicy::System => builder,
        VerifyPolicy::CaBundle(path) => {
            let pem = fs::read(path).map_err(|e| {
                CcpError::TlsConfig(format!(
                    "Failed to read CA bundle {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let certs = Certificate::from_pem_bundle(&pem).map_err(|e| {
                CcpError::TlsConfig(format!("Invalid CA bundle {}: {}", path.display(), e))
            })?;
            if certs.is_empty() {
                return Err(CcpError::TlsConfig(format!(
                    "CA bundle {} contains no certificates",
                    path.display()
                )));
            }
            certs
                .into_iter()
                .fold(builder.tls_built_in_root_certs(false), |b, cert| {
                    b.add_root_certificate(cert)
                })
        }
    };

    builder
        .build()
        .map_err(|e| CcpError::TlsConfig(format!("Failed to create HTTP client: {}", e)))
}

fn parse_body(object: &str, body: &str) -> Result<RawVaultRecord, CcpError> {
    let malformed = |reason: String| CcpError::MalformedResponse {
        object: object.to_string(),
        reason,
    };
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(malformed(format!("expected a JSON object, got {}", kind(&other)))),
        Err(e) => Err(malformed(e.to_string())),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(verify: VerifyPolicy) -> CcpConfig {
        CcpConfig::new("app", "https://ccp.example/api", "safe", Some(verify))
    }

    #[test]
    fn user_agent_contains_version() {
        assert!(CcpClient::user_agent().starts_with("cyberark-secrets-backend/"));
    }

    #[test]
    fn parse_body_accepts_object() {
        let raw = parse_body("obj", r#"{"Content": "pw"}"#).unwrap();
        assert_eq!(raw.get("Content").and_then(Value::as_str), Some("pw"));
    }

    #[test]
    fn parse_body_rejects_invalid_json() {
        let err = parse_body("obj", "<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(err, CcpError::MalformedResponse { ref object, .. } if object == "obj"));
    }

    #[test]
    fn parse_body_rejects_non_object() {
        let err = parse_body("obj", r#"["Content"]"#).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn missing_ca_bundle_is_a_tls_error() {
        let err = build_http_client(&config(VerifyPolicy::CaBundle(
            "/nonexistent/ccp-ca.pem".into(),
        )))
        .unwrap_err();
        assert!(matches!(err, CcpError::TlsConfig(_)));
    }

    #[test]
    fn construction_does_not_read_ca_bundle() {
        let client = CcpClient::new(config(VerifyPolicy::CaBundle(
            "/nonexistent/ccp-ca.pem".into(),
        )));
        assert!(client.http.get().is_none());
    }
}
