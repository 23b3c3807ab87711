/// Errors raised while resolving objects from the Central Credential Provider.
///
/// An object that carries none of the recognized fields is not an error; the
/// lookups report it as `None`.
#[derive(Debug, thiserror::Error)]
pub enum CcpError {
    #[error("network error communicating with CCP: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed CCP response for object '{object}': {reason}")]
    MalformedResponse { object: String, reason: String },

    #[error("invalid port value '{0}'")]
    InvalidPort(String),

    #[error("object '{object}' has no '{field}' field")]
    MissingField { object: String, field: &'static str },

    #[error("service account chain starting at '{start}' loops or exceeds {limit} hops")]
    IndirectionLoop { start: String, limit: usize },

    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    #[error("invalid backend configuration: {0}")]
    Config(#[from] serde_json::Error),
}
