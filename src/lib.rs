//! cyberark-secrets-backend - CyberArk CCP secrets backend
//!
//! This crate resolves connections and variables on demand from a CyberArk
//! Central Credential Provider (CCP). A vault object may name a service
//! account object in its `AccountDescription`; the password is then taken
//! from that object instead.
//!
//! ## Architecture
//!
//! - `ccp` module - configuration, HTTP client, field mapping and resolution
//! - `connection` module - the connection type handed to callers
//! - `interface` module - the `SecretsBackend` trait a host framework calls
//! - `cli` module - command-line front end for manual lookups
//!
//! Lookups are blocking and perform one HTTP request per object in a
//! service-account chain. Nothing is cached.

pub mod ccp;
pub mod cli;
pub mod connection;
pub mod interface;

pub use ccp::{CcpConfig, CcpError, CyberArkSecretsBackend, VerifyPolicy};
pub use connection::Connection;
pub use interface::SecretsBackend;

/// Initialize logging for tests
#[cfg(test)]
pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
