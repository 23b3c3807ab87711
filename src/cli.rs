use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{error, info};

use crate::ccp::{CcpConfig, CyberArkSecretsBackend, VerifyPolicy};
use crate::interface::SecretsBackend;

#[derive(Parser, Debug)]
#[command(
    name = "ccp-resolve",
    about = "Resolve connections and variables from a CyberArk Central Credential Provider",
    version
)]
pub struct Cli {
    /// CCP endpoint, e.g. https://ccp.example.com/AIMWebService/api/Accounts
    #[arg(long, env = "CYBERARK_CCP_URL", global = true)]
    pub ccp_url: Option<String>,

    /// CCP application id.
    #[arg(long, env = "CYBERARK_APP_ID", global = true)]
    pub app_id: Option<String>,

    /// Safe holding the objects.
    #[arg(long, env = "CYBERARK_SAFE", global = true)]
    pub safe: Option<String>,

    /// CA bundle path, or `true`/`false`. Defaults to CYBERARK_SSL, then `false`.
    #[arg(long, value_name = "PATH|true|false", global = true)]
    pub verify: Option<VerifyPolicy>,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a connection and print it as JSON.
    Connection {
        /// Connection id (the vault object name).
        conn_id: String,
        /// Print the password instead of a mask.
        #[arg(long)]
        show_password: bool,
    },
    /// Resolve a variable and print its value.
    Variable {
        /// Variable key (the vault object name).
        key: String,
    },
}

impl Cli {
    pub fn config(&self) -> Result<CcpConfig> {
        let ccp_url = self
            .ccp_url
            .as_deref()
            .context("missing --ccp-url (or CYBERARK_CCP_URL)")?;
        let app_id = self
            .app_id
            .as_deref()
            .context("missing --app-id (or CYBERARK_APP_ID)")?;
        let safe = self
            .safe
            .as_deref()
            .context("missing --safe (or CYBERARK_SAFE)")?;

        let mut config = CcpConfig::new(app_id, ccp_url, safe, self.verify.clone());
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<()> {
    let backend = CyberArkSecretsBackend::new(cli.config()?);

    match cli.command {
        Commands::Connection {
            conn_id,
            show_password,
        } => {
            info!("Resolving connection '{}'", conn_id);
            let conn = backend
                .get_connection(&conn_id)
                .with_context(|| format!("Failed to resolve connection '{}'", conn_id))?;
            match conn {
                Some(conn) => {
                    let conn = if show_password { conn } else { conn.masked() };
                    println!("{}", serde_json::to_string_pretty(&conn)?);
                }
                None => {
                    error!("Connection '{}' not found", conn_id);
                    return Err(anyhow::anyhow!("connection '{}' not found", conn_id));
                }
            }
        }
        Commands::Variable { key } => {
            info!("Resolving variable '{}'", key);
            match backend
                .get_variable(&key)
                .with_context(|| format!("Failed to resolve variable '{}'", key))?
            {
                Some(value) => println!("{}", value),
                None => {
                    error!("Variable '{}' not found", key);
                    return Err(anyhow::anyhow!("variable '{}' not found", key));
                }
            }
        }
    }
    Ok(())
}
