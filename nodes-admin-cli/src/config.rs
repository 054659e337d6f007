//! Connection settings from flags and environment

use std::time::Duration;

use clap::Args;
use nodes_admin_lib::auth::StaticSession;
use nodes_admin_lib::AdminClient;

use crate::error::CliError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Flags shared by every command that talks to the API.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Base URL of the admin API
    #[arg(long, global = true, env = "NODES_API_URL")]
    pub api_url: Option<String>,

    /// Session token sent as a bearer credential
    #[arg(long, global = true, env = "NODES_ADMIN_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "NODES_ADMIN_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

/// Resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl Config {
    /// Resolves settings, failing on a missing URL or token.
    pub fn resolve(args: &ConnectionArgs) -> Result<Self, CliError> {
        let api_url = non_empty(args.api_url.as_deref()).ok_or(CliError::MissingConfig("NODES_API_URL"))?;
        let token = non_empty(args.token.as_deref()).ok_or(CliError::MissingConfig("NODES_ADMIN_TOKEN"))?;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(CliError::InvalidArgument(format!(
                "API URL must start with http:// or https://, got '{}'",
                api_url
            )));
        }
        let timeout = match args.timeout_secs {
            Some(0) => return Err(CliError::InvalidArgument("timeout must be positive".to_string())),
            Some(secs) => Duration::from_secs(secs),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout,
        })
    }

    /// Builds the API client.
    pub fn client(&self) -> Result<AdminClient, CliError> {
        let client = AdminClient::builder()
            .url(self.api_url.as_str())
            .session_provider(StaticSession::new(self.token.as_str()))
            .timeout(self.timeout)
            .build()?;
        Ok(client)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
