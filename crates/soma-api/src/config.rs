//! Configuration management for the Soma check-in service.

use std::{net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The three required values (`BOT_TOKEN`, `SUPABASE_URL`,
/// `SUPABASE_SERVICE_ROLE_KEY`) have no defaults. Their absence does not
/// stop the process: the check-in endpoints answer 500 with a diagnostic
/// naming the missing variables until an operator provides them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Telegram bot token used to verify `initData` signatures.
    ///
    /// Environment variable: `BOT_TOKEN`
    #[serde(default, alias = "BOT_TOKEN")]
    pub bot_token: Option<String>,

    /// Supabase project base URL.
    ///
    /// Environment variable: `SUPABASE_URL`
    #[serde(default, alias = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Supabase service-role key with write access to the check-in
    /// collection. Never logged; see [`Config::service_role_key_masked`].
    ///
    /// Environment variable: `SUPABASE_SERVICE_ROLE_KEY`
    #[serde(default, alias = "SUPABASE_SERVICE_ROLE_KEY")]
    pub supabase_service_role_key: Option<String>,

    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,

    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,

    /// HTTP request timeout in seconds, applied to inbound requests and
    /// to the outbound storage client.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

/// Borrowed view of the required configuration.
///
/// Only constructible through [`Config::credentials`], so holding one
/// proves every required variable was present.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    /// Bot token for signature verification.
    pub bot_token: &'a str,
    /// Supabase project base URL.
    pub supabase_url: &'a str,
    /// Supabase service-role key.
    pub service_role_key: &'a str,
}

impl Config {
    /// Load configuration from defaults, config file, and environment
    /// variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when a provided value cannot be parsed into its
    /// field type or fails validation. Missing required secrets are NOT
    /// an error here; they surface per request.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Names every required variable that is absent or empty.
    ///
    /// All three are always checked so one diagnostic covers the full
    /// fix; the original deployment's guard only caught the first.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_unset(&self.bot_token) {
            missing.push("BOT_TOKEN");
        }
        if is_unset(&self.supabase_url) {
            missing.push("SUPABASE_URL");
        }
        if is_unset(&self.supabase_service_role_key) {
            missing.push("SUPABASE_SERVICE_ROLE_KEY");
        }
        missing
    }

    /// Returns the required configuration, or the names of the variables
    /// still missing.
    ///
    /// # Errors
    ///
    /// The error lists every absent variable by its environment name.
    pub fn credentials(&self) -> std::result::Result<Credentials<'_>, Vec<&'static str>> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(Credentials {
            bot_token: self.bot_token.as_deref().unwrap_or_default(),
            supabase_url: self.supabase_url.as_deref().unwrap_or_default(),
            service_role_key: self.supabase_service_role_key.as_deref().unwrap_or_default(),
        })
    }

    /// Parse server socket address from host and port configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if host and port do not form a valid address.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Service-role key with its content masked for logging.
    pub fn service_role_key_masked(&self) -> String {
        match self.supabase_service_role_key.as_deref() {
            None | Some("") => "<unset>".to_string(),
            Some(key) if key.len() <= 8 => "***".to_string(),
            Some(key) => {
                let prefix: String = key.chars().take(4).collect();
                format!("{prefix}***")
            },
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            supabase_url: None,
            supabase_service_role_key: None,
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            rust_log: default_log_level(),
        }
    }
}

fn is_unset(value: &Option<String>) -> bool {
    matches!(value.as_deref(), None | Some(""))
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}
