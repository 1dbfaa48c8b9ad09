//! Configuration management for the RAX FTP client
//!
//! Values come from built-in defaults, then an optional `config.toml` in the
//! working directory, then `RAX_FTP_CLIENT__*` environment variables.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

/// Client configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    /// Control port used when `open` gives no port
    pub default_port: u16,

    /// Read size for control replies and data chunks
    pub buffer_size: usize,

    /// Range the active-mode listener port is drawn from
    pub active_port_min: u16,
    pub active_port_max: u16,

    /// Ports tried before active mode gives up
    pub bind_attempts: usize,

    /// Seconds to wait for the server's active-mode connection, 0 waits forever
    pub accept_timeout_secs: u64,

    /// Seconds to wait for a reply still owed after a failed data connection
    pub reply_timeout_secs: u64,

    /// Address advertised in PORT instead of the control socket's local address
    pub local_ip: Option<String>,

    pub prompt: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_port: 21,
            buffer_size: 8192,
            active_port_min: 20000,
            active_port_max: 65535,
            bind_attempts: 10,
            accept_timeout_secs: 0,
            reply_timeout_secs: 10,
            local_ip: None,
            prompt: "ftp > ".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("RAX_FTP_CLIENT").separator("__"))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.default_port == 0 {
            return Err(config::ConfigError::Message(
                "default_port cannot be 0".into(),
            ));
        }

        if self.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.active_port_min < 1024 {
            return Err(config::ConfigError::Message(
                "active_port_min must be at least 1024".into(),
            ));
        }

        if self.active_port_min > self.active_port_max {
            return Err(config::ConfigError::Message(
                "active_port_min must not exceed active_port_max".into(),
            ));
        }

        if self.bind_attempts == 0 {
            return Err(config::ConfigError::Message(
                "bind_attempts must be greater than 0".into(),
            ));
        }

        if self.reply_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "reply_timeout_secs must be greater than 0".into(),
            ));
        }

        if let Some(ip) = &self.local_ip {
            if ip.parse::<IpAddr>().is_err() {
                return Err(config::ConfigError::Message(format!(
                    "local_ip {ip:?} is not an IP address"
                )));
            }
        }

        Ok(())
    }

    /// Get active-mode accept timeout as Duration, if bounded
    pub fn accept_timeout(&self) -> Option<Duration> {
        (self.accept_timeout_secs > 0).then(|| Duration::from_secs(self.accept_timeout_secs))
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }

    /// Get the configured PORT address override
    pub fn local_ip_override(&self) -> Option<IpAddr> {
        self.local_ip.as_deref().and_then(|ip| ip.parse().ok())
    }
}
