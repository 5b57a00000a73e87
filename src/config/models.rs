// src/config/models.rs
use anyhow::{bail, Result};
use serde::Deserialize;

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_instances() -> String {
    "default:localhost:11434".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

/// Process configuration, read once from the environment before the proxy
/// starts accepting connections.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bind host for the proxy listener.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the proxy listener.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret for inbound requests. Unset or empty disables
    /// authentication.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Comma-separated instance list: `name:host:port` or `name:port`.
    #[serde(default = "default_instances")]
    pub ollama_instances: String,

    /// Verbose-diagnostics toggle.
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub metrics_enabled: bool,

    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

impl Config {
    /// Configured token with the empty-string sentinel collapsed to `None`.
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn auth_enabled(&self) -> bool {
        self.api_token().is_some()
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("PORT must be non-zero");
        }
        if self.metrics_enabled && self.metrics_port == self.port {
            bail!("METRICS_PORT must differ from PORT");
        }
        Ok(())
    }
}
