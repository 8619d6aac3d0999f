use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{OciError, Result};
use crate::log::LogConfig;

/// Default bind host for the HTTP transport
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port for the HTTP transport
pub const DEFAULT_PORT: u16 = 8888;

/// How the tool server talks to its client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout (default)
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST, plus a health endpoint
    Http,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            _ => Err(format!("unknown transport: '{}' (supported: stdio, http)", s)),
        }
    }
}

/// Registry client configuration
///
/// Shared read-only by every tool call. Nothing per-call (credentials,
/// tokens) ever lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Whole-request timeout in seconds (None = no timeout)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Registries reached over plain HTTP (e.g. "localhost:5000")
    #[serde(default)]
    pub insecure_registries: Vec<String>,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("oci-mcp/{}", crate::VERSION)
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout_secs: None,
            insecure_registries: Vec::new(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientOptions {
    /// Request timeout as a `Duration`, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Whether `registry` should be contacted over plain HTTP.
    pub fn is_insecure(&self, registry: &str) -> bool {
        self.insecure_registries
            .iter()
            .any(|r| r.eq_ignore_ascii_case(registry))
    }

    /// URL scheme used for `registry`.
    pub fn scheme(&self, registry: &str) -> &'static str {
        if self.is_insecure(registry) {
            "http"
        } else {
            "https"
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Transport the tool server listens on
    #[serde(default)]
    pub transport: Transport,

    /// Bind host (HTTP transport only)
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port (HTTP transport only)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,

    /// Registry client configuration
    #[serde(default)]
    pub registry: ClientOptions,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            host: default_host(),
            port: DEFAULT_PORT,
            log: LogConfig::default(),
            registry: ClientOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Check the settings that matter for the selected transport.
    pub fn validate(&self) -> Result<()> {
        if self.transport == Transport::Http {
            if self.host.trim().is_empty() {
                return Err(OciError::ConfigError(
                    "host must not be empty for the http transport".to_string(),
                ));
            }
            if self.port == 0 {
                return Err(OciError::ConfigError(
                    "port must be non-zero for the http transport".to_string(),
                ));
            }
        }
        if self.registry.request_timeout_secs == Some(0) {
            return Err(OciError::ConfigError(
                "request timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` bind address string.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.bind_address(), "127.0.0.1:8888");
        assert!(config.registry.request_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_transport_from_str() {
        assert_eq!("stdio".parse::<Transport>().unwrap(), Transport::Stdio);
        assert_eq!("HTTP".parse::<Transport>().unwrap(), Transport::Http);
        assert!("sse".parse::<Transport>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_port_for_http() {
        let config = ServerConfig {
            transport: Transport::Http,
            port: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(OciError::ConfigError(_))));
    }

    #[test]
    fn test_validate_ignores_port_for_stdio() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = ServerConfig::default();
        config.registry.request_timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_insecure_registry_scheme() {
        let options = ClientOptions {
            insecure_registries: vec!["localhost:5000".to_string()],
            ..Default::default()
        };
        assert_eq!(options.scheme("localhost:5000"), "http");
        assert_eq!(options.scheme("LOCALHOST:5000"), "http");
        assert_eq!(options.scheme("ghcr.io"), "https");
    }

    #[test]
    fn test_default_user_agent_carries_version() {
        let options = ClientOptions::default();
        assert!(options.user_agent.starts_with("oci-mcp/"));
    }

    #[test]
    fn test_server_config_deserialize_partial() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"transport":"http","port":9000}"#).unwrap();
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
    }
}
