//! Command-line arguments.

use clap::Parser;

use oci_mcp_core::config::{DEFAULT_HOST, DEFAULT_PORT};
use oci_mcp_core::log::LogLevel;
use oci_mcp_core::{ClientOptions, LogConfig, LogFormat, ServerConfig, Transport};

/// OCI registry tool server: list tags, resolve digests, annotations and architectures.
#[derive(Parser, Debug)]
#[command(name = "oci-mcp", version, about)]
pub struct Cli {
    /// Transport to serve on (stdio, http)
    #[arg(long, env = "OCI_MCP_TRANSPORT", default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Bind host for the http transport
    #[arg(long, env = "OCI_MCP_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Bind port for the http transport
    #[arg(long, env = "OCI_MCP_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Log output format (text, json)
    #[arg(long, env = "OCI_MCP_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,

    /// Per-request timeout for registry calls, in seconds
    #[arg(long, env = "OCI_MCP_REQUEST_TIMEOUT")]
    pub request_timeout: Option<u64>,

    /// Registry reached over plain HTTP (repeatable, or comma-separated)
    #[arg(
        long = "insecure-registry",
        env = "OCI_MCP_INSECURE_REGISTRIES",
        value_delimiter = ','
    )]
    pub insecure_registries: Vec<String>,
}

impl Cli {
    pub fn into_config(self) -> ServerConfig {
        let level = if self.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };

        ServerConfig {
            transport: self.transport,
            host: self.host,
            port: self.port,
            log: LogConfig {
                level,
                format: self.log_format,
            },
            registry: ClientOptions {
                request_timeout_secs: self.request_timeout,
                insecure_registries: self
                    .insecure_registries
                    .into_iter()
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect(),
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = Cli::try_parse_from(["oci-mcp"]).unwrap().into_config();
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8888);
        assert_eq!(config.log.format, LogFormat::Text);
        assert_eq!(config.log.level, LogLevel::Info);
        assert_eq!(config.registry.request_timeout_secs, None);
        assert!(config.registry.insecure_registries.is_empty());
    }

    #[test]
    fn test_cli_http_options() {
        let config = Cli::try_parse_from([
            "oci-mcp",
            "--transport",
            "http",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--log-format",
            "json",
            "--verbose",
            "--request-timeout",
            "15",
            "--insecure-registry",
            "localhost:5000, registry.local",
        ])
        .unwrap()
        .into_config();

        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.registry.request_timeout_secs, Some(15));
        assert_eq!(
            config.registry.insecure_registries,
            vec!["localhost:5000", "registry.local"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_rejects_unknown_transport() {
        assert!(Cli::try_parse_from(["oci-mcp", "--transport", "grpc"]).is_err());
    }
}
