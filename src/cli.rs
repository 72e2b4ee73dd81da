//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// Calculator command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the server should listen
    #[arg(long, default_value = "0.0.0.0", env = "CALCULATOR_HOST")]
    pub host: String,
    /// The port to which the server should bind
    #[arg(long, default_value_t = 8000, env = "CALCULATOR_PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "CALCULATOR_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/calculator/certs/cert.pem",
        env = "CALCULATOR_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/calculator/certs/key.pem",
        env = "CALCULATOR_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for operations to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "CALCULATOR_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "CALCULATOR_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
    /// Path to the history database. History is kept in memory when not set.
    #[arg(long, env = "CALCULATOR_HISTORY_PATH")]
    pub history_path: Option<String>,
    /// Maximum time in seconds to wait for the history store.
    #[arg(long, default_value_t = 10, env = "CALCULATOR_STORE_TIMEOUT")]
    pub store_timeout: u64,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
