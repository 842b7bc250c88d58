//! CLI argument parsing with subcommand architecture.

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gemini-gateway",
    version,
    about = "Authenticated CORS gateway in front of the Gemini API",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Arguments for the implicit `run` when no subcommand is given
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the gateway (default when no subcommand is given)
    Run(RunArgs),
    /// Load and validate configuration and secrets, then exit
    Check(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Path to config file (optional; defaults are used when absent)
    #[arg(short, long, default_value = "gateway.yaml", env = "GATEWAY_CONFIG")]
    pub config: String,

    /// Listen host
    #[arg(long, env = "GATEWAY_HOST")]
    pub host: Option<String>,

    /// Listen port
    #[arg(long, env = "GATEWAY_PORT")]
    pub port: Option<u16>,

    /// Model used when a request carries no `model` query parameter
    #[arg(long, env = "GATEWAY_DEFAULT_MODEL")]
    pub default_model: Option<String>,

    /// Upstream base URL (e.g. a regional endpoint or a local mock)
    #[arg(long, env = "GATEWAY_UPSTREAM_BASE_URL")]
    pub upstream_base_url: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "GATEWAY_LOG_LEVEL")]
    pub log_level: String,
}
