use std::path::PathBuf;

use clap::Parser;

/// Switchboard conversation router
#[derive(Debug, Parser)]
#[command(name = "switchboard", about = "Sticky-session router for LLM backends")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "switchboard.toml", env = "SWITCHBOARD_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "SWITCHBOARD_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
