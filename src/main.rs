use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

/// Media gateway over yt-dlp
#[derive(Debug, Parser)]
#[command(name = "media-gateway", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Debug logging for the gateway and HTTP layer
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "media_gateway=debug,tower_http=debug".to_string()
        } else {
            "media_gateway=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cli.host, cli.port))?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(media_gateway::run(addr))
}
