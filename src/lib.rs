pub mod config;
pub mod dispatcher;
pub mod gateway;
pub mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use config::GatewayConfig;
use dispatcher::Dispatcher;
use gateway::{MediaProvider, YtDlpCli};

/// Load configuration, wire the yt-dlp provider and serve HTTP on `addr`
pub async fn run(addr: SocketAddr) -> anyhow::Result<()> {
    let config = Arc::new(GatewayConfig::load());
    config.log_summary();

    let provider: Arc<dyn MediaProvider> = Arc::new(YtDlpCli::new(config.ytdlp_bin.clone()));
    tracing::info!("Using provider {}", provider.name());

    let dispatcher = Arc::new(Dispatcher::new(provider, config));
    server::start_server(addr, dispatcher).await
}
