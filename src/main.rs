//! Tideline site server
//!
//! Configuration comes from `TIDELINE_*` and `EDGE_CONFIG_*` environment
//! variables; see [`site_server::ServerConfig::from_env`].

use site_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    start_server(config).await
}
