use anyhow::Result;
use graphql_basics::config::ServerConfig;
use graphql_basics::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1);
    let config = ServerConfig::load(path.as_deref())?;

    ServerBuilder::new().with_config(config).serve().await
}
