//! ServerBuilder for fluent API to build HTTP servers

use super::host::ServerHost;
use super::router::build_graphql_router;
use crate::config::ServerConfig;
use crate::core::EntityStore;
use crate::storage::InMemoryEntityStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for creating the GraphQL HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(ServerConfig::from_yaml_file("config.yaml")?)
///     .build()?;
/// ```
#[derive(Default)]
pub struct ServerBuilder {
    config: ServerConfig,
    store: Option<Arc<dyn EntityStore>>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Serve from the given store instead of seeding a fresh one
    pub fn with_store(mut self, store: impl EntityStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Without an explicit store, an in-memory store is seeded from the
    /// configured seed file (or the demo dataset).
    pub fn build_host(self) -> Result<ServerHost> {
        let store = match self.store {
            Some(store) => store,
            None => {
                let seed = self.config.load_seed()?;
                tracing::info!(
                    users = seed.users.len(),
                    posts = seed.posts.len(),
                    comments = seed.comments.len(),
                    "Seeding in-memory store"
                );
                Arc::new(InMemoryEntityStore::from_seed(seed)) as Arc<dyn EntityStore>
            }
        };

        Ok(ServerHost::new(self.config, store))
    }

    /// Build the final GraphQL router
    pub fn build(self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        build_graphql_router(host)
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind.clone();
        let path = self.config.graphql_path.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(addr = %addr, path = %path, "The server is up!");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::User;

    #[tokio::test]
    async fn test_default_builder_seeds_demo_data() {
        let host = ServerBuilder::new().build_host().unwrap();
        assert_eq!(host.store().user_count().await.unwrap(), 3);
        assert_eq!(host.config.bind, "127.0.0.1:4000");
    }

    #[tokio::test]
    async fn test_with_store_overrides_seed() {
        let store = InMemoryEntityStore::new();
        store
            .add_user(User::new("1", "Solo", "solo@example.com", None))
            .await
            .unwrap();

        let host = ServerBuilder::new().with_store(store).build_host().unwrap();
        assert_eq!(host.store().user_count().await.unwrap(), 1);
    }

    #[test]
    fn test_missing_seed_file_fails_build() {
        let config = ServerConfig {
            seed_file: Some("/nonexistent/seed.yaml".to_string()),
            ..Default::default()
        };

        assert!(ServerBuilder::new().with_config(config).build().is_err());
    }

    #[test]
    fn test_invalid_cors_origin_fails_build() {
        let mut config = ServerConfig::default();
        config.cors.allowed_origins = vec!["bad\norigin".to_string()];

        assert!(ServerBuilder::new().with_config(config).build().is_err());
    }

    #[test]
    fn test_graphql_path_without_leading_slash_builds() {
        let config = ServerConfig {
            graphql_path: "graphql".to_string(),
            ..Default::default()
        };

        assert!(ServerBuilder::new().with_config(config).build().is_ok());
    }
}
