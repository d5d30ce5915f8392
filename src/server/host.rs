//! Server host holding the state shared by every request handler

use crate::config::ServerConfig;
use crate::core::EntityStore;
use crate::engine::GraphQLExecutor;
use std::sync::Arc;

/// Host context containing the application state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerHost::new(config, Arc::new(InMemoryEntityStore::with_demo_data())));
/// let app = build_graphql_router(host)?;
/// ```
pub struct ServerHost {
    pub config: Arc<ServerConfig>,

    /// Executor bound to the store of this host
    pub executor: GraphQLExecutor,
}

impl ServerHost {
    pub fn new(config: ServerConfig, store: Arc<dyn EntityStore>) -> Self {
        Self {
            config: Arc::new(config),
            executor: GraphQLExecutor::new(store),
        }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        self.executor.store()
    }
}
