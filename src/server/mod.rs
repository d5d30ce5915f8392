//! Server module exposing the engine over HTTP
//!
//! This module provides a `ServerBuilder` that wires:
//! - the in-memory store, seeded from configuration
//! - the GraphQL endpoint, schema export and playground routes
//! - CORS and request tracing layers

pub mod builder;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use host::ServerHost;
pub use router::build_graphql_router;
