//! # graphql-basics
//!
//! A small GraphQL service over an in-memory blog graph of users, posts and
//! comments.
//!
//! ## Features
//!
//! - **Filtered Lists**: `users`, `posts` and `comments` accept a case-insensitive substring filter
//! - **Graph Navigation**: every relationship resolves through a foreign key, to any depth
//! - **Single Write Path**: `createUser` with email uniqueness checked under the store's write lock
//! - **Custom Executor**: operations are parsed with `graphql-parser`, validated and executed in-crate
//! - **Configuration-Based**: bind address, endpoint path, CORS and seed data come from YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use graphql_basics::prelude::*;
//!
//! let executor = GraphQLExecutor::new(Arc::new(InMemoryEntityStore::with_demo_data()));
//! let data = executor
//!     .execute(r#"{ posts(query: "lel") { title author { name } } }"#, None)
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::config::{CorsConfig, ServerConfig};
    pub use crate::core::{
        Comment, EngineError, EngineResult, Entity, EntityStore, Node, Post, TextFilter, User,
        ValidationError,
    };
    pub use crate::engine::{
        CreateUserArgs, GraphQLExecutor, GraphQLRequest, GraphQLResponse, ListArgs,
        MutationExecutor, QueryExecutor, RelationshipResolver, Schema,
    };
    pub use crate::server::{ServerBuilder, ServerHost};
    pub use crate::storage::{InMemoryEntityStore, SeedData};

    pub use std::sync::Arc;
}
