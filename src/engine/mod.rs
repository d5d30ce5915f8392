//! GraphQL resolution engine
//!
//! This module contains the custom executor that runs GraphQL operations
//! against the blog schema and an injected [`EntityStore`](crate::core::EntityStore).
//!
//! The engine is split into several sub-modules:
//! - `core`: Main executor orchestration
//! - `schema`: The object types, their fields and SDL rendering
//! - `introspection`: `__schema` and `__type` over the schema
//! - `operation`: Operation selection within a document
//! - `validation`: Schema validation of an operation
//! - `query_executor`: Query root fields
//! - `mutation_executor`: Mutation root fields
//! - `field_resolver`: Field and relation resolution
//! - `relations`: One-hop relationship lookups
//! - `response`: Transport request and response envelopes
//! - `utils`: Utility functions

mod core;
pub mod field_resolver;
pub mod introspection;
pub mod mutation_executor;
pub mod operation;
pub mod query_executor;
pub mod relations;
pub mod response;
pub mod schema;
mod utils;
pub mod validation;

pub use core::GraphQLExecutor;
pub use mutation_executor::{CreateUserArgs, MutationExecutor};
pub use query_executor::{ListArgs, QueryExecutor};
pub use relations::RelationshipResolver;
pub use response::{GraphQLErrorBody, GraphQLRequest, GraphQLResponse};
pub use schema::{Schema, TypeRef};
