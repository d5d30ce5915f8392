//! Core module containing the records, errors and store abstraction of the engine

pub mod entity;
pub mod error;
pub mod filter;
pub mod store;

pub use entity::{Comment, Entity, Node, Post, User};
pub use error::{EngineError, EngineResult, ValidationError};
pub use filter::TextFilter;
pub use store::EntityStore;
