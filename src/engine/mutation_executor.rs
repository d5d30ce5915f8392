//! Mutation execution: `createUser`, the only write path of the graph

use futures::future::{BoxFuture, FutureExt};
use graphql_parser::query::Field;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::field_resolver::{self, ExecutionContext};
use super::utils;
use crate::core::{EngineError, EngineResult, EntityStore, User};

/// Arguments of `createUser`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserArgs {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,

    #[validate(length(min = 1, message = "email must not be empty"))]
    pub email: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "age must not be negative"))]
    pub age: Option<i32>,
}

impl CreateUserArgs {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: Option<i32>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }
}

/// Root mutation operations over an injected store
#[derive(Clone)]
pub struct MutationExecutor {
    store: Arc<dyn EntityStore>,
}

impl MutationExecutor {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// `createUser(name, email, age)`
    ///
    /// Fails with `DuplicateEmail` when any user already holds `email`
    /// (exact match). The store is left untouched on every failure.
    pub async fn create_user(&self, args: CreateUserArgs) -> EngineResult<User> {
        if let Err(e) = args.validate() {
            let err = EngineError::invalid_input(format!("Invalid arguments for createUser: {}", e));
            tracing::warn!(error = %err, "Rejected createUser");
            return Err(err);
        }

        let user = User::new(Uuid::new_v4().to_string(), args.name, args.email, args.age);

        match self.store.add_user(user).await {
            Ok(created) => {
                tracing::info!(user_id = %created.id, "User created");
                Ok(created)
            }
            Err(err @ EngineError::DuplicateEmail { .. }) => {
                tracing::warn!(error = %err, "Rejected createUser");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}

/// Resolve a mutation root field (only "createUser" exists)
pub fn resolve_mutation_field<'d, 'q>(
    ctx: &'d ExecutionContext<'d, 'q>,
    fields: Vec<&'d Field<'q, String>>,
) -> BoxFuture<'d, EngineResult<Value>> {
    async move {
        let field = fields[0];

        match field.name.as_str() {
            "__typename" => Ok(json!("Mutation")),
            "createUser" => {
                let args: CreateUserArgs = utils::parse_args(field, ctx.variables)?;
                let created = MutationExecutor::new(ctx.store.clone())
                    .create_user(args)
                    .await?;

                field_resolver::resolve_object(
                    ctx,
                    created.into(),
                    field_resolver::merged_selections(&fields),
                )
                .await
            }
            other => Err(EngineError::operation(format!(
                "Unknown mutation field: {}",
                other
            ))),
        }
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::relations::RelationshipResolver;
    use crate::storage::InMemoryEntityStore;

    fn executor() -> (MutationExecutor, Arc<dyn EntityStore>) {
        let store: Arc<dyn EntityStore> = Arc::new(InMemoryEntityStore::with_demo_data());
        (MutationExecutor::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_user_appends_to_store() {
        let (mutations, store) = executor();

        let ann = mutations
            .create_user(CreateUserArgs::new("Ann", "ann@example.com", Some(30)))
            .await
            .unwrap();

        assert_eq!(ann.name, "Ann");
        assert_eq!(ann.email, "ann@example.com");
        assert_eq!(ann.age, Some(30));
        assert!(Uuid::parse_str(&ann.id).is_ok());

        let users = store.users().await.unwrap();
        assert_eq!(users.len(), 4);
        assert_eq!(users.last(), Some(&ann));

        let posts = RelationshipResolver::new(store.as_ref())
            .posts_of_user(&ann)
            .await
            .unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_create_user_generates_distinct_ids() {
        let (mutations, _) = executor();

        let a = mutations
            .create_user(CreateUserArgs::new("A", "a@example.com", None))
            .await
            .unwrap();
        let b = mutations
            .create_user(CreateUserArgs::new("B", "b@example.com", None))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.age, None);
    }

    #[tokio::test]
    async fn test_duplicate_email_leaves_store_unchanged() {
        let (mutations, store) = executor();

        let err = mutations
            .create_user(CreateUserArgs::new("Dup", "andrew@example.com", None))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::DuplicateEmail { .. }));
        assert_eq!(err.to_string(), "Email taken.");
        assert_eq!(store.user_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_second_creation_with_same_email_fails() {
        let (mutations, store) = executor();

        mutations
            .create_user(CreateUserArgs::new("Ann", "ann@example.com", None))
            .await
            .unwrap();
        let err = mutations
            .create_user(CreateUserArgs::new("Ann Again", "ann@example.com", None))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::DuplicateEmail { .. }));
        assert_eq!(store.user_count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_preconditions_are_checked_before_the_store() {
        let (mutations, store) = executor();

        for args in [
            CreateUserArgs::new("", "x@example.com", None),
            CreateUserArgs::new("X", "", None),
            CreateUserArgs::new("X", "x@example.com", Some(-1)),
        ] {
            let err = mutations.create_user(args).await.unwrap_err();
            assert_eq!(err.error_code(), "BAD_USER_INPUT");
        }

        assert_eq!(store.user_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_creations_with_same_email_yield_one_user() {
        let (mutations, store) = executor();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let mutations = mutations.clone();
                tokio::spawn(async move {
                    mutations
                        .create_user(CreateUserArgs::new(
                            format!("Racer {}", i),
                            "race@example.com",
                            None,
                        ))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.user_count().await.unwrap(), 4);
    }
}
