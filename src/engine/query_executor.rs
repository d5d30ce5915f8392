//! Query execution: the top-level list operations and `me`

use futures::future::{BoxFuture, FutureExt};
use graphql_parser::query::Field;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::field_resolver::{self, ExecutionContext};
use super::introspection::{self, TypeArgs};
use super::utils;
use crate::core::{Comment, EngineError, EngineResult, EntityStore, Post, TextFilter, User};

/// Arguments of the `users`, `posts` and `comments` root fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListArgs {
    /// Case-insensitive substring filter
    #[serde(default)]
    pub query: Option<String>,
}

impl ListArgs {
    pub fn filter(&self) -> TextFilter {
        TextFilter::new(self.query.as_deref())
    }
}

/// Root query operations over an injected store
#[derive(Clone)]
pub struct QueryExecutor {
    store: Arc<dyn EntityStore>,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// `users(query)`: users whose name contains the filter
    pub async fn list_users(&self, args: &ListArgs) -> EngineResult<Vec<User>> {
        let users = self.store.users().await?;
        Ok(args.filter().apply(users, |u| vec![u.name.as_str()]))
    }

    /// `me`: a fixed sentinel user, never read from the store
    pub fn current_user(&self) -> User {
        User::new("1234543", "Mike", "mike@exalmple.com", None)
    }

    /// `posts(query)`: posts whose title or body contains the filter
    pub async fn list_posts(&self, args: &ListArgs) -> EngineResult<Vec<Post>> {
        let posts = self.store.posts().await?;
        Ok(args
            .filter()
            .apply(posts, |p| vec![p.title.as_str(), p.body.as_str()]))
    }

    /// `comments(query)`: comments whose text contains the filter
    pub async fn list_comments(&self, args: &ListArgs) -> EngineResult<Vec<Comment>> {
        let comments = self.store.comments().await?;
        Ok(args.filter().apply(comments, |c| vec![c.text.as_str()]))
    }
}

/// Resolve a query root field (e.g., "users", "me")
///
/// `fields` holds every field merged under one response key. Validation has
/// already rejected keys whose fields differ in name or arguments, so the
/// first one supplies both.
pub fn resolve_query_field<'d, 'q>(
    ctx: &'d ExecutionContext<'d, 'q>,
    fields: Vec<&'d Field<'q, String>>,
) -> BoxFuture<'d, EngineResult<Value>> {
    async move {
        let field = fields[0];
        let queries = QueryExecutor::new(ctx.store.clone());
        let selections = field_resolver::merged_selections(&fields);

        match field.name.as_str() {
            "__typename" => Ok(json!("Query")),
            "__schema" => {
                let schema = introspection::schema_value(ctx.schema);
                Ok(introspection::project(ctx, &schema, &selections))
            }
            "__type" => {
                let args: TypeArgs = utils::parse_args(field, ctx.variables)?;
                let ty = introspection::type_value(ctx.schema, &args.name);
                Ok(introspection::project(ctx, &ty, &selections))
            }
            "users" => {
                let args: ListArgs = utils::parse_args(field, ctx.variables)?;
                let users = queries.list_users(&args).await?;
                field_resolver::resolve_list(ctx, users, &selections).await
            }
            "me" => {
                let me = queries.current_user();
                field_resolver::resolve_object(ctx, me.into(), selections).await
            }
            "posts" => {
                let args: ListArgs = utils::parse_args(field, ctx.variables)?;
                let posts = queries.list_posts(&args).await?;
                field_resolver::resolve_list(ctx, posts, &selections).await
            }
            "comments" => {
                let args: ListArgs = utils::parse_args(field, ctx.variables)?;
                let comments = queries.list_comments(&args).await?;
                field_resolver::resolve_list(ctx, comments, &selections).await
            }
            other => Err(EngineError::operation(format!(
                "Unknown query field: {}",
                other
            ))),
        }
    }
    .boxed()
}
