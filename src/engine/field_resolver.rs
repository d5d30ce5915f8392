//! Field and relation resolution for graph records
//!
//! Builds the response tree for a parent record: scalar fields are read off
//! the record, relationship fields go through the [`RelationshipResolver`]
//! and recurse with the nested selection.

use futures::future::{BoxFuture, FutureExt, try_join_all};
use graphql_parser::query::{Field, Selection, SelectionSet, TypeCondition};
use indexmap::IndexMap;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use super::operation::Fragments;
use super::relations::RelationshipResolver;
use super::schema::Schema;
use super::utils;
use crate::core::{EngineResult, EntityStore, Node};

/// Everything a resolver needs besides its parent record
pub struct ExecutionContext<'d, 'q> {
    pub store: &'d Arc<dyn EntityStore>,
    pub schema: &'d Schema,
    pub fragments: &'d Fragments<'d, 'q>,
    pub variables: &'d HashMap<String, Value>,
}

impl<'d, 'q> ExecutionContext<'d, 'q> {
    pub fn relations(&self) -> RelationshipResolver<'d> {
        RelationshipResolver::new(self.store.as_ref())
    }
}

/// Fields grouped by response key, in selection order
pub type GroupedFields<'d, 'q> = IndexMap<String, Vec<&'d Field<'q, String>>>;

/// Collect the fields that apply to `type_name`, expanding fragments
///
/// Fields sharing a response key are grouped so their sub-selections merge.
pub fn collect_fields<'d, 'q>(
    ctx: &ExecutionContext<'d, 'q>,
    type_name: &str,
    selection_sets: &[&'d SelectionSet<'q, String>],
) -> GroupedFields<'d, 'q> {
    let mut grouped = GroupedFields::new();
    for set in selection_sets {
        collect_into(ctx, type_name, &set.items, &mut grouped);
    }
    grouped
}

fn collect_into<'d, 'q>(
    ctx: &ExecutionContext<'d, 'q>,
    type_name: &str,
    items: &'d [Selection<'q, String>],
    grouped: &mut GroupedFields<'d, 'q>,
) {
    for selection in items {
        match selection {
            Selection::Field(field) => {
                if utils::should_include(&field.directives, ctx.variables) {
                    grouped
                        .entry(utils::response_key(field).to_string())
                        .or_default()
                        .push(field);
                }
            }
            Selection::InlineFragment(inline) => {
                let applies = match &inline.type_condition {
                    Some(TypeCondition::On(condition)) => condition == type_name,
                    None => true,
                };
                if applies && utils::should_include(&inline.directives, ctx.variables) {
                    collect_into(ctx, type_name, &inline.selection_set.items, grouped);
                }
            }
            Selection::FragmentSpread(spread) => {
                if !utils::should_include(&spread.directives, ctx.variables) {
                    continue;
                }
                if let Some(&fragment) = ctx.fragments.get(spread.fragment_name.as_str()) {
                    let TypeCondition::On(condition) = &fragment.type_condition;
                    if condition == type_name {
                        collect_into(ctx, type_name, &fragment.selection_set.items, grouped);
                    }
                }
            }
        }
    }
}

/// Sub-selections of every field merged under one response key
pub fn merged_selections<'d, 'q>(
    fields: &[&'d Field<'q, String>],
) -> Vec<&'d SelectionSet<'q, String>> {
    fields.iter().map(|&field| &field.selection_set).collect()
}

/// Resolve the selection for a single record
pub fn resolve_object<'d, 'q>(
    ctx: &'d ExecutionContext<'d, 'q>,
    node: Node,
    selections: Vec<&'d SelectionSet<'q, String>>,
) -> BoxFuture<'d, EngineResult<Value>> {
    async move { resolve_object_impl(ctx, node, selections).await }.boxed()
}

/// Implementation of resolve_object
async fn resolve_object_impl<'d, 'q>(
    ctx: &'d ExecutionContext<'d, 'q>,
    node: Node,
    selections: Vec<&'d SelectionSet<'q, String>>,
) -> EngineResult<Value> {
    let grouped = collect_fields(ctx, node.type_name(), &selections);
    let mut result = Map::new();

    for (key, fields) in grouped {
        let value = resolve_field(ctx, &node, fields).await?;
        result.insert(key, value);
    }

    Ok(Value::Object(result))
}

/// Resolve the selection for each record of a list, keeping its order
pub async fn resolve_list<'d, 'q, T>(
    ctx: &'d ExecutionContext<'d, 'q>,
    items: Vec<T>,
    selections: &[&'d SelectionSet<'q, String>],
) -> EngineResult<Value>
where
    T: Into<Node>,
{
    let resolved = try_join_all(
        items
            .into_iter()
            .map(|item| resolve_object(ctx, item.into(), selections.to_vec())),
    )
    .await?;

    Ok(Value::Array(resolved))
}

/// Resolve a single related record, or `null` when the foreign key dangles
async fn resolve_optional<'d, 'q, T>(
    ctx: &'d ExecutionContext<'d, 'q>,
    item: Option<T>,
    selections: Vec<&'d SelectionSet<'q, String>>,
) -> EngineResult<Value>
where
    T: Into<Node>,
{
    match item {
        Some(item) => resolve_object(ctx, item.into(), selections).await,
        None => Ok(Value::Null),
    }
}

/// Resolve one response key of a record
async fn resolve_field<'d, 'q>(
    ctx: &'d ExecutionContext<'d, 'q>,
    node: &Node,
    fields: Vec<&'d Field<'q, String>>,
) -> EngineResult<Value> {
    let name = fields[0].name.as_str();
    if name == "__typename" {
        return Ok(json!(node.type_name()));
    }

    let relations = ctx.relations();
    let selections = merged_selections(&fields);

    match node {
        Node::User(user) => match name {
            "id" => Ok(json!(user.id)),
            "name" => Ok(json!(user.name)),
            "email" => Ok(json!(user.email)),
            "age" => Ok(json!(user.age)),
            "posts" => {
                let posts = relations.posts_of_user(user).await?;
                resolve_list(ctx, posts, &selections).await
            }
            "comments" => {
                let comments = relations.comments_by_author(user).await?;
                resolve_list(ctx, comments, &selections).await
            }
            _ => Ok(Value::Null),
        },
        Node::Post(post) => match name {
            "id" => Ok(json!(post.id)),
            "title" => Ok(json!(post.title)),
            "body" => Ok(json!(post.body)),
            "published" => Ok(json!(post.published)),
            "author" => {
                let author = relations.author_of_post(post).await?;
                resolve_optional(ctx, author, selections).await
            }
            "comments" => {
                let comments = relations.comments_of_post(post).await?;
                resolve_list(ctx, comments, &selections).await
            }
            _ => Ok(Value::Null),
        },
        Node::Comment(comment) => match name {
            "id" => Ok(json!(comment.id)),
            "text" => Ok(json!(comment.text)),
            "author" => {
                let author = relations.author_of_comment(comment).await?;
                resolve_optional(ctx, author, selections).await
            }
            "post" => {
                let post = relations.post_of_comment(comment).await?;
                resolve_optional(ctx, post, selections).await
            }
            _ => Ok(Value::Null),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Comment, Post, User};
    use crate::engine::operation::collect_fragments;
    use crate::storage::{InMemoryEntityStore, SeedData};
    use graphql_parser::query::{Definition, OperationDefinition, parse_query};

    /// Resolve `query`'s top-level selection set against `node`
    async fn resolve(store: InMemoryEntityStore, node: Node, query: &str) -> Value {
        let store: Arc<dyn EntityStore> = Arc::new(store);
        let doc = parse_query::<String>(query).unwrap();
        let fragments = collect_fragments(&doc);
        let variables = HashMap::new();
        let schema = Schema::blog();
        let ctx = ExecutionContext {
            store: &store,
            schema: &schema,
            fragments: &fragments,
            variables: &variables,
        };
        let set = doc
            .definitions
            .iter()
            .find_map(|d| match d {
                Definition::Operation(OperationDefinition::SelectionSet(set)) => Some(set),
                _ => None,
            })
            .unwrap();

        resolve_object(&ctx, node, vec![set]).await.unwrap()
    }

    fn post_two() -> Node {
        Post::new("2", "Post title 2", "Body of the post 2", false, "1").into()
    }

    #[tokio::test]
    async fn test_scalar_fields_follow_selection_order() {
        let value = resolve(
            InMemoryEntityStore::with_demo_data(),
            User::new("2", "Sarah", "sarahw@example.com", None).into(),
            "{ email age name }",
        )
        .await;

        assert_eq!(
            value,
            json!({ "email": "sarahw@example.com", "age": null, "name": "Sarah" })
        );
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["email", "age", "name"]);
    }

    #[tokio::test]
    async fn test_nested_relations_mirror_selection() {
        let value = resolve(
            InMemoryEntityStore::with_demo_data(),
            post_two(),
            "{ title author { name } comments { id author { name } } }",
        )
        .await;

        assert_eq!(
            value,
            json!({
                "title": "Post title 2",
                "author": { "name": "Andrew" },
                "comments": [
                    { "id": "1", "author": { "name": "Andrew" } },
                    { "id": "2", "author": { "name": "Sarah" } },
                    { "id": "4", "author": { "name": "Mike" } }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_aliases_and_typename() {
        let value = resolve(
            InMemoryEntityStore::with_demo_data(),
            post_two(),
            "{ kind: __typename heading: title writer: author { __typename id } }",
        )
        .await;

        assert_eq!(
            value,
            json!({
                "kind": "Post",
                "heading": "Post title 2",
                "writer": { "__typename": "User", "id": "1" }
            })
        );
    }

    #[tokio::test]
    async fn test_fragments_and_merged_fields() {
        let value = resolve(
            InMemoryEntityStore::with_demo_data(),
            post_two(),
            "{ author { id } ...Bits author { name } ... on Comment { text } }
             fragment Bits on Post { published }",
        )
        .await;

        assert_eq!(
            value,
            json!({
                "author": { "id": "1", "name": "Andrew" },
                "published": false
            })
        );
    }

    #[tokio::test]
    async fn test_skip_directive() {
        let value = resolve(
            InMemoryEntityStore::with_demo_data(),
            post_two(),
            "{ id title @skip(if: true) body @include(if: false) }",
        )
        .await;

        assert_eq!(value, json!({ "id": "2" }));
    }

    #[tokio::test]
    async fn test_dangling_foreign_keys_resolve_to_null_and_empty() {
        let store = InMemoryEntityStore::from_seed(SeedData {
            users: vec![],
            posts: vec![],
            comments: vec![Comment::new("9", "orphan", "ghost", "missing")],
        });

        let value = resolve(
            store,
            Comment::new("9", "orphan", "ghost", "missing").into(),
            "{ text author { name } post { title comments { id } } }",
        )
        .await;

        assert_eq!(
            value,
            json!({ "text": "orphan", "author": null, "post": null })
        );
    }

    #[tokio::test]
    async fn test_user_relations_in_tree() {
        let value = resolve(
            InMemoryEntityStore::with_demo_data(),
            User::new("2", "Sarah", "sarahw@example.com", None).into(),
            "{ posts { id } comments { id post { id } } }",
        )
        .await;

        assert_eq!(
            value,
            json!({
                "posts": [{ "id": "3" }],
                "comments": [
                    { "id": "2", "post": { "id": "2" } },
                    { "id": "3", "post": { "id": "1" } }
                ]
            })
        );
    }
}
