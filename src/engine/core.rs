//! Core GraphQL executor orchestration

use futures::future::{FutureExt, try_join_all};
use graphql_parser::query::parse_query;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use super::field_resolver::{self, ExecutionContext};
use super::mutation_executor;
use super::operation::{self, Operation, OperationKind};
use super::query_executor;
use super::response::{GraphQLRequest, GraphQLResponse};
use super::schema::Schema;
use super::utils;
use super::validation;
use crate::core::{EngineError, EngineResult, EntityStore};

/// GraphQL executor that runs operations against the blog schema
#[derive(Clone)]
pub struct GraphQLExecutor {
    store: Arc<dyn EntityStore>,
    schema: Arc<Schema>,
}

impl GraphQLExecutor {
    /// Create a new executor over the given store
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            schema: Arc::new(Schema::blog()),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Execute a single-operation document and return its `data`
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<HashMap<String, Value>>,
    ) -> EngineResult<Value> {
        self.execute_operation(query, variables.unwrap_or_default(), None)
            .await
    }

    /// Parse, validate and execute one operation of a document
    pub async fn execute_operation(
        &self,
        query: &str,
        variables: HashMap<String, Value>,
        operation_name: Option<&str>,
    ) -> EngineResult<Value> {
        let doc = parse_query::<String>(query).map_err(|e| EngineError::Parse {
            message: e.to_string(),
        })?;

        let fragments = operation::collect_fragments(&doc);
        let operation = operation::select_operation(&doc, operation_name)?;
        validation::validate_operation(&self.schema, &operation, &fragments)?;
        let variables = utils::coerce_variables(operation.variable_definitions, &variables)?;

        tracing::debug!(
            kind = %operation.kind,
            name = operation.name.unwrap_or("<anonymous>"),
            "Executing operation"
        );

        let ctx = ExecutionContext {
            store: &self.store,
            schema: &self.schema,
            fragments: &fragments,
            variables: &variables,
        };

        match operation.kind {
            OperationKind::Query => execute_query(&ctx, &operation).await,
            OperationKind::Mutation => execute_mutation(&ctx, &operation).await,
        }
    }

    /// Execute a transport request, folding failures into the response
    pub async fn execute_request(&self, request: GraphQLRequest) -> GraphQLResponse {
        let result = self
            .execute_operation(
                &request.query,
                request.variables.unwrap_or_default(),
                request.operation_name.as_deref(),
            )
            .await;

        match result {
            Ok(data) => GraphQLResponse::from_data(data),
            Err(err) => {
                if err.is_request_error() {
                    tracing::debug!(error = %err, code = err.error_code(), "Rejected operation");
                } else {
                    tracing::warn!(error = %err, code = err.error_code(), "Operation failed");
                }
                GraphQLResponse::from_error(&err)
            }
        }
    }
}

/// Execute a query operation
///
/// Root fields are independent reads and resolve concurrently.
async fn execute_query<'d, 'q>(
    ctx: &'d ExecutionContext<'d, 'q>,
    operation: &Operation<'d, 'q>,
) -> EngineResult<Value> {
    let grouped =
        field_resolver::collect_fields(ctx, OperationKind::Query.root_type(), &[operation.selection_set]);

    let values = try_join_all(grouped.iter().map(|(key, fields)| {
        let path = vec![key.clone()];
        query_executor::resolve_query_field(ctx, fields.clone())
            .map(move |result| result.map_err(|e| e.at_path(path)))
    }))
    .await?;

    let data: Map<String, Value> = grouped.into_keys().zip(values).collect();
    Ok(Value::Object(data))
}

/// Execute a mutation operation
///
/// Root fields run one after another, in document order.
async fn execute_mutation<'d, 'q>(
    ctx: &'d ExecutionContext<'d, 'q>,
    operation: &Operation<'d, 'q>,
) -> EngineResult<Value> {
    let grouped = field_resolver::collect_fields(
        ctx,
        OperationKind::Mutation.root_type(),
        &[operation.selection_set],
    );

    let mut data = Map::new();
    for (key, fields) in grouped {
        let value = mutation_executor::resolve_mutation_field(ctx, fields)
            .await
            .map_err(|e| e.at_path(vec![key.clone()]))?;
        data.insert(key, value);
    }

    Ok(Value::Object(data))
}
