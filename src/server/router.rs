//! GraphQL routes of the HTTP transport

use crate::config::CorsConfig;
use crate::engine::{GraphQLRequest, GraphQLResponse};
use crate::server::host::ServerHost;
use anyhow::{Context, Result};
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use axum::{
    Json, Router,
    extract::Extension,
    http::{HeaderValue, Method},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the GraphQL router from a host
///
/// Routes, relative to the configured `graphql_path`:
/// - POST {path} - Execute a query or mutation
/// - GET {path}/schema - Schema in SDL form
/// - GET {path}/playground - GraphQL playground (when enabled)
pub fn build_graphql_router(host: Arc<ServerHost>) -> Result<Router> {
    let endpoint = host.config.endpoint_path();
    let base = endpoint.trim_end_matches('/');

    let mut router = Router::new()
        .route(&endpoint, post(graphql_handler))
        .route(&format!("{}/schema", base), get(graphql_schema));

    if host.config.playground {
        router = router.route(&format!("{}/playground", base), get(graphql_playground));
    }

    let cors = cors_layer(&host.config.cors)?;

    Ok(router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(Extension(host)),
    ))
}

/// CORS policy: permissive unless specific origins are configured
fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    if config.allows_any_origin() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any))
}

/// Handler for GraphQL queries and mutations
async fn graphql_handler(
    Extension(host): Extension<Arc<ServerHost>>,
    Json(request): Json<GraphQLRequest>,
) -> Json<GraphQLResponse> {
    Json(host.executor.execute_request(request).await)
}

/// Handler for GraphQL schema SDL export
async fn graphql_schema(Extension(host): Extension<Arc<ServerHost>>) -> impl IntoResponse {
    host.executor.schema().sdl()
}

/// Handler for GraphQL playground UI
async fn graphql_playground(Extension(host): Extension<Arc<ServerHost>>) -> impl IntoResponse {
    let endpoint = host.config.endpoint_path();
    Html(playground_source(GraphQLPlaygroundConfig::new(&endpoint)))
}
