//! Request and response envelopes of the GraphQL transport

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::core::EngineError;

/// Body of a GraphQL request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,

    #[serde(default)]
    pub variables: Option<HashMap<String, Value>>,

    #[serde(default)]
    pub operation_name: Option<String>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_variables(mut self, variables: HashMap<String, Value>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }
}

/// Extra error metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExtensions {
    pub code: String,
}

/// One entry of the `errors` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQLErrorBody {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<String>>,

    pub extensions: ErrorExtensions,
}

impl GraphQLErrorBody {
    fn new(message: String, code: &str, path: Option<Vec<String>>) -> Self {
        Self {
            message,
            path,
            extensions: ErrorExtensions {
                code: code.to_string(),
            },
        }
    }
}

/// Response of a GraphQL request
///
/// `data` is absent when the request was rejected before execution, and
/// `null` when a root resolver failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLErrorBody>,
}

impl GraphQLResponse {
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn from_error(error: &EngineError) -> Self {
        match error {
            EngineError::Validation(violations) => Self {
                data: None,
                errors: violations
                    .iter()
                    .map(|v| GraphQLErrorBody::new(v.to_string(), error.error_code(), None))
                    .collect(),
            },
            EngineError::Field { path, source } => Self {
                data: Some(Value::Null),
                errors: vec![GraphQLErrorBody::new(
                    source.to_string(),
                    source.error_code(),
                    Some(path.clone()),
                )],
            },
            other => Self {
                data: None,
                errors: vec![GraphQLErrorBody::new(
                    other.to_string(),
                    other.error_code(),
                    None,
                )],
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
