//! Operation selection within a parsed document

use graphql_parser::query::{
    Definition, Document, FragmentDefinition, OperationDefinition, SelectionSet,
    VariableDefinition,
};
use std::collections::HashMap;
use std::fmt;

use crate::core::{EngineError, EngineResult};
use crate::engine::schema::Schema;

/// Named fragments of a document
pub type Fragments<'d, 'q> = HashMap<&'d str, &'d FragmentDefinition<'q, String>>;

/// Kind of an executable operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    /// Name of the root object type the operation selects from
    pub fn root_type(self) -> &'static str {
        match self {
            OperationKind::Query => Schema::QUERY,
            OperationKind::Mutation => Schema::MUTATION,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
        }
    }
}

/// The operation chosen for execution
#[derive(Debug, Clone, Copy)]
pub struct Operation<'d, 'q> {
    pub kind: OperationKind,
    pub name: Option<&'d str>,
    pub variable_definitions: &'d [VariableDefinition<'q, String>],
    pub selection_set: &'d SelectionSet<'q, String>,
}

/// Index the named fragments of a document
pub fn collect_fragments<'d, 'q>(doc: &'d Document<'q, String>) -> Fragments<'d, 'q> {
    doc.definitions
        .iter()
        .filter_map(|def| match def {
            Definition::Fragment(fragment) => Some((fragment.name.as_str(), fragment)),
            Definition::Operation(_) => None,
        })
        .collect()
}

/// Pick the operation to run
///
/// With an `operation_name` the matching named operation is chosen; without
/// one the document must contain exactly one operation.
pub fn select_operation<'d, 'q>(
    doc: &'d Document<'q, String>,
    operation_name: Option<&str>,
) -> EngineResult<Operation<'d, 'q>> {
    let operations: Vec<&OperationDefinition<'q, String>> = doc
        .definitions
        .iter()
        .filter_map(|def| match def {
            Definition::Operation(op) => Some(op),
            Definition::Fragment(_) => None,
        })
        .collect();

    if operations.is_empty() {
        return Err(EngineError::operation("No operation found in query"));
    }

    let selected = match operation_name {
        Some(name) => operations
            .into_iter()
            .find(|op| operation_name_of(op) == Some(name))
            .ok_or_else(|| EngineError::operation(format!("Unknown operation named \"{}\".", name)))?,
        None if operations.len() > 1 => {
            return Err(EngineError::operation(
                "Must provide operation name if query contains multiple operations.",
            ));
        }
        None => operations[0],
    };

    match selected {
        OperationDefinition::SelectionSet(selection_set) => Ok(Operation {
            kind: OperationKind::Query,
            name: None,
            variable_definitions: &[],
            selection_set,
        }),
        OperationDefinition::Query(query) => Ok(Operation {
            kind: OperationKind::Query,
            name: query.name.as_deref(),
            variable_definitions: &query.variable_definitions,
            selection_set: &query.selection_set,
        }),
        OperationDefinition::Mutation(mutation) => Ok(Operation {
            kind: OperationKind::Mutation,
            name: mutation.name.as_deref(),
            variable_definitions: &mutation.variable_definitions,
            selection_set: &mutation.selection_set,
        }),
        OperationDefinition::Subscription(_) => {
            Err(EngineError::operation("Subscriptions are not supported"))
        }
    }
}

fn operation_name_of<'d>(op: &'d OperationDefinition<'_, String>) -> Option<&'d str> {
    match op {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
    }
}
