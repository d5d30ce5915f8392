//! Typed error handling for the resolution engine
//!
//! # Error Categories
//!
//! - [`EngineError::DuplicateEmail`]: the only failure a resolver can produce
//!   on purpose. Surfaces to the caller as `Email taken.`
//! - Request-level failures ([`EngineError::Parse`], [`EngineError::Validation`],
//!   [`EngineError::InvalidInput`], [`EngineError::Operation`]): the operation
//!   was rejected before any resolver ran.
//! - [`EngineError::Storage`]: the store itself is unusable (poisoned lock).
//!
//! Relationship lookups that find no target are not errors; they resolve to
//! `null` or to an empty list.
//!
//! # Example
//!
//! ```rust,ignore
//! match mutations.create_user(args).await {
//!     Ok(user) => println!("created {}", user.id),
//!     Err(EngineError::DuplicateEmail { .. }) => println!("pick another email"),
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Result alias used across the engine
pub type EngineResult<T> = Result<T, EngineError>;

/// The main error type of the engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// Another user already holds this email (exact, case-sensitive match)
    #[error("Email taken.")]
    DuplicateEmail { email: String },

    /// Another user already holds this identifier
    #[error("User id '{id}' is already registered")]
    DuplicateId { id: String },

    /// The operation text is not valid GraphQL
    #[error("Syntax Error: {message}")]
    Parse { message: String },

    /// The operation does not conform to the schema
    #[error("{}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// Argument or variable values were rejected
    #[error("{message}")]
    InvalidInput { message: String },

    /// No executable operation could be selected from the document
    #[error("{message}")]
    Operation { message: String },

    /// The backing store could not be accessed
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// An error raised while resolving the root field at `path`
    #[error("{source}")]
    Field {
        path: Vec<String>,
        source: Box<EngineError>,
    },
}

impl EngineError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn operation(message: impl Into<String>) -> Self {
        EngineError::Operation {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        EngineError::Storage {
            message: message.into(),
        }
    }

    /// Attach the response path of the root field that failed
    pub fn at_path(self, path: Vec<String>) -> Self {
        match self {
            EngineError::Field { .. } => self,
            other => EngineError::Field {
                path,
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, without any path wrapper
    pub fn root_cause(&self) -> &EngineError {
        match self {
            EngineError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Stable machine-readable code, exposed as `extensions.code`
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::DuplicateEmail { .. } => "DUPLICATE_EMAIL",
            EngineError::DuplicateId { .. } => "DUPLICATE_ID",
            EngineError::Parse { .. } => "GRAPHQL_PARSE_FAILED",
            EngineError::Validation(_) => "GRAPHQL_VALIDATION_FAILED",
            EngineError::InvalidInput { .. } => "BAD_USER_INPUT",
            EngineError::Operation { .. } => "OPERATION_RESOLUTION_FAILURE",
            EngineError::Storage { .. } => "STORAGE_ERROR",
            EngineError::Field { source, .. } => source.error_code(),
        }
    }

    /// Whether the error was raised before execution started
    ///
    /// Errors raised by a resolver always carry the path of their root field;
    /// anything else rejected the whole request and yields no `data` entry.
    pub fn is_request_error(&self) -> bool {
        !matches!(self, EngineError::Field { .. })
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A single rule violation found while validating an operation against the schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Cannot query field \"{field}\" on type \"{type_name}\".")]
    UnknownField { type_name: String, field: String },

    #[error("Unknown argument \"{argument}\" on field \"{type_name}.{field}\".")]
    UnknownArgument {
        type_name: String,
        field: String,
        argument: String,
    },

    #[error(
        "Field \"{type_name}.{field}\" argument \"{argument}\" of type \"{expected}\" is required, but it was not provided."
    )]
    MissingArgument {
        type_name: String,
        field: String,
        argument: String,
        expected: String,
    },

    #[error("Argument \"{argument}\" on field \"{type_name}.{field}\" expects type \"{expected}\".")]
    InvalidArgument {
        type_name: String,
        field: String,
        argument: String,
        expected: String,
    },

    #[error("Field \"{field}\" of type \"{type_ref}\" must have a selection of subfields.")]
    MissingSelection { field: String, type_ref: String },

    #[error("Field \"{field}\" must not have a selection since type \"{type_ref}\" has no subfields.")]
    UnexpectedSelection { field: String, type_ref: String },

    #[error("Unknown type \"{name}\".")]
    UnknownType { name: String },

    #[error(
        "Fragment cannot be spread here as objects of type \"{parent}\" can never be of type \"{condition}\"."
    )]
    InapplicableFragment { parent: String, condition: String },

    #[error("Unknown fragment \"{name}\".")]
    UnknownFragment { name: String },

    #[error("Cannot spread fragment \"{name}\" within itself.")]
    FragmentCycle { name: String },

    #[error("Variable \"${name}\" is not defined.")]
    UndefinedVariable { name: String },

    #[error("Variable \"${name}\" cannot be non-input type \"{var_type}\".")]
    NonInputVariable { name: String, var_type: String },

    #[error(
        "Variable \"${name}\" of type \"{var_type}\" used in position expecting type \"{expected}\"."
    )]
    VariableTypeMismatch {
        name: String,
        var_type: String,
        expected: String,
    },

    #[error(
        "Fields \"{key}\" conflict because {reason}. Use different aliases on the fields to fetch both if this was intentional."
    )]
    FieldsConflict { key: String, reason: String },

    #[error("Unknown directive \"@{name}\".")]
    UnknownDirective { name: String },

    #[error("Unknown argument \"{argument}\" on directive \"@{directive}\".")]
    UnknownDirectiveArgument { directive: String, argument: String },

    #[error(
        "Directive \"@{directive}\" argument \"{argument}\" of type \"{expected}\" is required, but it was not provided."
    )]
    MissingDirectiveArgument {
        directive: String,
        argument: String,
        expected: String,
    },

    #[error("Argument \"{argument}\" on directive \"@{directive}\" expects type \"{expected}\".")]
    InvalidDirectiveArgument {
        directive: String,
        argument: String,
        expected: String,
    },
}
