//! Utility functions for GraphQL execution

use graphql_parser::query::{Directive, Field, Type, Value as GqlValue, VariableDefinition};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

use crate::core::{EngineError, EngineResult};
use crate::engine::schema::TypeRef;

/// Key under which a field appears in the response (alias or name)
pub fn response_key<'d>(field: &'d Field<'_, String>) -> &'d str {
    field.alias.as_deref().unwrap_or(field.name.as_str())
}

/// Convert an AST type into a schema type reference
pub fn type_ref_from_ast(ty: &Type<'_, String>) -> TypeRef {
    match ty {
        Type::NamedType(name) => TypeRef::named(name),
        Type::ListType(inner) => TypeRef::list(type_ref_from_ast(inner)),
        Type::NonNullType(inner) => TypeRef::non_null(type_ref_from_ast(inner)),
    }
}

/// Convert a GraphQL value to JSON, substituting variables
///
/// Returns `None` for a variable that was neither provided nor defaulted, so
/// the caller can treat the argument as absent.
pub fn gql_value_to_json(
    value: &GqlValue<'_, String>,
    variables: &HashMap<String, Value>,
) -> Option<Value> {
    let json = match value {
        GqlValue::Variable(name) => return variables.get(name).cloned(),
        GqlValue::Null => Value::Null,
        GqlValue::Int(i) => json!(i.as_i64().unwrap_or(0)),
        GqlValue::Float(f) => json!(f),
        GqlValue::String(s) => json!(s),
        GqlValue::Boolean(b) => json!(b),
        GqlValue::Enum(e) => json!(e),
        GqlValue::List(list) => Value::Array(
            list.iter()
                .map(|v| gql_value_to_json(v, variables).unwrap_or(Value::Null))
                .collect(),
        ),
        GqlValue::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(
                    k.clone(),
                    gql_value_to_json(v, variables).unwrap_or(Value::Null),
                );
            }
            Value::Object(map)
        }
    };
    Some(json)
}

/// Collect the arguments of a field into a JSON object
pub fn argument_map(field: &Field<'_, String>, variables: &HashMap<String, Value>) -> Map<String, Value> {
    field
        .arguments
        .iter()
        .filter_map(|(name, value)| {
            gql_value_to_json(value, variables).map(|json| (name.clone(), json))
        })
        .collect()
}

/// Deserialize the arguments of a field into a typed argument struct
pub fn parse_args<T: DeserializeOwned>(
    field: &Field<'_, String>,
    variables: &HashMap<String, Value>,
) -> EngineResult<T> {
    let args = Value::Object(argument_map(field, variables));
    serde_json::from_value(args).map_err(|e| {
        EngineError::invalid_input(format!(
            "Invalid arguments for field \"{}\": {}",
            field.name, e
        ))
    })
}

/// Evaluate `@skip(if:)` and `@include(if:)` on a selection
pub fn should_include(directives: &[Directive<'_, String>], variables: &HashMap<String, Value>) -> bool {
    directives.iter().all(|directive| {
        let condition = directive
            .arguments
            .iter()
            .find(|(name, _)| name == "if")
            .and_then(|(_, value)| gql_value_to_json(value, variables))
            .and_then(|v| v.as_bool());

        match (directive.name.as_str(), condition) {
            ("skip", Some(true)) => false,
            ("include", Some(false)) => false,
            _ => true,
        }
    })
}

/// Whether a JSON value can be coerced to the given input type
pub fn json_matches_type(value: &Value, ty: &TypeRef) -> bool {
    match (value, ty) {
        (Value::Null, TypeRef::NonNull(_)) => false,
        (Value::Null, _) => true,
        (v, TypeRef::NonNull(inner)) => json_matches_type(v, inner),
        (Value::Array(items), TypeRef::List(inner)) => {
            items.iter().all(|item| json_matches_type(item, inner))
        }
        (v, TypeRef::List(inner)) => json_matches_type(v, inner),
        (v, TypeRef::Named(name)) => match name.as_str() {
            "String" => v.is_string(),
            "ID" => v.is_string() || v.is_i64(),
            "Int" => v.as_i64().is_some_and(|i| i32::try_from(i).is_ok()),
            "Boolean" => v.is_boolean(),
            _ => false,
        },
    }
}

/// Apply variable definitions to the provided variable values
///
/// Provided values are type-checked, defaults fill in missing values, and a
/// missing non-null variable without a default is an error. Variables left
/// undetermined are absent from the returned map.
pub fn coerce_variables(
    definitions: &[VariableDefinition<'_, String>],
    provided: &HashMap<String, Value>,
) -> EngineResult<HashMap<String, Value>> {
    let mut coerced = HashMap::new();

    for definition in definitions {
        let name = definition.name.as_str();
        let ty = type_ref_from_ast(&definition.var_type);

        match provided.get(name) {
            Some(value) => {
                if !json_matches_type(value, &ty) {
                    return Err(EngineError::invalid_input(format!(
                        "Variable \"${}\" got invalid value {}; expected type \"{}\".",
                        name, value, ty
                    )));
                }
                coerced.insert(name.to_string(), value.clone());
            }
            None => {
                if let Some(default) = &definition.default_value {
                    if let Some(value) = gql_value_to_json(default, &HashMap::new()) {
                        coerced.insert(name.to_string(), value);
                    }
                } else if ty.is_non_null() {
                    return Err(EngineError::invalid_input(format!(
                        "Variable \"${}\" of required type \"{}\" was not provided.",
                        name, ty
                    )));
                }
            }
        }
    }

    Ok(coerced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_parser::query::{Definition, OperationDefinition, Selection, parse_query};
    use serde::Deserialize;

    fn with_first_field<F: FnOnce(&Field<'_, String>)>(query: &str, f: F) {
        let doc = parse_query::<String>(query).unwrap();
        let Definition::Operation(op) = &doc.definitions[0] else {
            panic!("expected an operation");
        };
        let set = match op {
            OperationDefinition::SelectionSet(set) => set,
            OperationDefinition::Query(q) => &q.selection_set,
            OperationDefinition::Mutation(m) => &m.selection_set,
            OperationDefinition::Subscription(s) => &s.selection_set,
        };
        let Selection::Field(field) = &set.items[0] else {
            panic!("expected a field");
        };
        f(field)
    }

    #[test]
    fn test_response_key_prefers_alias() {
        with_first_field("{ everyone: users { id } }", |field| {
            assert_eq!(response_key(field), "everyone");
        });
        with_first_field("{ users { id } }", |field| {
            assert_eq!(response_key(field), "users");
        });
    }

    #[test]
    fn test_argument_map_substitutes_variables() {
        let mut vars = HashMap::new();
        vars.insert("q".to_string(), json!("andr"));

        with_first_field("query($q: String, $missing: String) { users(query: $q) { id } posts(query: $missing) { id } }", |field| {
            let args = argument_map(field, &vars);
            assert_eq!(args.get("query"), Some(&json!("andr")));
        });
    }

    #[test]
    fn test_missing_variable_is_absent_argument() {
        with_first_field("query($q: String) { users(query: $q) { id } }", |field| {
            let args = argument_map(field, &HashMap::new());
            assert!(args.is_empty());
        });
    }

    #[derive(Debug, Deserialize)]
    struct Args {
        name: String,
        age: Option<i32>,
    }

    #[test]
    fn test_parse_args_into_struct() {
        with_first_field(r#"mutation { createUser(name: "Ann", age: 30) { id } }"#, |field| {
            let args: Args = parse_args(field, &HashMap::new()).unwrap();
            assert_eq!(args.name, "Ann");
            assert_eq!(args.age, Some(30));
        });
    }

    #[test]
    fn test_parse_args_reports_field_name() {
        with_first_field(r#"mutation { createUser(age: 30) { id } }"#, |field| {
            let err = parse_args::<Args>(field, &HashMap::new()).unwrap_err();
            assert!(err.to_string().contains("createUser"));
            assert_eq!(err.error_code(), "BAD_USER_INPUT");
        });
    }

    #[test]
    fn test_skip_and_include() {
        let mut vars = HashMap::new();
        vars.insert("yes".to_string(), json!(true));

        with_first_field("{ users @skip(if: true) { id } }", |field| {
            assert!(!should_include(&field.directives, &vars));
        });
        with_first_field("query($yes: Boolean) { users @include(if: $yes) { id } }", |field| {
            assert!(should_include(&field.directives, &vars));
        });
        with_first_field("{ users @include(if: false) { id } }", |field| {
            assert!(!should_include(&field.directives, &vars));
        });
    }

    #[test]
    fn test_json_matches_type() {
        assert!(json_matches_type(&json!("x"), &TypeRef::required("String")));
        assert!(!json_matches_type(&Value::Null, &TypeRef::required("String")));
        assert!(json_matches_type(&Value::Null, &TypeRef::named("Int")));
        assert!(json_matches_type(&json!(30), &TypeRef::named("Int")));
        assert!(!json_matches_type(&json!(1.5), &TypeRef::named("Int")));
        assert!(!json_matches_type(&json!(5_000_000_000_i64), &TypeRef::named("Int")));
        assert!(json_matches_type(&json!(["a", "b"]), &TypeRef::required_list("String")));
    }

    #[test]
    fn test_coerce_variables() {
        let doc = parse_query::<String>(
            "query($q: String = \"lel\", $name: String!, $age: Int) { me { id } }",
        )
        .unwrap();
        let Definition::Operation(OperationDefinition::Query(query)) = &doc.definitions[0] else {
            panic!("expected a query");
        };

        let mut provided = HashMap::new();
        provided.insert("name".to_string(), json!("Ann"));
        let coerced = coerce_variables(&query.variable_definitions, &provided).unwrap();
        assert_eq!(coerced.get("q"), Some(&json!("lel")));
        assert_eq!(coerced.get("name"), Some(&json!("Ann")));
        assert!(!coerced.contains_key("age"));

        let err = coerce_variables(&query.variable_definitions, &HashMap::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Variable \"$name\" of required type \"String!\" was not provided."
        );

        provided.insert("age".to_string(), json!("thirty"));
        let err = coerce_variables(&query.variable_definitions, &provided).unwrap_err();
        assert!(err.to_string().contains("expected type \"Int\""));
    }
}
