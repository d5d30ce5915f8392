//! Schema introspection: `__schema` and `__type(name)`
//!
//! The introspection tree is rendered as JSON from the [`Schema`] and each
//! request projects its selection over it. Every object in the tree carries
//! its `__typename`, so fragments on `__Type` or `__Field` apply the same way
//! they do on graph records.

use graphql_parser::query::SelectionSet;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::field_resolver::{self, ExecutionContext};
use super::schema::{ArgumentDef, FieldDef, ObjectType, SCALARS, Schema, TypeRef};

/// Query root fields answered from the schema instead of the store
pub const ROOT_FIELDS: &[&str] = &["__schema", "__type"];

/// Arguments of `__type`
#[derive(Debug, Clone, Deserialize)]
pub struct TypeArgs {
    pub name: String,
}

/// `__schema`
pub fn schema_value(schema: &Schema) -> Value {
    let types: Vec<Value> = schema
        .objects()
        .map(object_type)
        .chain(SCALARS.iter().map(|name| scalar_type(name)))
        .collect();

    json!({
        "__typename": "__Schema",
        "description": null,
        "queryType": object_type(schema.query_type()),
        "mutationType": object_type(schema.mutation_type()),
        "subscriptionType": null,
        "types": types,
        "directives": [
            directive("skip", "Directs the executor to skip this field or fragment when the `if` argument is true."),
            directive("include", "Directs the executor to include this field or fragment only when the `if` argument is true."),
        ],
    })
}

/// `__type(name)`: the named type, or `null` when the schema has none
pub fn type_value(schema: &Schema, name: &str) -> Value {
    match schema.object(name) {
        Some(object) => object_type(object),
        None if SCALARS.contains(&name) => scalar_type(name),
        None => Value::Null,
    }
}

/// Project a selection over a subtree of the introspection result
pub fn project<'d, 'q>(
    ctx: &ExecutionContext<'d, 'q>,
    value: &Value,
    selections: &[&'d SelectionSet<'q, String>],
) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| project(ctx, item, selections))
                .collect(),
        ),
        Value::Object(object) => {
            let type_name = object
                .get("__typename")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let mut result = Map::new();

            for (key, fields) in field_resolver::collect_fields(ctx, type_name, selections) {
                let child = object.get(fields[0].name.as_str()).unwrap_or(&Value::Null);
                let nested = field_resolver::merged_selections(&fields);
                let projected = if nested.iter().all(|set| set.items.is_empty()) {
                    child.clone()
                } else {
                    project(ctx, child, &nested)
                };
                result.insert(key, projected);
            }

            Value::Object(result)
        }
        other => other.clone(),
    }
}

/// A `__Type` with every field present, so projections never miss a key
fn type_object(kind: &str, name: Option<&str>) -> Map<String, Value> {
    let mut object = Map::new();
    object.insert("__typename".to_string(), json!("__Type"));
    object.insert("kind".to_string(), json!(kind));
    object.insert("name".to_string(), json!(name));
    for key in [
        "description",
        "specifiedByURL",
        "fields",
        "interfaces",
        "possibleTypes",
        "enumValues",
        "inputFields",
        "ofType",
    ] {
        object.insert(key.to_string(), Value::Null);
    }
    object
}

fn object_type(object: &ObjectType) -> Value {
    let mut ty = type_object("OBJECT", Some(object.name.as_str()));
    ty.insert(
        "fields".to_string(),
        Value::Array(object.fields.values().map(field).collect()),
    );
    ty.insert("interfaces".to_string(), json!([]));
    Value::Object(ty)
}

fn scalar_type(name: &str) -> Value {
    Value::Object(type_object("SCALAR", Some(name)))
}

/// Type reference of a field or argument
///
/// Named types are references only: `kind` and `name`, no fields.
fn type_ref(ty: &TypeRef) -> Value {
    let object = match ty {
        TypeRef::NonNull(inner) => wrapper("NON_NULL", inner),
        TypeRef::List(inner) => wrapper("LIST", inner),
        TypeRef::Named(name) if SCALARS.contains(&name.as_str()) => {
            type_object("SCALAR", Some(name.as_str()))
        }
        TypeRef::Named(name) => type_object("OBJECT", Some(name.as_str())),
    };
    Value::Object(object)
}

fn wrapper(kind: &str, inner: &TypeRef) -> Map<String, Value> {
    let mut object = type_object(kind, None);
    object.insert("ofType".to_string(), type_ref(inner));
    object
}

fn field(def: &FieldDef) -> Value {
    let args: Vec<Value> = def.args.iter().map(input_value).collect();
    json!({
        "__typename": "__Field",
        "name": def.name,
        "description": null,
        "args": args,
        "type": type_ref(&def.ty),
        "isDeprecated": false,
        "deprecationReason": null,
    })
}

fn input_value(arg: &ArgumentDef) -> Value {
    json!({
        "__typename": "__InputValue",
        "name": arg.name,
        "description": null,
        "type": type_ref(&arg.ty),
        "defaultValue": null,
        "isDeprecated": false,
        "deprecationReason": null,
    })
}

fn directive(name: &str, description: &str) -> Value {
    let condition = ArgumentDef {
        name: "if".to_string(),
        ty: TypeRef::required("Boolean"),
    };
    json!({
        "__typename": "__Directive",
        "name": name,
        "description": description,
        "isRepeatable": false,
        "locations": ["FIELD", "FRAGMENT_SPREAD", "INLINE_FRAGMENT"],
        "args": [input_value(&condition)],
    })
}
