//! Static schema of the graph
//!
//! The schema is the wire contract: operations are validated against it and
//! its SDL is served to clients. It is built once per executor.

use indexmap::IndexMap;
use std::fmt;

/// Built-in scalar type names
pub const SCALARS: &[&str] = &["ID", "String", "Int", "Boolean"];

/// A GraphQL type reference (e.g., `[Post!]!`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    NonNull(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: &str) -> Self {
        TypeRef::Named(name.to_string())
    }

    pub fn non_null(inner: TypeRef) -> Self {
        TypeRef::NonNull(Box::new(inner))
    }

    pub fn list(inner: TypeRef) -> Self {
        TypeRef::List(Box::new(inner))
    }

    /// `Name!`
    pub fn required(name: &str) -> Self {
        Self::non_null(Self::named(name))
    }

    /// `[Name!]!`
    pub fn required_list(name: &str) -> Self {
        Self::non_null(Self::list(Self::required(name)))
    }

    /// The innermost named type
    pub fn base_name(&self) -> &str {
        match self {
            TypeRef::Named(name) => name,
            TypeRef::List(inner) | TypeRef::NonNull(inner) => inner.base_name(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, TypeRef::NonNull(_))
    }

    /// Whether the base type is a scalar (and so takes no sub-selection)
    pub fn is_leaf(&self) -> bool {
        SCALARS.contains(&self.base_name())
    }

    /// Whether a value of type `self` may be used where `expected` is required
    ///
    /// A nullable variable may not flow into a non-null position unless it has
    /// a default value.
    pub fn is_compatible_with(&self, expected: &TypeRef, has_default: bool) -> bool {
        match (self, expected) {
            (TypeRef::NonNull(inner), TypeRef::NonNull(exp)) => {
                inner.is_compatible_with(exp, has_default)
            }
            (TypeRef::NonNull(inner), exp) => inner.is_compatible_with(exp, has_default),
            (actual, TypeRef::NonNull(exp)) => has_default && actual.is_compatible_with(exp, false),
            (TypeRef::List(inner), TypeRef::List(exp)) => inner.is_compatible_with(exp, false),
            (TypeRef::Named(a), TypeRef::Named(e)) => a == e,
            _ => false,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(name) => write!(f, "{}", name),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
            TypeRef::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

/// An argument accepted by a field
#[derive(Debug, Clone)]
pub struct ArgumentDef {
    pub name: String,
    pub ty: TypeRef,
}

/// A field of an object type
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeRef,
    pub args: Vec<ArgumentDef>,
}

impl FieldDef {
    fn new(name: &str, ty: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            ty,
            args: Vec::new(),
        }
    }

    fn arg(mut self, name: &str, ty: TypeRef) -> Self {
        self.args.push(ArgumentDef {
            name: name.to_string(),
            ty,
        });
        self
    }

    pub fn argument(&self, name: &str) -> Option<&ArgumentDef> {
        self.args.iter().find(|a| a.name == name)
    }
}

/// An object type and its fields, in declaration order
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub fields: IndexMap<String, FieldDef>,
}

impl ObjectType {
    fn new(name: &str, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.to_string(),
            fields: fields.into_iter().map(|f| (f.name.clone(), f)).collect(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }
}

/// The complete schema: root operation types plus object types
#[derive(Debug, Clone)]
pub struct Schema {
    types: IndexMap<String, ObjectType>,
}

impl Schema {
    pub const QUERY: &'static str = "Query";
    pub const MUTATION: &'static str = "Mutation";

    /// The users/posts/comments schema
    pub fn blog() -> Self {
        let filter = || TypeRef::named("String");

        let query = ObjectType::new(
            Self::QUERY,
            vec![
                FieldDef::new("users", TypeRef::required_list("User")).arg("query", filter()),
                FieldDef::new("me", TypeRef::required("User")),
                FieldDef::new("posts", TypeRef::required_list("Post")).arg("query", filter()),
                FieldDef::new("comments", TypeRef::required_list("Comment"))
                    .arg("query", filter()),
            ],
        );

        let mutation = ObjectType::new(
            Self::MUTATION,
            vec![
                FieldDef::new("createUser", TypeRef::required("User"))
                    .arg("name", TypeRef::required("String"))
                    .arg("email", TypeRef::required("String"))
                    .arg("age", TypeRef::named("Int")),
            ],
        );

        let user = ObjectType::new(
            "User",
            vec![
                FieldDef::new("id", TypeRef::required("ID")),
                FieldDef::new("name", TypeRef::required("String")),
                FieldDef::new("email", TypeRef::required("String")),
                FieldDef::new("age", TypeRef::named("Int")),
                FieldDef::new("posts", TypeRef::required_list("Post")),
                FieldDef::new("comments", TypeRef::required_list("Comment")),
            ],
        );

        let post = ObjectType::new(
            "Post",
            vec![
                FieldDef::new("id", TypeRef::required("ID")),
                FieldDef::new("title", TypeRef::required("String")),
                FieldDef::new("body", TypeRef::required("String")),
                FieldDef::new("published", TypeRef::required("Boolean")),
                FieldDef::new("author", TypeRef::required("User")),
                FieldDef::new("comments", TypeRef::required_list("Comment")),
            ],
        );

        let comment = ObjectType::new(
            "Comment",
            vec![
                FieldDef::new("id", TypeRef::required("ID")),
                FieldDef::new("text", TypeRef::required("String")),
                FieldDef::new("author", TypeRef::required("User")),
                FieldDef::new("post", TypeRef::required("Post")),
            ],
        );

        Self {
            types: [query, mutation, user, post, comment]
                .into_iter()
                .map(|t| (t.name.clone(), t))
                .collect(),
        }
    }

    pub fn object(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name)
    }

    /// Whether `name` is a type known to this schema (object or scalar)
    pub fn has_type(&self, name: &str) -> bool {
        self.types.contains_key(name) || SCALARS.contains(&name)
    }

    pub fn query_type(&self) -> &ObjectType {
        &self.types[Self::QUERY]
    }

    pub fn mutation_type(&self) -> &ObjectType {
        &self.types[Self::MUTATION]
    }

    /// Object types in declaration order, root types first
    pub fn objects(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.values()
    }

    /// Render the schema as SDL
    pub fn sdl(&self) -> String {
        let mut sdl = String::new();

        for object in self.objects() {
            sdl.push_str(&format!("type {} {{\n", object.name));
            for field in object.fields.values() {
                let args = if field.args.is_empty() {
                    String::new()
                } else {
                    let list: Vec<String> = field
                        .args
                        .iter()
                        .map(|a| format!("{}: {}", a.name, a.ty))
                        .collect();
                    format!("({})", list.join(", "))
                };
                sdl.push_str(&format!("  {}{}: {}\n", field.name, args, field.ty));
            }
            sdl.push_str("}\n\n");
        }

        sdl.push_str("schema {\n");
        sdl.push_str("  query: Query\n");
        sdl.push_str("  mutation: Mutation\n");
        sdl.push_str("}\n");

        sdl
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::blog()
    }
}
