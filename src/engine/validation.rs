//! Validation of an operation against the schema
//!
//! Runs after parsing and before any resolver. Every violation found is
//! collected, so a client sees all problems of a document at once.

use graphql_parser::query::{
    Directive, Field, FragmentDefinition, Selection, SelectionSet, TypeCondition, Value as GqlValue,
};
use indexmap::IndexMap;
use std::collections::HashMap;

use super::field_resolver;
use super::introspection;
use super::operation::{Fragments, Operation, OperationKind};
use super::schema::{ObjectType, Schema, TypeRef};
use super::utils;
use crate::core::{EngineError, EngineResult, ValidationError};

/// Validate `operation` (and every fragment it reaches) against `schema`
pub fn validate_operation<'d, 'q>(
    schema: &Schema,
    operation: &Operation<'d, 'q>,
    fragments: &Fragments<'d, 'q>,
) -> EngineResult<()> {
    let mut validator = Validator {
        schema,
        fragments,
        variables: HashMap::new(),
        errors: Vec::new(),
    };

    validator.declare_variables(operation);

    let root = match operation.kind {
        OperationKind::Query => schema.query_type(),
        OperationKind::Mutation => schema.mutation_type(),
    };
    validator.validate_selection_set(root, operation.selection_set, &mut Vec::new());

    // Conflicts are only looked for in documents free of other errors, which
    // also rules out fragment cycles.
    if validator.errors.is_empty() {
        validator.check_merge_conflicts(root, &[operation.selection_set]);
    }

    if validator.errors.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(validator.errors))
    }
}

struct Validator<'s, 'd, 'q> {
    schema: &'s Schema,
    fragments: &'s Fragments<'d, 'q>,
    /// Declared variables: type and whether a default exists
    variables: HashMap<String, (TypeRef, bool)>,
    errors: Vec<ValidationError>,
}

impl<'s, 'd, 'q> Validator<'s, 'd, 'q> {
    fn report(&mut self, error: ValidationError) {
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
    }

    fn declare_variables(&mut self, operation: &Operation<'_, '_>) {
        for definition in operation.variable_definitions {
            let ty = utils::type_ref_from_ast(&definition.var_type);
            let base = ty.base_name();

            if !self.schema.has_type(base) {
                self.report(ValidationError::UnknownType {
                    name: base.to_string(),
                });
            } else if !ty.is_leaf() {
                self.report(ValidationError::NonInputVariable {
                    name: definition.name.clone(),
                    var_type: ty.to_string(),
                });
            }

            let has_default = definition.default_value.is_some();
            self.variables
                .insert(definition.name.clone(), (ty, has_default));
        }
    }

    fn validate_selection_set(
        &mut self,
        parent: &'s ObjectType,
        selection_set: &'d SelectionSet<'q, String>,
        spread_stack: &mut Vec<&'d str>,
    ) {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => self.validate_field(parent, field, spread_stack),
                Selection::InlineFragment(inline) => {
                    self.validate_directives(&inline.directives);
                    let target = match &inline.type_condition {
                        Some(TypeCondition::On(condition)) => {
                            match self.fragment_target(parent, condition) {
                                Some(target) => target,
                                None => continue,
                            }
                        }
                        None => parent,
                    };
                    self.validate_selection_set(target, &inline.selection_set, spread_stack);
                }
                Selection::FragmentSpread(spread) => {
                    self.validate_directives(&spread.directives);
                    let name = spread.fragment_name.as_str();
                    let Some(fragment) = self.spread_target(name, spread_stack) else {
                        continue;
                    };

                    let TypeCondition::On(condition) = &fragment.type_condition;
                    let Some(target) = self.fragment_target(parent, condition) else {
                        continue;
                    };

                    spread_stack.push(name);
                    self.validate_selection_set(target, &fragment.selection_set, spread_stack);
                    spread_stack.pop();
                }
            }
        }
    }

    /// Look up a spread fragment, unless it is unknown or already being spread
    fn spread_target(
        &mut self,
        name: &'d str,
        spread_stack: &[&'d str],
    ) -> Option<&'d FragmentDefinition<'q, String>> {
        if spread_stack.contains(&name) {
            self.report(ValidationError::FragmentCycle {
                name: name.to_string(),
            });
            return None;
        }

        let fragment = self.fragments.get(name).copied();
        if fragment.is_none() {
            self.report(ValidationError::UnknownFragment {
                name: name.to_string(),
            });
        }
        fragment
    }

    /// Resolve a fragment type condition in the context of `parent`
    ///
    /// The schema has no interfaces or unions, so a fragment only applies to
    /// the exact object type it names.
    fn fragment_target(&mut self, parent: &'s ObjectType, condition: &str) -> Option<&'s ObjectType> {
        let schema = self.schema;

        match schema.object(condition) {
            Some(_) if condition == parent.name => Some(parent),
            Some(_) => {
                self.report(ValidationError::InapplicableFragment {
                    parent: parent.name.clone(),
                    condition: condition.to_string(),
                });
                None
            }
            None if schema.has_type(condition) => {
                self.report(ValidationError::InapplicableFragment {
                    parent: parent.name.clone(),
                    condition: condition.to_string(),
                });
                None
            }
            None => {
                self.report(ValidationError::UnknownType {
                    name: condition.to_string(),
                });
                None
            }
        }
    }

    fn validate_field(
        &mut self,
        parent: &'s ObjectType,
        field: &'d Field<'q, String>,
        spread_stack: &mut Vec<&'d str>,
    ) {
        let name = field.name.as_str();
        self.validate_directives(&field.directives);

        if name == "__typename" {
            if !field.selection_set.items.is_empty() {
                self.report(ValidationError::UnexpectedSelection {
                    field: name.to_string(),
                    type_ref: "String!".to_string(),
                });
            }
            return;
        }

        if parent.name == Schema::QUERY && introspection::ROOT_FIELDS.contains(&name) {
            self.validate_introspection_field(field, spread_stack);
            return;
        }

        let Some(definition) = parent.field(name) else {
            self.report(ValidationError::UnknownField {
                type_name: parent.name.clone(),
                field: name.to_string(),
            });
            return;
        };

        for (argument, value) in &field.arguments {
            match definition.argument(argument) {
                Some(argument_def) => {
                    if !self.check_value(value, &argument_def.ty) {
                        self.report(ValidationError::InvalidArgument {
                            type_name: parent.name.clone(),
                            field: name.to_string(),
                            argument: argument.clone(),
                            expected: argument_def.ty.to_string(),
                        });
                    }
                }
                None => self.report(ValidationError::UnknownArgument {
                    type_name: parent.name.clone(),
                    field: name.to_string(),
                    argument: argument.clone(),
                }),
            }
        }

        for argument_def in &definition.args {
            let provided = field.arguments.iter().any(|(n, _)| *n == argument_def.name);
            if argument_def.ty.is_non_null() && !provided {
                self.report(ValidationError::MissingArgument {
                    type_name: parent.name.clone(),
                    field: name.to_string(),
                    argument: argument_def.name.clone(),
                    expected: argument_def.ty.to_string(),
                });
            }
        }

        let has_selection = !field.selection_set.items.is_empty();
        if definition.ty.is_leaf() {
            if has_selection {
                self.report(ValidationError::UnexpectedSelection {
                    field: name.to_string(),
                    type_ref: definition.ty.to_string(),
                });
            }
            return;
        }

        if !has_selection {
            self.report(ValidationError::MissingSelection {
                field: name.to_string(),
                type_ref: definition.ty.to_string(),
            });
            return;
        }

        let schema = self.schema;
        match schema.object(definition.ty.base_name()) {
            Some(child) => self.validate_selection_set(child, &field.selection_set, spread_stack),
            None => self.report(ValidationError::UnknownType {
                name: definition.ty.base_name().to_string(),
            }),
        }
    }

    /// `__schema` and `__type` select from the introspection tree
    ///
    /// Their sub-selections are not checked against the schema; only
    /// fragments, directives and variables inside them are.
    fn validate_introspection_field(
        &mut self,
        field: &'d Field<'q, String>,
        spread_stack: &mut Vec<&'d str>,
    ) {
        let name = field.name.as_str();
        let name_type = TypeRef::required("String");

        for (argument, value) in &field.arguments {
            if name == "__type" && argument == "name" {
                if !self.check_value(value, &name_type) {
                    self.report(ValidationError::InvalidArgument {
                        type_name: Schema::QUERY.to_string(),
                        field: name.to_string(),
                        argument: argument.clone(),
                        expected: name_type.to_string(),
                    });
                }
            } else {
                self.report(ValidationError::UnknownArgument {
                    type_name: Schema::QUERY.to_string(),
                    field: name.to_string(),
                    argument: argument.clone(),
                });
            }
        }

        if name == "__type" && !field.arguments.iter().any(|(n, _)| n == "name") {
            self.report(ValidationError::MissingArgument {
                type_name: Schema::QUERY.to_string(),
                field: name.to_string(),
                argument: "name".to_string(),
                expected: name_type.to_string(),
            });
        }

        if field.selection_set.items.is_empty() {
            let type_ref = if name == "__schema" { "__Schema!" } else { "__Type" };
            self.report(ValidationError::MissingSelection {
                field: name.to_string(),
                type_ref: type_ref.to_string(),
            });
            return;
        }

        self.walk_introspection_selection(&field.selection_set, spread_stack);
    }

    fn walk_introspection_selection(
        &mut self,
        selection_set: &'d SelectionSet<'q, String>,
        spread_stack: &mut Vec<&'d str>,
    ) {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => {
                    self.validate_directives(&field.directives);
                    for (_, value) in &field.arguments {
                        self.check_variables_defined(value);
                    }
                    self.walk_introspection_selection(&field.selection_set, spread_stack);
                }
                Selection::InlineFragment(inline) => {
                    self.validate_directives(&inline.directives);
                    self.walk_introspection_selection(&inline.selection_set, spread_stack);
                }
                Selection::FragmentSpread(spread) => {
                    self.validate_directives(&spread.directives);
                    let name = spread.fragment_name.as_str();
                    let Some(fragment) = self.spread_target(name, spread_stack) else {
                        continue;
                    };

                    spread_stack.push(name);
                    self.walk_introspection_selection(&fragment.selection_set, spread_stack);
                    spread_stack.pop();
                }
            }
        }
    }

    /// `@skip` and `@include` are the only directives; both take `if: Boolean!`
    fn validate_directives(&mut self, directives: &[Directive<'q, String>]) {
        let condition_type = TypeRef::required("Boolean");

        for directive in directives {
            let name = directive.name.as_str();
            if name != "skip" && name != "include" {
                self.report(ValidationError::UnknownDirective {
                    name: name.to_string(),
                });
                continue;
            }

            for (argument, value) in &directive.arguments {
                if argument != "if" {
                    self.report(ValidationError::UnknownDirectiveArgument {
                        directive: name.to_string(),
                        argument: argument.clone(),
                    });
                } else if !self.check_value(value, &condition_type) {
                    self.report(ValidationError::InvalidDirectiveArgument {
                        directive: name.to_string(),
                        argument: argument.clone(),
                        expected: condition_type.to_string(),
                    });
                }
            }

            if !directive.arguments.iter().any(|(n, _)| n == "if") {
                self.report(ValidationError::MissingDirectiveArgument {
                    directive: name.to_string(),
                    argument: "if".to_string(),
                    expected: condition_type.to_string(),
                });
            }
        }
    }

    /// Fields sharing a response key must name the same field with the same
    /// arguments; their sub-selections merge and are checked the same way
    fn check_merge_conflicts(
        &mut self,
        parent: &'s ObjectType,
        sets: &[&'d SelectionSet<'q, String>],
    ) {
        let mut grouped: IndexMap<String, Vec<&'d Field<'q, String>>> = IndexMap::new();
        for &set in sets {
            self.collect_by_key(parent, set, &mut grouped);
        }

        for (key, fields) in grouped {
            let first = fields[0];
            let conflict = fields[1..].iter().find_map(|other| {
                if other.name != first.name {
                    Some(format!(
                        "\"{}\" and \"{}\" are different fields",
                        first.name, other.name
                    ))
                } else if !same_arguments(first, other) {
                    Some("they have differing arguments".to_string())
                } else {
                    None
                }
            });

            if let Some(reason) = conflict {
                self.report(ValidationError::FieldsConflict { key, reason });
                continue;
            }

            let schema = self.schema;
            let child = parent
                .field(&first.name)
                .and_then(|definition| schema.object(definition.ty.base_name()));
            if let Some(child) = child {
                self.check_merge_conflicts(child, &field_resolver::merged_selections(&fields));
            }
        }
    }

    fn collect_by_key(
        &self,
        parent: &ObjectType,
        selection_set: &'d SelectionSet<'q, String>,
        grouped: &mut IndexMap<String, Vec<&'d Field<'q, String>>>,
    ) {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => grouped
                    .entry(utils::response_key(field).to_string())
                    .or_default()
                    .push(field),
                Selection::InlineFragment(inline) => {
                    let applies = match &inline.type_condition {
                        Some(TypeCondition::On(condition)) => *condition == parent.name,
                        None => true,
                    };
                    if applies {
                        self.collect_by_key(parent, &inline.selection_set, grouped);
                    }
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.fragment_name.as_str();
                    let Some(fragment) = self.fragments.get(name).copied() else {
                        continue;
                    };
                    let TypeCondition::On(condition) = &fragment.type_condition;
                    if *condition == parent.name {
                        self.collect_by_key(parent, &fragment.selection_set, grouped);
                    }
                }
            }
        }
    }

    /// Report variables that the operation does not declare
    fn check_variables_defined(&mut self, value: &GqlValue<'q, String>) {
        match value {
            GqlValue::Variable(name) => {
                if !self.variables.contains_key(name) {
                    self.report(ValidationError::UndefinedVariable { name: name.clone() });
                }
            }
            GqlValue::List(items) => {
                for item in items {
                    self.check_variables_defined(item);
                }
            }
            GqlValue::Object(fields) => {
                for item in fields.values() {
                    self.check_variables_defined(item);
                }
            }
            _ => {}
        }
    }

    /// Check a literal (or variable) against the expected input type
    ///
    /// Variable misuse is reported here directly; the return value only
    /// speaks for literals.
    fn check_value(&mut self, value: &GqlValue<'q, String>, expected: &TypeRef) -> bool {
        match (value, expected) {
            (GqlValue::Variable(name), _) => {
                match self.variables.get(name).cloned() {
                    None => self.report(ValidationError::UndefinedVariable { name: name.clone() }),
                    Some((var_type, has_default)) => {
                        if !var_type.is_compatible_with(expected, has_default) {
                            self.report(ValidationError::VariableTypeMismatch {
                                name: name.clone(),
                                var_type: var_type.to_string(),
                                expected: expected.to_string(),
                            });
                        }
                    }
                }
                true
            }
            (GqlValue::Null, TypeRef::NonNull(_)) => false,
            (GqlValue::Null, _) => true,
            (v, TypeRef::NonNull(inner)) => self.check_value(v, inner),
            (GqlValue::List(items), TypeRef::List(inner)) => {
                let mut valid = true;
                for item in items {
                    valid &= self.check_value(item, inner);
                }
                valid
            }
            (v, TypeRef::List(inner)) => self.check_value(v, inner),
            (v, TypeRef::Named(type_name)) => match type_name.as_str() {
                "String" => matches!(v, GqlValue::String(_)),
                "ID" => matches!(v, GqlValue::String(_) | GqlValue::Int(_)),
                "Int" => matches!(
                    v,
                    GqlValue::Int(n) if n.as_i64().is_some_and(|i| i32::try_from(i).is_ok())
                ),
                "Boolean" => matches!(v, GqlValue::Boolean(_)),
                _ => false,
            },
        }
    }
}

/// Same arguments in any order; variables compare by name
fn same_arguments<'a>(a: &Field<'a, String>, b: &Field<'a, String>) -> bool {
    a.arguments.len() == b.arguments.len()
        && a.arguments.iter().all(|(name, value)| {
            b.arguments
                .iter()
                .any(|(other_name, other_value)| other_name == name && other_value == value)
        })
}
