//! Raw schema → property tree.
//!
//! Depth-first over `definitions` (first) and `properties`. `$ref` nodes are
//! handed to the [`ReferenceResolver`] and spliced in under the referencing
//! key; everything else dispatches on `type`. Nodes with an unknown or
//! missing `type` are skipped with a warning.
use std::time::Duration;

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use serde_json::Value;

use crate::error::{CompileError, SchemaError, UnresolvedReferenceError};
use crate::path::PathExpr;
use crate::property::{
    ArrayRules, IntegerRules, Kind, NumberRules, ObjectRules, Pattern, Property, StringRules,
};
use crate::raw::{self, Keywords, RawNode, RootKeywords};
use crate::reference::{Fetch, HttpFetcher, ReferenceResolver};
use crate::schema::Schema;

pub type Definitions = IndexMap<String, Property>;

/// Default for `--fetch-timeout`.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

pub struct SchemaCompiler<F: Fetch = HttpFetcher> {
    resolver: ReferenceResolver<F>,
}

/// Where `$ref`s found while compiling a node are looked up.
#[derive(Debug, Clone)]
pub struct Scope<'d> {
    definitions: &'d Definitions,
    /// Set while compiling inside a fetched document: `#/...` then points into it.
    base: Option<String>,
    depth: usize,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl<F: Fetch> SchemaCompiler<F> {
    pub fn new(resolver: ReferenceResolver<F>) -> Self {
        Self { resolver }
    }

    pub fn with_fetcher(fetcher: F) -> Self {
        Self::new(ReferenceResolver::new(fetcher))
    }

    pub fn resolver(&self) -> &ReferenceResolver<F> {
        &self.resolver
    }

    pub fn compile(&mut self, raw: &Value) -> Result<Schema, CompileError> {
        if !raw.is_object() {
            return Err(SchemaError::NotAnObject.into());
        }
        let root: RootKeywords = raw::decode(raw, "$")?;
        if let Some(type_) = &root.type_ {
            if type_.as_str() != Some("object") {
                let shown = type_.as_str().map(str::to_owned).unwrap_or_else(|| type_.to_string());
                return Err(SchemaError::UnsupportedRootType(shown).into());
            }
        }
        let Some(properties) = root.properties.as_ref() else {
            return Err(SchemaError::MissingProperties.into());
        };

        let definitions = self.compile_definitions(&root)?;

        let scope = Scope::root(&definitions);
        let mut top = ObjectRules::default();
        for (key, value) in properties {
            tracing::debug!(property = %key, "compiling property");
            let path = PathExpr::root().child(key);
            if let Some(property) = compile_node(&mut self.resolver, &scope, key, path, value)? {
                top.insert(property);
            }
        }

        Ok(Schema {
            dialect: root.schema,
            root_type: "object".to_owned(),
            description: root.description,
            required: root.required,
            additional_properties: raw::allows_additional(root.additional_properties.as_ref()),
            definitions,
            properties: top.children,
        })
    }

    /// `definitions` and `$defs`, in declaration order. A definition may refer
    /// to one declared after it: those are retried until nothing changes.
    fn compile_definitions(&mut self, root: &RootKeywords) -> Result<Definitions, CompileError> {
        let declared: Vec<(&String, &Value)> = root
            .definitions
            .iter()
            .flatten()
            .chain(root.defs.iter().flatten())
            .collect();

        let mut compiled = Definitions::new();
        let mut pending = declared.clone();
        while !pending.is_empty() {
            let mut deferred = Vec::new();
            let mut last_error = None;
            for &(name, body) in &pending {
                tracing::debug!(definition = %name, "compiling definition");
                let scope = Scope::root(&compiled);
                let path = PathExpr::root().child(name);
                match compile_node(&mut self.resolver, &scope, name, path, body) {
                    Ok(Some(property)) => {
                        compiled.insert(name.clone(), property);
                    }
                    Ok(None) => {}
                    Err(err) if waits_on_declared(&err, &declared) => {
                        deferred.push((name, body));
                        last_error = Some(err);
                    }
                    Err(err) => return Err(err),
                }
            }
            if deferred.len() == pending.len() {
                if let Some(err) = last_error {
                    return Err(err);
                }
            }
            pending = deferred;
        }

        let mut ordered = Definitions::with_capacity(compiled.len());
        for (name, _) in declared {
            if let Some(property) = compiled.shift_remove(name) {
                ordered.insert(name.clone(), property);
            }
        }
        Ok(ordered)
    }
}

fn waits_on_declared(err: &CompileError, declared: &[(&String, &Value)]) -> bool {
    match err {
        CompileError::Unresolved(UnresolvedReferenceError::UnknownDefinition { name, .. }) => {
            declared.iter().any(|(n, _)| *n == name)
        }
        _ => false,
    }
}

impl<'d> Scope<'d> {
    pub fn root(definitions: &'d Definitions) -> Self {
        Self { definitions, base: None, depth: 0 }
    }
    /// Scope for a subschema found in the document at `url`.
    pub fn remote(&self, url: &str) -> Self {
        Self {
            definitions: self.definitions,
            base: Some(url.to_owned()),
            depth: self.depth + 1,
        }
    }
    pub fn definitions(&self) -> &'d Definitions {
        self.definitions
    }
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Compiles the schema `value` found under `key`. `Ok(None)` means skipped.
pub fn compile_node<F: Fetch>(
    resolver: &mut ReferenceResolver<F>,
    scope: &Scope<'_>,
    key: &str,
    path: PathExpr,
    value: &Value,
) -> Result<Option<Property>, CompileError> {
    let at = path.to_string();
    match RawNode::from_value(value, &at)? {
        None => {
            tracing::warn!(path = %at, "schema is not an object; skipping");
            Ok(None)
        }
        Some(RawNode::Reference(reference)) => {
            resolver.resolve(&reference, scope, key, path).map(Some)
        }
        Some(RawNode::Typed(keywords)) => compile_typed(resolver, scope, key, path, keywords),
    }
}

fn compile_typed<F: Fetch>(
    resolver: &mut ReferenceResolver<F>,
    scope: &Scope<'_>,
    key: &str,
    path: PathExpr,
    keywords: Keywords,
) -> Result<Option<Property>, CompileError> {
    let type_name = match keywords.type_name() {
        Some(name) => name,
        None if keywords.properties.is_some() => "object",
        None => {
            tracing::warn!(path = %path, "no supported `type` and no `$ref`; skipping");
            return Ok(None);
        }
    };
    let kind = match type_name {
        "string" => Kind::String(string_rules(&keywords, &path)?),
        "integer" => Kind::Integer(IntegerRules {
            format: keywords.format.clone(),
            enum_values: integer_enum(keywords.enum_.as_deref(), &path)?,
        }),
        "number" => Kind::Number(NumberRules {
            format: keywords.format.clone(),
            enum_values: number_enum(keywords.enum_.as_deref(), &path)?,
        }),
        "boolean" => Kind::Boolean,
        "array" => Kind::Array(array_rules(resolver, scope, key, &keywords)?),
        "object" => Kind::Object(object_rules(resolver, scope, &path, &keywords)?),
        other => {
            tracing::warn!(path = %path, ty = other, "type not supported yet; skipping");
            return Ok(None);
        }
    };
    let mut property = Property::new(key, path, kind);
    property.description = keywords.description;
    property.default = keywords.default;
    Ok(Some(property))
}

fn string_rules(keywords: &Keywords, path: &PathExpr) -> Result<StringRules, SchemaError> {
    // Lookaround and backreferences are outside `regex`; such a field accepts any string.
    let pattern = match &keywords.pattern {
        Some(source) => match Pattern::new(source) {
            Ok(pattern) => Some(pattern),
            Err(error) => {
                tracing::warn!(path = %path, pattern = %source, %error, "pattern not supported; not enforcing it");
                None
            }
        },
        None => None,
    };
    let enum_values = match keywords.enum_.as_deref() {
        Some(values) => Some(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| match v {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(enum_error(path, i, "a string")),
                })
                .collect::<Result<IndexSet<_>, _>>()?,
        ),
        None => None,
    };
    Ok(StringRules { format: keywords.format.clone(), pattern, enum_values })
}

fn integer_enum(values: Option<&[Value]>, path: &PathExpr) -> Result<Option<IndexSet<i64>>, SchemaError> {
    let Some(values) = values else { return Ok(None) };
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v.as_i64().ok_or_else(|| enum_error(path, i, "an integer")))
        .collect::<Result<IndexSet<_>, _>>()
        .map(Some)
}

fn number_enum(
    values: Option<&[Value]>,
    path: &PathExpr,
) -> Result<Option<IndexSet<OrderedFloat<f64>>>, SchemaError> {
    let Some(values) = values else { return Ok(None) };
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v.as_f64().map(OrderedFloat).ok_or_else(|| enum_error(path, i, "a number")))
        .collect::<Result<IndexSet<_>, _>>()
        .map(Some)
}

fn enum_error(path: &PathExpr, index: usize, expected: &str) -> SchemaError {
    SchemaError::Keyword {
        path: format!("{path}.enum[{index}]"),
        message: format!("expected {expected}"),
    }
}

fn array_rules<F: Fetch>(
    resolver: &mut ReferenceResolver<F>,
    scope: &Scope<'_>,
    key: &str,
    keywords: &Keywords,
) -> Result<ArrayRules, CompileError> {
    let items = match &keywords.items {
        Some(items) => {
            compile_node(resolver, scope, key, PathExpr::relative(key), items)?.map(Box::new)
        }
        None => None,
    };
    Ok(ArrayRules {
        items,
        unique_items: keywords.unique_items.unwrap_or(false),
        min_items: keywords.min_items,
    })
}

fn object_rules<F: Fetch>(
    resolver: &mut ReferenceResolver<F>,
    scope: &Scope<'_>,
    path: &PathExpr,
    keywords: &Keywords,
) -> Result<ObjectRules, CompileError> {
    // A schema-valued `additionalProperties` only flips the flag; its schema is never prompted.
    let mut rules = ObjectRules {
        children: Vec::new(),
        additional_properties: raw::allows_additional(keywords.additional_properties.as_ref()),
    };
    for (key, value) in keywords.properties.iter().flatten() {
        if let Some(child) = compile_node(resolver, scope, key, path.child(key), value)? {
            rules.insert(child);
        }
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::testing::CountingFetcher;
    use serde_json::json;

    fn compile_offline(raw: Value) -> Result<Schema, CompileError> {
        SchemaCompiler::with_fetcher(CountingFetcher::default()).compile(&raw)
    }

    #[test]
    fn loads_dialect_and_nested_objects() {
        let schema = compile_offline(json!({
            "$schema": "https://schema.test",
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer"},
                "address": {
                    "type": "object",
                    "properties": {"street": {"type": "string"}, "city": {"type": "string"}}
                }
            }
        }))
        .unwrap();
        assert_eq!(schema.dialect.as_deref(), Some("https://schema.test"));
        let names: Vec<_> = schema.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["name", "age", "address"]);
        let address = schema.property("address").unwrap().object().unwrap();
        assert_eq!(address.names(), ["street", "city"]);
        assert_eq!(address.child("city").unwrap().path.to_string(), "$.address.city");
    }

    #[test]
    fn missing_properties_is_fatal() {
        let err = compile_offline(json!({"type": "object"})).unwrap_err();
        assert!(matches!(err, CompileError::Schema(SchemaError::MissingProperties)));
    }

    #[test]
    fn non_object_root_type_is_fatal() {
        let err = compile_offline(json!({"type": "array", "properties": {}})).unwrap_err();
        assert!(matches!(err, CompileError::Schema(SchemaError::UnsupportedRootType(t)) if t == "array"));
    }

    #[test]
    fn unknown_nested_types_are_skipped() {
        let schema = compile_offline(json!({
            "type": "object",
            "properties": {
                "nothing": {"type": "null"},
                "untyped": {"description": "no type"},
                "kept": {"type": "boolean"},
                "obj": {"type": "object", "properties": {"bad": {"type": "mystery"}}}
            }
        }))
        .unwrap();
        let names: Vec<_> = schema.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["kept", "obj"]);
        assert!(schema.property("obj").unwrap().object().unwrap().children.is_empty());
    }

    #[test]
    fn reference_transparency() {
        let via_ref = compile_offline(json!({
            "type": "object",
            "properties": {"a": {"$ref": "#/definitions/a"}},
            "definitions": {"a": {"type": "integer"}}
        }))
        .unwrap();
        let inline = compile_offline(json!({
            "type": "object",
            "properties": {"a": {"type": "integer"}}
        }))
        .unwrap();
        assert_eq!(via_ref.properties, inline.properties);
        assert_eq!(via_ref.properties[0].declared_type(), "integer");
    }

    #[test]
    fn referenced_node_takes_the_referencing_key() {
        let schema = compile_offline(json!({
            "type": "object",
            "properties": {
                "home": {"$ref": "#/definitions/address"},
                "work": {"$ref": "#/definitions/address"}
            },
            "definitions": {
                "address": {
                    "type": "object",
                    "properties": {
                        "city": {"type": "string"},
                        "postal_code": {"type": "string", "pattern": "^[0-9]{4}-[0-9]{3}$"}
                    }
                }
            }
        }))
        .unwrap();
        let work = schema.property("work").unwrap();
        assert_eq!(work.name, "work");
        assert_eq!(work.path.to_string(), "$.work");
        let postal = work.object().unwrap().child("postal_code").unwrap();
        assert_eq!(postal.path.to_string(), "$.work.postal_code");
        assert!(postal.validate("1000-123").is_ok());
        assert!(postal.validate("1000123").is_err());
        assert_eq!(schema.definitions.keys().collect::<Vec<_>>(), ["address"]);
    }

    #[test]
    fn definitions_may_reference_later_definitions() {
        let schema = compile_offline(json!({
            "type": "object",
            "properties": {"person": {"$ref": "#/definitions/person"}},
            "definitions": {
                "person": {"type": "object", "properties": {"age": {"$ref": "#/$defs/age"}}}
            },
            "$defs": {"age": {"type": "integer", "enum": [1, 2, 3]}}
        }))
        .unwrap();
        let age = schema.property("person").unwrap().object().unwrap().child("age").unwrap();
        assert_eq!(age.path.to_string(), "$.person.age");
        assert!(age.validate("4").is_err());
        assert_eq!(schema.definitions.keys().collect::<Vec<_>>(), ["person", "age"]);
    }

    #[test]
    fn cyclic_definitions_do_not_resolve() {
        let err = compile_offline(json!({
            "type": "object",
            "properties": {},
            "definitions": {
                "a": {"type": "object", "properties": {"b": {"$ref": "#/definitions/b"}}},
                "b": {"type": "object", "properties": {"a": {"$ref": "#/definitions/a"}}}
            }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            CompileError::Unresolved(UnresolvedReferenceError::UnknownDefinition { .. })
        ));
    }

    #[test]
    fn dangling_reference_is_fatal() {
        let err = compile_offline(json!({
            "type": "object",
            "properties": {"a": {"$ref": "#/definitions/missing"}}
        }))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "no definition named `missing` (referenced as `#/definitions/missing`)"
        );
    }

    #[test]
    fn arrays_compile_their_items_once() {
        let schema = compile_offline(json!({
            "type": "object",
            "properties": {
                "phones": {"type": "array", "items": {"type": "integer"}, "minItems": 1},
                "emails": {"type": "array", "items": {"type": "string"}, "uniqueItems": true},
                "free": {"type": "array"}
            }
        }))
        .unwrap();
        let phones = schema.property("phones").unwrap().array().unwrap();
        let template = phones.items.as_ref().unwrap();
        assert_eq!(template.declared_type(), "integer");
        assert_eq!(template.path.to_string(), ".phones");
        assert_eq!(phones.min_items, Some(1));
        assert!(schema.property("emails").unwrap().array().unwrap().unique_items);
        assert!(schema.property("free").unwrap().array().unwrap().items.is_none());
    }

    #[test]
    fn schema_valued_additional_properties_has_no_children() {
        let schema = compile_offline(json!({
            "$schema": "https://example.com",
            "type": "object",
            "properties": {
                "securityRequirement": {
                    "type": "object",
                    "additionalProperties": {"type": "array", "items": {"type": "string"}}
                }
            }
        }))
        .unwrap();
        let prop = schema.property("securityRequirement").unwrap();
        let rules = prop.object().unwrap();
        assert!(rules.additional_properties);
        assert!(rules.children.is_empty());
    }

    #[test]
    fn unsupported_patterns_are_not_enforced() {
        let schema = compile_offline(json!({
            "properties": {
                "account": {
                    "type": "object",
                    "properties": {
                        "password": {"type": "string", "pattern": "^(?=.*[0-9]).{8,}$"},
                        "code": {"type": "string", "pattern": "("}
                    }
                }
            }
        }))
        .unwrap();
        let account = schema.property("account").unwrap().object().unwrap();
        for name in ["password", "code"] {
            let field = account.child(name).unwrap();
            assert_eq!(field.declared_type(), "string");
            assert_eq!(field.validate("short"), Ok(json!("short")));
        }
    }

    #[test]
    fn bad_enum_members_are_schema_errors() {
        let err = compile_offline(json!({
            "properties": {"n": {"type": "integer", "enum": [1, "two"]}}
        }))
        .unwrap_err();
        assert!(matches!(err, CompileError::Schema(SchemaError::Keyword { path, .. }) if path == "$.n.enum[1]"));
    }

    #[test]
    fn defaults_and_descriptions_are_kept() {
        let schema = compile_offline(json!({
            "properties": {"port": {"type": "number", "default": 8080, "description": "listen port"}}
        }))
        .unwrap();
        let port = schema.property("port").unwrap();
        assert_eq!(port.default, Some(json!(8080)));
        assert_eq!(port.description.as_deref(), Some("listen port"));
    }
}
