//! Typed views over raw schema objects, decoded with JSON-path context.
use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SchemaError;

/// One schema node before compilation: either a `$ref` placeholder, which the
/// compiler replaces before the tree is returned, or typed keywords.
#[derive(Debug)]
pub enum RawNode {
    Reference(String),
    Typed(Keywords),
}

/// The keywords the compiler understands. Unknown keywords are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keywords {
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<Value>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub format: Option<String>,
    pub pattern: Option<String>,
    #[serde(rename = "enum")]
    pub enum_: Option<Vec<Value>>,
    pub items: Option<Value>,
    pub properties: Option<IndexMap<String, Value>>,
    pub additional_properties: Option<Value>,
    pub unique_items: Option<bool>,
    pub min_items: Option<u64>,
}

/// Keywords of the document root.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootKeywords {
    #[serde(rename = "$schema")]
    pub schema: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<Value>,
    pub description: Option<String>,
    #[serde(default)]
    pub required: Vec<String>,
    pub additional_properties: Option<Value>,
    pub properties: Option<IndexMap<String, Value>>,
    pub definitions: Option<IndexMap<String, Value>>,
    #[serde(rename = "$defs")]
    pub defs: Option<IndexMap<String, Value>>,
}

impl RawNode {
    /// `None` when `value` is not an object (e.g. `"items": true`).
    pub fn from_value(value: &Value, at: &str) -> Result<Option<Self>, SchemaError> {
        if !value.is_object() {
            return Ok(None);
        }
        let keywords: Keywords = decode(value, at)?;
        match keywords.reference {
            Some(reference) => Ok(Some(RawNode::Reference(reference))),
            None => Ok(Some(RawNode::Typed(keywords))),
        }
    }
}

impl Keywords {
    /// The `type` keyword when it is a single string.
    pub fn type_name(&self) -> Option<&str> {
        self.type_.as_ref().and_then(Value::as_str)
    }
}

/// `additionalProperties`: booleans as given, a schema object counts as allowed.
pub fn allows_additional(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn decode<T: DeserializeOwned>(value: &Value, at: &str) -> Result<T, SchemaError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let inner = err.path().to_string();
        let path = if inner == "." { at.to_owned() } else { format!("{at}.{inner}") };
        SchemaError::Keyword { path, message: err.into_inner().to_string() }
    })
}
