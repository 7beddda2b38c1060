use serde_json::{Map, Value};

use crate::compile::Definitions;
use crate::property::Property;

/// A compiled schema document: the root of the property tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// `$schema`
    pub dialect: Option<String>,
    pub root_type: String,
    pub description: Option<String>,
    pub required: Vec<String>,
    pub additional_properties: bool,
    pub definitions: Definitions,
    pub properties: Vec<Property>,
}

impl Schema {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Top-level `required` names that exist in the tree but hold no value.
    pub fn missing_required(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|name| {
                self.property(name)
                    .is_some_and(|p| !crate::assemble::has_value(p))
            })
            .map(String::as_str)
            .collect()
    }

    pub fn assemble(&self) -> Map<String, Value> {
        crate::assemble::assemble(&self.properties)
    }
}
