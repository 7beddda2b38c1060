//! Compiled property tree.
//!
//! A closed variant set over the JSON Schema types we prompt for. Structure is
//! fixed after compilation; only the captured value is written afterwards,
//! by the navigator.
pub mod array;
pub mod number;
pub mod object;
pub mod string;

use serde_json::Value;

use crate::error::ValidationError;
use crate::path::PathExpr;
use crate::prompt::Question;

pub use array::ArrayRules;
pub use number::{IntegerRules, NumberRules};
pub use object::ObjectRules;
pub use string::{Pattern, StringRules};

const BOOLEAN_CHOICES: [&str; 2] = ["true", "false"];

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub path: PathExpr,
    pub kind: Kind,
    value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    String(StringRules),
    Integer(IntegerRules),
    Number(NumberRules),
    Boolean,
    Array(ArrayRules),
    Object(ObjectRules),
}

impl Kind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Kind::String(_) => "string",
            Kind::Integer(_) => "integer",
            Kind::Number(_) => "number",
            Kind::Boolean => "boolean",
            Kind::Array(_) => "array",
            Kind::Object(_) => "object",
        }
    }
}

impl Property {
    pub fn new(name: &str, path: PathExpr, kind: Kind) -> Self {
        Self {
            name: name.to_owned(),
            description: None,
            default: None,
            path,
            kind,
            value: None,
        }
    }

    pub fn declared_type(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Answered by a single question (everything except arrays and objects).
    pub fn is_leaf(&self) -> bool {
        !matches!(self.kind, Kind::Array(_) | Kind::Object(_))
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Stores the answer. Only the navigator calls this; a revisit overwrites.
    pub fn capture(&mut self, value: Value) {
        self.value = Some(value);
    }

    pub fn object(&self) -> Option<&ObjectRules> {
        match &self.kind {
            Kind::Object(rules) => Some(rules),
            _ => None,
        }
    }

    pub fn object_mut(&mut self) -> Option<&mut ObjectRules> {
        match &mut self.kind {
            Kind::Object(rules) => Some(rules),
            _ => None,
        }
    }

    pub fn array(&self) -> Option<&ArrayRules> {
        match &self.kind {
            Kind::Array(rules) => Some(rules),
            _ => None,
        }
    }

    /// Copy of this node spliced in under another key: the name changes, every
    /// path below is recomputed and nothing captured is carried over.
    pub fn relocate(&self, name: &str, path: PathExpr) -> Self {
        let kind = match &self.kind {
            Kind::Object(rules) => Kind::Object(ObjectRules {
                children: rules
                    .children
                    .iter()
                    .map(|child| child.relocate(&child.name, path.child(&child.name)))
                    .collect(),
                additional_properties: rules.additional_properties,
            }),
            Kind::Array(rules) => Kind::Array(ArrayRules {
                items: rules
                    .items
                    .as_ref()
                    .map(|item| Box::new(item.relocate(name, PathExpr::relative(name)))),
                unique_items: rules.unique_items,
                min_items: rules.min_items,
            }),
            other => other.clone(),
        };
        Self {
            name: name.to_owned(),
            description: self.description.clone(),
            default: self.default.clone(),
            path,
            kind,
            value: None,
        }
    }

    /// The question that captures this node. `None` for arrays and objects,
    /// which the navigator walks instead.
    pub fn question(&self) -> Option<Question> {
        let message = format!("{} ({}): ", self.name, self.declared_type());
        let default = self.default.as_ref().and_then(default_text);
        let choices = match &self.kind {
            Kind::String(rules) => rules.choices(),
            Kind::Integer(rules) => rules.choices(),
            Kind::Number(rules) => rules.choices(),
            Kind::Boolean => {
                return Some(Question::select(
                    format!("{}?", self.name),
                    BOOLEAN_CHOICES.iter().map(|c| c.to_string()).collect(),
                    default,
                ));
            }
            Kind::Array(_) | Kind::Object(_) => return None,
        };
        Some(match choices {
            Some(choices) => Question::select(message, choices, default),
            None => Question::input(message, default),
        })
    }

    pub fn validate(&self, raw: &str) -> Result<Value, ValidationError> {
        match &self.kind {
            Kind::String(rules) => rules.validate(raw),
            Kind::Integer(rules) => rules.validate(raw),
            Kind::Number(rules) => rules.validate(raw),
            Kind::Boolean => match raw.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(ValidationError::NotBoolean),
            },
            Kind::Array(_) | Kind::Object(_) => {
                Err(ValidationError::NotScalar(self.declared_type()))
            }
        }
    }
}

fn default_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
