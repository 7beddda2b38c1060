use indexmap::IndexSet;
use regex::Regex;
use serde_json::Value;

use crate::error::ValidationError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringRules {
    pub format: Option<String>,
    pub pattern: Option<Pattern>,
    /// Offered as a select question; answers outside the set never reach `validate`.
    pub enum_values: Option<IndexSet<String>>,
}

/// A `pattern` keyword. Matching is anchored on both ends.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    anchored: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self { source: source.to_owned(), anchored })
    }
    pub fn as_str(&self) -> &str {
        &self.source
    }
    pub fn is_full_match(&self, input: &str) -> bool {
        self.anchored.is_match(input)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl StringRules {
    pub fn validate(&self, raw: &str) -> Result<Value, ValidationError> {
        if let Some(pattern) = &self.pattern {
            if !pattern.is_full_match(raw) {
                return Err(ValidationError::Pattern(pattern.as_str().to_owned()));
            }
        }
        Ok(Value::String(raw.to_owned()))
    }

    pub fn choices(&self) -> Option<Vec<String>> {
        self.enum_values.as_ref().map(|set| set.iter().cloned().collect())
    }
}
