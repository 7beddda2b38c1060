use std::num::IntErrorKind;

use indexmap::IndexSet;
use ordered_float::OrderedFloat;
use serde_json::{Number, Value};

use crate::error::ValidationError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegerRules {
    pub format: Option<String>,
    pub enum_values: Option<IndexSet<i64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRules {
    pub format: Option<String>,
    pub enum_values: Option<IndexSet<OrderedFloat<f64>>>,
}

impl IntegerRules {
    pub fn validate(&self, raw: &str) -> Result<Value, ValidationError> {
        let parsed: i64 = raw.trim().parse().map_err(|_| ValidationError::NotInteger)?;
        if let Some(allowed) = &self.enum_values {
            if !allowed.contains(&parsed) {
                return Err(ValidationError::NotInEnum(self.choices().unwrap_or_default()));
            }
        }
        Ok(Value::from(parsed))
    }

    pub fn choices(&self) -> Option<Vec<String>> {
        self.enum_values.as_ref().map(|set| set.iter().map(i64::to_string).collect())
    }
}

impl NumberRules {
    /// Integers stay integers: only input containing `.`, or digits past the
    /// `i64` range, is read as a float.
    pub fn validate(&self, raw: &str) -> Result<Value, ValidationError> {
        let raw = raw.trim();
        let (number, as_float) = if raw.contains('.') {
            let f: f64 = raw.parse().map_err(|_| ValidationError::NotNumber)?;
            (Number::from_f64(f).ok_or(ValidationError::NotNumber)?, f)
        } else {
            match raw.parse::<i64>() {
                Ok(i) => (Number::from(i), i as f64),
                Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                    let f: f64 = raw.parse().map_err(|_| ValidationError::NotNumber)?;
                    (Number::from_f64(f).ok_or(ValidationError::NotNumber)?, f)
                }
                Err(_) => return Err(ValidationError::NotNumber),
            }
        };
        if let Some(allowed) = &self.enum_values {
            if !allowed.contains(&OrderedFloat(as_float)) {
                return Err(ValidationError::NotInEnum(self.choices().unwrap_or_default()));
            }
        }
        Ok(Value::Number(number))
    }

    pub fn choices(&self) -> Option<Vec<String>> {
        self.enum_values.as_ref().map(|set| set.iter().map(|f| f.0.to_string()).collect())
    }
}
