use serde_json::Value;

use super::Property;
use crate::error::ValidationError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrayRules {
    /// Element template. `None` when the schema has no `items`: elements are
    /// then collected as free text.
    pub items: Option<Box<Property>>,
    pub unique_items: bool,
    pub min_items: Option<u64>,
}

impl ArrayRules {
    pub fn validate_element(&self, raw: &str) -> Result<Value, ValidationError> {
        match &self.items {
            Some(template) => template.validate(raw),
            None => Ok(Value::String(raw.to_owned())),
        }
    }

    /// Checks the collected sequence as a whole once the user stops adding.
    pub fn finish(&self, elements: Vec<Value>) -> Result<Value, ValidationError> {
        if let Some(min) = self.min_items {
            if (elements.len() as u64) < min {
                return Err(ValidationError::TooFewItems { min, got: elements.len() });
            }
        }
        if self.unique_items {
            for (i, element) in elements.iter().enumerate() {
                if elements[..i].contains(element) {
                    return Err(ValidationError::DuplicateItem(i + 1));
                }
            }
        }
        Ok(Value::Array(elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathExpr;
    use crate::property::{IntegerRules, Kind};
    use serde_json::json;

    fn integer_items() -> ArrayRules {
        let template = Property::new(
            "phones",
            PathExpr::relative("phones"),
            Kind::Integer(IntegerRules::default()),
        );
        ArrayRules { items: Some(Box::new(template)), ..ArrayRules::default() }
    }

    #[test]
    fn elements_use_the_template_validator() {
        let rules = integer_items();
        assert_eq!(rules.validate_element("3"), Ok(json!(3)));
        assert_eq!(rules.validate_element("x"), Err(ValidationError::NotInteger));
    }

    #[test]
    fn missing_items_means_free_text() {
        let rules = ArrayRules::default();
        assert_eq!(rules.validate_element("a, b"), Ok(json!("a, b")));
    }

    #[test]
    fn min_items_checked_on_finish() {
        let rules = ArrayRules { min_items: Some(2), ..integer_items() };
        assert_eq!(
            rules.finish(vec![json!(1)]),
            Err(ValidationError::TooFewItems { min: 2, got: 1 })
        );
        assert_eq!(rules.finish(vec![json!(3), json!(7)]), Ok(json!([3, 7])));
    }

    #[test]
    fn unique_items_rejects_duplicates() {
        let rules = ArrayRules { unique_items: true, ..integer_items() };
        assert_eq!(
            rules.finish(vec![json!(1), json!(2), json!(1)]),
            Err(ValidationError::DuplicateItem(3))
        );
    }
}
