//! Interactive walk over the compiled tree.
//!
//! The root menu lists the top-level properties plus `""`, `Discard & Exit`
//! and `Save & Exit`; nested objects list their children plus `Back`. Leaves
//! are asked until their answer validates, arrays collect elements until the
//! user declines to add more. An interrupt at any prompt ends the session
//! without output.
use serde_json::{Map, Value};

use crate::assemble;
use crate::error::{PromptError, ValidationError};
use crate::property::{Kind, Property};
use crate::prompt::{Answer, Prompt, Question};
use crate::schema::Schema;

pub const SELECT_MESSAGE: &str = "Select a property";
pub const SEPARATOR: &str = "";
pub const DISCARD: &str = "Discard & Exit";
pub const SAVE: &str = "Save & Exit";
pub const BACK: &str = "Back";
pub const ADD_MORE: &str = "Add more elements?";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Saved(Map<String, Value>),
    Discarded,
    Cancelled,
}

/// What the menu selection resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    Child(usize),
    Separator,
    Back,
    Discard,
    Save,
}

pub struct Navigator<'p, P: Prompt> {
    prompt: &'p mut P,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

/// Runs a whole session over `schema`, writing captured values into it.
pub fn run<P: Prompt>(schema: &mut Schema, prompt: &mut P) -> Result<Outcome, PromptError> {
    Navigator::new(prompt).run(schema)
}

impl<'p, P: Prompt> Navigator<'p, P> {
    pub fn new(prompt: &'p mut P) -> Self {
        Self { prompt }
    }

    pub fn run(&mut self, schema: &mut Schema) -> Result<Outcome, PromptError> {
        match self.root(schema) {
            Err(PromptError::Cancelled) => {
                tracing::debug!("session cancelled");
                Ok(Outcome::Cancelled)
            }
            other => other,
        }
    }

    fn root(&mut self, schema: &mut Schema) -> Result<Outcome, PromptError> {
        loop {
            let names = schema.properties.iter().map(|p| p.name.clone()).collect::<Vec<_>>();
            match self.menu(&names, &[SEPARATOR, DISCARD, SAVE])? {
                Selection::Child(i) => self.visit(&mut schema.properties[i])?,
                Selection::Separator | Selection::Back => {}
                Selection::Discard => {
                    tracing::debug!("discarding session");
                    return Ok(Outcome::Discarded);
                }
                Selection::Save => {
                    let missing = schema.missing_required();
                    if !missing.is_empty() {
                        let message = format!("missing required properties: {}", missing.join(", "));
                        tracing::warn!("{message}");
                        self.prompt.report(&message);
                    }
                    return Ok(Outcome::Saved(schema.assemble()));
                }
            }
        }
    }

    /// Enters `property` according to its kind and returns once it is done.
    fn visit(&mut self, property: &mut Property) -> Result<(), PromptError> {
        tracing::debug!(path = %property.path, ty = property.declared_type(), "visiting");
        match property.kind {
            Kind::Object(_) => self.object(property),
            Kind::Array(_) => {
                let value = self.collect(property)?;
                property.capture(value);
                Ok(())
            }
            _ => {
                let value = self.leaf(property)?;
                property.capture(value);
                Ok(())
            }
        }
    }

    fn object(&mut self, property: &mut Property) -> Result<(), PromptError> {
        loop {
            let Some(rules) = property.object_mut() else {
                return Ok(());
            };
            match self.menu(&rules.names(), &[BACK])? {
                Selection::Child(i) => self.visit(&mut rules.children[i])?,
                _ => return Ok(()),
            }
        }
    }

    /// Asks until the answer validates.
    fn leaf(&mut self, property: &Property) -> Result<Value, PromptError> {
        let Some(question) = property.question() else {
            return Ok(Value::Null);
        };
        loop {
            let answer = self.text(&question)?;
            match property.validate(&answer) {
                Ok(value) => return Ok(value),
                Err(error) => self.prompt.report(&error.to_string()),
            }
        }
    }

    /// Collects elements until the user stops and the sequence validates.
    fn collect(&mut self, property: &Property) -> Result<Value, PromptError> {
        let Some(rules) = property.array() else {
            return Ok(Value::Null);
        };
        let mut elements = Vec::new();
        loop {
            let element = match rules.items.as_deref() {
                Some(template) => self.element(template)?,
                None => {
                    let question = Question::input(format!("{} element: ", property.name), None);
                    loop {
                        let answer = self.text(&question)?;
                        match rules.validate_element(&answer) {
                            Ok(value) => break value,
                            Err(error) => self.prompt.report(&error.to_string()),
                        }
                    }
                }
            };
            // A duplicate is re-asked here; accepting it would fail `finish` forever.
            if rules.unique_items && elements.contains(&element) {
                let error = ValidationError::DuplicateItem(elements.len() + 1);
                self.prompt.report(&error.to_string());
                continue;
            }
            elements.push(element);
            if self.confirm(ADD_MORE)? {
                continue;
            }
            match rules.finish(elements.clone()) {
                Ok(value) => return Ok(value),
                Err(error) => self.prompt.report(&error.to_string()),
            }
        }
    }

    /// One array element from a fresh copy of the template.
    fn element(&mut self, template: &Property) -> Result<Value, PromptError> {
        match template.kind {
            Kind::Object(_) => {
                let mut scratch = template.clone();
                self.object(&mut scratch)?;
                Ok(Value::Object(assemble::assemble_relative(&scratch)))
            }
            Kind::Array(_) => self.collect(template),
            _ => self.leaf(template),
        }
    }

    fn menu(&mut self, names: &[String], sentinels: &[&str]) -> Result<Selection, PromptError> {
        let mut choices = names.to_vec();
        choices.extend(sentinels.iter().map(|s| s.to_string()));
        let question = Question::select(SELECT_MESSAGE.to_owned(), choices, None);
        let answer = self.text(&question)?;
        // Children first, so a property named like a sentinel stays reachable.
        if let Some(i) = names.iter().position(|n| *n == answer) {
            return Ok(Selection::Child(i));
        }
        Ok(match answer.as_str() {
            DISCARD => Selection::Discard,
            SAVE => Selection::Save,
            BACK => Selection::Back,
            _ => Selection::Separator,
        })
    }

    /// Text answer; select answers outside the offered choices are re-asked.
    fn text(&mut self, question: &Question) -> Result<String, PromptError> {
        loop {
            let answer = match self.prompt.ask(question)? {
                Answer::Text(text) => text,
                Answer::Confirmed(yes) => yes.to_string(),
            };
            match question {
                Question::Select { choices, .. } if !choices.contains(&answer) => {
                    tracing::warn!(%answer, "answer is not one of the offered choices");
                    self.prompt.report(&format!("'{answer}' is not one of the choices"));
                }
                _ => return Ok(answer),
            }
        }
    }

    fn confirm(&mut self, message: &str) -> Result<bool, PromptError> {
        match self.prompt.ask(&Question::confirm(message.to_owned(), true))? {
            Answer::Confirmed(yes) => Ok(yes),
            Answer::Text(text) => Ok(matches!(text.trim().to_ascii_lowercase().as_str(), "y" | "yes")),
        }
    }
}
