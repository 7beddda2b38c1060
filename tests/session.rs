use std::cell::Cell;
use std::collections::VecDeque;

use serde_json::{Value, json};
use steer::navigate::{self, Outcome, BACK, SAVE};
use steer::prompt::{Answer, Prompt, Question};
use steer::reference::Fetch;
use steer::{FetchError, PromptError, SchemaCompiler};

struct Script(VecDeque<Answer>);

impl Script {
    fn new(answers: &[&str]) -> Self {
        Self(answers.iter().map(|a| Answer::Text(a.to_string())).collect())
    }
}

impl Prompt for Script {
    fn ask(&mut self, _question: &Question) -> Result<Answer, PromptError> {
        self.0.pop_front().ok_or(PromptError::Cancelled)
    }
    fn report(&mut self, _message: &str) {}
}

#[derive(Default)]
struct OneDocument {
    calls: Cell<usize>,
}

impl Fetch for OneDocument {
    fn fetch(&self, _url: &str) -> Result<Value, FetchError> {
        self.calls.set(self.calls.get() + 1);
        Ok(json!({"definitions": {"city": {"type": "string", "pattern": "[A-Z][a-z]+"}}}))
    }
}

#[test]
fn end_to_end_save() {
    let raw = json!({
        "$schema": "https://x",
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "address": {"type": "object", "properties": {"city": {"type": "string"}}}
        }
    });
    let mut schema = SchemaCompiler::with_fetcher(OneDocument::default()).compile(&raw).unwrap();
    let mut prompt = Script::new(&["name", "Ada", "address", "city", "Oxford", BACK, SAVE]);
    let Outcome::Saved(document) = navigate::run(&mut schema, &mut prompt).unwrap() else {
        panic!("expected a saved document");
    };
    assert_eq!(Value::Object(document), json!({"name": "Ada", "address": {"city": "Oxford"}}));
}

#[test]
fn remote_references_share_one_fetch() {
    let url = "https://schemas.example.com/places.json#/definitions/city";
    let raw = json!({
        "type": "object",
        "properties": {
            "birthplace": {"$ref": url},
            "home": {"type": "object", "properties": {"city": {"$ref": url}}}
        }
    });
    let mut compiler = SchemaCompiler::with_fetcher(OneDocument::default());
    let mut schema = compiler.compile(&raw).unwrap();
    assert_eq!(compiler.resolver().fetcher().calls.get(), 1);

    let mut prompt = Script::new(&["home", "city", "oxford", "Oxford", BACK, SAVE]);
    let outcome = navigate::run(&mut schema, &mut prompt).unwrap();
    assert_eq!(
        outcome,
        Outcome::Saved(json!({"home": {"city": "Oxford"}}).as_object().unwrap().clone())
    );
}
