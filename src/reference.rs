//! `$ref` resolution.
//!
//! Local references (`#/definitions/<name>`, `#/$defs/<name>`) are looked up
//! among the already compiled definitions. Remote references (`http(s)://`
//! URL with an optional `#/json/pointer`) are fetched once per document and
//! the addressed subschema is compiled at the referencing site.
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::compile::{Scope, compile_node};
use crate::error::{CompileError, FetchError, UnresolvedReferenceError};
use crate::path::PathExpr;
use crate::property::Property;

/// Remote documents nest at most this deep before we call it a cycle.
pub const MAX_REFERENCE_DEPTH: usize = 32;

static REMOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://").unwrap());
static LOCAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#/(?:definitions|\$defs)/([^/]+)$").unwrap());

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Retrieves a JSON document by URL.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Definition name, pointer escapes already decoded.
    Local(String),
    Remote { url: String, pointer: String },
}

/// Owns the per-session document cache. One writer, no locking.
pub struct ReferenceResolver<F: Fetch = HttpFetcher> {
    fetcher: F,
    documents: HashMap<String, Rc<Value>>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport { url: String::new(), message: e.to_string() })?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let response = self.client.get(url).send().map_err(|e| FetchError::Transport {
            url: url.to_owned(),
            message: e.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_owned(), status: status.as_u16() });
        }
        response.json::<Value>().map_err(|e| FetchError::Body {
            url: url.to_owned(),
            message: e.to_string(),
        })
    }
}

impl Reference {
    /// `base` is the URL of the document the reference was found in, if remote.
    pub fn parse(reference: &str, base: Option<&str>) -> Result<Self, UnresolvedReferenceError> {
        if REMOTE.is_match(reference) {
            let (url, pointer) = match reference.split_once('#') {
                Some((url, pointer)) => (url, pointer),
                None => (reference, ""),
            };
            return Ok(Reference::Remote { url: url.to_owned(), pointer: pointer.to_owned() });
        }
        if let Some(pointer) = reference.strip_prefix('#') {
            if let Some(url) = base {
                return Ok(Reference::Remote { url: url.to_owned(), pointer: pointer.to_owned() });
            }
            if let Some(caps) = LOCAL.captures(reference) {
                let name = caps[1].replace("~1", "/").replace("~0", "~");
                return Ok(Reference::Local(name));
            }
        }
        Err(UnresolvedReferenceError::Unsupported(reference.to_owned()))
    }
}

impl<F: Fetch> ReferenceResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher, documents: HashMap::new() }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn cached_documents(&self) -> usize {
        self.documents.len()
    }

    /// The document at `url`, fetched on first use.
    pub fn document(&mut self, url: &str) -> Result<Rc<Value>, FetchError> {
        if let Some(document) = self.documents.get(url) {
            tracing::debug!(%url, "remote schema served from cache");
            return Ok(Rc::clone(document));
        }
        tracing::info!(%url, "fetching remote schema");
        let document = Rc::new(self.fetcher.fetch(url)?);
        self.documents.insert(url.to_owned(), Rc::clone(&document));
        Ok(document)
    }

    /// Resolves `reference` to a node named `key` living at `path`.
    pub fn resolve(
        &mut self,
        reference: &str,
        scope: &Scope<'_>,
        key: &str,
        path: PathExpr,
    ) -> Result<Property, CompileError> {
        match Reference::parse(reference, scope.base())? {
            Reference::Local(name) => {
                let Some(definition) = scope.definitions().get(&name) else {
                    return Err(UnresolvedReferenceError::UnknownDefinition {
                        reference: reference.to_owned(),
                        name,
                    }
                    .into());
                };
                tracing::debug!(%reference, %path, "resolved local reference");
                Ok(definition.relocate(key, path))
            }
            Reference::Remote { url, pointer } => {
                if scope.depth() >= MAX_REFERENCE_DEPTH {
                    return Err(UnresolvedReferenceError::TooDeep(reference.to_owned()).into());
                }
                let document = self.document(&url)?;
                let Some(subschema) = document.pointer(&pointer) else {
                    return Err(UnresolvedReferenceError::PointerNotFound { url, pointer }.into());
                };
                let nested = scope.remote(&url);
                match compile_node(self, &nested, key, path, subschema)? {
                    Some(property) => Ok(property),
                    None => Err(UnresolvedReferenceError::Unsupported(reference.to_owned()).into()),
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    /// Serves canned documents and records every fetch.
    #[derive(Debug, Default)]
    pub struct CountingFetcher {
        documents: HashMap<String, Value>,
        pub calls: RefCell<Vec<String>>,
    }

    impl CountingFetcher {
        pub fn serve(mut self, url: &str, document: Value) -> Self {
            self.documents.insert(url.to_owned(), document);
            self
        }
        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl Fetch for CountingFetcher {
        fn fetch(&self, url: &str) -> Result<Value, FetchError> {
            self.calls.borrow_mut().push(url.to_owned());
            self.documents
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status { url: url.to_owned(), status: 404 })
        }
    }
}
