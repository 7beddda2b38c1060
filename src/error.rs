//! Error taxonomy.
//!
//! Compile-time errors (`SchemaError`, `UnresolvedReferenceError`,
//! `FetchError`) are fatal and surface before any prompt is shown. A
//! `ValidationError` never leaves the leaf that produced it.
use thiserror::Error;

/// Malformed or unsupported schema structure.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema document must be a JSON object")]
    NotAnObject,
    #[error("schema has no `properties` keyword")]
    MissingProperties,
    #[error("root schema type `{0}` is not supported (expected `object`)")]
    UnsupportedRootType(String),
    #[error("invalid keyword at {path}: {message}")]
    Keyword { path: String, message: String },
}

/// A `$ref` that does not point at anything we can compile.
#[derive(Debug, Error)]
pub enum UnresolvedReferenceError {
    #[error("no definition named `{name}` (referenced as `{reference}`)")]
    UnknownDefinition { reference: String, name: String },
    #[error("JSON pointer `{pointer}` not found in {url}")]
    PointerNotFound { url: String, pointer: String },
    #[error("unsupported reference form `{0}`")]
    Unsupported(String),
    #[error("reference `{0}` nests too deeply (reference cycle?)")]
    TooDeep(String),
}

/// A remote schema document could not be retrieved or parsed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{url} did not return a JSON document: {message}")]
    Body { url: String, message: String },
}

/// Anything that stops `compile` from producing a tree.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Unresolved(#[from] UnresolvedReferenceError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// One answer rejected by its property's constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid value. Must match pattern: '{0}'")]
    Pattern(String),
    #[error("Invalid value. Must be an integer")]
    NotInteger,
    #[error("Invalid value. Must be a number")]
    NotNumber,
    #[error("Invalid value. Must be true or false")]
    NotBoolean,
    #[error("Invalid value. Must be one of: {}", .0.join(", "))]
    NotInEnum(Vec<String>),
    #[error("Expected at least {min} elements, got {got}")]
    TooFewItems { min: u64, got: usize },
    #[error("Element #{0} is a duplicate; items must be unique")]
    DuplicateItem(usize),
    #[error("`{0}` properties are not answered directly")]
    NotScalar(&'static str),
}

/// Failure of the prompt surface itself.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Interrupt or end of input. Ends the session without output.
    #[error("cancelled by user")]
    Cancelled,
    #[error("prompt failed: {0}")]
    Io(String),
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("output type `{0}` needs an output file (--output-file)")]
    MissingFile(&'static str),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
