//! Interactive JSON Schema value builder.
//!
//! A schema document is compiled into a typed property tree
//! ([`compile::SchemaCompiler`], resolving `$ref`s through
//! [`reference::ReferenceResolver`]), walked interactively
//! ([`navigate::run`]) over an abstract [`prompt::Prompt`], and the captured
//! answers are folded into a nested document ([`assemble::assemble`]).
pub mod assemble;
pub mod cli;
pub mod compile;
pub mod error;
pub mod navigate;
pub mod output;
pub mod path;
pub mod prompt;
pub mod property;
pub mod raw;
pub mod reference;
pub mod schema;

pub use compile::SchemaCompiler;
pub use error::{
    CompileError, FetchError, PromptError, SchemaError, UnresolvedReferenceError, ValidationError,
};
pub use navigate::Outcome;
pub use path::PathExpr;
pub use property::{Kind, Property};
pub use schema::Schema;
