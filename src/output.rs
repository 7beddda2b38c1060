//! Rendering the assembled document.
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::OutputError;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    /// pretty JSON on standard output
    #[default]
    Stdout,
    /// pretty JSON file
    Json,
    /// YAML file
    Yaml,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Stdout => "stdout",
            OutputType::Json => "json",
            OutputType::Yaml => "yaml",
        }
    }
}

pub fn render(document: &Map<String, Value>, format: OutputType) -> Result<String, OutputError> {
    match format {
        OutputType::Stdout | OutputType::Json => Ok(serde_json::to_string_pretty(document)?),
        OutputType::Yaml => Ok(serde_yaml::to_string(document)?),
    }
}

/// `stdout` prints and never touches the filesystem; the file formats need `file`.
pub fn write(
    document: &Map<String, Value>,
    format: OutputType,
    file: Option<&Path>,
) -> Result<(), OutputError> {
    let rendered = render(document, format)?;
    if format == OutputType::Stdout {
        println!("{rendered}");
        return Ok(());
    }
    let Some(file) = file else {
        return Err(OutputError::MissingFile(format.as_str()));
    };
    let io_error = |source| OutputError::Write { path: file.display().to_string(), source };
    if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(file, rendered).map_err(io_error)?;
    tracing::info!(path = %file.display(), format = format.as_str(), "wrote document");
    Ok(())
}
