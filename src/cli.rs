//! Minimal CLI: schema → interactive session → (stdout | json | yaml)
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::compile::{DEFAULT_FETCH_TIMEOUT, SchemaCompiler};
use crate::navigate::{self, Outcome};
use crate::output::{self, OutputType};
use crate::prompt::TerminalPrompt;
use crate::reference::{HttpFetcher, ReferenceResolver};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// walk a JSON schema interactively and save the answers as JSON or YAML
#[derive(Parser, Debug)]
#[command(name = "steer", version, about)]
pub struct CommandLineInterface {
    /// more log output (-v info, -vv debug, -vvv trace); LOG_LEVEL overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// interactively build a values file from a JSON schema
    Values(ValuesOut),
}

#[derive(Args, Debug, Clone)]
struct ValuesOut {
    /// path to the JSON schema
    json_schema: PathBuf,

    /// the type of output
    #[arg(long, short = 't', value_enum, default_value_t = OutputType::Stdout)]
    output_type: OutputType,

    /// the file to write (required for json and yaml)
    #[arg(long, short = 'o')]
    output_file: Option<PathBuf>,

    /// timeout in seconds for fetching remote `$ref` documents
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    fetch_timeout: u64,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<ExitCode> {
        match &self.cmd {
            Command::Values(target) => target.run(),
        }
    }
}

impl ValuesOut {
    fn run(&self) -> anyhow::Result<ExitCode> {
        let path_str = self.json_schema.display().to_string();
        let source = std::fs::read_to_string(&self.json_schema)
            .with_context(|| format!("failed to read schema file ({path_str})"))?;
        let raw: serde_json::Value = serde_json::from_str(&source)
            .with_context(|| format!("failed to parse JSON schema file ({path_str})"))?;

        if self.output_type != OutputType::Stdout && self.output_file.is_none() {
            anyhow::bail!("--output-type {} needs --output-file", self.output_type.as_str());
        }

        let fetcher = HttpFetcher::new(Duration::from_secs(self.fetch_timeout))?;
        let mut compiler = SchemaCompiler::new(ReferenceResolver::new(fetcher));
        let mut schema = compiler
            .compile(&raw)
            .with_context(|| format!("failed to compile schema ({path_str})"))?;
        tracing::debug!(
            properties = schema.properties.len(),
            definitions = schema.definitions.len(),
            "schema compiled"
        );

        let mut prompt = TerminalPrompt::new()?;
        match navigate::run(&mut schema, &mut prompt)? {
            Outcome::Saved(document) => {
                output::write(&document, self.output_type, self.output_file.as_deref())?;
            }
            Outcome::Discarded => tracing::info!("discarded; nothing written"),
            Outcome::Cancelled => tracing::info!("cancelled; nothing written"),
        }
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_values_defaults() {
        let cli = CommandLineInterface::try_parse_from(["steer", "values", "schema.json"]).unwrap();
        let Command::Values(args) = cli.cmd;
        assert_eq!(args.json_schema, PathBuf::from("schema.json"));
        assert_eq!(args.output_type, OutputType::Stdout);
        assert!(args.output_file.is_none());
        assert_eq!(args.fetch_timeout, DEFAULT_FETCH_TIMEOUT.as_secs());
    }

    #[test]
    fn parse_values_with_output() {
        let cli = CommandLineInterface::try_parse_from([
            "steer", "-vv", "values", "s.json", "-t", "yaml", "-o", "out/values.yml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Values(args) = cli.cmd;
        assert_eq!(args.output_type, OutputType::Yaml);
        assert_eq!(args.output_file, Some(PathBuf::from("out/values.yml")));
    }

    #[test]
    fn rejects_unknown_output_type() {
        assert!(CommandLineInterface::try_parse_from(["steer", "values", "s.json", "-t", "toml"]).is_err());
    }
}
