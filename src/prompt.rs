//! The prompt surface: what the navigator asks, never how it is rendered.
pub mod terminal;

use crate::error::PromptError;

pub use terminal::TerminalPrompt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    /// Free text.
    Input { message: String, default: Option<String> },
    /// One of `choices`; implementations must not return anything else.
    Select { message: String, choices: Vec<String>, default: Option<String> },
    /// Yes/no.
    Confirm { message: String, default: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Confirmed(bool),
}

pub trait Prompt {
    fn ask(&mut self, question: &Question) -> Result<Answer, PromptError>;

    /// Shows a message (typically a validation error) without asking anything.
    fn report(&mut self, message: &str);
}

impl Question {
    pub fn input(message: String, default: Option<String>) -> Self {
        Question::Input { message, default }
    }

    /// A default that is not among `choices` is dropped.
    pub fn select(message: String, choices: Vec<String>, default: Option<String>) -> Self {
        let default = default.filter(|d| choices.contains(d));
        Question::Select { message, choices, default }
    }

    pub fn confirm(message: String, default: bool) -> Self {
        Question::Confirm { message, default }
    }

    pub fn message(&self) -> &str {
        match self {
            Question::Input { message, .. }
            | Question::Select { message, .. }
            | Question::Confirm { message, .. } => message,
        }
    }
}
