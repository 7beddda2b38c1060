use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use super::{Answer, Prompt, Question};
use crate::error::PromptError;

/// Line-editor backed prompt. Ctrl-C and Ctrl-D cancel the session.
pub struct TerminalPrompt {
    editor: DefaultEditor,
}

impl TerminalPrompt {
    pub fn new() -> Result<Self, PromptError> {
        let editor = DefaultEditor::new().map_err(|e| PromptError::Io(e.to_string()))?;
        Ok(Self { editor })
    }

    fn read_line(&mut self, prompt: &str, initial: &str) -> Result<String, PromptError> {
        match self.editor.readline_with_initial(prompt, (initial, "")) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Err(PromptError::Cancelled),
            Err(e) => Err(PromptError::Io(e.to_string())),
        }
    }

    fn select(
        &mut self,
        message: &str,
        choices: &[String],
        default: Option<&str>,
    ) -> Result<String, PromptError> {
        println!("{}", message.bold());
        for (i, choice) in choices.iter().enumerate() {
            if choice.is_empty() {
                println!("  {}", "─".dimmed());
            } else {
                println!("  {} {}", format!("{})", i + 1).cyan(), choice);
            }
        }
        loop {
            let line = self.read_line("> ", default.unwrap_or(""))?;
            if let Some(choice) = pick(choices, line.trim()) {
                return Ok(choice.to_owned());
            }
            self.report(&format!("Choose a number between 1 and {}", choices.len()));
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let line = self.read_line(&format!("{message} {hint} "), "")?;
            match line.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.report("Answer yes or no"),
            }
        }
    }
}

impl Prompt for TerminalPrompt {
    fn ask(&mut self, question: &Question) -> Result<Answer, PromptError> {
        match question {
            Question::Input { message, default } => {
                let line = self.read_line(message, default.as_deref().unwrap_or(""))?;
                Ok(Answer::Text(line))
            }
            Question::Select { message, choices, default } => {
                self.select(message, choices, default.as_deref()).map(Answer::Text)
            }
            Question::Confirm { message, default } => {
                self.confirm(message, *default).map(Answer::Confirmed)
            }
        }
    }

    fn report(&mut self, message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
}

/// Exact text first, then a 1-based menu number.
fn pick<'a>(choices: &'a [String], input: &str) -> Option<&'a str> {
    if let Some(choice) = choices.iter().find(|c| c.as_str() == input) {
        return Some(choice.as_str());
    }
    let index: usize = input.parse().ok()?;
    choices.get(index.checked_sub(1)?).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Vec<String> {
        vec!["name".into(), "age".into(), "".into(), "Save & Exit".into()]
    }

    #[test]
    fn pick_by_text_or_number() {
        let choices = menu();
        assert_eq!(pick(&choices, "age"), Some("age"));
        assert_eq!(pick(&choices, "1"), Some("name"));
        assert_eq!(pick(&choices, "4"), Some("Save & Exit"));
        assert_eq!(pick(&choices, ""), Some(""));
    }

    #[test]
    fn pick_rejects_out_of_range() {
        let choices = menu();
        assert_eq!(pick(&choices, "0"), None);
        assert_eq!(pick(&choices, "9"), None);
        assert_eq!(pick(&choices, "nope"), None);
    }
}
