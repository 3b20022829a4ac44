use inquire::{InquireError, Text};

use crate::error::PromptError;

pub trait Prompter: Send {
    fn ask(&mut self, message: &str) -> Result<String, PromptError>;
    fn say(&mut self, message: &str);
}

/// Terminal prompter backed by `inquire`. Esc cancels the current action,
/// Ctrl-C ends the session.
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn ask(&mut self, message: &str) -> Result<String, PromptError> {
        Text::new(message)
            .prompt()
            .map(|answer| answer.trim().to_string())
            .map_err(PromptError::from)
    }

    fn say(&mut self, message: &str) {
        println!("{message}");
    }
}

impl From<InquireError> for PromptError {
    fn from(err: InquireError) -> Self {
        match err {
            InquireError::OperationCanceled => PromptError::Cancelled,
            InquireError::OperationInterrupted => PromptError::Interrupted,
            other => PromptError::Io(other.to_string()),
        }
    }
}
