//! Implements PromptPort. Inquire-based login prompts.

use crate::domain::DomainError;
use crate::ports::PromptPort;
use inquire::{Password, PasswordDisplayMode, Text};

fn prompt_error(e: inquire::InquireError) -> DomainError {
    DomainError::Auth(format!("prompt aborted: {}", e))
}

/// TUI adapter. Inquire prompts on the controlling terminal.
#[derive(Default)]
pub struct TuiPrompt;

impl TuiPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl PromptPort for TuiPrompt {
    fn phone(&self) -> Result<String, DomainError> {
        Text::new("Phone number (international format):")
            .with_placeholder("+34600000000")
            .prompt()
            .map_err(prompt_error)
    }

    fn login_code(&self) -> Result<String, DomainError> {
        Text::new("Login code sent by Telegram:")
            .prompt()
            .map_err(prompt_error)
    }

    fn password(&self, hint: Option<&str>) -> Result<String, DomainError> {
        let mut prompt = Password::new("2FA password:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation();
        if let Some(hint) = hint {
            prompt = prompt.with_help_message(hint);
        }
        prompt.prompt().map_err(prompt_error)
    }
}
