//! Interactive prompts.
//!
//! The workflow only talks to the [`Prompter`] trait; the terminal
//! implementation is backed by `dialoguer`.

use crate::error::{Result, SyncError};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

/// A named text field with an optional pre-filled default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub description: &'static str,
    pub default: Option<String>,
}

impl Field {
    pub fn new(name: &'static str, description: &'static str, default: Option<String>) -> Self {
        Self {
            name,
            description,
            default,
        }
    }
}

pub trait Prompter {
    /// Asks for a non-empty value; an empty answer selects the default.
    fn input(&self, field: &Field) -> Result<String>;

    /// Yes/no question. `default` is the answer on a bare Enter.
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;

    /// Returns the index of the chosen item.
    fn select(&self, message: &str, items: &[&str], default: usize) -> Result<usize>;
}

#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn input(&self, field: &Field) -> Result<String> {
        let input = Input::<String>::with_theme(&self.theme).with_prompt(field.description);
        let input = match &field.default {
            Some(default) if !default.is_empty() => input.default(default.clone()),
            _ => input,
        };
        input
            .interact_text()
            .map(|value| value.trim().to_string())
            .map_err(|e| SyncError::PromptFailed(format!("{}: {}", field.name, e)))
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()
            .map_err(|e| SyncError::PromptFailed(e.to_string()))
    }

    fn select(&self, message: &str, items: &[&str], default: usize) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(default)
            .interact()
            .map_err(|e| SyncError::PromptFailed(e.to_string()))
    }
}
