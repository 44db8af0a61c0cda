//! Interactive selection of a TaskRun

use dialoguer::{theme::ColorfulTheme, Select};
use std::io::IsTerminal;
use std::sync::{Arc, Mutex};

use crate::error::{DebugError, Result};

/// Pick one entry out of a list.
pub trait Prompt: Send + Sync {
    /// Index of the chosen option.
    fn select(&self, message: &str, options: &[String]) -> Result<usize>;

    /// Whether a person is there to answer.
    fn is_interactive(&self) -> bool;
}

/// Terminal picker backed by dialoguer
pub struct DialoguerPrompt;

impl Prompt for DialoguerPrompt {
    fn select(&self, message: &str, options: &[String]) -> Result<usize> {
        let theme = ColorfulTheme::default();
        let selection = Select::with_theme(&theme)
            .with_prompt(message)
            .items(options)
            .default(0)
            .interact_opt()?;

        selection.ok_or(DebugError::Cancelled)
    }

    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }
}

/// Scripted prompt for tests; records every question it was asked.
#[derive(Clone)]
pub struct MockPrompt {
    answer: Option<usize>,
    interactive: bool,
    asked: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl MockPrompt {
    /// Answers every question with `index`
    pub fn answering(index: usize) -> Self {
        Self {
            answer: Some(index),
            interactive: true,
            asked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Behaves like a user pressing Esc
    pub fn cancelling() -> Self {
        Self {
            answer: None,
            interactive: true,
            asked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn non_interactive() -> Self {
        Self {
            answer: None,
            interactive: false,
            asked: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn asked(&self) -> Vec<(String, Vec<String>)> {
        self.asked.lock().unwrap().clone()
    }
}

impl Prompt for MockPrompt {
    fn select(&self, message: &str, options: &[String]) -> Result<usize> {
        self.asked
            .lock()
            .unwrap()
            .push((message.to_string(), options.to_vec()));

        match self.answer {
            Some(index) if index < options.len() => Ok(index),
            Some(index) => Err(DebugError::Prompt(format!(
                "answer {index} out of range for {} options",
                options.len()
            ))),
            None => Err(DebugError::Cancelled),
        }
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
