//! Terminal answers for missing resolver settings.

use std::io;

use colored::Colorize;
use csar_meta::{FailFast, PromptRequest, Slot, ValueProvider};
use dialoguer::Input;

/// Answers from `--arch` / `--policy` first, then asks on the terminal.
///
/// With prompting disabled a missing answer fails like [`FailFast`].
#[derive(Debug, Clone, Default)]
pub struct ConsolePrompt {
    architecture: Option<String>,
    policy: Option<String>,
    interactive: bool,
}

impl ConsolePrompt {
    pub fn new(architecture: Option<String>, policy: Option<String>, interactive: bool) -> Self {
        Self {
            architecture,
            policy,
            interactive,
        }
    }
}

impl ValueProvider for ConsolePrompt {
    fn provide(&mut self, request: &PromptRequest) -> io::Result<String> {
        let preset = match request.slot {
            Slot::Architecture => self.architecture.clone(),
            Slot::Policy => self.policy.clone(),
        };
        if let Some(answer) = preset {
            tracing::debug!(slot = %request.slot, "Answered from command line");
            return Ok(answer);
        }
        if !self.interactive {
            return FailFast.provide(request);
        }

        eprintln!(
            "{} The archive has no {} yet.",
            "=>".blue().bold(),
            request.slot.to_string().cyan()
        );
        for hint in &request.hints {
            eprintln!("   {}", hint.dimmed());
        }
        Input::<String>::new()
            .with_prompt(&request.message)
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)
    }
}
