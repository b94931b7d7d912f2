//! The value-provider capability used when a setting has never been stored.

use std::fmt;
use std::io;

/// Which resolver setting is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Architecture,
    Policy,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Architecture => write!(f, "architecture"),
            Slot::Policy => write!(f, "resolution policy"),
        }
    }
}

/// What to ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub slot: Slot,
    /// One-line question
    pub message: String,
    /// Human-readable hints, e.g. the menu of policies
    pub hints: Vec<String>,
}

/// Answers a [`PromptRequest`] with one line of text.
///
/// Implementations may block; a blank answer selects the slot's default.
pub trait ValueProvider {
    fn provide(&mut self, request: &PromptRequest) -> io::Result<String>;
}

impl<T: ValueProvider + ?Sized> ValueProvider for &mut T {
    fn provide(&mut self, request: &PromptRequest) -> io::Result<String> {
        (**self).provide(request)
    }
}

/// Answers from preset values, blank for anything not preset.
///
/// Records which slots were asked, so callers can tell whether a
/// prompt happened at all.
#[derive(Debug, Clone, Default)]
pub struct FixedValues {
    architecture: Option<String>,
    policy: Option<String>,
    asked: Vec<Slot>,
}

impl FixedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn architecture(mut self, answer: impl Into<String>) -> Self {
        self.architecture = Some(answer.into());
        self
    }

    pub fn policy(mut self, answer: impl Into<String>) -> Self {
        self.policy = Some(answer.into());
        self
    }

    /// Slots asked so far, in order.
    pub fn asked(&self) -> &[Slot] {
        &self.asked
    }
}

impl ValueProvider for FixedValues {
    fn provide(&mut self, request: &PromptRequest) -> io::Result<String> {
        self.asked.push(request.slot);
        let answer = match request.slot {
            Slot::Architecture => self.architecture.clone(),
            Slot::Policy => self.policy.clone(),
        };
        Ok(answer.unwrap_or_default())
    }
}

/// Refuses every request. For unattended runs that must not block.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl ValueProvider for FailFast {
    fn provide(&mut self, request: &PromptRequest) -> io::Result<String> {
        Err(io::Error::other(format!(
            "{} is not configured and prompting is disabled",
            request.slot
        )))
    }
}
