use serde::{Deserialize, Serialize};

/// The character the user is talking with.
///
/// `name` and `details` come from the user and never change afterwards.
/// `description` starts empty and is filled once the description
/// generation resolves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub details: String,
    pub description: String,
}

impl Persona {
    /// Create a persona without a description.
    pub fn new(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            details: details.into(),
            description: String::new(),
        }
    }

    /// Builder-style helper attaching a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Who authored a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Human,
    Persona,
}

impl Speaker {
    /// Author of the turn stored at `index`. Even turns are human.
    pub fn at(index: usize) -> Self {
        if index % 2 == 0 {
            Speaker::Human
        } else {
            Speaker::Persona
        }
    }
}

/// Append-only dialogue history.
///
/// Ownership alternates strictly: even indices are human turns, odd
/// indices are persona turns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `line` as the next turn.
    pub fn push(&mut self, line: impl Into<String>) {
        self.turns.push(line.into());
    }

    /// Speaker expected to produce the next turn.
    pub fn next_speaker(&self) -> Speaker {
        Speaker::at(self.turns.len())
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All turns in insertion order.
    pub fn all(&self) -> &[String] {
        &self.turns
    }
}
