use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::MAX_SUGGESTIONS;
use crate::prompts::GREETING_TEXT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message unit in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            suggestions: Vec::new(),
            topic: None,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self.suggestions.truncate(MAX_SUGGESTIONS);
        self
    }

    pub fn with_topic(mut self, topic: Option<String>) -> Self {
        self.topic = topic;
        self
    }
}

/// Append-only ordered log of turns.
///
/// The first turn is always the synthetic assistant greeting; user and
/// assistant turns are not required to alternate (consecutive assistant
/// turns occur after failed submissions).
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            turns: vec![Turn::assistant(GREETING_TEXT)],
        }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Suggestions of the latest turn, if it is an assistant turn.
    ///
    /// Suggestions on older turns are consumed: once a newer turn exists
    /// they no longer influence the UI.
    pub fn active_suggestions(&self) -> &[String] {
        match self.turns.last() {
            Some(turn) if turn.role == Role::Assistant => &turn.suggestions,
            _ => &[],
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
