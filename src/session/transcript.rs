use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    /// Label shown on the chat page.
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "You",
            Speaker::Assistant => "Lavender",
        }
    }
}

/// One line of the conversation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(speaker: Speaker, message: impl Into<String>) -> Self {
        Self {
            speaker,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered turns, oldest first. Grows only by whole user/assistant pairs.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
    /// Maximum retained pairs; 0 keeps everything.
    max_pairs: usize,
}

impl Transcript {
    pub fn new(max_pairs: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_pairs,
        }
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Appends a completed exchange, evicting the oldest pairs past the cap.
    pub(crate) fn push_pair(&mut self, question: String, answer: String) {
        self.turns.push(ChatTurn::new(Speaker::User, question));
        self.turns.push(ChatTurn::new(Speaker::Assistant, answer));

        if self.max_pairs > 0 {
            let limit = self.max_pairs * 2;
            if self.turns.len() > limit {
                let excess = self.turns.len() - limit;
                self.turns.drain(..excess);
            }
        }
    }
}
