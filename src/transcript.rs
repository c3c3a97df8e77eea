use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only conversation history, oldest message first.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Tail of the transcript that fits in `limit` messages and starts with a
    /// user message. `None` means the whole transcript.
    pub fn window(&self, limit: Option<usize>) -> &[Message] {
        let Some(limit) = limit else {
            return &self.messages;
        };

        let mut start = self.messages.len().saturating_sub(limit.max(1));
        while start < self.messages.len() && self.messages[start].role != Role::User {
            start += 1;
        }
        // Never drop the newest user message, even if the limit is tiny.
        if start == self.messages.len() {
            start = self
                .messages
                .iter()
                .rposition(|msg| msg.role == Role::User)
                .unwrap_or(self.messages.len());
        }
        &self.messages[start..]
    }
}
