//! Conversation state owned by one chat session.

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model.
    System,
    /// The person typing into the widget.
    User,
    /// The model.
    Assistant,
}

/// A single message as sent to the chat-completion API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: Role,
    /// Raw message text (markdown for assistant replies).
    pub content: String,
}

impl ChatMessage {
    /// Create a message.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered message history of one UI session.
///
/// Tracks which messages have already been handed to the display so a UI
/// can append only new ones.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    rendered: usize,
}

impl Conversation {
    /// Create an empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// All messages in order.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent message.
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Most recent user message.
    #[must_use]
    pub fn last_user(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// Messages added since the previous call.
    pub fn take_unrendered(&mut self) -> &[ChatMessage] {
        let start = self.rendered;
        self.rendered = self.messages.len();
        &self.messages[start..]
    }

    /// Drop all messages and the render cursor.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.rendered = 0;
    }
}
