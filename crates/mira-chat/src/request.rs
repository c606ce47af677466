//! Chat-completion request construction.

use mira_config::{AssistantConfig, ProviderConfig};
use serde::Serialize;

use crate::conversation::{ChatMessage, Conversation, Role};

/// Longest instruction text embedded into a user message, in characters.
pub const MAX_EMBEDDED_INSTRUCTIONS: usize = 8000;

const TRUNCATION_MARKER: &str = "\n\n[TRUNCATED INSTRUCTIONS]";

/// JSON body of a chat-completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequestBody {
    /// Model identifier.
    pub model: String,
    /// System message followed by the conversation.
    pub messages: Vec<ChatMessage>,
}

/// A fully prepared request, ready for a [`ChatTransport`](crate::ChatTransport).
#[derive(Clone)]
pub struct ChatRequest {
    /// Endpoint URL.
    pub endpoint: String,
    /// Request headers in send order.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: ChatRequestBody,
    /// Whether embedded instructions were cut at [`MAX_EMBEDDED_INSTRUCTIONS`].
    pub instructions_truncated: bool,
}

impl std::fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("ChatRequest")
            .field("endpoint", &self.endpoint)
            .field("headers", &headers)
            .field("body", &self.body)
            .field("instructions_truncated", &self.instructions_truncated)
            .finish()
    }
}

impl ChatRequest {
    /// Build the request for the current state of a conversation.
    ///
    /// The system message comes first when instructions are configured.
    /// With `send_history` disabled only the latest user message follows it.
    /// With `embed_instructions` enabled the instructions are also
    /// prepended, as a delimited header block, to the final user message.
    #[must_use]
    pub fn build(
        assistant: &AssistantConfig,
        provider: &ProviderConfig,
        conversation: &Conversation,
    ) -> Self {
        let instructions = assistant.instructions();
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        if !instructions.is_empty() {
            messages.push(ChatMessage::system(instructions));
        }

        if assistant.send_history {
            messages.extend(conversation.messages().iter().cloned());
        } else if let Some(last) = conversation.last_user() {
            messages.push(last.clone());
        }

        let mut instructions_truncated = false;
        if assistant.embed_instructions
            && !instructions.is_empty()
            && let Some(last) = messages.last_mut()
            && last.role == Role::User
        {
            let (header, truncated) = instruction_header(instructions);
            last.content.insert_str(0, &header);
            instructions_truncated = truncated;
        }

        if instructions_truncated {
            tracing::warn!(
                limit = MAX_EMBEDDED_INSTRUCTIONS,
                "Embedded instructions truncated"
            );
        }

        Self {
            endpoint: provider.endpoint.clone(),
            headers: request_headers(provider),
            body: ChatRequestBody {
                model: provider.model.clone(),
                messages,
            },
            instructions_truncated,
        }
    }

    /// Look up a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Serialize the body as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn body_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.body)
    }
}

/// Header block placed in front of the latest user message.
fn instruction_header(instructions: &str) -> (String, bool) {
    let truncated = instructions.chars().count() > MAX_EMBEDDED_INSTRUCTIONS;
    let body = if truncated {
        let cut: String = instructions
            .chars()
            .take(MAX_EMBEDDED_INSTRUCTIONS)
            .collect();
        format!("{cut}{TRUNCATION_MARKER}")
    } else {
        instructions.to_owned()
    };
    (
        format!("[INSTRUCTIONS_START]\n{body}\n[INSTRUCTIONS_END]\n\n"),
        truncated,
    )
}

fn request_headers(provider: &ProviderConfig) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_owned(), "application/json".to_owned())];
    if let Some(key) = provider.api_key() {
        headers.push(("Authorization".to_owned(), format!("Bearer {key}")));
    }
    headers.extend(
        provider
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );
    headers
}
