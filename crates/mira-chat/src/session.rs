//! Chat session: conversation state plus the request/reply cycle.

use mira_config::{AssistantConfig, Config, ProviderConfig};
use mira_markdown::Renderer;

use crate::conversation::{ChatMessage, Conversation, Role};
use crate::reply::extract_reply;
use crate::request::ChatRequest;
use crate::transport::{ChatTransport, TransportError};

/// Label shown next to the user's own messages.
const USER_LABEL: &str = "YOU";

/// Chat session error.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The message was rejected before sending.
    #[error("Validation error: {0}")]
    Validation(String),
    /// The transport failed. The configured error reply was appended.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// A message rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Message author.
    pub role: Role,
    /// Display label (`YOU` or the assistant name).
    pub author: String,
    /// Sanitized HTML fragment.
    pub html: String,
}

/// One UI session talking to a chat-completion endpoint.
///
/// Owns its [`Conversation`]; nothing is shared between sessions.
pub struct ChatSession<T: ChatTransport> {
    assistant: AssistantConfig,
    provider: ProviderConfig,
    transport: T,
    conversation: Conversation,
    renderer: Renderer,
}

impl<T: ChatTransport> ChatSession<T> {
    /// Start a session. The configured greeting, if any, becomes the first message.
    #[must_use]
    pub fn new(config: &Config, transport: T) -> Self {
        let mut session = Self {
            assistant: config.assistant.clone(),
            provider: config.provider.clone(),
            transport,
            conversation: Conversation::new(),
            renderer: Renderer::new(),
        };
        session.greet();
        session
    }

    /// Use a custom renderer for [`render_pending`](Self::render_pending).
    #[must_use]
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Current conversation.
    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a user message and append the assistant's reply.
    ///
    /// On transport failure the configured error reply is appended to the
    /// conversation in place of a real reply and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Validation`] for blank input (nothing is
    /// appended) and [`ChatError::Transport`] if the request fails.
    pub fn send(&mut self, text: &str) -> Result<String, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::Validation("message cannot be empty".to_owned()));
        }

        self.conversation.push(ChatMessage::user(text));
        let request = ChatRequest::build(&self.assistant, &self.provider, &self.conversation);
        tracing::info!(
            endpoint = %request.endpoint,
            model = %request.body.model,
            messages = request.body.messages.len(),
            "Sending chat request"
        );

        match self.transport.send(&request) {
            Ok(response) => {
                let reply = extract_reply(&response);
                tracing::debug!(reply_len = reply.len(), "Received chat reply");
                self.conversation.push(ChatMessage::assistant(reply.clone()));
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                self.conversation
                    .push(ChatMessage::assistant(self.assistant.error_reply.clone()));
                Err(e.into())
            }
        }
    }

    /// Render messages added since the previous call.
    pub fn render_pending(&mut self) -> Vec<RenderedMessage> {
        let assistant_name = &self.assistant.name;
        let renderer = &self.renderer;
        self.conversation
            .take_unrendered()
            .iter()
            .map(|message| RenderedMessage {
                role: message.role,
                author: match message.role {
                    Role::User => USER_LABEL.to_owned(),
                    Role::Assistant | Role::System => assistant_name.clone(),
                },
                html: renderer.render(&message.content),
            })
            .collect()
    }

    /// End the current conversation and start a fresh one.
    pub fn reset(&mut self) {
        tracing::debug!(messages = self.conversation.len(), "Resetting conversation");
        self.conversation.reset();
        self.greet();
    }

    fn greet(&mut self) {
        if let Some(greeting) = self.assistant.greeting.as_deref().filter(|g| !g.is_empty()) {
            self.conversation.push(ChatMessage::assistant(greeting));
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::mock::MockTransport;

    fn config() -> Config {
        let mut config = Config::default();
        config.assistant.instructions = Some("Stay on marketing topics.".to_owned());
        config.assistant.greeting = Some("Hello, I am Mira.".to_owned());
        config
    }

    #[test]
    fn test_new_session_greets() {
        let session = ChatSession::new(&config(), MockTransport::new());
        assert_eq!(
            session.conversation().messages(),
            &[ChatMessage::assistant("Hello, I am Mira.")]
        );
    }

    #[test]
    fn test_send_appends_reply() {
        let transport = MockTransport::new().with_reply("**Step 1:** define the audience");
        let mut session = ChatSession::new(&config(), transport);

        let reply = session.send("  How do I launch?  ").unwrap();
        assert_eq!(reply, "**Step 1:** define the audience");

        let messages = session.conversation().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ChatMessage::user("How do I launch?"));
        assert_eq!(messages[2].role, Role::Assistant);
    }

    #[test]
    fn test_send_builds_request_from_history() {
        let transport = MockTransport::new().with_reply("one").with_reply("two");
        let mut session = ChatSession::new(&config(), transport);
        session.send("first").unwrap();
        session.send("second").unwrap();

        let requests = session.transport().requests();
        assert_eq!(requests.len(), 2);
        let roles: Vec<Role> = requests[1].body.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User
            ]
        );
    }

    #[test]
    fn test_send_empty_message_rejected() {
        let mut session = ChatSession::new(&config(), MockTransport::new());
        let err = session.send("   ").unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        assert_eq!(err.to_string(), "Validation error: message cannot be empty");
        assert_eq!(session.conversation().len(), 1);
        assert!(session.transport().requests().is_empty());
    }

    #[test]
    fn test_transport_failure_appends_error_reply() {
        let transport = MockTransport::new().with_error(TransportError::Status {
            status: 429,
            body: "rate limited".to_owned(),
        });
        let mut session = ChatSession::new(&config(), transport);

        let err = session.send("hi").unwrap_err();
        assert!(err.to_string().contains("429"));
        assert_eq!(
            session.conversation().last().unwrap().content,
            "Sorry — there was an error contacting the assistant. Please try again."
        );
    }

    #[test]
    fn test_unknown_response_shape_kept_as_json() {
        let transport = MockTransport::new().with_response(json!({ "status": "queued" }));
        let mut session = ChatSession::new(&config(), transport);
        assert_eq!(session.send("hi").unwrap(), r#"{"status":"queued"}"#);
    }

    #[test]
    fn test_render_pending() {
        let transport = MockTransport::new().with_reply("- <b>one</b>\n- two");
        let mut session = ChatSession::new(&config(), transport);

        let greeting = session.render_pending();
        assert_eq!(greeting.len(), 1);
        assert_eq!(greeting[0].author, "MIRA");
        assert_eq!(greeting[0].html, "<p>Hello, I am Mira.</p>");

        session.send("list *please*").unwrap();
        let rendered = session.render_pending();
        assert_eq!(
            rendered,
            vec![
                RenderedMessage {
                    role: Role::User,
                    author: "YOU".to_owned(),
                    html: "<p>list <em>please</em></p>".to_owned(),
                },
                RenderedMessage {
                    role: Role::Assistant,
                    author: "MIRA".to_owned(),
                    html: "<ul><li>&lt;b&gt;one&lt;/b&gt;</li><li>two</li></ul>".to_owned(),
                },
            ]
        );
        assert!(session.render_pending().is_empty());
    }

    #[test]
    fn test_reset_starts_fresh_conversation() {
        let transport = MockTransport::new().with_reply("a");
        let mut session = ChatSession::new(&config(), transport);
        session.send("q").unwrap();
        let _ = session.render_pending();

        session.reset();
        assert_eq!(
            session.conversation().messages(),
            &[ChatMessage::assistant("Hello, I am Mira.")]
        );
        assert_eq!(session.render_pending().len(), 1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let config = config();
        let mut first = ChatSession::new(&config, MockTransport::new().with_reply("a"));
        let second = ChatSession::new(&config, MockTransport::new());
        first.send("q").unwrap();
        assert_eq!(first.conversation().len(), 3);
        assert_eq!(second.conversation().len(), 1);
    }
}
