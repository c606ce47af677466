//! Conversation state and chat-completion requests for MIRA.
//!
//! A [`ChatSession`] owns one [`Conversation`] and drives the
//! request/reply cycle against a [`ChatTransport`]:
//!
//! 1. the user message is appended to the conversation,
//! 2. a [`ChatRequest`] is built from the variant configuration,
//! 3. the transport returns the response JSON,
//! 4. [`extract_reply`] picks the reply text, which is appended in turn.
//!
//! Messages are rendered for display with `mira-markdown`.
//!
//! # Example
//!
//! ```
//! use mira_chat::{ChatRequest, ChatSession, ChatTransport, TransportError};
//! use mira_config::Config;
//! use serde_json::{Value, json};
//!
//! struct Canned;
//!
//! impl ChatTransport for Canned {
//!     fn send(&self, _request: &ChatRequest) -> Result<Value, TransportError> {
//!         Ok(json!({ "choices": [{ "message": { "content": "**Know your audience.**" } }] }))
//!     }
//! }
//!
//! let mut session = ChatSession::new(&Config::default(), Canned);
//! session.send("Where do I start?").unwrap();
//!
//! let rendered = session.render_pending();
//! assert_eq!(rendered[1].html, "<p><strong>Know your audience.</strong></p>");
//! ```

mod conversation;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod reply;
mod request;
mod session;
mod transport;

pub use conversation::{ChatMessage, Conversation, Role};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
pub use reply::extract_reply;
pub use request::{ChatRequest, ChatRequestBody, MAX_EMBEDDED_INSTRUCTIONS};
pub use session::{ChatError, ChatSession, RenderedMessage};
pub use transport::{ChatTransport, TransportError};
