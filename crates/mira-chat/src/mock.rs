//! Mock transport for testing.
//!
//! Provides [`MockTransport`] for exercising chat sessions without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{Value, json};

use crate::request::ChatRequest;
use crate::transport::{ChatTransport, TransportError};

/// Mock transport returning queued responses in order.
///
/// Every request passed to [`send`](ChatTransport::send) is recorded.
/// When the queue is empty, `send` fails with [`TransportError::Io`].
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockTransport {
    /// Create a mock with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chat-completion response carrying `content`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_reply(self, content: &str) -> Self {
        self.with_response(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    /// Queue a raw response body.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_response(self, response: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a failure.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_error(self, error: TransportError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ChatTransport for MockTransport {
    fn send(&self, request: &ChatRequest) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Io("no response queued".to_owned())))
    }
}
