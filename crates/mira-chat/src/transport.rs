//! Transport seam between a chat session and the network.
//!
//! Implementations own the HTTP client and credentials handling; the
//! session only hands over a prepared [`ChatRequest`] and receives the
//! decoded JSON body back.

use serde_json::Value;

use crate::request::ChatRequest;

/// Sends chat-completion requests.
pub trait ChatTransport {
    /// Send a request and return the decoded response body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the request cannot be delivered, the
    /// endpoint answers with a non-success status, or the body is not JSON.
    fn send(&self, request: &ChatRequest) -> Result<Value, TransportError>;
}

impl<T: ChatTransport + ?Sized> ChatTransport for &T {
    fn send(&self, request: &ChatRequest) -> Result<Value, TransportError> {
        (**self).send(request)
    }
}

impl<T: ChatTransport + ?Sized> ChatTransport for Box<T> {
    fn send(&self, request: &ChatRequest) -> Result<Value, TransportError> {
        (**self).send(request)
    }
}

/// Transport failure.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Endpoint answered with a non-success status.
    #[error("API error {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },
    /// Request could not be delivered.
    #[error("Transport error: {0}")]
    Io(String),
    /// Response body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
