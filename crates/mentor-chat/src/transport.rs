use std::pin::Pin;

use crate::errors::TransportError;
use crate::model::{ChatOptions, Message};

/// Response body as a stream of raw chunks.
pub type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, TransportError>> + Send + 'static>>;

/// One outbound chat request.
///
/// `messages` is a snapshot of the conversation taken at submit time.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub run_id: uuid::Uuid,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    /// JSON body sent to the chat endpoint: `{ "messages": [...] }`.
    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "messages": self.messages })
    }
}

/// Opens streaming chat responses.
///
/// Non-success statuses must be returned as [`TransportError::Status`] with
/// the response body so they can be classified.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open(&self, request: ChatRequest) -> Result<ByteStream, TransportError>;
}
