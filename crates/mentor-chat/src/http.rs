use futures::StreamExt as _;
use tracing::debug;

use crate::config::ChatClientConfig;
use crate::errors::{ChatError, TransportError};
use crate::transport::{ByteStream, ChatRequest, ChatTransport};

/// [`ChatTransport`] that POSTs to the chat function over HTTPS.
pub struct HttpChatTransport {
    client: reqwest::Client,
    config: ChatClientConfig,
}

impl HttpChatTransport {
    /// Creates a transport from explicit configuration.
    pub fn new(config: ChatClientConfig) -> Result<Self, ChatError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a transport from `MENTOR_CHAT_*` environment variables.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::new(ChatClientConfig::from_env()?)
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpChatTransport {
    async fn open(&self, request: ChatRequest) -> Result<ByteStream, TransportError> {
        debug!(run_id = %request.run_id, messages = request.messages.len(), "opening chat stream");
        let mut http_req = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request.body());
        if let Some(timeout) = request.options.timeout {
            http_req = http_req.timeout(timeout);
        }

        let response = http_req
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(TransportError::status(status.as_u16(), body));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::Read(e.to_string())));
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_missing_key() {
        let err = HttpChatTransport::new(ChatClientConfig::new("http://localhost/chat", " "));
        assert!(matches!(err, Err(ChatError::Config(_))));
    }
}
