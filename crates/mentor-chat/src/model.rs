use std::fmt;
use std::time::Duration;

/// Author of a conversation message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        })
    }
}

/// One entry of a conversation, serialized as `{ "role", "content" }`.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-run behavior options.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ChatOptions {
    /// Optional per-run timeout applied to the whole request.
    pub timeout: Option<Duration>,
    /// Bounded event buffer size between the run task and the consumer.
    pub stream_buffer_capacity: usize,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            stream_buffer_capacity: 128,
        }
    }
}

impl ChatOptions {
    /// Sets the per-run timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the event buffer capacity.
    pub fn stream_buffer_capacity(mut self, capacity: usize) -> Self {
        self.stream_buffer_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_options_default_buffer_capacity() {
        assert_eq!(ChatOptions::default().stream_buffer_capacity, 128);
    }

    #[test]
    fn message_serializes_with_lowercase_role() {
        let value = serde_json::to_value(Message::user("hi")).expect("serialize");
        assert_eq!(value, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
