use crate::errors::ChatError;
use crate::model::{Message, Role};

/// Ordered chat history.
///
/// Only the trailing assistant message may change, and only while it is
/// being streamed. Serializes as the plain message list so the surrounding
/// application can persist it.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
    #[serde(skip)]
    streaming: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a conversation from stored messages.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            streaming: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether an assistant message is currently being streamed into.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Appends a user message.
    pub fn push_user(&mut self, content: impl Into<String>) -> Result<(), ChatError> {
        if self.streaming {
            return Err(ChatError::Busy);
        }
        self.messages.push(Message::user(content));
        Ok(())
    }

    /// Appends the empty assistant message that streamed text will fill.
    pub fn begin_assistant(&mut self) -> Result<(), ChatError> {
        if self.streaming {
            return Err(ChatError::Busy);
        }
        self.messages.push(Message::assistant(String::new()));
        self.streaming = true;
        Ok(())
    }

    /// Replaces the content of the in-progress assistant message.
    pub fn update_assistant(&mut self, content: &str) -> Result<(), ChatError> {
        content.clone_into(&mut self.streamed_message()?.content);
        Ok(())
    }

    fn streamed_message(&mut self) -> Result<&mut Message, ChatError> {
        if !self.streaming {
            return Err(ChatError::protocol_msg(
                "no assistant message is being streamed",
            ));
        }
        match self.messages.last_mut() {
            Some(message) if message.role == Role::Assistant => Ok(message),
            _ => Err(ChatError::protocol_msg(
                "last message is not the streamed assistant message",
            )),
        }
    }

    /// Appends a fragment to the in-progress assistant message.
    pub fn append_assistant(&mut self, fragment: &str) -> Result<(), ChatError> {
        self.streamed_message()?.content.push_str(fragment);
        Ok(())
    }

    /// Freezes the in-progress assistant message.
    pub fn end_assistant(&mut self) {
        self.streaming = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_last_assistant_message_is_updated() {
        let mut conversation = Conversation::from_messages(vec![
            Message::user("a"),
            Message::assistant("first answer"),
        ]);
        conversation.push_user("b").expect("user");
        conversation.begin_assistant().expect("begin");
        conversation.append_assistant("He").expect("append");
        conversation.append_assistant("y").expect("append");
        conversation.end_assistant();

        assert_eq!(
            conversation.messages(),
            &[
                Message::user("a"),
                Message::assistant("first answer"),
                Message::user("b"),
                Message::assistant("Hey"),
            ]
        );
    }

    #[test]
    fn at_most_one_message_in_progress() {
        let mut conversation = Conversation::new();
        conversation.push_user("q").expect("user");
        conversation.begin_assistant().expect("begin");
        assert_eq!(conversation.begin_assistant(), Err(ChatError::Busy));
        assert_eq!(conversation.push_user("again"), Err(ChatError::Busy));
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn update_requires_in_progress_message() {
        let mut conversation = Conversation::from_messages(vec![Message::assistant("done")]);
        assert!(matches!(
            conversation.update_assistant("x"),
            Err(ChatError::Protocol(_))
        ));
        assert!(matches!(
            conversation.append_assistant("x"),
            Err(ChatError::Protocol(_))
        ));
        assert_eq!(conversation.last(), Some(&Message::assistant("done")));
    }

    #[test]
    fn serializes_as_message_list() {
        let conversation = Conversation::from_messages(vec![Message::user("hi")]);
        let value = serde_json::to_value(&conversation).expect("serialize");
        assert_eq!(value, serde_json::json!([{"role": "user", "content": "hi"}]));
    }
}
