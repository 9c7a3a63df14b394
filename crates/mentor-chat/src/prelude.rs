//! Common imports for typical chat usage.
pub use crate::{
    AbortHandle, ChatClientConfig, ChatError, ChatEvent, ChatOptions, ChatReply, ChatRun,
    ChatSession, ChatState, ChatTransport, Conversation, HttpChatTransport, Message, Notice,
    NoticeKind, Role, StreamOutcome,
};
