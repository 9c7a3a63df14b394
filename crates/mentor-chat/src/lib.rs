//! Streaming AI mentor chat.
//!
//! A [`ChatSession`] owns one conversation. Submitting a message POSTs the
//! history to the chat function and returns a [`ChatRun`] whose events carry
//! the assistant reply as it streams in. The byte stream is decoded by
//! [`sse::DeltaDecoder`], which tolerates chunk boundaries anywhere,
//! including inside a UTF-8 code point or a JSON payload.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use mentor_chat::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ChatError> {
//! let transport = Arc::new(HttpChatTransport::from_env()?);
//! let mut session = ChatSession::new(transport);
//!
//! let run = session.submit("How do I validate my startup idea?").await?;
//! let outcome = session
//!     .drive(run, |_, event| {
//!         if let ChatEvent::Delta { fragment, .. } = event {
//!             print!("{fragment}");
//!         }
//!     })
//!     .await?;
//!
//! if let Some(notice) = outcome.notice() {
//!     eprintln!("{}", notice.message);
//! }
//! # Ok(())
//! # }
//! ```

/// Running text of the streamed assistant message.
pub mod accumulator;
/// HTTP client configuration.
pub mod config;
/// Ordered chat history.
pub mod conversation;
/// Public error types.
pub mod errors;
/// reqwest-based transport.
pub mod http;
/// Messages, roles and run options.
pub mod model;
/// Logging setup.
pub mod observability;
/// Common imports for typical usage.
pub mod prelude;
/// Run task, streaming handle and cancellation handle.
pub mod run;
/// Conversation owner and request state machine.
pub mod session;
pub mod sse;
/// Outcome classification and user-facing notices.
pub mod status;
/// Run events and outcomes.
pub mod stream;
/// Transport contract.
pub mod transport;

pub use accumulator::MessageAccumulator;
pub use config::ChatClientConfig;
pub use conversation::Conversation;
pub use errors::{ChatError, TransportError};
pub use http::HttpChatTransport;
pub use model::{ChatOptions, Message, Role};
pub use run::{AbortHandle, ChatRun};
pub use session::{ChatSession, ChatState};
pub use status::{Notice, NoticeKind};
pub use stream::{ChatEvent, ChatReply, StreamOutcome};
pub use transport::{ByteStream, ChatRequest, ChatTransport};
