use std::sync::{Arc, Weak};

use tracing::{debug, info};

use crate::conversation::Conversation;
use crate::errors::ChatError;
use crate::model::ChatOptions;
use crate::run::{AbortHandle, ChatRun};
use crate::stream::{ChatEvent, StreamOutcome};
use crate::transport::{ChatRequest, ChatTransport};

/// Request state of a chat session.
///
/// Terminal outcomes are reported through [`StreamOutcome`]; once one has
/// been applied the session is `Idle` again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    /// Request sent, response head not yet accepted.
    Sending,
    /// Response body is being read.
    Streaming,
}

struct ActiveRun {
    run_id: uuid::Uuid,
    abort: AbortHandle,
    lease: Weak<()>,
}

impl ActiveRun {
    /// The caller dropped the [`ChatRun`] without finishing it.
    fn is_dropped(&self) -> bool {
        self.lease.strong_count() == 0
    }
}

/// One mentor conversation and its request state machine.
///
/// The session owns the conversation. A run only receives a snapshot of the
/// messages, and its events are folded back in through [`apply`](Self::apply)
/// or [`drive`](Self::drive). Only one run may be active at a time.
pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    options: ChatOptions,
    conversation: Conversation,
    state: ChatState,
    active: Option<ActiveRun>,
    last_outcome: Option<StreamOutcome>,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self::with_conversation(transport, Conversation::new())
    }

    /// Resumes an existing conversation.
    pub fn with_conversation(
        transport: Arc<dyn ChatTransport>,
        conversation: Conversation,
    ) -> Self {
        Self {
            transport,
            options: ChatOptions::default(),
            conversation,
            state: ChatState::Idle,
            active: None,
            last_outcome: None,
        }
    }

    /// Sets the options used for subsequent runs.
    pub fn options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> ChatState {
        if self.run_dropped() {
            ChatState::Idle
        } else {
            self.state
        }
    }

    /// Outcome of the most recent finished run.
    pub fn last_outcome(&self) -> Option<&StreamOutcome> {
        self.last_outcome.as_ref()
    }

    /// Whether a new message may be submitted.
    pub fn can_submit(&self) -> bool {
        self.state() == ChatState::Idle
    }

    fn run_dropped(&self) -> bool {
        self.active.as_ref().is_some_and(ActiveRun::is_dropped)
    }

    /// Appends `text` as a user message and starts streaming the reply.
    ///
    /// Rejected with [`ChatError::Busy`] while a run is in flight and with
    /// [`ChatError::Validation`] for blank text.
    pub async fn submit(&mut self, text: impl Into<String>) -> Result<ChatRun, ChatError> {
        if self.run_dropped() {
            debug!("previous chat run was dropped");
            self.abandon();
        }
        if self.state != ChatState::Idle {
            return Err(ChatError::Busy);
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ChatError::Validation("message must not be empty".into()));
        }
        if self.options.stream_buffer_capacity == 0 {
            return Err(ChatError::Validation(
                "stream_buffer_capacity must be greater than 0".into(),
            ));
        }

        self.conversation.push_user(text)?;
        let request = ChatRequest {
            run_id: uuid::Uuid::new_v4(),
            messages: self.conversation.messages().to_vec(),
            options: self.options.clone(),
        };
        debug!(run_id = %request.run_id, history = request.messages.len(), "submitting chat message");
        let run = ChatRun::spawn(self.transport.clone(), request);
        self.active = Some(ActiveRun {
            run_id: run.run_id(),
            abort: run.abort_handle(),
            lease: run.lease(),
        });
        self.state = ChatState::Sending;
        Ok(run)
    }

    /// Folds one run event into the conversation and state machine.
    pub fn apply(&mut self, event: &ChatEvent) -> Result<(), ChatError> {
        match self.active.as_ref() {
            Some(active) if active.run_id == event.run_id() => {}
            _ => {
                return Err(ChatError::protocol_msg(format!(
                    "event for inactive run {}",
                    event.run_id()
                )));
            }
        }

        match event {
            ChatEvent::StreamOpened { .. } => {
                if self.state != ChatState::Sending {
                    return Err(ChatError::protocol_msg("stream opened twice"));
                }
                self.conversation.begin_assistant()?;
                self.state = ChatState::Streaming;
            }
            ChatEvent::Delta { fragment, .. } => {
                if self.state != ChatState::Streaming {
                    return Err(ChatError::protocol_msg("delta before stream opened"));
                }
                self.conversation.append_assistant(fragment)?;
            }
            ChatEvent::Finished {
                outcome, content, ..
            } => {
                if self.conversation.is_streaming() {
                    self.conversation.update_assistant(content)?;
                    self.conversation.end_assistant();
                }
                info!(?outcome, "chat attempt finished");
                self.last_outcome = Some(outcome.clone());
                self.active = None;
                self.state = ChatState::Idle;
            }
        }
        Ok(())
    }

    /// Consumes `run` to its end, applying every event and calling
    /// `on_update` after each one.
    pub async fn drive<F>(
        &mut self,
        mut run: ChatRun,
        mut on_update: F,
    ) -> Result<StreamOutcome, ChatError>
    where
        F: FnMut(&Conversation, &ChatEvent),
    {
        while let Some(event) = run.next_event().await {
            if let Err(err) = self.apply(&event) {
                self.abandon();
                return Err(err);
            }
            on_update(&self.conversation, &event);
            if let ChatEvent::Finished { outcome, .. } = event {
                return Ok(outcome);
            }
        }
        self.abandon();
        Err(ChatError::protocol_msg("run ended without a terminal event"))
    }

    /// Requests cancellation of the active run, if any.
    ///
    /// The session returns to `Idle` when the run's `Finished` event is
    /// applied.
    pub fn cancel(&self) {
        if let Some(active) = &self.active {
            active.abort.abort();
        }
    }

    /// Stops the active run without waiting for its final event and returns
    /// to `Idle`. Text streamed so far is kept.
    pub fn abandon(&mut self) {
        if let Some(active) = self.active.take() {
            active.abort.abort();
            self.last_outcome = Some(StreamOutcome::Cancelled);
        }
        self.conversation.end_assistant();
        self.state = ChatState::Idle;
    }
}
