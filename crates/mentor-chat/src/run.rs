use std::sync::{Arc, Weak};

use futures::StreamExt as _;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::accumulator::MessageAccumulator;
use crate::errors::ChatError;
use crate::sse::{DeltaDecoder, DeltaItem};
use crate::status::outcome_for_error;
use crate::stream::{ChatEvent, ChatReply, StreamOutcome};
use crate::transport::{ChatRequest, ChatTransport};

/// Handle used to cancel a running chat stream.
#[derive(Clone)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Requests cancellation.
    ///
    /// The run stops reading and finishes with `StreamOutcome::Cancelled`,
    /// keeping whatever text had arrived.
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// Streaming handle for one chat attempt.
///
/// Events arrive in order and end with exactly one `ChatEvent::Finished`.
/// Dropping the handle stops the underlying read loop and releases the
/// response body, even while other [`AbortHandle`]s are alive.
pub struct ChatRun {
    run_id: uuid::Uuid,
    rx: mpsc::Receiver<ChatEvent>,
    final_rx: oneshot::Receiver<ChatReply>,
    abort_handle: AbortHandle,
    lease: Arc<()>,
    saw_terminal: bool,
}

impl ChatRun {
    pub(crate) fn spawn(transport: Arc<dyn ChatTransport>, request: ChatRequest) -> Self {
        let (tx, rx) = mpsc::channel(request.options.stream_buffer_capacity);
        let (final_tx, final_rx) = oneshot::channel();
        let (abort_tx, abort_rx) = watch::channel(false);
        let run_id = request.run_id;
        tokio::spawn(run_task(transport, request, tx, final_tx, abort_rx));
        Self {
            run_id,
            rx,
            final_rx,
            abort_handle: AbortHandle { tx: abort_tx },
            lease: Arc::new(()),
            saw_terminal: false,
        }
    }

    pub fn run_id(&self) -> uuid::Uuid {
        self.run_id
    }

    /// Returns a handle that can cancel the run.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort_handle.clone()
    }

    /// Weak reference that dies with this handle.
    pub(crate) fn lease(&self) -> Weak<()> {
        Arc::downgrade(&self.lease)
    }

    /// Waits for the next event. Returns `None` once the channel is closed.
    pub async fn next_event(&mut self) -> Option<ChatEvent> {
        let event = self.rx.recv().await;
        if let Some(ChatEvent::Finished { .. }) = &event {
            self.saw_terminal = true;
        }
        event
    }

    /// Drains remaining events (if any) and returns the final reply.
    pub async fn finish(mut self) -> Result<ChatReply, ChatError> {
        while !self.saw_terminal {
            match self.rx.recv().await {
                Some(ChatEvent::Finished { .. }) => self.saw_terminal = true,
                Some(_) => {}
                None => break,
            }
        }
        self.final_rx.await.map_err(|_| {
            ChatError::protocol_msg(format!("run {} ended without a final reply", self.run_id))
        })
    }
}

enum Flow {
    Continue,
    Done,
    ReceiverGone,
}

async fn run_task(
    transport: Arc<dyn ChatTransport>,
    request: ChatRequest,
    tx: mpsc::Sender<ChatEvent>,
    final_tx: oneshot::Sender<ChatReply>,
    mut abort_rx: watch::Receiver<bool>,
) {
    let run_id = request.run_id;
    debug!(run_id = %run_id, messages = request.messages.len(), "chat run started");

    let opened = tokio::select! {
        _ = wait_for_abort(&mut abort_rx) => None,
        _ = tx.closed() => {
            debug!(run_id = %run_id, "chat run dropped before the response");
            return;
        }
        opened = transport.open(request) => Some(opened),
    };
    let mut body = match opened {
        None => {
            finish_run(&tx, final_tx, run_id, StreamOutcome::Cancelled, String::new()).await;
            return;
        }
        Some(Err(err)) => {
            let outcome = outcome_for_error(&err);
            warn!(run_id = %run_id, error = %err, "chat request rejected");
            finish_run(&tx, final_tx, run_id, outcome, String::new()).await;
            return;
        }
        Some(Ok(body)) => body,
    };

    if tx.send(ChatEvent::StreamOpened { run_id }).await.is_err() {
        return;
    }

    let mut decoder = DeltaDecoder::default();
    let mut acc = MessageAccumulator::default();
    let outcome = loop {
        tokio::select! {
            _ = wait_for_abort(&mut abort_rx) => break StreamOutcome::Cancelled,
            _ = tx.closed() => {
                debug!(run_id = %run_id, fragments = acc.fragments(), "chat run dropped, releasing body");
                return;
            }
            next = body.next() => {
                let (items, ended) = match next {
                    Some(Ok(chunk)) => (decoder.push(&chunk), false),
                    Some(Err(err)) => {
                        warn!(run_id = %run_id, error = %err, "chat stream failed");
                        break StreamOutcome::Failed { reason: err.to_string() };
                    }
                    None => (decoder.finish(), true),
                };
                match publish(&tx, run_id, &mut acc, items).await {
                    Flow::ReceiverGone => return,
                    Flow::Done => break StreamOutcome::Completed,
                    Flow::Continue if ended => break StreamOutcome::Completed,
                    Flow::Continue => {}
                }
            }
        }
    };
    // Release the body before reporting.
    drop(body);

    info!(run_id = %run_id, fragments = acc.fragments(), ?outcome, "chat run finished");
    finish_run(&tx, final_tx, run_id, outcome, acc.into_content()).await;
}

async fn publish(
    tx: &mpsc::Sender<ChatEvent>,
    run_id: uuid::Uuid,
    acc: &mut MessageAccumulator,
    items: Vec<DeltaItem>,
) -> Flow {
    for item in items {
        match item {
            DeltaItem::Fragment(fragment) => {
                let seq = acc.fragments();
                acc.push(&fragment);
                debug!(run_id = %run_id, seq, "chat fragment");
                let event = ChatEvent::Delta {
                    run_id,
                    seq,
                    fragment,
                };
                if tx.send(event).await.is_err() {
                    return Flow::ReceiverGone;
                }
            }
            DeltaItem::Done => return Flow::Done,
        }
    }
    Flow::Continue
}

/// Resolves once cancellation is requested or every abort handle is gone.
async fn wait_for_abort(abort_rx: &mut watch::Receiver<bool>) {
    loop {
        if *abort_rx.borrow_and_update() {
            return;
        }
        if abort_rx.changed().await.is_err() {
            return;
        }
    }
}

async fn finish_run(
    tx: &mpsc::Sender<ChatEvent>,
    final_tx: oneshot::Sender<ChatReply>,
    run_id: uuid::Uuid,
    outcome: StreamOutcome,
    content: String,
) {
    let _ = tx
        .send(ChatEvent::Finished {
            run_id,
            outcome: outcome.clone(),
            content: content.clone(),
        })
        .await;
    let _ = final_tx.send(ChatReply { outcome, content });
}
