//! Incremental decoding of the chat completion event stream.
//!
//! Bytes flow through four stages: [`Utf8Decoder`] → [`LineFramer`] →
//! [`classify`] → [`parse_payload`]. [`DeltaDecoder`] runs them in order and
//! yields content fragments as soon as their line is complete.
//!
//! A data line whose JSON fails to parse is pushed back onto the front of
//! the buffer and the current batch stops there. The next chunk retries it
//! once; a line that fails again is dropped so later lines are not held up.
mod filter;
mod framer;
mod payload;
mod utf8;

pub use filter::{COMMENT_MARKER, DATA_PREFIX, LineKind, classify};
pub use framer::{FramedLine, LineFramer};
pub use payload::{DONE_SENTINEL, ParsedDelta, Payload, parse_payload};
pub use utf8::Utf8Decoder;

use tracing::{debug, warn};

/// Item produced by [`DeltaDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaItem {
    /// Non-empty text fragment in stream order.
    Fragment(String),
    /// The terminal sentinel was read; nothing further will be produced.
    Done,
}

/// Stateful decoder for one streaming response.
#[derive(Debug, Default)]
pub struct DeltaDecoder {
    utf8: Utf8Decoder,
    framer: LineFramer,
    pushed_back: Option<String>,
    done: bool,
}

impl DeltaDecoder {
    /// Feeds one chunk of the response body.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<DeltaItem> {
        let mut items = Vec::new();
        if self.done {
            return items;
        }
        let text = self.utf8.decode(chunk);
        self.framer.push(&text);
        self.drain_lines(&mut items);
        items
    }

    /// Processes whatever is still buffered once the body has ended.
    ///
    /// The last line may lack its newline. Payloads that still do not parse
    /// are ignored.
    pub fn finish(&mut self) -> Vec<DeltaItem> {
        let mut items = Vec::new();
        if self.done {
            return items;
        }
        self.done = true;
        let tail = self.utf8.finish();
        self.framer.push(&tail);
        let rest = self.framer.take_buffered();
        for raw in rest.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let LineKind::Data(payload) = classify(line) else {
                continue;
            };
            match parse_payload(payload) {
                Ok(Payload::Done) => {
                    items.push(DeltaItem::Done);
                    break;
                }
                Ok(Payload::Delta(delta)) => push_fragment(&mut items, delta),
                Err(err) => debug!(error = %err, "ignoring unparseable trailing data line"),
            }
        }
        items
    }

    /// Whether the sentinel has been read or the input finished.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Text buffered but not yet consumed as a line.
    pub fn buffered(&self) -> &str {
        self.framer.buffered()
    }

    fn drain_lines(&mut self, items: &mut Vec<DeltaItem>) {
        while let Some(line) = self.framer.next_line() {
            let LineKind::Data(payload) = classify(line.text()) else {
                continue;
            };
            match parse_payload(payload) {
                Ok(Payload::Done) => {
                    self.done = true;
                    items.push(DeltaItem::Done);
                    return;
                }
                Ok(Payload::Delta(delta)) => {
                    self.pushed_back = None;
                    push_fragment(items, delta);
                }
                Err(err) => {
                    let raw = line.raw();
                    if self.pushed_back.as_deref() == Some(raw.as_str()) {
                        warn!(error = %err, "dropping data line that failed to parse twice");
                        self.pushed_back = None;
                        continue;
                    }
                    debug!(error = %err, "data line did not parse; re-buffering");
                    self.framer.unread(&line);
                    self.pushed_back = Some(raw);
                    return;
                }
            }
        }
    }
}

fn push_fragment(items: &mut Vec<DeltaItem>, delta: ParsedDelta) {
    if let Some(text) = delta.content_fragment.filter(|text| !text.is_empty()) {
        items.push(DeltaItem::Fragment(text));
    }
}
