/// Terminal state of one chat attempt.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamOutcome {
    /// Sentinel read or body ended normally.
    Completed,
    /// Endpoint answered 429.
    RateLimited { message: String },
    /// Endpoint answered 402.
    PaymentRequired { message: String },
    /// Request, status or stream read failed.
    Failed { reason: String },
    /// Stopped by the caller.
    Cancelled,
}

impl StreamOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Events published by a [`ChatRun`](crate::ChatRun), in order.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatEvent {
    /// Response accepted; an empty assistant message should be shown.
    StreamOpened { run_id: uuid::Uuid },
    /// A fragment arrived; append it to the streamed message.
    Delta {
        run_id: uuid::Uuid,
        seq: u64,
        fragment: String,
    },
    /// Terminal event; always the last one. `content` is the whole reply.
    Finished {
        run_id: uuid::Uuid,
        outcome: StreamOutcome,
        content: String,
    },
}

impl ChatEvent {
    pub fn run_id(&self) -> uuid::Uuid {
        match self {
            Self::StreamOpened { run_id }
            | Self::Delta { run_id, .. }
            | Self::Finished { run_id, .. } => *run_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }
}

/// Final result of a run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatReply {
    pub outcome: StreamOutcome,
    /// Accumulated assistant text; may be empty, and is kept on failure.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let value = serde_json::to_value(StreamOutcome::RateLimited {
            message: "slow down".into(),
        })
        .expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"kind": "rate_limited", "message": "slow down"})
        );
    }
}
