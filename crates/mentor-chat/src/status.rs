//! Maps rejected or failed attempts to outcomes and user-facing notices.

use crate::errors::TransportError;
use crate::stream::StreamOutcome;

/// Shown for 429 when the body carries no message.
pub const RATE_LIMITED_FALLBACK: &str = "Rate limit exceeded. Please try again in a moment.";
/// Shown for 402 when the body carries no message.
pub const PAYMENT_REQUIRED_FALLBACK: &str = "AI credits exhausted. Please add credits to continue.";
/// Shown for every other failure.
pub const GENERIC_FAILURE: &str = "Failed to get a response from the mentor. Please try again.";

/// Severity of a notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Quota or rate limit; the service is temporarily unavailable.
    ServiceUnavailable,
    Error,
}

/// Notification to show after an attempt.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

/// Classifies a transport error. 429 and 402 are distinct outcomes.
pub fn outcome_for_error(err: &TransportError) -> StreamOutcome {
    match err {
        TransportError::Status { status: 429, body } => StreamOutcome::RateLimited {
            message: error_message(body).unwrap_or_else(|| RATE_LIMITED_FALLBACK.to_string()),
        },
        TransportError::Status { status: 402, body } => StreamOutcome::PaymentRequired {
            message: error_message(body)
                .unwrap_or_else(|| PAYMENT_REQUIRED_FALLBACK.to_string()),
        },
        other => StreamOutcome::Failed {
            reason: other.to_string(),
        },
    }
}

/// Reads `{ "error": string }` from a rejection body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
}

impl StreamOutcome {
    /// Notice to surface for this outcome; `None` when there is nothing to
    /// report.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Completed | Self::Cancelled => None,
            Self::RateLimited { message } | Self::PaymentRequired { message } => Some(Notice {
                kind: NoticeKind::ServiceUnavailable,
                message: message.clone(),
            }),
            Self::Failed { .. } => Some(Notice {
                kind: NoticeKind::Error,
                message: GENERIC_FAILURE.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_is_shown_verbatim() {
        let outcome = outcome_for_error(&TransportError::status(429, r#"{"error":"slow down"}"#));
        assert_eq!(
            outcome,
            StreamOutcome::RateLimited {
                message: "slow down".into()
            }
        );
        assert_eq!(
            outcome.notice(),
            Some(Notice {
                kind: NoticeKind::ServiceUnavailable,
                message: "slow down".into()
            })
        );
    }

    #[test]
    fn payment_required_uses_fallback_without_json_body() {
        let outcome = outcome_for_error(&TransportError::status(402, "<html>"));
        assert_eq!(
            outcome,
            StreamOutcome::PaymentRequired {
                message: PAYMENT_REQUIRED_FALLBACK.into()
            }
        );
    }

    #[test]
    fn other_statuses_and_transport_errors_fail_generically() {
        for err in [
            TransportError::status(500, r#"{"error":"internal"}"#),
            TransportError::Request("connection refused".into()),
            TransportError::Read("reset".into()),
        ] {
            let outcome = outcome_for_error(&err);
            assert!(matches!(outcome, StreamOutcome::Failed { .. }));
            assert_eq!(
                outcome.notice().map(|notice| notice.message),
                Some(GENERIC_FAILURE.to_string())
            );
        }
    }

    #[test]
    fn completed_and_cancelled_have_no_notice() {
        assert_eq!(StreamOutcome::Completed.notice(), None);
        assert_eq!(StreamOutcome::Cancelled.notice(), None);
    }
}
