use serde::Deserialize;

/// Payload that ends the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Text carried by one delta record. Role-only deltas have none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDelta {
    pub content_fragment: Option<String>,
}

/// Result of parsing a data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The terminal sentinel.
    Done,
    Delta(ParsedDelta),
}

#[derive(Deserialize)]
struct ChunkRecord {
    #[serde(default)]
    choices: Vec<ChoiceRecord>,
}

#[derive(Deserialize)]
struct ChoiceRecord {
    #[serde(default)]
    delta: DeltaRecord,
}

#[derive(Deserialize, Default)]
struct DeltaRecord {
    #[serde(default)]
    content: Option<String>,
}

/// Parses a trimmed `data:` payload.
///
/// Only `choices[0].delta.content` is read; every other field is ignored.
/// An error means the payload is not (yet) a complete JSON record.
pub fn parse_payload(raw: &str) -> Result<Payload, serde_json::Error> {
    if raw == DONE_SENTINEL {
        return Ok(Payload::Done);
    }
    let record: ChunkRecord = serde_json::from_str(raw)?;
    let content_fragment = record
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content);
    Ok(Payload::Delta(ParsedDelta { content_fragment }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(raw: &str) -> Option<String> {
        match parse_payload(raw).expect("parse") {
            Payload::Delta(delta) => delta.content_fragment,
            Payload::Done => panic!("unexpected sentinel"),
        }
    }

    #[test]
    fn sentinel_is_done() {
        assert_eq!(parse_payload("[DONE]").expect("parse"), Payload::Done);
    }

    #[test]
    fn extracts_first_choice_content() {
        assert_eq!(
            fragment(r#"{"id":"x","choices":[{"delta":{"content":"Hi"}},{"delta":{"content":"no"}}]}"#),
            Some("Hi".into())
        );
    }

    #[test]
    fn records_without_content_yield_none() {
        assert_eq!(fragment(r#"{"choices":[{"delta":{}}]}"#), None);
        assert_eq!(fragment(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#), None);
        assert_eq!(fragment(r#"{"choices":[{"delta":{"content":null}}]}"#), None);
        assert_eq!(fragment(r#"{"choices":[]}"#), None);
        assert_eq!(fragment(r#"{"object":"chat.completion.chunk"}"#), None);
    }

    #[test]
    fn truncated_json_is_an_error() {
        assert!(parse_payload(r#"{"choices":[{"delta":{"content":"Hel"#).is_err());
    }
}
