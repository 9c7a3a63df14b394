//! Property-based tests: chunk boundaries never change decoded output.

use mentor_chat::sse::{DeltaDecoder, DeltaItem};
use proptest::prelude::*;

fn arb_line_ending() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("\n"), Just("\r\n")]
}

/// Event stream with keep-alives between data lines, ending in `[DONE]`.
fn render(fragments: &[String], keep_alive: bool, eol: &str) -> String {
    let mut stream = String::new();
    for fragment in fragments {
        if keep_alive {
            stream.push_str(&format!(": keep-alive{eol}{eol}"));
        }
        let payload = serde_json::json!({"choices": [{"delta": {"content": fragment}}]});
        stream.push_str(&format!("data: {payload}{eol}"));
    }
    stream.push_str(&format!("data: [DONE]{eol}"));
    stream
}

fn decode(bytes: &[u8], cuts: &[usize]) -> (String, bool) {
    let mut points: Vec<usize> = cuts.iter().map(|cut| cut % (bytes.len() + 1)).collect();
    points.sort_unstable();
    points.dedup();

    let mut decoder = DeltaDecoder::default();
    let mut items = Vec::new();
    let mut start = 0;
    for point in points {
        items.extend(decoder.push(&bytes[start..point]));
        start = point;
    }
    items.extend(decoder.push(&bytes[start..]));
    items.extend(decoder.finish());

    let mut text = String::new();
    let mut done = false;
    for item in items {
        match item {
            DeltaItem::Fragment(fragment) => text.push_str(&fragment),
            DeltaItem::Done => done = true,
        }
    }
    (text, done)
}

proptest! {
    #[test]
    fn arbitrary_chunking_yields_fragments_in_order(
        fragments in proptest::collection::vec(any::<String>(), 0..8),
        keep_alive in any::<bool>(),
        eol in arb_line_ending(),
        cuts in proptest::collection::vec(any::<usize>(), 0..16),
    ) {
        let stream = render(&fragments, keep_alive, eol);
        let (text, done) = decode(stream.as_bytes(), &cuts);
        prop_assert_eq!(text, fragments.concat());
        prop_assert!(done);
    }

    #[test]
    fn arbitrary_chunking_matches_single_chunk(
        fragments in proptest::collection::vec("[a-zé🌍 \"\\\\]{0,6}", 1..6),
        cuts in proptest::collection::vec(any::<usize>(), 1..24),
    ) {
        let stream = render(&fragments, true, "\n");
        let bytes = stream.as_bytes();
        prop_assert_eq!(decode(bytes, &cuts), decode(bytes, &[]));
    }
}
