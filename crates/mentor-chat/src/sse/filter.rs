/// Prefix of data-bearing event lines.
pub const DATA_PREFIX: &str = "data:";
/// Leading character of comment (keep-alive) lines.
pub const COMMENT_MARKER: char = ':';

/// Classification of one framed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace-only.
    Blank,
    /// Keep-alive comment.
    Comment,
    /// Any other field (`event:`, `id:`, ...); not used by the chat endpoint.
    Ignored,
    /// Trimmed payload of a `data:` line.
    Data(&'a str),
}

/// Classifies a line. Only `data:` lines carry anything onward.
pub fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with(COMMENT_MARKER) {
        return LineKind::Comment;
    }
    match line.strip_prefix(DATA_PREFIX) {
        Some(rest) => LineKind::Data(rest.trim()),
        None => LineKind::Ignored,
    }
}
