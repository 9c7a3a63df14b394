/// A complete line taken from the stream buffer.
///
/// Keeps the terminator it was split on so the line can be restored to the
/// buffer exactly as it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedLine {
    text: String,
    terminator: &'static str,
}

impl FramedLine {
    /// Line content without `\n` or a trailing `\r`.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The original bytes of the line, terminator included.
    pub fn raw(&self) -> String {
        let mut raw = String::with_capacity(self.text.len() + self.terminator.len());
        raw.push_str(&self.text);
        raw.push_str(self.terminator);
        raw
    }
}

/// Splits incrementally decoded text into newline-terminated lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: String,
}

impl LineFramer {
    /// Appends decoded text to the buffer.
    pub fn push(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Removes and returns the first complete line, if any.
    ///
    /// Text after the last newline stays buffered until its terminator
    /// arrives.
    pub fn next_line(&mut self) -> Option<FramedLine> {
        let idx = self.buf.find('\n')?;
        let mut text: String = self.buf.drain(..=idx).collect();
        text.pop();
        let terminator = if text.ends_with('\r') {
            text.pop();
            "\r\n"
        } else {
            "\n"
        };
        Some(FramedLine { text, terminator })
    }

    /// Puts a line back at the front of the buffer.
    pub fn unread(&mut self, line: &FramedLine) {
        self.buf.insert_str(0, &line.raw());
    }

    /// Text not yet returned as a line.
    pub fn buffered(&self) -> &str {
        &self.buf
    }

    /// Takes everything still buffered, leaving the framer empty.
    pub fn take_buffered(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(framer: &mut LineFramer) -> Vec<String> {
        std::iter::from_fn(|| framer.next_line())
            .map(|line| line.text().to_string())
            .collect()
    }

    #[test]
    fn emits_complete_lines_and_keeps_tail() {
        let mut framer = LineFramer::default();
        framer.push("one\ntwo\r\nthr");
        assert_eq!(drain(&mut framer), vec!["one", "two"]);
        assert_eq!(framer.buffered(), "thr");
        framer.push("ee\n");
        assert_eq!(drain(&mut framer), vec!["three"]);
        assert_eq!(framer.buffered(), "");
    }

    #[test]
    fn consumed_buffer_yields_nothing_more() {
        let mut framer = LineFramer::default();
        framer.push("a\n");
        assert_eq!(drain(&mut framer), vec!["a"]);
        assert!(framer.next_line().is_none());
        assert!(framer.next_line().is_none());
    }

    #[test]
    fn carriage_return_split_from_its_newline() {
        let mut framer = LineFramer::default();
        framer.push("data: x\r");
        assert!(framer.next_line().is_none());
        framer.push("\n");
        let line = framer.next_line().expect("line");
        assert_eq!(line.text(), "data: x");
        assert_eq!(line.raw(), "data: x\r\n");
    }

    #[test]
    fn unread_restores_line_byte_for_byte() {
        let mut framer = LineFramer::default();
        framer.push("first\r\nsecond\npartial");
        let line = framer.next_line().expect("line");
        framer.unread(&line);
        assert_eq!(framer.buffered(), "first\r\nsecond\npartial");
    }

    #[test]
    fn empty_lines_are_still_framed() {
        let mut framer = LineFramer::default();
        framer.push("\n\r\n");
        assert_eq!(drain(&mut framer), vec!["", ""]);
    }
}
