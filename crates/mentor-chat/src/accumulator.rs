/// Running text of the assistant message being streamed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MessageAccumulator {
    content: String,
    fragments: u64,
}

impl MessageAccumulator {
    /// Appends a fragment and returns the updated message text.
    pub fn push(&mut self, fragment: &str) -> &str {
        self.content.push_str(fragment);
        self.fragments += 1;
        &self.content
    }

    /// Text accumulated so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of fragments applied.
    pub fn fragments(&self) -> u64 {
        self.fragments
    }

    pub fn into_content(self) -> String {
        self.content
    }
}
