/// Incremental UTF-8 decoder.
///
/// Bytes of a code point split across reads are held back until the rest
/// arrives. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Decodes as much of `chunk` (after any held-back bytes) as is complete.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::with_capacity(self.pending.len());
        loop {
            let (valid, invalid_len) = match std::str::from_utf8(&self.pending) {
                Ok(_) => (self.pending.len(), None),
                Err(err) => (err.valid_up_to(), err.error_len()),
            };
            out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
            match invalid_len {
                // Either fully decoded or an incomplete sequence at the tail.
                None => {
                    self.pending.drain(..valid);
                    return out;
                }
                Some(len) => {
                    out.push(char::REPLACEMENT_CHARACTER);
                    self.pending.drain(..valid + len);
                }
            }
        }
    }

    /// Flushes held-back bytes at end of input.
    pub fn finish(&mut self) -> String {
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }

    /// Number of bytes waiting for the rest of their code point.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
