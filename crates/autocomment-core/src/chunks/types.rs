/// A source file split into a leading preamble and an ordered sequence of
/// units. The preamble is kept verbatim and never sent to the completion
/// service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChunks {
    pub preamble: String,
    pub units: Vec<String>,
}

impl SourceChunks {
    /// Concatenating the pieces in order reproduces the source byte-for-byte.
    pub fn reassemble(&self) -> String {
        let mut out = String::with_capacity(
            self.preamble.len() + self.units.iter().map(String::len).sum::<usize>(),
        );
        out.push_str(&self.preamble);
        for unit in &self.units {
            out.push_str(unit);
        }
        out
    }
}
