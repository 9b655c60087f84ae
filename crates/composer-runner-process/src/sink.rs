//! Live output forwarding

use std::fmt;

/// Which pipe a chunk of child output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for child output, invoked once per chunk as it arrives.
///
/// Chunks are forwarded untouched: no line splitting, no decoding, no buffering.
/// Passing no sink to a runner means the output is discarded.
///
/// Any `FnMut(StreamKind, &[u8])` closure is a sink:
///
/// ```rust
/// use composer_runner_process::{OutputSink, StreamKind};
///
/// let mut seen = Vec::new();
/// let mut sink = |stream: StreamKind, chunk: &[u8]| seen.push((stream, chunk.to_vec()));
/// sink.on_output(StreamKind::Stdout, b"hello");
/// drop(sink);
/// assert_eq!(seen, vec![(StreamKind::Stdout, b"hello".to_vec())]);
/// ```
pub trait OutputSink {
    fn on_output(&mut self, stream: StreamKind, chunk: &[u8]);
}

impl<F> OutputSink for F
where
    F: FnMut(StreamKind, &[u8]),
{
    fn on_output(&mut self, stream: StreamKind, chunk: &[u8]) {
        self(stream, chunk);
    }
}
