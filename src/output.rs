//! Output sinks for live echoing of process output
//!
//! A sink receives each chunk of bytes as soon as it is read from a child's
//! stdout or stderr pipe. Chunk boundaries are whatever the OS delivered; no
//! guarantee is made that a chunk is a whole line or valid UTF-8.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Accepts chunks of bytes produced by a running process
pub trait OutputSink: Send + Sync {
    /// Handle one chunk of output
    fn handle_output(&self, data: &[u8]);

    /// Short name of where output goes, for logs and `Debug` output
    fn kind(&self) -> &'static str {
        "custom"
    }
}

/// Shared handle to a sink, as stored in a session configuration
pub type SharedSink = Arc<dyn OutputSink>;

/// Drops all output
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl OutputSink for DiscardSink {
    fn handle_output(&self, _data: &[u8]) {}

    fn kind(&self) -> &'static str {
        "discard"
    }
}

/// Forwards output to the host's standard output
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn handle_output(&self, data: &[u8]) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(data).and_then(|_| out.flush()) {
            debug!("stdout echo failed: {}", e);
        }
    }

    fn kind(&self) -> &'static str {
        "stdout"
    }
}

/// Forwards output to the host's standard error
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl OutputSink for StderrSink {
    fn handle_output(&self, data: &[u8]) {
        let mut err = std::io::stderr().lock();
        if let Err(e) = err.write_all(data).and_then(|_| err.flush()) {
            debug!("stderr echo failed: {}", e);
        }
    }

    fn kind(&self) -> &'static str {
        "stderr"
    }
}

/// Split captured output into lines, without line terminators
pub fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

/// Collects every chunk in memory
///
/// Clones share the same buffer, so a clone can be handed to a session while
/// the caller keeps one to inspect afterwards.
#[derive(Clone, Default)]
pub struct MemorySink {
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks received so far, in arrival order
    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.chunks
            .lock()
            .map(|chunks| chunks.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// All received bytes concatenated
    pub fn contents(&self) -> Vec<u8> {
        self.chunks().concat()
    }

    /// All received bytes as (lossy) text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl OutputSink for MemorySink {
    fn handle_output(&self, data: &[u8]) {
        let mut chunks = self
            .chunks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        chunks.push(data.to_vec());
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

impl fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySink")
            .field("bytes", &self.contents().len())
            .finish()
    }
}
