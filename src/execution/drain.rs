//! Stream draining
//!
//! Each of a child's output pipes is read by its own task until EOF, so a
//! child that floods one stream can never block on a pipe nobody is reading.
//! Chunks are numbered per stream at read time and reassembled by number.

use crate::output::SharedSink;
use std::collections::BTreeMap;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

/// Read buffer size per stream
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

impl StreamType {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamType::Stdout => "stdout",
            StreamType::Stderr => "stderr",
        }
    }
}

/// Ordered capture of one stream
///
/// Sequence numbers belong to this stream alone. Reassembly walks them in
/// ascending order, independent of the order chunks were inserted.
#[derive(Debug, Default, Clone)]
pub struct ChunkLog {
    next_sequence: u64,
    chunks: BTreeMap<u64, Vec<u8>>,
}

impl ChunkLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the sequence number for the chunk just read
    pub fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Store a chunk under its sequence number
    pub fn insert(&mut self, sequence: u64, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.chunks.insert(sequence, chunk);
    }

    /// Reserve a number and store the chunk in one step
    pub fn push(&mut self, chunk: Vec<u8>) -> u64 {
        let sequence = self.next_sequence();
        self.insert(sequence, chunk);
        sequence
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total captured bytes
    pub fn total_bytes(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }

    /// Concatenate all chunks in sequence order
    pub fn assemble(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.total_bytes());
        for chunk in self.chunks.values() {
            bytes.extend_from_slice(chunk);
        }
        bytes
    }

    /// Reassembled capture as (lossy) UTF-8 text
    ///
    /// Decoding happens after reassembly so multi-byte characters split
    /// across chunk boundaries survive.
    pub fn into_text(self) -> String {
        String::from_utf8_lossy(&self.assemble()).into_owned()
    }
}

/// Read `reader` to EOF, echoing each chunk to `sink`
///
/// An I/O error ends the drain like EOF does; whatever was read so far is
/// kept.
pub async fn drain<R>(mut reader: R, stream: StreamType, sink: SharedSink) -> ChunkLog
where
    R: AsyncRead + Unpin,
{
    let mut log = ChunkLog::new();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => {
                debug!(
                    "{} EOF after {} chunks ({} bytes)",
                    stream.as_str(),
                    log.len(),
                    log.total_bytes()
                );
                break;
            }
            Ok(n) => {
                let sequence = log.next_sequence();
                let chunk = buf[..n].to_vec();
                sink.handle_output(&chunk);
                log.insert(sequence, chunk);
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("{} read error ({}): {}", stream.as_str(), e.kind(), e);
                break;
            }
        }
    }

    log
}

/// Drain `reader` on its own task
pub fn spawn_drain<R>(reader: R, stream: StreamType, sink: SharedSink) -> JoinHandle<ChunkLog>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(drain(reader, stream, sink))
}
