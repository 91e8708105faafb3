//! Byte accumulator fed by the transport
//!
//! Bytes are appended at the back and only ever removed from the front, so
//! anything handed out as part of a frame or discarded as noise is never
//! looked at again.

use bytes::{Buf, Bytes, BytesMut};

#[cfg(feature = "logging")]
use tracing::debug;

/// Growable buffer of unconsumed stream bytes
#[derive(Debug, Default)]
pub struct ByteAccumulator {
    buf: BytesMut,
    consumed: u64,
}

impl ByteAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty accumulator with preallocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            consumed: 0,
        }
    }

    /// Append bytes from the transport; empty input is a no-op
    pub fn ingest(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Unconsumed bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Number of unconsumed bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing is buffered
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Absolute stream offset of the first unconsumed byte
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Remove and return the first `n` bytes
    ///
    /// `n` is clamped to the buffered length.
    pub fn take(&mut self, n: usize) -> Bytes {
        let n = n.min(self.buf.len());
        self.consumed += n as u64;
        self.buf.split_to(n).freeze()
    }

    /// Drop the first `n` bytes, returning how many were dropped
    pub fn discard(&mut self, n: usize) -> usize {
        let n = n.min(self.buf.len());
        if n > 0 {
            #[cfg(feature = "logging")]
            debug!("Discarding {} bytes at offset {}", n, self.consumed);

            self.buf.advance(n);
            self.consumed += n as u64;
        }
        n
    }

    /// Keep only the last `n` bytes, returning how many were dropped
    pub fn retain_tail(&mut self, n: usize) -> usize {
        let excess = self.buf.len().saturating_sub(n);
        self.discard(excess)
    }
}
