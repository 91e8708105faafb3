//! Resumable stream parser
//!
//! The parser owns its buffer, configuration and decoder registry. Each
//! call to [`Parser::ingest`] appends a chunk and runs one pass: frames are
//! removed and turned into records until the front of the buffer needs more
//! data. Nothing but the buffered bytes carries over to the next pass.

use crate::accumulator::ByteAccumulator;
use crate::config::ParserConfig;
use crate::error::SbfError;
use crate::record::{DecodedRecord, RecordEmitter};
use crate::registry::BlockRegistry;
use crate::scanner;
use crate::stats::ParseStats;
use crate::types::Frame;
use chrono::{DateTime, Utc};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Streaming parser for one receiver connection
#[derive(Debug, Default)]
pub struct Parser {
    buffer: ByteAccumulator,
    config: ParserConfig,
    emitter: RecordEmitter,
    stats: ParseStats,
}

impl Parser {
    /// Create a parser with the built-in block decoders
    pub fn new(config: ParserConfig) -> Result<Self, SbfError> {
        Self::with_registry(config, BlockRegistry::default())
    }

    /// Create a parser with a custom registry
    pub fn with_registry(config: ParserConfig, registry: BlockRegistry) -> Result<Self, SbfError> {
        config.validate()?;
        Ok(Self {
            buffer: ByteAccumulator::with_capacity(config.max_display_size),
            config,
            emitter: RecordEmitter::new(registry),
            stats: ParseStats::default(),
        })
    }

    /// Append a chunk and return the records it completed, in stream order
    pub fn ingest(&mut self, bytes: &[u8]) -> Vec<DecodedRecord> {
        self.ingest_at(bytes, Utc::now())
    }

    /// Same as [`Parser::ingest`], stamping records with `now`
    pub fn ingest_at(&mut self, bytes: &[u8], now: DateTime<Utc>) -> Vec<DecodedRecord> {
        self.push(bytes);
        self.drain_at(now)
    }

    /// Append a chunk without parsing
    pub fn push(&mut self, bytes: &[u8]) {
        self.stats.bytes_ingested += bytes.len() as u64;
        self.buffer.ingest(bytes);
    }

    /// Remove the next frame without decoding it
    pub fn next_frame(&mut self) -> Option<Frame> {
        scanner::next_frame(&mut self.buffer, &self.config, &mut self.stats)
    }

    /// Run one pass over the buffered bytes
    pub fn drain_at(&mut self, now: DateTime<Utc>) -> Vec<DecodedRecord> {
        let mut records = Vec::new();

        while let Some(frame) = self.next_frame() {
            match self.emitter.emit(&frame, now) {
                Ok(Some(record)) => {
                    self.stats.records_emitted += 1;
                    records.push(record);
                }
                Ok(None) => {}
                Err(SbfError::UnsupportedBlock(number)) => {
                    self.stats.unsupported_blocks += 1;

                    #[cfg(feature = "logging")]
                    debug!(
                        "Unsupported SBF block {} at offset {} ({} bytes)",
                        number,
                        frame.offset,
                        frame.size()
                    );
                    #[cfg(not(feature = "logging"))]
                    let _ = number;
                }
                Err(e) => {
                    self.stats.decode_failures += 1;

                    #[cfg(feature = "logging")]
                    warn!(
                        "Failed to decode {} frame at offset {}: {}",
                        frame.kind.label(),
                        frame.offset,
                        e
                    );
                    #[cfg(not(feature = "logging"))]
                    let _ = e;
                }
            }
        }

        records
    }

    /// Bytes waiting for the rest of a frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Absolute stream offset of the first buffered byte
    pub fn stream_offset(&self) -> u64 {
        self.buffer.consumed()
    }

    /// Statistics so far
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Count a record the sink refused
    pub fn record_publish_failure(&mut self) {
        self.stats.publish_failures += 1;
    }

    /// Configuration in use
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Block decoders in use
    pub fn registry(&self) -> &BlockRegistry {
        self.emitter.registry()
    }

    /// Mutable registry access, for adding decoders
    pub fn registry_mut(&mut self) -> &mut BlockRegistry {
        self.emitter.registry_mut()
    }
}
