//! # Sbfstream Core
//!
//! Streaming decoder for the byte stream of a Septentrio GNSS receiver: SBF
//! binary blocks interleaved with the ASCII side-channel (prompts, command
//! replies, display text, events and formatted information blocks).
//!
//! ## Modules
//!
//! - `constants`: Wire constants, frame size limits and block numbers
//! - `types`: Block header, frames and parse outcomes
//! - `accumulator`: Front-consumed byte buffer fed by the transport
//! - `crc`: SBF CRC-16 computation
//! - `prompt`: Receiver prompt recognition
//! - `ascii`: Classifiers for the ASCII frame kinds
//! - `decoder`: SBF header validation and CRC check
//! - `scanner`: Frame boundary search with forward-progress guarantees
//! - `reader`: Little-endian offset reader used by block decoders
//! - `blocks`: Typed block decoders
//! - `schema`: Data-driven block layouts
//! - `registry`: Block number to decoder mapping
//! - `record`: Decoded output records and the record emitter
//! - `parser`: Resumable parser owning its buffer
//! - `pipeline`: Single-owner parsing thread fed by a bounded channel
//! - `encoder`: SBF block construction
//! - `config`: Parser size limits
//! - `stats`: Running parse statistics
//! - `error`: Error type

#![warn(missing_docs)]

pub mod accumulator;
pub mod ascii;
pub mod blocks;
pub mod config;
pub mod constants;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod reader;
pub mod record;
pub mod registry;
pub mod scanner;
pub mod schema;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use config::ParserConfig;
pub use error::SbfError;
pub use parser::Parser;
pub use pipeline::{JsonLinesSink, ParserHandle, RecordSink};
pub use record::{DecodedRecord, RecordPayload};
pub use registry::BlockRegistry;
pub use stats::ParseStats;
pub use types::{BlockHeader, Frame, FrameKind, ParseOutcome};

/// Result type alias for sbfstream operations
pub type Result<T> = core::result::Result<T, SbfError>;
