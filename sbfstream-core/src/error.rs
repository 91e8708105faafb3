//! Error types for sbfstream operations

/// Errors that can occur while scanning, decoding or publishing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SbfError {
    /// Incomplete block - not enough data
    #[error("Incomplete block: expected {expected} bytes, got {actual}")]
    IncompleteBlock {
        /// The number of bytes expected.
        expected: usize,
        /// The number of bytes actually available.
        actual: usize,
    },

    /// Block does not start with `$@`
    #[error("Invalid SBF sync: expected $@, got {0:?}")]
    BadSync([u8; 2]),

    /// Header length field outside the legal range or misaligned
    #[error("Invalid SBF block length: {0}")]
    InvalidLength(u16),

    /// CRC mismatch
    #[error("CRC mismatch: expected {expected:#06x}, got {actual:#06x}")]
    ChecksumMismatch {
        /// The CRC carried in the header.
        expected: u16,
        /// The CRC computed over the block.
        actual: u16,
    },

    /// No decoder registered for the block number
    #[error("Unsupported SBF block number: {0}")]
    UnsupportedBlock(u16),

    /// A field read past the end of the block
    #[error("Field at offset {offset} ({width} bytes) exceeds block of {len} bytes")]
    FieldOutOfBounds {
        /// Byte offset of the field.
        offset: usize,
        /// Width of the field in bytes.
        width: usize,
        /// Length of the block.
        len: usize,
    },

    /// Sub-block stride too small for its fields
    #[error("Sub-block length {0} is too small")]
    InvalidSubBlockLength(u8),

    /// Terminator not found within the size limit of the frame kind
    #[error("{kind} frame exceeds maximum size {max} without terminator")]
    FrameTooLarge {
        /// Kind of frame being classified.
        kind: &'static str,
        /// Configured maximum size.
        max: usize,
    },

    /// First line of a formatted information block is not `$-- BLOCK i / n`
    #[error("Malformed formatted information block header")]
    MalformedInfoBlockHeader,

    /// Byte following `$` names no known frame type
    #[error("Unknown frame type byte {0:#04x}")]
    UnknownFrameType(u8),

    /// Encoded block would not fit the 16-bit length field
    #[error("Block size {0} exceeds maximum 65532")]
    BlockTooLarge(usize),

    /// Sink refused a record
    #[error("Publish error: {0}")]
    Publish(String),

    /// IO error during read/write
    #[error("IO error: {0}")]
    Io(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Parser thread is no longer accepting chunks
    #[error("Parser channel closed")]
    ChannelClosed,

    /// Parser thread panicked
    #[error("Parser worker panicked")]
    WorkerPanicked,
}

impl From<std::io::Error> for SbfError {
    fn from(err: std::io::Error) -> Self {
        SbfError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SbfError {
    fn from(err: serde_json::Error) -> Self {
        SbfError::Publish(err.to_string())
    }
}
