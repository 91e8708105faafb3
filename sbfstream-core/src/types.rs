//! Core types for frames found in the receiver byte stream

use crate::constants::{
    BLOCK_NUMBER_MASK, CRC_OFFSET, ID_OFFSET, LENGTH_OFFSET, REVISION_SHIFT, SBF_HEADER_SIZE,
    SBF_SYNC,
};
use crate::error::SbfError;
use crate::prompt::Prompt;
use bytes::Bytes;
use core::ops::Range;
use serde::{Deserialize, Serialize};

/// SBF block header (first 8 bytes of every block)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Sync marker, always `$@`
    pub sync: [u8; 2],

    /// CRC over bytes `[4, length)`
    pub crc: u16,

    /// Raw ID field: bits 0-12 block number, bits 13-15 revision
    pub id: u16,

    /// Total block length in bytes, header included
    pub length: u16,
}

impl BlockHeader {
    /// Create a header for the given block number and revision
    pub fn new(block_number: u16, revision: u8, length: u16) -> Self {
        Self {
            sync: *SBF_SYNC,
            crc: 0,
            id: (block_number & BLOCK_NUMBER_MASK) | ((revision as u16) << REVISION_SHIFT),
            length,
        }
    }

    /// Parse a header from the first 8 bytes of `data`
    ///
    /// Only the layout is checked here; length and CRC validation belong
    /// to [`crate::decoder::parse_block`].
    pub fn parse(data: &[u8]) -> Result<Self, SbfError> {
        if data.len() < SBF_HEADER_SIZE {
            return Err(SbfError::IncompleteBlock {
                expected: SBF_HEADER_SIZE,
                actual: data.len(),
            });
        }

        Ok(Self {
            sync: [data[0], data[1]],
            crc: u16::from_le_bytes([data[CRC_OFFSET], data[CRC_OFFSET + 1]]),
            id: u16::from_le_bytes([data[ID_OFFSET], data[ID_OFFSET + 1]]),
            length: u16::from_le_bytes([data[LENGTH_OFFSET], data[LENGTH_OFFSET + 1]]),
        })
    }

    /// Block number (low 13 bits of the ID)
    pub const fn block_number(&self) -> u16 {
        self.id & BLOCK_NUMBER_MASK
    }

    /// Block revision (high 3 bits of the ID)
    pub const fn revision(&self) -> u8 {
        (self.id >> REVISION_SHIFT) as u8
    }

    /// Serialize back to wire layout
    pub fn to_bytes(&self) -> [u8; SBF_HEADER_SIZE] {
        let mut out = [0u8; SBF_HEADER_SIZE];
        out[0..2].copy_from_slice(&self.sync);
        out[CRC_OFFSET..CRC_OFFSET + 2].copy_from_slice(&self.crc.to_le_bytes());
        out[ID_OFFSET..ID_OFFSET + 2].copy_from_slice(&self.id.to_le_bytes());
        out[LENGTH_OFFSET..LENGTH_OFFSET + 2].copy_from_slice(&self.length.to_le_bytes());
        out
    }
}

/// What a classifier recognized at the front of the buffer
#[derive(Debug, Clone, PartialEq)]
pub enum FrameKind {
    /// Receiver prompt; `prompt` is `None` when the window matched no pattern
    CommandPrompt {
        /// Recognized prompt, if any
        prompt: Option<Prompt>,
    },

    /// Reply to a command (`$R`), terminated by a prompt
    AsciiCommandReply {
        /// Prompt that terminated the reply
        prompt: Prompt,
    },

    /// ASCII display dump (`$TD`)
    AsciiDisplay,

    /// Timed event line (`$TE`)
    Event,

    /// Formatted information block (`$-- BLOCK i / n`)
    FormattedInfoBlock {
        /// Index of this block within the series
        index: u32,
        /// Number of blocks in the series
        count: u32,
        /// Prompt that terminated the block
        prompt: Prompt,
    },

    /// CRC-valid SBF block
    SbfBlock(BlockHeader),
}

impl FrameKind {
    /// Name used as `dataType` in published records; prompts are never published
    pub const fn data_type(&self) -> Option<&'static str> {
        match self {
            FrameKind::CommandPrompt { .. } => None,
            FrameKind::AsciiCommandReply { .. } => Some("asciiCommandReply"),
            FrameKind::AsciiDisplay => Some("asciiDisplay"),
            FrameKind::Event => Some("event"),
            FrameKind::FormattedInfoBlock { .. } => Some("formattedInfoBlock"),
            FrameKind::SbfBlock(_) => Some("sbf"),
        }
    }

    /// Short label for logs and listings
    pub const fn label(&self) -> &'static str {
        match self {
            FrameKind::CommandPrompt { .. } => "prompt",
            FrameKind::AsciiCommandReply { .. } => "reply",
            FrameKind::AsciiDisplay => "display",
            FrameKind::Event => "event",
            FrameKind::FormattedInfoBlock { .. } => "info-block",
            FrameKind::SbfBlock(_) => "sbf",
        }
    }
}

/// One self-delimited unit removed from the stream
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Absolute stream offset of the first frame byte
    pub offset: u64,

    /// What the frame is
    pub kind: FrameKind,

    /// Every byte the frame consumed, delimiters included
    pub raw: Bytes,

    /// Text between prefix and terminator; the whole block for SBF
    pub payload: Bytes,
}

impl Frame {
    /// Build a frame from the consumed bytes and the payload range within them
    pub fn new(offset: u64, kind: FrameKind, raw: Bytes, body: Range<usize>) -> Self {
        let payload = raw.slice(body);
        Self {
            offset,
            kind,
            raw,
            payload,
        }
    }

    /// Number of bytes the frame consumed
    pub fn size(&self) -> usize {
        self.raw.len()
    }

    /// Payload as text, invalid UTF-8 replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    /// A command reply starting with `$R?` reports a rejected command
    pub fn is_error_reply(&self) -> bool {
        matches!(self.kind, FrameKind::AsciiCommandReply { .. }) && self.raw.get(2) == Some(&b'?')
    }
}

/// Result of classifying the bytes at the front of the buffer
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A complete frame of `size` bytes; `body` locates its payload
    Consumed {
        /// Bytes to remove from the buffer
        size: usize,
        /// Payload range relative to the frame start
        body: Range<usize>,
        /// What was recognized
        kind: FrameKind,
    },

    /// Frame may still complete; stop this pass without dropping anything
    NeedMoreData,

    /// Frame rejected; drop `skip` bytes and keep scanning
    Invalid {
        /// Why the frame was rejected
        reason: SbfError,
        /// Bytes to drop, always at least one
        skip: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_parse() {
        let raw = [b'$', b'@', 0x34, 0x12, 0xFC, 0x2F, 0x1C, 0x00];
        let header = BlockHeader::parse(&raw).unwrap();

        assert_eq!(header.sync, *b"$@");
        assert_eq!(header.crc, 0x1234);
        assert_eq!(header.length, 28);
        // 0x2FFC: revision 1, block number 4092
        assert_eq!(header.block_number(), 4092);
        assert_eq!(header.revision(), 1);
        assert_eq!(header.to_bytes(), raw);
    }

    #[test]
    fn test_header_too_short() {
        let result = BlockHeader::parse(b"$@\x00");
        assert!(matches!(result, Err(SbfError::IncompleteBlock { .. })));
    }

    #[test]
    fn test_error_reply_flag() {
        let raw = Bytes::from_static(b"$R? foo: Invalid command!\r\nCOM1>");
        let frame = Frame::new(
            0,
            FrameKind::AsciiCommandReply {
                prompt: Prompt::Com(1),
            },
            raw,
            2..25,
        );
        assert!(frame.is_error_reply());
        assert_eq!(frame.text(), "? foo: Invalid command!");
    }
}
