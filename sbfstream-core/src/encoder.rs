//! SBF block encoding
//!
//! Used by tests, benches and the fuzz harness to produce blocks exactly as
//! a receiver would: header, TOW/WNc time header, body, zero padding up to
//! a multiple of four, CRC filled in last.

use crate::constants::{
    BLOCK_LENGTH_ALIGNMENT, CRC_OFFSET, ID_OFFSET, SBF_TIME_HEADER_END, U16_NOT_VALID,
    U32_NOT_VALID,
};
use crate::crc::block_crc;
use crate::error::SbfError;
use crate::types::BlockHeader;
use bytes::{BufMut, Bytes, BytesMut};

/// Largest block length that is a multiple of four and fits the length field
pub const MAX_BLOCK_LENGTH: usize = u16::MAX as usize - (u16::MAX as usize % BLOCK_LENGTH_ALIGNMENT);

/// Encode a complete block
///
/// Layout:
/// 1. Sync `$@` (2 bytes)
/// 2. CRC (2 bytes, little-endian)
/// 3. ID (2 bytes: block number + revision << 13)
/// 4. Length (2 bytes)
/// 5. TOW (4 bytes, ms) and WNc (2 bytes)
/// 6. Body, then zero padding
pub fn encode_block(
    block_number: u16,
    revision: u8,
    tow: u32,
    wnc: u16,
    body: &[u8],
) -> Result<Bytes, SbfError> {
    let unpadded = SBF_TIME_HEADER_END + body.len();
    let length = unpadded.div_ceil(BLOCK_LENGTH_ALIGNMENT) * BLOCK_LENGTH_ALIGNMENT;
    if length > MAX_BLOCK_LENGTH {
        return Err(SbfError::BlockTooLarge(length));
    }

    let header = BlockHeader::new(block_number, revision, length as u16);

    let mut buf = BytesMut::with_capacity(length);
    buf.put_slice(&header.to_bytes());
    buf.put_u32_le(tow);
    buf.put_u16_le(wnc);
    buf.put_slice(body);
    buf.put_bytes(0, length - unpadded);

    let crc = block_crc(&buf);
    buf[CRC_OFFSET..ID_OFFSET].copy_from_slice(&crc.to_le_bytes());

    Ok(buf.freeze())
}

/// Builder for constructing SBF blocks
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    block_number: u16,
    revision: u8,
    tow: u32,
    wnc: u16,
    body: Bytes,
}

impl BlockBuilder {
    /// Start a block with the given number; time fields default to do-not-use
    pub fn new(block_number: u16) -> Self {
        Self {
            block_number,
            revision: 0,
            tow: U32_NOT_VALID,
            wnc: U16_NOT_VALID,
            body: Bytes::new(),
        }
    }

    /// Set the block revision (0-7)
    pub fn revision(mut self, revision: u8) -> Self {
        self.revision = revision & 0x07;
        self
    }

    /// Set the time of week in milliseconds
    pub fn tow(mut self, tow: u32) -> Self {
        self.tow = tow;
        self
    }

    /// Set the continuous week number
    pub fn wnc(mut self, wnc: u16) -> Self {
        self.wnc = wnc;
        self
    }

    /// Set the bytes following the time header
    pub fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    /// Build and encode the block
    pub fn build(self) -> Result<Bytes, SbfError> {
        encode_block(
            self.block_number,
            self.revision,
            self.tow,
            self.wnc,
            &self.body,
        )
    }
}
