//! CRC-16 used by SBF blocks
//!
//! CCITT polynomial 0x1021, initial value 0, no reflection and no final
//! XOR (the XMODEM parameter set). The CRC covers everything after the CRC
//! field itself: bytes `[4, length)` of a block.

use crate::constants::{CRC_OFFSET, ID_OFFSET};
use ::crc::{Crc, CRC_16_XMODEM};

/// CRC engine for SBF blocks
pub const SBF_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Compute the CRC of `data`
pub fn compute_crc(data: &[u8]) -> u16 {
    SBF_CRC.checksum(data)
}

/// Compute the CRC of a complete block (header included)
///
/// `block` must be at least [`ID_OFFSET`] bytes long.
pub fn block_crc(block: &[u8]) -> u16 {
    compute_crc(&block[ID_OFFSET..])
}

/// Check the CRC stored in a complete block
pub fn verify_block(block: &[u8]) -> bool {
    block.len() >= ID_OFFSET
        && block_crc(block) == u16::from_le_bytes([block[CRC_OFFSET], block[CRC_OFFSET + 1]])
}
