//! SBF block framing: header, length and CRC validation

use crate::constants::{
    BLOCK_LENGTH_ALIGNMENT, ID_OFFSET, INVALID_FRAME_SKIP, MIN_BLOCK_LENGTH, SBF_SYNC,
};
use crate::crc::compute_crc;
use crate::error::SbfError;
use crate::types::{BlockHeader, FrameKind, ParseOutcome};

/// Validate a block at the start of `data` (strict mode)
///
/// Checks, in order:
/// - sync marker and header presence
/// - length field (at least 8, multiple of 4)
/// - that the whole block is present
/// - CRC over bytes `[4, length)`
///
/// Trailing bytes after the block are ignored.
pub fn validate_block(data: &[u8]) -> Result<BlockHeader, SbfError> {
    let header = BlockHeader::parse(data)?;

    if &header.sync != SBF_SYNC {
        return Err(SbfError::BadSync(header.sync));
    }

    let length = header.length as usize;
    if header.length < MIN_BLOCK_LENGTH || length % BLOCK_LENGTH_ALIGNMENT != 0 {
        return Err(SbfError::InvalidLength(header.length));
    }

    if length > data.len() {
        return Err(SbfError::IncompleteBlock {
            expected: length,
            actual: data.len(),
        });
    }

    let actual = compute_crc(&data[ID_OFFSET..length]);
    if actual != header.crc {
        return Err(SbfError::ChecksumMismatch {
            expected: header.crc,
            actual,
        });
    }

    Ok(header)
}

/// Classify an SBF block at the start of `data` for the scanner
///
/// Any rejected block skips just the sync marker. The length field is
/// covered by the CRC, so after a mismatch it cannot be trusted to say
/// where the next frame starts.
pub fn parse_block(data: &[u8]) -> ParseOutcome {
    match validate_block(data) {
        Ok(header) => {
            let size = header.length as usize;
            ParseOutcome::Consumed {
                size,
                body: 0..size,
                kind: FrameKind::SbfBlock(header),
            }
        }
        Err(SbfError::IncompleteBlock { .. }) => ParseOutcome::NeedMoreData,
        Err(reason) => ParseOutcome::Invalid {
            reason,
            skip: INVALID_FRAME_SKIP,
        },
    }
}
