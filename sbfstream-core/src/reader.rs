//! Little-endian offset reader over a complete SBF block
//!
//! Block layouts pack fields of mixed width with no alignment guarantee,
//! so every read names its byte offset explicitly and is bounds-checked
//! against the block.

use crate::constants::{SBF_HEADER_SIZE, SBF_TIME_HEADER_END};
use crate::error::SbfError;

/// Bounds-checked field reads at explicit byte offsets
#[derive(Debug, Clone, Copy)]
pub struct BlockReader<'a> {
    block: &'a [u8],
}

macro_rules! read_le {
    ($(#[$doc:meta] $name:ident => $ty:ty),* $(,)?) => {
        $(
            #[$doc]
            pub fn $name(&self, offset: usize) -> Result<$ty, SbfError> {
                const WIDTH: usize = core::mem::size_of::<$ty>();
                let bytes = self.bytes_at(offset, WIDTH)?;
                let mut raw = [0u8; WIDTH];
                raw.copy_from_slice(bytes);
                Ok(<$ty>::from_le_bytes(raw))
            }
        )*
    };
}

impl<'a> BlockReader<'a> {
    /// Wrap a complete block, header included
    pub fn new(block: &'a [u8]) -> Self {
        Self { block }
    }

    /// Length of the underlying block
    pub fn len(&self) -> usize {
        self.block.len()
    }

    /// True for an empty slice
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// True when `width` bytes at `offset` lie inside the block
    pub fn has(&self, offset: usize, width: usize) -> bool {
        offset
            .checked_add(width)
            .map_or(false, |end| end <= self.block.len())
    }

    /// Borrow `width` bytes at `offset`
    pub fn bytes_at(&self, offset: usize, width: usize) -> Result<&'a [u8], SbfError> {
        if !self.has(offset, width) {
            return Err(SbfError::FieldOutOfBounds {
                offset,
                width,
                len: self.block.len(),
            });
        }
        Ok(&self.block[offset..offset + width])
    }

    read_le! {
        /// Read a `u8`
        u8_at => u8,
        /// Read an `i8`
        i8_at => i8,
        /// Read a little-endian `u16`
        u16_at => u16,
        /// Read a little-endian `i16`
        i16_at => i16,
        /// Read a little-endian `u32`
        u32_at => u32,
        /// Read a little-endian `i32`
        i32_at => i32,
        /// Read a little-endian `u64`
        u64_at => u64,
        /// Read a little-endian `f32`
        f32_at => f32,
        /// Read a little-endian `f64`
        f64_at => f64,
    }

    /// Read the TOW/WNc time header that follows the block header
    pub fn time_header(&self) -> Result<TimeHeader, SbfError> {
        if !self.has(0, SBF_TIME_HEADER_END) {
            return Err(SbfError::FieldOutOfBounds {
                offset: SBF_HEADER_SIZE,
                width: SBF_TIME_HEADER_END - SBF_HEADER_SIZE,
                len: self.block.len(),
            });
        }

        Ok(TimeHeader {
            tow: self.u32_at(SBF_HEADER_SIZE)?,
            wnc: self.u16_at(SBF_HEADER_SIZE + 4)?,
        })
    }
}

/// Time stamp carried by every block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeHeader {
    /// Time of week in milliseconds
    pub tow: u32,
    /// Continuous week number
    pub wnc: u16,
}
