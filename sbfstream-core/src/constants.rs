//! Constants and limits for the receiver byte stream

/// SBF sync marker, first two bytes of every block
pub const SBF_SYNC: &[u8; 2] = b"$@";

/// Size of the SBF block header (sync + CRC + ID + length)
pub const SBF_HEADER_SIZE: usize = 8;

/// Size of the header plus the TOW/WNc time header that follows it
pub const SBF_TIME_HEADER_END: usize = 14;

/// Smallest legal value of the header length field
pub const MIN_BLOCK_LENGTH: u16 = 8;

/// Block lengths are always a multiple of this
pub const BLOCK_LENGTH_ALIGNMENT: usize = 4;

/// Offset of the CRC field within the header
pub const CRC_OFFSET: usize = 2;

/// Offset of the ID field within the header; CRC coverage starts here
pub const ID_OFFSET: usize = 4;

/// Offset of the length field within the header
pub const LENGTH_OFFSET: usize = 6;

/// Low 13 bits of the ID field hold the block number
pub const BLOCK_NUMBER_MASK: u16 = 0x1FFF;

/// Shift to extract the revision from the ID field
pub const REVISION_SHIFT: u16 = 13;

/// Start of every framed message other than a prompt
pub const FRAME_START: u8 = b'$';

/// Last byte of every receiver prompt
pub const PROMPT_END: u8 = b'>';

/// Length of a receiver prompt, e.g. `COM1>`
pub const PROMPT_LENGTH: usize = 5;

/// Line terminator used throughout the ASCII side-channel
pub const CRLF: &[u8; 2] = b"\r\n";

/// Terminator of an ASCII display frame
pub const DISPLAY_TERMINATOR: &[u8; 9] = b"\r\n####>\r\n";

/// Prefix of an ASCII display frame
pub const DISPLAY_PREFIX: &[u8; 3] = b"$TD";

/// Prefix of an event frame
pub const EVENT_PREFIX: &[u8; 3] = b"$TE";

/// Prefix of a command reply
pub const COMMAND_REPLY_PREFIX: &[u8; 2] = b"$R";

/// Prefix of a formatted information block, followed by ` BLOCK i / n`
pub const INFO_BLOCK_PREFIX: &[u8; 3] = b"$--";

/// Maximum size of an ASCII command reply
pub const MAX_COMMAND_REPLY_SIZE: usize = 4096;

/// Maximum size of an ASCII display frame
pub const MAX_DISPLAY_SIZE: usize = 16384;

/// Maximum size of an event frame
pub const MAX_EVENT_SIZE: usize = 256;

/// Maximum size of a formatted information block
pub const MAX_INFO_BLOCK_SIZE: usize = 4096;

/// Maximum length of the `$-- BLOCK i / n` header line
pub const INFO_BLOCK_HEADER_LIMIT: usize = 30;

/// Bytes skipped when an ASCII frame or SBF length is rejected (`$` + type byte)
pub const INVALID_FRAME_SKIP: usize = 2;

/// Bytes skipped when the byte after `$` names no known frame type
pub const UNKNOWN_TYPE_SKIP: usize = 1;

/// Default capacity of the chunk channel feeding the parser thread
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Block number of RFStatus
pub const BLOCK_RF_STATUS: u16 = 4092;

/// Block number of ReceiverTime
pub const BLOCK_RECEIVER_TIME: u16 = 5914;

/// Block number of EndOfPVT
pub const BLOCK_END_OF_PVT: u16 = 5921;

/// Block number of DOP (second generation)
pub const BLOCK_DOP: u16 = 4001;

/// Block number of PowerStatus
pub const BLOCK_POWER_STATUS: u16 = 4101;

/// Block number of PVTGeodetic (second generation)
pub const BLOCK_PVT_GEODETIC: u16 = 4007;

/// Do-not-use value of a signed 8-bit field
pub const I8_NOT_VALID: i8 = i8::MIN;
/// Do-not-use value of an unsigned 8-bit field
pub const U8_NOT_VALID: u8 = u8::MAX;
/// Do-not-use value of a signed 16-bit field
pub const I16_NOT_VALID: i16 = i16::MIN;
/// Do-not-use value of an unsigned 16-bit field
pub const U16_NOT_VALID: u16 = u16::MAX;
/// Do-not-use value of a signed 32-bit field
pub const I32_NOT_VALID: i32 = i32::MIN;
/// Do-not-use value of an unsigned 32-bit field
pub const U32_NOT_VALID: u32 = u32::MAX;
/// Do-not-use value of floating point fields
pub const F_NOT_VALID: f64 = -2e10;
