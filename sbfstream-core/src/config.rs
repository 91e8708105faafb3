//! Parser configuration

use crate::constants::{
    DEFAULT_CHANNEL_CAPACITY, INFO_BLOCK_HEADER_LIMIT, MAX_COMMAND_REPLY_SIZE, MAX_DISPLAY_SIZE,
    MAX_EVENT_SIZE, MAX_INFO_BLOCK_SIZE,
};
use crate::error::SbfError;
use serde::{Deserialize, Serialize};

/// Size limits for the ASCII classifiers and pipeline sizing
///
/// Every field has a default, so a partial JSON object is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserConfig {
    /// Maximum size of a `$R` command reply
    pub max_command_reply_size: usize,

    /// Maximum size of a `$TD` display dump
    pub max_display_size: usize,

    /// Maximum size of a `$TE` event line
    pub max_event_size: usize,

    /// Maximum size of a `$--` formatted information block
    pub max_info_block_size: usize,

    /// Bytes within which the `$-- BLOCK i / n` line must end
    pub info_block_header_limit: usize,

    /// Chunks queued for the parser thread before the reader blocks
    pub channel_capacity: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_command_reply_size: MAX_COMMAND_REPLY_SIZE,
            max_display_size: MAX_DISPLAY_SIZE,
            max_event_size: MAX_EVENT_SIZE,
            max_info_block_size: MAX_INFO_BLOCK_SIZE,
            info_block_header_limit: INFO_BLOCK_HEADER_LIMIT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ParserConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SbfError> {
        let sizes = [
            ("maxCommandReplySize", self.max_command_reply_size),
            ("maxDisplaySize", self.max_display_size),
            ("maxEventSize", self.max_event_size),
            ("maxInfoBlockSize", self.max_info_block_size),
            ("infoBlockHeaderLimit", self.info_block_header_limit),
            ("channelCapacity", self.channel_capacity),
        ];

        for (name, value) in sizes {
            if value == 0 {
                return Err(SbfError::Config(format!("{} must be greater than 0", name)));
            }
        }

        if self.info_block_header_limit > self.max_info_block_size {
            return Err(SbfError::Config(format!(
                "infoBlockHeaderLimit {} exceeds maxInfoBlockSize {}",
                self.info_block_header_limit, self.max_info_block_size
            )));
        }

        Ok(())
    }
}
