//! Running parse statistics

use crate::types::FrameKind;
use serde::Serialize;

/// Counters kept by the parser across passes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseStats {
    /// Total bytes handed to the parser
    pub bytes_ingested: u64,

    /// Bytes dropped as noise or as part of rejected frames
    pub bytes_discarded: u64,

    /// Bytes that belonged to recognized frames
    pub bytes_framed: u64,

    /// Prompts removed from the stream
    pub prompts: u64,

    /// Command replies recognized
    pub command_replies: u64,

    /// Display dumps recognized
    pub displays: u64,

    /// Event lines recognized
    pub events: u64,

    /// Formatted information blocks recognized
    pub info_blocks: u64,

    /// CRC-valid SBF blocks recognized
    pub sbf_blocks: u64,

    /// SBF blocks dropped on CRC mismatch
    pub crc_failures: u64,

    /// Frames rejected for any other reason
    pub invalid_frames: u64,

    /// SBF blocks with no registered decoder
    pub unsupported_blocks: u64,

    /// SBF blocks whose decoder returned an error
    pub decode_failures: u64,

    /// Records handed to the sink
    pub records_emitted: u64,

    /// Records the sink failed to publish
    pub publish_failures: u64,
}

impl ParseStats {
    /// Count one recognized frame
    pub fn record_frame(&mut self, kind: &FrameKind, size: usize) {
        self.bytes_framed += size as u64;
        match kind {
            FrameKind::CommandPrompt { .. } => self.prompts += 1,
            FrameKind::AsciiCommandReply { .. } => self.command_replies += 1,
            FrameKind::AsciiDisplay => self.displays += 1,
            FrameKind::Event => self.events += 1,
            FrameKind::FormattedInfoBlock { .. } => self.info_blocks += 1,
            FrameKind::SbfBlock(_) => self.sbf_blocks += 1,
        }
    }

    /// Total frames recognized, prompts included
    pub fn frames_found(&self) -> u64 {
        self.prompts
            + self.command_replies
            + self.displays
            + self.events
            + self.info_blocks
            + self.sbf_blocks
    }

    /// Share of ingested bytes that belonged to frames, as a percentage
    pub fn recovery_rate(&self) -> f64 {
        if self.bytes_ingested == 0 {
            0.0
        } else {
            (self.bytes_framed as f64 / self.bytes_ingested as f64) * 100.0
        }
    }
}
