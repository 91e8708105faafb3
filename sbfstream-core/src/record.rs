//! Decoded output records
//!
//! Every record serializes to
//! `{"dataType": <kind>, "timestamp": <RFC3339 UTC>, <kind>: <payload>}`.
//! ASCII payloads are the frame text; SBF payloads carry the block number,
//! its type name, revision and decoded fields.

use crate::blocks::SbfBlockBody;
use crate::error::SbfError;
use crate::registry::BlockRegistry;
use crate::types::{Frame, FrameKind};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

#[cfg(feature = "logging")]
use tracing::debug;

/// Payload of an `sbf` record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SbfPayload {
    /// Block number (ID masked to 13 bits)
    #[serde(rename = "blockID")]
    pub block_id: u16,
    /// Decoder name, e.g. `rfStatus`
    pub block_type: &'static str,
    /// Block revision (ID bits 13-15)
    pub revision: u8,
    /// Decoded fields
    pub block: SbfBlockBody,
}

/// Typed payload, one variant per published frame kind
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPayload {
    /// Decoded SBF block
    Sbf(SbfPayload),
    /// Text of a `$R` reply
    AsciiCommandReply(String),
    /// Text of a `$TD` display dump
    AsciiDisplay(String),
    /// Text of a `$TE` event
    Event(String),
    /// Body of a `$--` information block
    FormattedInfoBlock(String),
}

impl RecordPayload {
    /// Value of the `dataType` key, also the key holding the payload
    pub const fn data_type(&self) -> &'static str {
        match self {
            RecordPayload::Sbf(_) => "sbf",
            RecordPayload::AsciiCommandReply(_) => "asciiCommandReply",
            RecordPayload::AsciiDisplay(_) => "asciiDisplay",
            RecordPayload::Event(_) => "event",
            RecordPayload::FormattedInfoBlock(_) => "formattedInfoBlock",
        }
    }
}

/// One record handed to the publish sink
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// When the frame was recognized
    pub timestamp: DateTime<Utc>,
    /// What was recognized
    pub payload: RecordPayload,
}

impl DecodedRecord {
    /// Create a record
    pub fn new(timestamp: DateTime<Utc>, payload: RecordPayload) -> Self {
        Self { timestamp, payload }
    }

    /// Value of the `dataType` key
    pub fn data_type(&self) -> &'static str {
        self.payload.data_type()
    }

    /// Serialize to a single JSON line (no trailing newline)
    pub fn to_json(&self) -> Result<String, SbfError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for DecodedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data_type = self.data_type();

        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("dataType", data_type)?;
        map.serialize_entry(
            "timestamp",
            &self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        )?;
        match &self.payload {
            RecordPayload::Sbf(sbf) => map.serialize_entry(data_type, sbf)?,
            RecordPayload::AsciiCommandReply(text)
            | RecordPayload::AsciiDisplay(text)
            | RecordPayload::Event(text)
            | RecordPayload::FormattedInfoBlock(text) => map.serialize_entry(data_type, text)?,
        }
        map.end()
    }
}

/// Turns recognized frames into records
#[derive(Debug, Clone, Default)]
pub struct RecordEmitter {
    registry: BlockRegistry,
}

impl RecordEmitter {
    /// Create an emitter over the given registry
    pub fn new(registry: BlockRegistry) -> Self {
        Self { registry }
    }

    /// Block decoders in use
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// Mutable access, for registering decoders
    pub fn registry_mut(&mut self) -> &mut BlockRegistry {
        &mut self.registry
    }

    /// Build the record for `frame`
    ///
    /// Prompts yield `Ok(None)`. An SBF block without a decoder yields
    /// [`SbfError::UnsupportedBlock`]; the frame is still consumed.
    pub fn emit(
        &self,
        frame: &Frame,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<DecodedRecord>, SbfError> {
        let payload = match &frame.kind {
            FrameKind::CommandPrompt { prompt } => {
                #[cfg(feature = "logging")]
                match prompt {
                    Some(prompt) => debug!("Prompt {} at offset {}", prompt, frame.offset),
                    None => debug!(
                        "Unrecognized prompt {:?} at offset {}",
                        String::from_utf8_lossy(&frame.raw),
                        frame.offset
                    ),
                }
                #[cfg(not(feature = "logging"))]
                let _ = prompt;

                return Ok(None);
            }
            FrameKind::AsciiCommandReply { .. } => RecordPayload::AsciiCommandReply(frame.text()),
            FrameKind::AsciiDisplay => RecordPayload::AsciiDisplay(frame.text()),
            FrameKind::Event => RecordPayload::Event(frame.text()),
            FrameKind::FormattedInfoBlock { .. } => {
                RecordPayload::FormattedInfoBlock(frame.text())
            }
            FrameKind::SbfBlock(header) => {
                RecordPayload::Sbf(self.registry.decode(header, &frame.payload)?)
            }
        };

        Ok(Some(DecodedRecord::new(timestamp, payload)))
    }
}
