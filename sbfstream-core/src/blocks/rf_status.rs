//! RFStatus (block 4092): RF band monitoring and spoofing flag
//!
//! ```text
//! 0..8    header
//! 8..12   TOW       u32
//! 12..14  WNc       u16
//! 14      N         u8   number of RFBand sub-blocks
//! 15      SBLength  u8   stride of one sub-block
//! 16      Flags     u8   bit 7: spoofing suspected
//! 17..19  reserved
//! 19..    N x RFBand { Frequency u32, Bandwidth u16, Info u8, padding }
//! ```

use crate::blocks::SbfBlockBody;
use crate::constants::BLOCK_RF_STATUS;
use crate::encoder::BlockBuilder;
use crate::error::SbfError;
use crate::reader::BlockReader;
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

/// Offset of the first RFBand sub-block
const RF_BAND_OFFSET: usize = 19;

/// Bytes an RFBand sub-block needs for its own fields
const RF_BAND_MIN_LENGTH: u8 = 7;

const FLAG_SPOOFING: u8 = 1 << 7;

const INFO_NOTCH: u8 = 1 << 0;
const INFO_CANCELLED: u8 = 1 << 1;
const INFO_DETECTED: u8 = 1 << 2;
const INFO_ANTENNA_SHIFT: u8 = 6;

/// Decoded RFStatus block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfStatus {
    /// Time of week in milliseconds
    pub tow: u32,
    /// Continuous week number
    pub wnc: u16,
    /// Number of RF bands reported
    pub number_of_bands: u8,
    /// Flags bit 7
    pub spoofing_suspected: bool,
    /// One entry per monitored band
    pub rf_bands: Vec<RfBand>,
}

/// One RFBand sub-block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfBand {
    /// Center frequency in Hz
    pub frequency: u32,
    /// Bandwidth in kHz
    pub bandwidth: u16,
    /// Decoded `Info` bit field
    pub info: RfBandInfo,
}

/// `Info` bit field of an RFBand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfBandInfo {
    /// Bit 0
    pub suppressed_by_notch_filter: bool,
    /// Bit 1
    pub interference_cancelled: bool,
    /// Bit 2
    pub interference_detected: bool,
    /// Bits 6-7
    #[serde(rename = "antennaID")]
    pub antenna_id: u8,
}

impl RfBandInfo {
    /// Split the raw `Info` byte
    pub const fn from_bits(info: u8) -> Self {
        Self {
            suppressed_by_notch_filter: info & INFO_NOTCH != 0,
            interference_cancelled: info & INFO_CANCELLED != 0,
            interference_detected: info & INFO_DETECTED != 0,
            antenna_id: info >> INFO_ANTENNA_SHIFT,
        }
    }

    /// Pack back into the raw `Info` byte
    pub const fn to_bits(self) -> u8 {
        let mut info = (self.antenna_id & 0x03) << INFO_ANTENNA_SHIFT;
        if self.suppressed_by_notch_filter {
            info |= INFO_NOTCH;
        }
        if self.interference_cancelled {
            info |= INFO_CANCELLED;
        }
        if self.interference_detected {
            info |= INFO_DETECTED;
        }
        info
    }
}

impl RfStatus {
    /// Name published as `blockType`
    pub const BLOCK_TYPE: &'static str = "rfStatus";

    /// Decode a complete, CRC-checked block
    pub fn decode(block: &[u8]) -> Result<Self, SbfError> {
        let reader = BlockReader::new(block);
        let time = reader.time_header()?;

        let n = reader.u8_at(14)?;
        let sb_length = reader.u8_at(15)?;
        let flags = reader.u8_at(16)?;

        if n > 0 && sb_length < RF_BAND_MIN_LENGTH {
            return Err(SbfError::InvalidSubBlockLength(sb_length));
        }

        let rf_bands = (0..n as usize)
            .map(|i| {
                let offset = RF_BAND_OFFSET + i * sb_length as usize;
                // the sub-block stride must fit, not just its fields
                reader.bytes_at(offset, sb_length as usize)?;
                Ok(RfBand {
                    frequency: reader.u32_at(offset)?,
                    bandwidth: reader.u16_at(offset + 4)?,
                    info: RfBandInfo::from_bits(reader.u8_at(offset + 6)?),
                })
            })
            .collect::<Result<Vec<_>, SbfError>>()?;

        Ok(Self {
            tow: time.tow,
            wnc: time.wnc,
            number_of_bands: n,
            spoofing_suspected: flags & FLAG_SPOOFING != 0,
            rf_bands,
        })
    }

    /// Encode as a complete SBF block with an 8-byte sub-block stride
    pub fn encode(&self) -> Result<Bytes, SbfError> {
        const SB_LENGTH: u8 = 8;

        let mut body = BytesMut::with_capacity(5 + self.rf_bands.len() * SB_LENGTH as usize);
        body.put_u8(self.rf_bands.len() as u8);
        body.put_u8(SB_LENGTH);
        body.put_u8(if self.spoofing_suspected { FLAG_SPOOFING } else { 0 });
        body.put_bytes(0, 2);

        for band in &self.rf_bands {
            body.put_u32_le(band.frequency);
            body.put_u16_le(band.bandwidth);
            body.put_u8(band.info.to_bits());
            body.put_u8(0);
        }

        BlockBuilder::new(BLOCK_RF_STATUS)
            .tow(self.tow)
            .wnc(self.wnc)
            .body(body.freeze())
            .build()
    }
}

/// Registry entry point
pub fn decode(block: &[u8]) -> Result<SbfBlockBody, SbfError> {
    RfStatus::decode(block).map(SbfBlockBody::RfStatus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::validate_block;

    fn sample() -> RfStatus {
        RfStatus {
            tow: 345_600_000,
            wnc: 2250,
            number_of_bands: 2,
            spoofing_suspected: true,
            rf_bands: vec![
                RfBand {
                    frequency: 1_575_420_000,
                    bandwidth: 2000,
                    info: RfBandInfo::from_bits(0x81),
                },
                RfBand {
                    frequency: 1_227_600_000,
                    bandwidth: 500,
                    info: RfBandInfo::from_bits(0x06),
                },
            ],
        }
    }

    #[test]
    fn test_info_bits() {
        let info = RfBandInfo::from_bits(0x81);
        assert!(info.suppressed_by_notch_filter);
        assert!(!info.interference_cancelled);
        assert!(!info.interference_detected);
        assert_eq!(info.antenna_id, 2);
        assert_eq!(info.to_bits(), 0x81);
    }

    #[test]
    fn test_encode_then_decode() {
        let status = sample();
        let block = status.encode().unwrap();

        let header = validate_block(&block).unwrap();
        assert_eq!(header.block_number(), BLOCK_RF_STATUS);
        assert_eq!(RfStatus::decode(&block).unwrap(), status);
    }

    #[test]
    fn test_layout_offsets() {
        let block = sample().encode().unwrap();
        assert_eq!(block[14], 2);
        assert_eq!(block[15], 8);
        assert_eq!(block[16], 0x80);
        assert_eq!(&block[19..23], &1_575_420_000u32.to_le_bytes());
        assert_eq!(block[25], 0x81);
        assert_eq!(&block[27..31], &1_227_600_000u32.to_le_bytes());
    }

    #[test]
    fn test_json_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["numberOfBands"], 2);
        assert_eq!(value["spoofingSuspected"], true);
        assert_eq!(value["rfBands"][0]["frequency"], 1_575_420_000u32);
        assert_eq!(value["rfBands"][0]["info"]["suppressedByNotchFilter"], true);
        assert_eq!(value["rfBands"][0]["info"]["antennaID"], 2);
        assert_eq!(value["rfBands"][1]["info"]["interferenceDetected"], true);
    }

    #[test]
    fn test_truncated_bands_rejected() {
        let mut block = sample().encode().unwrap().to_vec();
        // claim more bands than the block holds
        block[14] = 9;
        assert!(matches!(
            RfStatus::decode(&block),
            Err(SbfError::FieldOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_short_stride_rejected() {
        let mut block = sample().encode().unwrap().to_vec();
        block[15] = 4;
        assert_eq!(
            RfStatus::decode(&block),
            Err(SbfError::InvalidSubBlockLength(4))
        );
    }

    #[test]
    fn test_no_bands() {
        let status = RfStatus {
            number_of_bands: 0,
            spoofing_suspected: false,
            rf_bands: Vec::new(),
            ..sample()
        };
        let block = status.encode().unwrap();
        assert_eq!(RfStatus::decode(&block).unwrap(), status);
    }
}
