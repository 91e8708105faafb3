//! Fixed byte vectors for SBF blocks and the ASCII side-channel
//!
//! The hex strings are receiver-layout blocks with their CRCs computed
//! independently of this crate.

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use sbfstream_core::{
    blocks::{RfBand, RfBandInfo, RfStatus},
    crc::block_crc,
    encoder::BlockBuilder,
    Parser, RecordPayload,
};
use serde_json::json;

/// RFStatus, TOW 345600000, WNc 2250, one band at 1575.42 MHz
const RF_STATUS: &str = "2440c6adfc0f1c0000709914ca0801088000006000e75dd007810000";

/// ReceiverTime, TOW 345000, WNc 2250, 2024-03-14 12:30:15, 18 leap seconds
const RECEIVER_TIME: &str = "2440e9341a171800a8430500ca0818030e0c1e0f12020000";

fn decode_one(bytes: &[u8]) -> serde_json::Value {
    let now = Utc.with_ymd_and_hms(2024, 3, 14, 12, 30, 15).unwrap();
    let records = Parser::default().ingest_at(bytes, now);
    assert_eq!(records.len(), 1);
    serde_json::to_value(&records[0]).unwrap()
}

#[test]
fn test_vector_crc() {
    for vector in [RF_STATUS, RECEIVER_TIME] {
        let block = hex::decode(vector).unwrap();
        let carried = u16::from_le_bytes([block[2], block[3]]);
        assert_eq!(block_crc(&block), carried);
    }
}

#[test]
fn test_vector_rf_status() {
    let block = hex::decode(RF_STATUS).unwrap();

    assert_eq!(
        decode_one(&block),
        json!({
            "dataType": "sbf",
            "timestamp": "2024-03-14T12:30:15Z",
            "sbf": {
                "blockID": 4092,
                "blockType": "rfStatus",
                "revision": 0,
                "block": {
                    "tow": 345600000u32,
                    "wnc": 2250,
                    "numberOfBands": 1,
                    "spoofingSuspected": true,
                    "rfBands": [{
                        "frequency": 1575420000u32,
                        "bandwidth": 2000,
                        "info": {
                            "suppressedByNotchFilter": true,
                            "interferenceCancelled": false,
                            "interferenceDetected": false,
                            "antennaID": 2
                        }
                    }]
                }
            }
        })
    );
}

#[test]
fn test_vector_rf_status_encoding() {
    let status = RfStatus {
        tow: 345_600_000,
        wnc: 2250,
        number_of_bands: 1,
        spoofing_suspected: true,
        rf_bands: vec![RfBand {
            frequency: 1_575_420_000,
            bandwidth: 2000,
            info: RfBandInfo::from_bits(0x81),
        }],
    };

    assert_eq!(hex::encode(status.encode().unwrap()), RF_STATUS);
}

#[test]
fn test_vector_receiver_time() {
    let block = hex::decode(RECEIVER_TIME).unwrap();
    let value = decode_one(&block);
    let fields = &value["sbf"]["block"];

    assert_eq!(value["sbf"]["blockType"], "receiverTime");
    assert_eq!(fields["utcYear"], 24);
    assert_eq!(fields["utcMonth"], 3);
    assert_eq!(fields["utcSec"], 15);

    let built = BlockBuilder::new(5914)
        .tow(345_000)
        .wnc(2250)
        .body(Bytes::from_static(&[24, 3, 14, 12, 30, 15, 18, 2]))
        .build()
        .unwrap();
    assert_eq!(hex::encode(built), RECEIVER_TIME);
}

#[test]
fn test_vector_single_bit_flips() {
    let block = hex::decode(RECEIVER_TIME).unwrap();

    // every bit outside sync, CRC and length fields
    for byte in (4..6).chain(8..block.len()) {
        for bit in 0..8 {
            let mut damaged = block.clone();
            damaged[byte] ^= 1 << bit;

            let mut parser = Parser::default();
            assert!(parser.ingest(&damaged).is_empty(), "bit {} of byte {}", bit, byte);
            assert_eq!(parser.stats().crc_failures, 1);
        }
    }
}

#[test]
fn test_vector_ascii_frames() {
    let cases: [(&[u8], RecordPayload); 4] = [
        (
            b"$R: lstConfigFile, Current\r\n  ...\r\nCOM1>",
            RecordPayload::AsciiCommandReply(": lstConfigFile, Current\r\n  ...".into()),
        ),
        (
            b"$TD\r\nSatellites: 12\r\n####>\r\n",
            RecordPayload::AsciiDisplay("Satellites: 12".into()),
        ),
        (b"$TE PPS\r\n", RecordPayload::Event(" PPS".into())),
        (
            b"$-- BLOCK 1 / 1\r\nFirmware 4.12.0\r\nUSB1>",
            RecordPayload::FormattedInfoBlock("Firmware 4.12.0".into()),
        ),
    ];

    for (bytes, expected) in cases {
        let records = Parser::default().ingest(bytes);
        assert_eq!(records.len(), 1, "{:?}", String::from_utf8_lossy(bytes));
        assert_eq!(records[0].payload, expected);
    }
}
