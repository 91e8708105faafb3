use std::fs;
use tempfile::tempdir;

use bytes::Bytes;
use sbfstream_cli::commands::decode;
use sbfstream_core::encoder::BlockBuilder;
use sbfstream_core::{DecodedRecord, Parser, RecordSink, SbfError};

/// Helper: a capture with one frame of each published kind plus a prompt
fn create_capture(num_epochs: u32) -> Vec<u8> {
    let mut data = b"COM1>".to_vec();

    for i in 0..num_epochs {
        let block = BlockBuilder::new(5914)
            .tow(i * 1000)
            .wnc(2250)
            .body(Bytes::from_static(&[24, 3, 14, 12, 30, 15, 18, 2]))
            .build()
            .unwrap();
        data.extend_from_slice(&block);
    }

    data.extend_from_slice(b"$R: getReceiverInterface\r\n  ReceiverInterface, 1\r\nCOM1>");
    data.extend_from_slice(b"$TE marker\r\n");
    data
}

/// Helper: a capture where the first block fails its CRC
fn create_damaged_capture() -> Vec<u8> {
    let mut data = create_capture(3);
    // byte inside the first block body
    data[5 + 16] ^= 0xFF;
    data
}

#[test]
fn test_decode_to_file() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("capture.sbf");
    let output_path = td.path().join("records.jsonl");

    fs::write(&input_path, create_capture(4)).unwrap();

    let stats = decode::execute(
        input_path.to_str().unwrap(),
        Some(output_path.to_str().unwrap()),
        4096,
        false,
        false,
    )
    .unwrap();

    assert_eq!(stats.sbf_blocks, 4);
    assert_eq!(stats.records_emitted, 6);

    let text = fs::read_to_string(&output_path).unwrap();
    let records: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(records.len(), 6);
    assert_eq!(records[0]["dataType"], "sbf");
    assert_eq!(records[0]["sbf"]["blockType"], "receiverTime");
    assert_eq!(records[0]["sbf"]["block"]["utcYear"], 24);
    assert_eq!(records[4]["dataType"], "asciiCommandReply");
    assert_eq!(records[5]["event"], " marker");
}

#[test]
fn test_decode_small_chunks_match() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("capture.sbf");
    let whole_path = td.path().join("whole.jsonl");
    let chunked_path = td.path().join("chunked.jsonl");

    fs::write(&input_path, create_capture(3)).unwrap();
    let input = input_path.to_str().unwrap();

    decode::execute(input, Some(whole_path.to_str().unwrap()), 4096, false, false).unwrap();
    decode::execute(input, Some(chunked_path.to_str().unwrap()), 3, false, false).unwrap();

    let strip = |path: &std::path::Path| -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| {
                let mut value: serde_json::Value = serde_json::from_str(line).unwrap();
                value.as_object_mut().unwrap().remove("timestamp");
                value
            })
            .collect()
    };

    assert_eq!(strip(&whole_path), strip(&chunked_path));
}

#[test]
fn test_decode_stats_only() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("capture.sbf");
    let output_path = td.path().join("records.jsonl");

    fs::write(&input_path, create_damaged_capture()).unwrap();

    let stats = decode::execute(
        input_path.to_str().unwrap(),
        Some(output_path.to_str().unwrap()),
        4096,
        true,
        false,
    )
    .unwrap();

    assert_eq!(stats.crc_failures, 1);
    assert_eq!(stats.sbf_blocks, 2);
    assert!(!output_path.exists());
}

#[test]
fn test_decode_with_progress() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("capture.sbf");
    fs::write(&input_path, create_capture(2)).unwrap();

    let stats = decode::execute(input_path.to_str().unwrap(), None, 16, true, true).unwrap();
    assert_eq!(stats.bytes_ingested, fs::metadata(&input_path).unwrap().len());
}

#[test]
fn test_decode_missing_file() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("missing.sbf");

    let result = decode::execute(input_path.to_str().unwrap(), None, 4096, false, false);
    assert!(result.is_err());
}

#[test]
fn test_decode_zero_chunk_size() {
    let td = tempdir().unwrap();
    let input_path = td.path().join("capture.sbf");
    fs::write(&input_path, create_capture(1)).unwrap();

    let result = decode::execute(input_path.to_str().unwrap(), None, 0, false, false);
    assert!(result.is_err());
}

/// Sink that accepts a fixed number of records, then fails
struct LimitedSink {
    records: Vec<DecodedRecord>,
    limit: usize,
}

impl RecordSink for LimitedSink {
    fn publish(&mut self, record: &DecodedRecord) -> Result<(), SbfError> {
        if self.records.len() == self.limit {
            return Err(SbfError::Publish("output closed".into()));
        }
        self.records.push(record.clone());
        Ok(())
    }
}

#[test]
fn test_decode_chunks_publishes_as_it_goes() {
    let data = create_capture(10);
    let mut parser = Parser::default();
    let mut sink = LimitedSink {
        records: Vec::new(),
        limit: 2,
    };

    let result = decode::decode_chunks(&mut parser, &data, 24, Some(&mut sink), None);

    // the third record failed before the rest of the capture was read
    assert!(result.is_err());
    assert_eq!(sink.records.len(), 2);
    assert!(parser.stats().bytes_ingested < data.len() as u64);
}

#[test]
fn test_decode_chunks_counts_records() {
    let data = create_capture(4);
    let mut parser = Parser::default();
    let mut records = Vec::<DecodedRecord>::new();

    let written = decode::decode_chunks(&mut parser, &data, 7, Some(&mut records), None).unwrap();

    // four blocks, the reply and the event
    assert_eq!(written, 6);
    assert_eq!(records.len(), 6);
    assert_eq!(parser.stats().bytes_ingested, data.len() as u64);
}

#[test]
fn test_decode_chunks_without_sink() {
    let data = create_capture(2);
    let mut parser = Parser::default();

    let written =
        decode::decode_chunks::<Vec<DecodedRecord>>(&mut parser, &data, 16, None, None).unwrap();

    assert_eq!(written, 0);
    assert_eq!(parser.stats().sbf_blocks, 2);
}
