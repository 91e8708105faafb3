//! Fuzz entry points for sbfstream-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_ingest

use sbfstream_core::{scanner, BlockHeader, BlockRegistry, FrameKind, Parser};

/// Feed the input as one chunk; every byte must be accounted for
pub fn fuzz_ingest(data: &[u8]) {
    let mut parser = Parser::default();
    let _ = parser.ingest(data);

    let stats = parser.stats();
    assert_eq!(stats.bytes_ingested, data.len() as u64);
    assert_eq!(
        stats.bytes_framed + stats.bytes_discarded + parser.buffered() as u64,
        stats.bytes_ingested
    );
}

/// Split the input at a cut point taken from its first byte
///
/// Both feeds must produce the same records.
pub fn fuzz_chunked(data: &[u8]) {
    let Some((&cut, stream)) = data.split_first() else {
        return;
    };
    let cut = (cut as usize).min(stream.len());

    let whole: Vec<_> = Parser::default()
        .ingest(stream)
        .into_iter()
        .map(|r| r.payload)
        .collect();

    let mut parser = Parser::default();
    let mut chunked: Vec<_> = parser
        .ingest(&stream[..cut])
        .into_iter()
        .map(|r| r.payload)
        .collect();
    chunked.extend(parser.ingest(&stream[cut..]).into_iter().map(|r| r.payload));

    assert_eq!(whole, chunked);
}

/// Run every registered block decoder on arbitrary block contents
pub fn fuzz_block(data: &[u8]) {
    let registry = BlockRegistry::default();

    for frame in scanner::scan_stream(data) {
        if let FrameKind::SbfBlock(header) = &frame.kind {
            let _ = registry.decode(header, &frame.payload);
        }
    }

    // decoders also see blocks that never passed a CRC check
    if let Ok(header) = BlockHeader::parse(data) {
        for number in registry.block_numbers() {
            let header = BlockHeader::new(number, header.revision(), header.length);
            let _ = registry.decode(&header, data);
        }
    }
}
