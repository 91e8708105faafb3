//! Frame scanner over the accumulated byte stream
//!
//! Every step either removes bytes from the front of the buffer or stops
//! the pass because the frame at the front may still complete. Nothing
//! else is carried between passes, so a pass can resume from the buffer
//! contents alone.

use crate::accumulator::ByteAccumulator;
use crate::ascii;
use crate::config::ParserConfig;
use crate::constants::{
    FRAME_START, INVALID_FRAME_SKIP, PROMPT_END, PROMPT_LENGTH, UNKNOWN_TYPE_SKIP,
};
use crate::decoder::parse_block;
use crate::error::SbfError;
use crate::stats::ParseStats;
use crate::types::{Frame, ParseOutcome};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Classify the frame starting with `$` at the front of `data`
pub fn classify(data: &[u8], config: &ParserConfig) -> ParseOutcome {
    let Some(&type_byte) = data.get(1) else {
        return ParseOutcome::NeedMoreData;
    };

    match type_byte {
        b'@' => parse_block(data),
        b'R' => ascii::classify_command_reply(data, config.max_command_reply_size),
        b'T' => match data.get(2) {
            None => ParseOutcome::NeedMoreData,
            Some(b'D') => ascii::classify_display(data, config.max_display_size),
            Some(b'E') => ascii::classify_event(data, config.max_event_size),
            Some(&other) => ParseOutcome::Invalid {
                reason: SbfError::UnknownFrameType(other),
                skip: INVALID_FRAME_SKIP,
            },
        },
        b'-' => ascii::classify_info_block(
            data,
            config.max_info_block_size,
            config.info_block_header_limit,
        ),
        other => ParseOutcome::Invalid {
            reason: SbfError::UnknownFrameType(other),
            skip: UNKNOWN_TYPE_SKIP,
        },
    }
}

/// Remove and return the next frame from `buffer`
///
/// Returns `None` when the pass has to stop: either nothing frame-like is
/// left (the buffer is trimmed to the last `PROMPT_LENGTH - 1` bytes, which
/// may be the start of a prompt) or the frame at the front needs more data.
pub fn next_frame(
    buffer: &mut ByteAccumulator,
    config: &ParserConfig,
    stats: &mut ParseStats,
) -> Option<Frame> {
    loop {
        let Some(pos) = memchr::memchr2(FRAME_START, PROMPT_END, buffer.as_slice()) else {
            stats.bytes_discarded += buffer.retain_tail(PROMPT_LENGTH - 1) as u64;
            return None;
        };

        let outcome = if buffer.as_slice()[pos] == PROMPT_END {
            // `>` closes a prompt: look at the window ending at it
            let start = (pos + 1).saturating_sub(PROMPT_LENGTH);
            stats.bytes_discarded += buffer.discard(start) as u64;
            ascii::classify_prompt(&buffer.as_slice()[..pos + 1 - start])
        } else {
            stats.bytes_discarded += buffer.discard(pos) as u64;
            classify(buffer.as_slice(), config)
        };

        match outcome {
            ParseOutcome::Consumed { size, body, kind } => {
                let offset = buffer.consumed();
                let raw = buffer.take(size);
                stats.record_frame(&kind, size);

                #[cfg(feature = "logging")]
                debug!(
                    "Found {} frame at offset {} ({} bytes)",
                    kind.label(),
                    offset,
                    size
                );

                return Some(Frame::new(offset, kind, raw, body));
            }
            ParseOutcome::NeedMoreData => {
                #[cfg(feature = "logging")]
                debug!(
                    "Waiting for more data at offset {} ({} bytes buffered)",
                    buffer.consumed(),
                    buffer.len()
                );

                return None;
            }
            ParseOutcome::Invalid { reason, skip } => {
                match reason {
                    SbfError::ChecksumMismatch { .. } => stats.crc_failures += 1,
                    _ => stats.invalid_frames += 1,
                }

                #[cfg(feature = "logging")]
                match reason {
                    SbfError::UnknownFrameType(_) => {
                        debug!("Skipping stray '$' at offset {}", buffer.consumed())
                    }
                    _ => warn!(
                        "Rejected frame at offset {}: {} (skipping {} bytes)",
                        buffer.consumed(),
                        reason,
                        skip
                    ),
                }

                stats.bytes_discarded += buffer.discard(skip.max(1)) as u64;
            }
        }
    }
}

/// Scan a complete capture and return every frame found in it
///
/// A trailing partial frame is left out.
pub fn scan_stream(data: &[u8]) -> Vec<Frame> {
    scan_stream_with_stats(data).0
}

/// Scan a complete capture, with statistics
pub fn scan_stream_with_stats(data: &[u8]) -> (Vec<Frame>, ParseStats) {
    let config = ParserConfig::default();
    let mut stats = ParseStats {
        bytes_ingested: data.len() as u64,
        ..Default::default()
    };

    let mut buffer = ByteAccumulator::with_capacity(data.len());
    buffer.ingest(data);

    let mut frames = Vec::new();
    while let Some(frame) = next_frame(&mut buffer, &config, &mut stats) {
        frames.push(frame);
    }

    #[cfg(feature = "logging")]
    debug!(
        "Scan complete: found {} frames in {} bytes",
        frames.len(),
        data.len()
    );

    (frames, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::BlockBuilder;
    use crate::prompt::Prompt;
    use crate::types::FrameKind;
    use bytes::Bytes;

    fn block(number: u16) -> Bytes {
        BlockBuilder::new(number)
            .tow(1000)
            .wnc(2300)
            .body(Bytes::from_static(b"\x01\x02"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_scan_clean_stream() {
        let mut stream = Vec::new();
        stream.extend_from_slice(&block(5914));
        stream.extend_from_slice(b"$TE event one\r\n");
        stream.extend_from_slice(&block(4092));

        let frames = scan_stream(&stream);

        assert_eq!(frames.len(), 3);
        assert!(matches!(frames[0].kind, FrameKind::SbfBlock(h) if h.block_number() == 5914));
        assert_eq!(frames[1].kind, FrameKind::Event);
        assert_eq!(frames[1].offset, block(5914).len() as u64);
        assert!(matches!(frames[2].kind, FrameKind::SbfBlock(h) if h.block_number() == 4092));
    }

    #[test]
    fn test_scan_with_garbage() {
        let mut stream = Vec::new();
        stream.extend_from_slice(b"GARBAGE $x DATA $");
        stream.extend_from_slice(&block(5914));
        stream.extend_from_slice(b"more garbage");
        stream.extend_from_slice(&block(5921));

        let (frames, stats) = scan_stream_with_stats(&stream);

        assert_eq!(frames.len(), 2);
        assert_eq!(stats.sbf_blocks, 2);
        assert!(stats.bytes_discarded > 0);
    }

    #[test]
    fn test_prompt_window_and_noise() {
        let (frames, stats) = scan_stream_with_stats(b"xyzCOM1>abc>");

        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames[0].kind,
            FrameKind::CommandPrompt {
                prompt: Some(Prompt::Com(1))
            }
        );
        assert_eq!(&frames[0].raw[..], b"COM1>");
        assert_eq!(frames[0].offset, 3);
        assert_eq!(frames[1].kind, FrameKind::CommandPrompt { prompt: None });
        assert_eq!(stats.prompts, 2);
    }

    #[test]
    fn test_short_prompt_window_at_start() {
        let frames = scan_stream(b"1>");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].size(), 2);
    }

    #[test]
    fn test_no_frame_keeps_tail() {
        let mut buffer = ByteAccumulator::new();
        buffer.ingest(b"nothing to see here COM1");
        let mut stats = ParseStats::default();

        assert!(next_frame(&mut buffer, &ParserConfig::default(), &mut stats).is_none());
        assert_eq!(buffer.as_slice(), b"COM1");

        // the prompt completes on the next ingest
        buffer.ingest(b">");
        let frame = next_frame(&mut buffer, &ParserConfig::default(), &mut stats).unwrap();
        assert_eq!(
            frame.kind,
            FrameKind::CommandPrompt {
                prompt: Some(Prompt::Com(1))
            }
        );
    }

    #[test]
    fn test_lone_dollar_waits() {
        let mut buffer = ByteAccumulator::new();
        buffer.ingest(b"noise$");
        let mut stats = ParseStats::default();

        assert!(next_frame(&mut buffer, &ParserConfig::default(), &mut stats).is_none());
        assert_eq!(buffer.as_slice(), b"$");
    }

    #[test]
    fn test_crc_failure_counted_and_recovered() {
        let mut bad = block(5914).to_vec();
        bad[14] ^= 0x01;

        let mut stream = bad;
        stream.extend_from_slice(&block(5921));

        let (frames, stats) = scan_stream_with_stats(&stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(stats.crc_failures, 1);
    }

    #[test]
    fn test_unknown_t_type() {
        let (frames, stats) = scan_stream_with_stats(b"$TX\r\n$TE ok\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].text(), " ok");
        assert_eq!(stats.invalid_frames, 1);
    }

    #[test]
    fn test_blocks_recovered_from_random_noise() {
        use rand::{RngCore, SeedableRng};

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut stream = Vec::new();

        for _ in 0..50 {
            let mut noise = vec![0u8; (rng.next_u32() % 64) as usize];
            rng.fill_bytes(&mut noise);
            // a `$` in the noise could open a frame that swallows the block
            noise.retain(|&b| b != b'$');

            stream.extend_from_slice(&noise);
            stream.extend_from_slice(&block(5921));
        }

        let (frames, stats) = scan_stream_with_stats(&stream);
        let blocks = frames
            .iter()
            .filter(|f| matches!(f.kind, FrameKind::SbfBlock(_)))
            .count();

        assert_eq!(blocks, 50);
        assert_eq!(stats.crc_failures, 0);
    }
}
