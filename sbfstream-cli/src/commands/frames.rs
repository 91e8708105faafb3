use super::{print_stats, read_input};
use anyhow::{Context, Result};
use sbfstream_core::constants::SBF_HEADER_SIZE;
use sbfstream_core::scanner::scan_stream_with_stats;
use sbfstream_core::{Frame, FrameKind};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;

/// One line of the frame listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSummary {
    pub offset: u64,
    pub kind: String,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<u8>,
    pub detail: String,
}

impl FrameSummary {
    pub fn from_frame(frame: &Frame) -> Self {
        let (block_number, revision, detail) = match &frame.kind {
            FrameKind::SbfBlock(header) => (
                Some(header.block_number()),
                Some(header.revision()),
                hex::encode(&frame.raw[..SBF_HEADER_SIZE.min(frame.raw.len())]),
            ),
            FrameKind::CommandPrompt { prompt } => (
                None,
                None,
                match prompt {
                    Some(prompt) => prompt.to_string(),
                    None => String::from_utf8_lossy(&frame.raw).into_owned(),
                },
            ),
            FrameKind::AsciiCommandReply { prompt } => {
                let status = if frame.is_error_reply() { "error, " } else { "" };
                (None, None, format!("{}ended by {}", status, prompt))
            }
            FrameKind::FormattedInfoBlock { index, count, .. } => {
                (None, None, format!("BLOCK {} / {}", index, count))
            }
            FrameKind::AsciiDisplay | FrameKind::Event => {
                (None, None, first_line(&frame.text()))
            }
        };

        Self {
            offset: frame.offset,
            kind: frame.kind.label().to_string(),
            size: frame.size(),
            block_number,
            revision,
            detail,
        }
    }
}

fn first_line(text: &str) -> String {
    let line = text.trim_start().lines().next().unwrap_or("");
    line.chars().take(48).collect()
}

/// List every recognized frame of a capture
pub fn execute(input: &str, output: Option<&str>) -> Result<Vec<FrameSummary>> {
    info!("Listing frames in: {}", input);
    let data = read_input(input)?;

    let (frames, stats) = scan_stream_with_stats(&data);
    let summaries: Vec<FrameSummary> = frames.iter().map(FrameSummary::from_frame).collect();

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&summaries)
                .context("Failed to serialize frame listing")?;
            fs::write(path, json)
                .with_context(|| format!("Failed to write output file: {}", path))?;
            info!("Frame listing written to: {}", path);
        }
        None => {
            println!("{:>10}  {:<10} {:>6}  {:>5}  detail", "offset", "kind", "size", "block");
            for summary in &summaries {
                let block = match (summary.block_number, summary.revision) {
                    (Some(number), Some(revision)) => format!("{}.{}", number, revision),
                    _ => "-".to_string(),
                };
                println!(
                    "{:>10}  {:<10} {:>6}  {:>5}  {}",
                    summary.offset, summary.kind, summary.size, block, summary.detail
                );
            }
        }
    }

    print_stats("Frame Scan", &stats);
    Ok(summaries)
}
