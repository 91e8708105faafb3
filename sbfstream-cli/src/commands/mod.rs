//! Subcommand implementations

pub mod decode;
pub mod frames;
pub mod listen;

use anyhow::{Context, Result};
use colored::*;
use sbfstream_core::ParseStats;
use std::fs;
use std::io::{self, Read};

/// Read a capture file, or stdin when `input` is `-`
pub fn read_input(input: &str) -> Result<Vec<u8>> {
    if input == "-" {
        let mut data = Vec::new();
        io::stdin()
            .read_to_end(&mut data)
            .context("Failed to read from stdin")?;
        Ok(data)
    } else {
        fs::read(input).with_context(|| format!("Failed to read input file: {}", input))
    }
}

/// Print a statistics summary to stderr
///
/// Stdout is reserved for records.
pub fn print_stats(title: &str, stats: &ParseStats) {
    let mark = |count: u64| {
        if count == 0 {
            "✓".green()
        } else {
            "✗".red()
        }
    };

    eprintln!("\n=== {} ===", title);
    eprintln!("Bytes ingested:     {} bytes", stats.bytes_ingested);
    eprintln!("Bytes discarded:    {} bytes", stats.bytes_discarded);
    eprintln!("Recovery rate:      {:.2}%", stats.recovery_rate());
    eprintln!();
    eprintln!("Prompts:            {}", stats.prompts);
    eprintln!("Command replies:    {}", stats.command_replies);
    eprintln!("Displays:           {}", stats.displays);
    eprintln!("Events:             {}", stats.events);
    eprintln!("Info blocks:        {}", stats.info_blocks);
    eprintln!("SBF blocks:         {}", stats.sbf_blocks);
    eprintln!();
    eprintln!("{} CRC failures:     {}", mark(stats.crc_failures), stats.crc_failures);
    eprintln!("{} Invalid frames:   {}", mark(stats.invalid_frames), stats.invalid_frames);
    eprintln!("{} Decode failures:  {}", mark(stats.decode_failures), stats.decode_failures);
    eprintln!("  Unsupported:      {}", stats.unsupported_blocks);
    eprintln!("  Records emitted:  {}", stats.records_emitted.to_string().bold());
    if stats.publish_failures > 0 {
        eprintln!("{} Publish failures: {}", "✗".red(), stats.publish_failures);
    }
    eprintln!();
}
