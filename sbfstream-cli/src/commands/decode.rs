use super::{print_stats, read_input};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sbfstream_core::{JsonLinesSink, ParseStats, Parser, RecordSink};
use std::fs::File;
use std::io::{self, BufWriter};
use tracing::info;

/// Decode a capture into JSON lines
///
/// The capture is fed to the parser `chunk_size` bytes at a time, as a
/// transport would deliver it. Each chunk's records go to `output`, or to
/// stdout, before the next chunk is parsed.
pub fn execute(
    input: &str,
    output: Option<&str>,
    chunk_size: usize,
    stats_only: bool,
    progress: bool,
) -> Result<ParseStats> {
    if chunk_size == 0 {
        bail!("Chunk size must be greater than 0");
    }

    info!("Decoding capture: {}", input);
    let data = read_input(input)?;
    info!("Capture size: {} bytes", data.len());

    let bar = if progress {
        let bar = ProgressBar::new(data.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
                .context("Invalid progress bar template")?,
        );
        Some(bar)
    } else {
        None
    };

    // records stream out chunk by chunk; nothing is opened for stats-only runs
    let mut sink: Option<Box<dyn RecordSink>> = match (stats_only, output) {
        (true, _) => None,
        (false, Some(path)) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Some(Box::new(JsonLinesSink::new(BufWriter::new(file))))
        }
        (false, None) => Some(Box::new(JsonLinesSink::new(io::stdout()))),
    };

    let mut parser = Parser::default();
    let written = decode_chunks(
        &mut parser,
        &data,
        chunk_size,
        sink.as_deref_mut(),
        bar.as_ref(),
    )?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    if let Some(mut sink) = sink {
        sink.flush().context("Failed to flush output")?;
        match output {
            Some(path) => info!("{} records written to: {}", written, path),
            None => info!("{} records written", written),
        }
    }

    if parser.buffered() > 0 {
        info!("{} trailing bytes left in an incomplete frame", parser.buffered());
    }

    print_stats("Decode Results", parser.stats());
    Ok(parser.stats().clone())
}

/// Parse `data` in `chunk_size` pieces, publishing each piece's records
/// before the next is parsed
///
/// Returns the number of records published. A failed publish stops the run
/// with the rest of the capture unparsed.
pub fn decode_chunks<S: RecordSink + ?Sized>(
    parser: &mut Parser,
    data: &[u8],
    chunk_size: usize,
    mut sink: Option<&mut S>,
    bar: Option<&ProgressBar>,
) -> Result<usize> {
    if chunk_size == 0 {
        bail!("Chunk size must be greater than 0");
    }

    let mut written = 0usize;
    for chunk in data.chunks(chunk_size) {
        let records = parser.ingest(chunk);
        if let Some(sink) = sink.as_deref_mut() {
            for record in &records {
                sink.publish(record).context("Failed to write record")?;
            }
            written += records.len();
        }
        if let Some(bar) = bar {
            bar.inc(chunk.len() as u64);
        }
    }
    Ok(written)
}
