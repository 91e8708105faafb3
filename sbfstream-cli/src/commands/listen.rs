use super::print_stats;
use crate::settings::AdapterSettings;
use anyhow::{Context, Result};
use bytes::Bytes;
use sbfstream_core::pipeline::{self, ParserHandle};
use sbfstream_core::{JsonLinesSink, ParseStats, Parser, RecordSink};
use std::io::{self, ErrorKind, Read};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// Pause after a failed read before trying again
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Connect to the receiver and publish records as JSON lines on stdout
pub fn execute(
    settings_path: Option<&str>,
    host: Option<String>,
    port: Option<u16>,
    read_timeout_ms: Option<u64>,
) -> Result<ParseStats> {
    let mut settings = match settings_path {
        Some(path) => AdapterSettings::load(path)?,
        None => AdapterSettings::default(),
    };
    settings.apply_overrides(host, port, read_timeout_ms);
    settings.validate()?;

    let address = settings.address();
    info!("Connecting to GNSS receiver at {}", address);

    let stream = TcpStream::connect(&address)
        .with_context(|| format!("Failed to connect to {}", address))?;
    stream
        .set_read_timeout(settings.read_timeout())
        .context("Failed to set read timeout")?;

    let running = install_interrupt_handler()?;
    let (stats, _) = run(stream, &settings, JsonLinesSink::new(io::stdout()), &running)?;
    print_stats("Session Results", &stats);
    Ok(stats)
}

/// Feed everything `reader` yields through a parser thread into `sink`
///
/// Returns when the reader reports end of stream or `running` is cleared,
/// after the parser thread has drained every queued chunk. The flag is
/// checked between reads, so a blocking reader needs a read timeout.
pub fn run<R, S>(
    reader: R,
    settings: &AdapterSettings,
    sink: S,
    running: &AtomicBool,
) -> Result<(ParseStats, S)>
where
    R: Read,
    S: RecordSink + 'static,
{
    let parser = Parser::new(settings.parser.clone()).context("Invalid parser settings")?;
    let handle = pipeline::spawn(parser, sink).context("Failed to start parser thread")?;

    let read_result = read_loop(reader, &handle, settings.read_buffer_size, running);

    let (parser, sink) = handle.into_inner()?;
    let bytes_read = read_result?;
    info!("Connection closed after {} bytes", bytes_read);

    Ok((parser.stats().clone(), sink))
}

/// Ctrl-C clears the returned flag
///
/// The handler can only be registered once per process, so later sessions
/// reuse the first flag after re-arming it.
fn install_interrupt_handler() -> Result<Arc<AtomicBool>> {
    static RUNNING: Mutex<Option<Arc<AtomicBool>>> = Mutex::new(None);

    let mut slot = RUNNING
        .lock()
        .map_err(|_| anyhow::anyhow!("Interrupt handler state poisoned"))?;
    if let Some(running) = slot.as_ref() {
        running.store(true, Ordering::SeqCst);
        return Ok(Arc::clone(running));
    }

    let running = Arc::new(AtomicBool::new(true));
    let running_for_signal = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_for_signal.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl-C handler")?;

    *slot = Some(Arc::clone(&running));
    Ok(running)
}

fn read_loop<R: Read, S>(
    mut reader: R,
    handle: &ParserHandle<S>,
    buffer_size: usize,
    running: &AtomicBool,
) -> Result<u64> {
    let mut buffer = vec![0u8; buffer_size];
    let mut total = 0u64;

    loop {
        if !running.load(Ordering::SeqCst) {
            info!("Interrupted, draining parser");
            return Ok(total);
        }

        match reader.read(&mut buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => {
                debug!("{} bytes read from receiver", n);
                total += n as u64;
                handle
                    .ingest(Bytes::copy_from_slice(&buffer[..n]))
                    .context("Parser thread stopped")?;
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                error!("Error reading from GNSS receiver: {}", e);
                thread::sleep(READ_ERROR_BACKOFF);
            }
        }
    }
}
