//! Parsing thread fed by a bounded channel
//!
//! The transport side only ever sends chunks; the parser and its buffer
//! live on one dedicated thread, so ingestion and parsing never touch the
//! same bytes concurrently. Records reach the sink in stream order. A sink
//! error is logged and counted and parsing carries on.

use crate::error::SbfError;
use crate::parser::Parser;
use crate::record::DecodedRecord;
use crate::stats::ParseStats;
use bytes::Bytes;
use crossbeam::channel::{bounded, Sender};
use std::io::Write;
use std::thread::{self, JoinHandle};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Destination for decoded records
pub trait RecordSink: Send {
    /// Publish one record
    fn publish(&mut self, record: &DecodedRecord) -> Result<(), SbfError>;

    /// Called once after the last record
    fn flush(&mut self) -> Result<(), SbfError> {
        Ok(())
    }
}

/// Writes one JSON object per line
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    fn publish(&mut self, record: &DecodedRecord) -> Result<(), SbfError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SbfError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl RecordSink for Vec<DecodedRecord> {
    fn publish(&mut self, record: &DecodedRecord) -> Result<(), SbfError> {
        self.push(record.clone());
        Ok(())
    }
}

impl RecordSink for Sender<DecodedRecord> {
    fn publish(&mut self, record: &DecodedRecord) -> Result<(), SbfError> {
        self.send(record.clone())
            .map_err(|_| SbfError::Publish("record receiver disconnected".into()))
    }
}

/// Handle to a running parser thread
#[derive(Debug)]
pub struct ParserHandle<S> {
    sender: Sender<Bytes>,
    join: JoinHandle<(Parser, S)>,
}

/// Start a parser thread publishing into `sink`
///
/// The chunk channel holds `channelCapacity` chunks from the parser's
/// configuration; [`ParserHandle::ingest`] blocks while it is full.
pub fn spawn<S>(parser: Parser, sink: S) -> Result<ParserHandle<S>, SbfError>
where
    S: RecordSink + 'static,
{
    let (sender, receiver) = bounded::<Bytes>(parser.config().channel_capacity);

    let join = thread::Builder::new()
        .name("sbf-parser".into())
        .spawn(move || {
            let mut parser = parser;
            let mut sink = sink;

            for chunk in receiver.iter() {
                for record in parser.ingest(&chunk) {
                    if let Err(e) = sink.publish(&record) {
                        parser.record_publish_failure();

                        #[cfg(feature = "logging")]
                        warn!("Failed to publish {} record: {}", record.data_type(), e);
                        #[cfg(not(feature = "logging"))]
                        let _ = e;
                    }
                }
            }

            if let Err(e) = sink.flush() {
                #[cfg(feature = "logging")]
                warn!("Failed to flush record sink: {}", e);
                #[cfg(not(feature = "logging"))]
                let _ = e;
            }

            #[cfg(feature = "logging")]
            debug!(
                "Parser thread done: {} frames, {} records, {} bytes left unparsed",
                parser.stats().frames_found(),
                parser.stats().records_emitted,
                parser.buffered()
            );

            (parser, sink)
        })?;

    Ok(ParserHandle { sender, join })
}

impl<S> ParserHandle<S> {
    /// Queue a chunk for parsing; empty chunks are dropped
    pub fn ingest(&self, chunk: Bytes) -> Result<(), SbfError> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.sender
            .send(chunk)
            .map_err(|_| SbfError::ChannelClosed)
    }

    /// Close the channel, wait for queued chunks and return the statistics
    ///
    /// A partial frame still buffered is dropped with the parser.
    pub fn shutdown(self) -> Result<ParseStats, SbfError> {
        let (parser, _) = self.into_inner()?;
        Ok(parser.stats().clone())
    }

    /// Like [`ParserHandle::shutdown`], returning the parser and sink
    pub fn into_inner(self) -> Result<(Parser, S), SbfError> {
        let Self { sender, join } = self;
        drop(sender);
        join.join().map_err(|_| SbfError::WorkerPanicked)
    }
}
