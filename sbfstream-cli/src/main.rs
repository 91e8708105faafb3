use anyhow::Result;
use clap::{Parser, Subcommand};
use sbfstream_cli::commands;
use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sbfstream")]
#[command(about = "sbfstream - Septentrio receiver stream decoder", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a captured stream into JSON lines
    Decode {
        /// Capture file, or - for stdin
        #[arg(short, long)]
        input: String,

        /// Output file for JSON lines (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Bytes fed to the parser per chunk
        #[arg(long, default_value = "4096")]
        chunk_size: usize,

        /// Show statistics only
        #[arg(long)]
        stats_only: bool,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },

    /// List the frames found in a captured stream
    Frames {
        /// Capture file, or - for stdin
        #[arg(short, long)]
        input: String,

        /// Output JSON file for the listing
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Read from a receiver over TCP and publish records on stdout
    Listen {
        /// Adapter settings JSON file
        #[arg(short, long)]
        settings: Option<String>,

        /// Receiver host (overrides settings)
        #[arg(long)]
        host: Option<String>,

        /// Receiver TCP port (overrides settings)
        #[arg(short, long)]
        port: Option<u16>,

        /// Read timeout in milliseconds, 0 to block (overrides settings)
        #[arg(long)]
        read_timeout_ms: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout carries records only
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Decode {
            input,
            output,
            chunk_size,
            stats_only,
            progress,
        } => commands::decode::execute(&input, output.as_deref(), chunk_size, stats_only, progress)
            .map(|_| ()),

        Commands::Frames { input, output } => {
            commands::frames::execute(&input, output.as_deref()).map(|_| ())
        }

        Commands::Listen {
            settings,
            host,
            port,
            read_timeout_ms,
        } => commands::listen::execute(settings.as_deref(), host, port, read_timeout_ms).map(|_| ()),
    }
}
