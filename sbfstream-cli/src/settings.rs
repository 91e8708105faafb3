//! Adapter settings for the `listen` command
//!
//! Field names follow the receiver adapter's JSON settings document, so an
//! existing settings file can be reused as is.

use anyhow::{bail, Context, Result};
use sbfstream_core::ParserConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

/// Default read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Default size of a single transport read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// How the receiver is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// TCP connection to the receiver's IP port
    Tcp,
    /// Serial line; opened by an external transport, not by this tool
    Serial,
}

/// Connection and parser settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterSettings {
    /// Transport kind; required in a settings file
    pub connection_type: ConnectionType,

    /// Receiver host name or address
    #[serde(default)]
    pub host: String,

    /// Receiver TCP port
    #[serde(default)]
    pub tcp_port: u16,

    /// Read timeout in milliseconds, 0 blocks indefinitely
    #[serde(default = "default_read_timeout")]
    pub read_timeout: u64,

    /// Bytes requested per read
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    /// Parser size limits
    #[serde(default)]
    pub parser: ParserConfig,
}

fn default_read_timeout() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            connection_type: ConnectionType::Tcp,
            host: String::new(),
            tcp_port: 0,
            read_timeout: DEFAULT_READ_TIMEOUT_MS,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            parser: ParserConfig::default(),
        }
    }
}

impl AdapterSettings {
    /// Load settings from a JSON file
    pub fn load(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path))?;

        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings file: {}", path))
    }

    /// Replace file values with those given on the command line
    pub fn apply_overrides(
        &mut self,
        host: Option<String>,
        port: Option<u16>,
        read_timeout_ms: Option<u64>,
    ) {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.tcp_port = port;
        }
        if let Some(timeout) = read_timeout_ms {
            self.read_timeout = timeout;
        }
    }

    /// Check that the settings describe a usable connection
    pub fn validate(&self) -> Result<()> {
        if self.connection_type == ConnectionType::Serial {
            bail!("connectionType 'serial' is not supported, use 'tcp'");
        }

        if self.host.is_empty() {
            bail!("host is required in adapter settings when connection type is set to 'tcp'");
        }

        if self.tcp_port == 0 {
            bail!("tcpPort is required in adapter settings when connection type is set to 'tcp'");
        }

        if self.read_buffer_size == 0 {
            bail!("readBufferSize must be greater than 0");
        }

        self.parser
            .validate()
            .context("Invalid parser settings")?;

        Ok(())
    }

    /// `host:port` for connecting
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.tcp_port)
    }

    /// Socket read timeout, `None` when disabled
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout > 0).then(|| Duration::from_millis(self.read_timeout))
    }
}
