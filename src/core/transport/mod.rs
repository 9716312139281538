//! Transport layer for the coprocessor link
//!
//! Supports:
//! - Serial ports (RS-232, RS-485, USB-Serial)
//! - Scripted in-memory channels for tests and offline development

mod scripted;
mod serial;

pub use scripted::ScriptedChannel;
pub use serial::{list_ports, SerialChannel, SerialFlowControl, SerialParity, SerialSettings};

use bytes::Bytes;
use thiserror::Error;

/// Transport error types
#[derive(Debug, Error)]
pub enum TransportError {
    /// Port not found
    #[error("Port not found: {0}")]
    PortNotFound(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Opening the channel failed
    #[error("Open failed: {0}")]
    OpenFailed(String),

    /// The channel rejected or failed a write; the transaction is aborted
    /// and the line should be considered desynchronized.
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// The response was not fully received before the deadline. Carries
    /// whatever bytes had accumulated so the caller can tell a silent peer
    /// from a stalled one.
    #[error("Timed out with {} of {expected} response bytes", .partial.len())]
    Timeout {
        /// Bytes accumulated before the deadline elapsed
        partial: Bytes,
        /// Response size that was expected
        expected: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A byte-oriented link carrying one transaction at a time.
///
/// Implementations are blocking. A transaction borrows the channel mutably
/// for its full write-then-read exchange; callers needing concurrent
/// transactions serialize access themselves.
pub trait Channel {
    /// Offer bytes to the link, returning how many were accepted. The link
    /// may accept fewer than offered; callers retry with the remaining
    /// suffix.
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Push accepted-but-buffered bytes onto the wire.
    fn flush(&mut self) -> Result<(), TransportError>;

    /// Read whatever has arrived, up to `buf.len()` bytes. Blocks for at
    /// most the channel's internal poll interval and returns 0 when nothing
    /// arrived in that window; 0 is not an error or end-of-stream.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Drop any bytes sitting in the receive path, so a stale response
    /// cannot leak into the next transaction.
    fn discard_input(&mut self) -> Result<(), TransportError>;

    /// Human-readable description of the link
    fn connection_info(&self) -> String;
}
