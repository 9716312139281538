//! # Blocklink Core Library
//!
//! A client library for serial-attached hardware coprocessors that consume
//! fixed-size request blocks and answer with fixed-size responses:
//! - Block framing: message + pad marker + zero fill + control byte
//! - Chunk-tolerant ordered delivery over the serial link
//! - Deadline-bounded response collection with partial-read accumulation
//! - Scripted channels for hardware-free testing
//!
//! The peer's computation over a block is opaque; responses are returned as
//! raw bytes for the caller to interpret.
//!
//! ## Example
//!
//! ```rust,no_run
//! use blocklink_core::{compute, SerialChannel, SerialSettings};
//!
//! fn main() -> anyhow::Result<()> {
//!     let settings = SerialSettings::new("/dev/ttyUSB0", 9600);
//!     let timeout = settings.response_timeout();
//!     let mut channel = SerialChannel::open(settings)?;
//!
//!     let response = compute(&mut channel, b"abc", timeout)?;
//!     println!("{}", hex::encode(&response));
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{CliResult, ExitCodes};
pub use crate::config::{AppConfig, DeviceProfile};
pub use crate::core::codec::{format_bytes, hexdump, HexFormat};
pub use crate::core::framing::{
    frame, strip, FramingError, BLOCK_SIZE, CONTROL_BYTE, PAD_MARKER, RESPONSE_SIZE,
};
pub use crate::core::transaction::{compute, transact, Error, TransactionPhase};
pub use crate::core::transport::{
    list_ports, Channel, ScriptedChannel, SerialChannel, SerialFlowControl, SerialParity,
    SerialSettings, TransportError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
