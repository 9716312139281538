//! Core module containing the main functionality of Blocklink
//!
//! This module provides:
//! - Fixed-block message framing (pad marker, zero fill, control byte)
//! - Write-then-read transactions with deadline-bounded response collection
//! - Transport layer (serial ports, scripted channels for tests)
//! - Display codecs for opaque response bytes

pub mod codec;
pub mod framing;
pub mod transaction;
pub mod transport;
