//! Fixed-block message framing
//!
//! A message is padded into exactly one transmission block: the message
//! bytes, a pad marker, zero fill, and a trailing control byte. The peer
//! consumes whole blocks only; there is no header, length prefix, or
//! checksum on the wire.

use thiserror::Error;

/// Request block size in bytes, fixed by the peer.
pub const BLOCK_SIZE: usize = 64;

/// Response size in bytes, fixed by the peer.
pub const RESPONSE_SIZE: usize = 20;

// Peer-specific constants. Neither matches a textbook padding scheme;
// confirm both against the device documentation before targeting other
// hardware.

/// Sentinel byte marking the end of message content within a block.
pub const PAD_MARKER: u8 = 0x80;

/// Final byte of every block.
pub const CONTROL_BYTE: u8 = 0x18;

/// Framing error types
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// Message does not fit the block after reserving the marker and
    /// control bytes. Multi-block chaining is not supported.
    #[error("Message of {len} bytes does not fit a {block_size}-byte block")]
    MessageTooLarge {
        /// Message length in bytes
        len: usize,
        /// Requested block size
        block_size: usize,
    },

    /// Block length does not match the expected size
    #[error("Block is {0} bytes, expected {1}")]
    WrongBlockLength(usize, usize),

    /// No pad marker found where the padding rule requires one
    #[error("Pad marker not found in block")]
    MarkerNotFound,

    /// Trailing control byte mismatch
    #[error("Control byte is {found:#04x}, expected {expected:#04x}")]
    BadControlByte {
        /// Byte found at the final position
        found: u8,
        /// Expected control byte
        expected: u8,
    },
}

/// Frame a message into a single transmission block.
///
/// The result is always exactly `block_size` bytes: the message, `PAD_MARKER`
/// at index `message.len()`, zero fill, and `CONTROL_BYTE` at the final
/// index. Deterministic and side-effect free.
///
/// # Errors
///
/// Returns [`FramingError::MessageTooLarge`] when the message cannot fit the
/// block after reserving the marker and control bytes
/// (`message.len() + 1 >= block_size`).
pub fn frame(message: &[u8], block_size: usize) -> Result<Vec<u8>, FramingError> {
    // One slot for the marker, one for the trailing control byte.
    if message.len() + 1 >= block_size {
        return Err(FramingError::MessageTooLarge {
            len: message.len(),
            block_size,
        });
    }

    let mut block = vec![0u8; block_size];
    block[..message.len()].copy_from_slice(message);
    block[message.len()] = PAD_MARKER;
    block[block_size - 1] = CONTROL_BYTE;

    Ok(block)
}

/// Recover the message from a well-formed block.
///
/// Inverse of [`frame`]: validates the control byte, locates the pad marker
/// as the last nonzero byte before it, and returns everything in front of
/// the marker.
///
/// # Errors
///
/// Returns [`FramingError::WrongBlockLength`] on a size mismatch,
/// [`FramingError::BadControlByte`] when the final byte is wrong, and
/// [`FramingError::MarkerNotFound`] when the padding region does not end in
/// `PAD_MARKER` followed only by zero fill.
pub fn strip(block: &[u8], block_size: usize) -> Result<Vec<u8>, FramingError> {
    if block.len() != block_size {
        return Err(FramingError::WrongBlockLength(block.len(), block_size));
    }

    let Some((&last, body)) = block.split_last() else {
        return Err(FramingError::MarkerNotFound);
    };
    if last != CONTROL_BYTE {
        return Err(FramingError::BadControlByte {
            found: last,
            expected: CONTROL_BYTE,
        });
    }

    // The marker is the last nonzero byte ahead of the control byte; the
    // fill between them must be all zeros.
    match body.iter().rposition(|&b| b != 0) {
        Some(i) if body[i] == PAD_MARKER => Ok(body[..i].to_vec()),
        _ => Err(FramingError::MarkerNotFound),
    }
}
