//! Write-then-read transactions over a channel
//!
//! One transaction delivers a framed block to the peer in order, then
//! accumulates the fixed-size response under a deadline. The channel is
//! borrowed exclusively for the whole exchange; no state survives between
//! transactions.

use crate::core::framing::{self, FramingError, BLOCK_SIZE, RESPONSE_SIZE};
use crate::core::transport::{Channel, TransportError};
use bytes::Bytes;
use std::fmt;
use std::time::{Duration, Instant};

/// Errors surfaced by a full compute exchange
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Message could not be framed
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// Transport failed during the exchange
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Phase of one transaction, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionPhase {
    /// No transaction in flight
    Idle,
    /// Delivering the request block
    Writing,
    /// Accumulating the response
    AwaitingResponse,
    /// Full response collected
    Complete,
    /// Write error or response deadline elapsed
    Failed,
}

impl fmt::Display for TransactionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Writing => write!(f, "writing"),
            Self::AwaitingResponse => write!(f, "awaiting-response"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Perform one request/response exchange: deliver `block` in order, then
/// read exactly `response_size` bytes.
///
/// The write phase retries short writes with the remaining suffix until the
/// whole block has been accepted; the read phase never starts unless the
/// write phase completed. Reads are accumulated across polls until the
/// response is complete or `timeout` elapses, measured from the end of the
/// write phase. Timeout accuracy is bounded by the channel's poll interval.
///
/// # Errors
///
/// Returns [`TransportError::WriteFailed`] when the channel rejects or fails
/// a write (the line should be considered desynchronized), and
/// [`TransportError::Timeout`] carrying the partial response when the
/// deadline elapses. After a timeout, pending input is discarded so late
/// bytes cannot leak into a subsequent transaction.
pub fn transact(
    channel: &mut dyn Channel,
    block: Vec<u8>,
    response_size: usize,
    timeout: Duration,
) -> Result<Bytes, TransportError> {
    tracing::debug!(
        phase = %TransactionPhase::Writing,
        len = block.len(),
        "delivering block"
    );

    let mut sent = 0;
    while sent < block.len() {
        match channel.write(&block[sent..]) {
            Ok(0) => {
                return Err(TransportError::WriteFailed(
                    "channel accepted no bytes".to_string(),
                ));
            }
            Ok(n) => {
                sent += n;
                tracing::trace!(sent, total = block.len(), "chunk accepted");
            }
            Err(e) => {
                tracing::warn!(phase = %TransactionPhase::Failed, sent, "write aborted");
                return Err(TransportError::WriteFailed(e.to_string()));
            }
        }
    }
    channel
        .flush()
        .map_err(|e| TransportError::WriteFailed(e.to_string()))?;

    tracing::debug!(
        phase = %TransactionPhase::AwaitingResponse,
        expected = response_size,
        "reading response"
    );

    let deadline = Instant::now() + timeout;
    let mut response = Vec::with_capacity(response_size);
    let mut buf = vec![0u8; response_size];
    while response.len() < response_size {
        if Instant::now() >= deadline {
            // Late bytes must not surface in the next transaction.
            let _ = channel.discard_input();
            tracing::warn!(
                phase = %TransactionPhase::Failed,
                got = response.len(),
                expected = response_size,
                "response deadline elapsed"
            );
            return Err(TransportError::Timeout {
                partial: Bytes::from(response),
                expected: response_size,
            });
        }

        let want = response_size - response.len();
        let n = channel.read_chunk(&mut buf[..want])?;
        if n > 0 {
            response.extend_from_slice(&buf[..n]);
            tracing::trace!(got = n, have = response.len(), "fragment received");
        }
    }

    tracing::debug!(phase = %TransactionPhase::Complete, len = response.len(), "transaction complete");
    Ok(Bytes::from(response))
}

/// One full exchange against the reference peer: frame `message` into a
/// [`BLOCK_SIZE`]-byte block, deliver it, and collect the
/// [`RESPONSE_SIZE`]-byte answer.
///
/// The response bytes are opaque payload; interpreting them is the caller's
/// business.
///
/// # Errors
///
/// Returns [`Error::Framing`] when the message does not fit one block, and
/// [`Error::Transport`] for write failures and response timeouts.
pub fn compute(
    channel: &mut dyn Channel,
    message: &[u8],
    timeout: Duration,
) -> Result<Bytes, Error> {
    let block = framing::frame(message, BLOCK_SIZE)?;
    let response = transact(channel, block, RESPONSE_SIZE, timeout)?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::ScriptedChannel;

    #[test]
    fn test_phase_display() {
        assert_eq!(TransactionPhase::Idle.to_string(), "idle");
        assert_eq!(
            TransactionPhase::AwaitingResponse.to_string(),
            "awaiting-response"
        );
    }

    #[test]
    fn test_whole_response_in_one_fragment() {
        let mut channel = ScriptedChannel::new().respond(&[0x55; 20]);
        let response = transact(
            &mut channel,
            vec![0u8; 64],
            20,
            Duration::from_millis(100),
        )
        .unwrap();
        assert_eq!(response.as_ref(), &[0x55; 20]);
        assert_eq!(channel.written().len(), 64);
    }

    #[test]
    fn test_message_too_large_skips_transport() {
        let mut channel = ScriptedChannel::new();
        let message = vec![0u8; 63];
        let err = compute(&mut channel, &message, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, Error::Framing(FramingError::MessageTooLarge { .. })));
        assert!(channel.written().is_empty());
    }
}
