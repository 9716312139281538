//! Integration tests for the transaction layer
//!
//! All tests drive `transact`/`compute` through a scripted channel, so they
//! exercise short-write retries, fragmented responses, and timeouts without
//! any serial hardware.

use blocklink_core::{
    compute, frame, transact, Error, ScriptedChannel, TransportError, BLOCK_SIZE, RESPONSE_SIZE,
};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_millis(100);

fn sample_response() -> Vec<u8> {
    (0..RESPONSE_SIZE as u8).map(|i| i.wrapping_mul(7)).collect()
}

#[test]
fn chunked_writes_deliver_whole_block_before_any_read() {
    let block = frame(b"abc", BLOCK_SIZE).unwrap();
    let expected = block.clone();
    let response = sample_response();

    // The link accepts between 1 and 7 bytes per write call.
    let mut channel = ScriptedChannel::new()
        .accept_chunks(&[3, 1, 7, 2, 5, 4, 6])
        .respond(&response);

    let got = transact(&mut channel, block, RESPONSE_SIZE, TIMEOUT).unwrap();

    assert_eq!(channel.written(), expected.as_slice());
    assert_eq!(channel.written_at_first_read(), Some(BLOCK_SIZE));
    assert_eq!(got.as_ref(), response.as_slice());
}

#[test]
fn fragmented_response_is_accumulated_in_order() {
    let response = sample_response();

    // 5 + 5 + 10 bytes; no single fragment reaches the full 20.
    let mut channel = ScriptedChannel::new()
        .respond(&response[..5])
        .respond(&response[5..10])
        .respond(&response[10..]);

    let got = transact(&mut channel, frame(b"", BLOCK_SIZE).unwrap(), RESPONSE_SIZE, TIMEOUT)
        .unwrap();

    assert_eq!(got.as_ref(), response.as_slice());
}

#[test]
fn partial_response_times_out_with_accumulated_bytes() {
    let response = sample_response();

    // Only 12 of 20 bytes ever arrive.
    let mut channel = ScriptedChannel::new()
        .respond(&response[..5])
        .respond(&response[5..12]);

    let err = transact(
        &mut channel,
        frame(b"abc", BLOCK_SIZE).unwrap(),
        RESPONSE_SIZE,
        Duration::from_millis(30),
    )
    .unwrap_err();

    match err {
        TransportError::Timeout { partial, expected } => {
            assert_eq!(partial.as_ref(), &response[..12]);
            assert_eq!(expected, RESPONSE_SIZE);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn silent_peer_times_out_with_empty_partial() {
    let mut channel = ScriptedChannel::new();

    let err = transact(
        &mut channel,
        frame(b"abc", BLOCK_SIZE).unwrap(),
        RESPONSE_SIZE,
        Duration::from_millis(20),
    )
    .unwrap_err();

    match err {
        TransportError::Timeout { partial, .. } => assert!(partial.is_empty()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[test]
fn late_input_is_discarded_after_timeout() {
    // 12 bytes arrive in time; the rest of the answer shows up long after
    // the deadline and must be flushed, not left for the next transaction.
    let response = sample_response();
    let mut channel = ScriptedChannel::new()
        .respond(&response[..12])
        .respond_after(Duration::from_millis(200), &response[12..]);

    let err = transact(
        &mut channel,
        frame(b"abc", BLOCK_SIZE).unwrap(),
        RESPONSE_SIZE,
        Duration::from_millis(25),
    )
    .unwrap_err();

    match err {
        TransportError::Timeout { partial, .. } => assert_eq!(partial.as_ref(), &response[..12]),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert_eq!(channel.discarded(), RESPONSE_SIZE - 12);
}

#[test]
fn hard_write_error_aborts_before_read() {
    let mut channel = ScriptedChannel::new()
        .accept_chunks(&[8])
        .fail_write_after(16)
        .respond(&sample_response());

    let err = transact(
        &mut channel,
        frame(b"abc", BLOCK_SIZE).unwrap(),
        RESPONSE_SIZE,
        TIMEOUT,
    )
    .unwrap_err();

    assert!(matches!(err, TransportError::WriteFailed(_)));
    // The read phase was never entered.
    assert_eq!(channel.written_at_first_read(), None);
}

#[test]
fn compute_frames_and_exchanges() {
    let response = sample_response();
    let mut channel = ScriptedChannel::new().respond(&response);

    let got = compute(&mut channel, b"abc", TIMEOUT).unwrap();

    assert_eq!(got.len(), RESPONSE_SIZE);
    assert_eq!(got.as_ref(), response.as_slice());

    // The wire saw exactly the reference block for "abc".
    let mut expected = vec![0u8; BLOCK_SIZE];
    expected[..3].copy_from_slice(b"abc");
    expected[3] = 0x80;
    expected[BLOCK_SIZE - 1] = 0x18;
    assert_eq!(channel.written(), expected.as_slice());
}

#[test]
fn compute_rejects_oversized_message_without_touching_channel() {
    let mut channel = ScriptedChannel::new().respond(&sample_response());
    let message = vec![0x42; BLOCK_SIZE - 1];

    let err = compute(&mut channel, &message, TIMEOUT).unwrap_err();

    assert!(matches!(err, Error::Framing(_)));
    assert!(channel.written().is_empty());
    assert_eq!(channel.written_at_first_read(), None);
}
