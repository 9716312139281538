//! Scripted in-memory channel
//!
//! Stands in for a hardware peer during tests and offline development. The
//! script controls how many bytes each write call accepts and in what
//! fragments the response comes back, so short writes, fragmented reads,
//! and stalled peers can all be reproduced deterministically.

use super::{Channel, TransportError};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// In-memory channel driven by a pre-programmed script
pub struct ScriptedChannel {
    accept_sizes: Vec<usize>,
    accept_cursor: usize,
    fail_write_after: Option<usize>,
    script: VecDeque<(Duration, Vec<u8>)>,
    started: Instant,
    written: Vec<u8>,
    first_read_at: Option<usize>,
    discarded: usize,
    poll_delay: Duration,
}

impl ScriptedChannel {
    /// Create a channel that accepts writes whole and has nothing to say
    pub fn new() -> Self {
        Self {
            accept_sizes: Vec::new(),
            accept_cursor: 0,
            fail_write_after: None,
            script: VecDeque::new(),
            started: Instant::now(),
            written: Vec::new(),
            first_read_at: None,
            discarded: 0,
            poll_delay: Duration::from_millis(1),
        }
    }

    /// Cap the bytes accepted per write call, cycling through `sizes`
    #[must_use]
    pub fn accept_chunks(mut self, sizes: &[usize]) -> Self {
        self.accept_sizes = sizes.to_vec();
        self
    }

    /// Queue a response fragment; one fragment is served per read poll
    #[must_use]
    pub fn respond(mut self, fragment: &[u8]) -> Self {
        self.script.push_back((Duration::ZERO, fragment.to_vec()));
        self
    }

    /// Queue a response fragment that only becomes available once `delay`
    /// has elapsed since the channel was created
    #[must_use]
    pub fn respond_after(mut self, delay: Duration, fragment: &[u8]) -> Self {
        self.script.push_back((delay, fragment.to_vec()));
        self
    }

    /// Fail writes with a hard I/O error once `n` bytes have been accepted
    #[must_use]
    pub fn fail_write_after(mut self, n: usize) -> Self {
        self.fail_write_after = Some(n);
        self
    }

    /// Everything accepted so far, in order
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Bytes that had been written when the first read poll happened, or
    /// `None` if no read has occurred
    pub fn written_at_first_read(&self) -> Option<usize> {
        self.first_read_at
    }

    /// Unserved response bytes dropped by [`Channel::discard_input`]
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

impl Default for ScriptedChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for ScriptedChannel {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if let Some(limit) = self.fail_write_after {
            if self.written.len() >= limit {
                return Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "scripted write failure",
                )));
            }
        }

        let cap = if self.accept_sizes.is_empty() {
            data.len()
        } else {
            let cap = self.accept_sizes[self.accept_cursor % self.accept_sizes.len()];
            self.accept_cursor += 1;
            cap
        };

        let accepted = data.len().min(cap);
        self.written.extend_from_slice(&data[..accepted]);
        Ok(accepted)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if self.first_read_at.is_none() {
            self.first_read_at = Some(self.written.len());
        }

        let Some((delay, mut fragment)) = self.script.pop_front() else {
            // Silence still costs one poll interval.
            std::thread::sleep(self.poll_delay);
            return Ok(0);
        };
        if self.started.elapsed() < delay {
            // Not due yet.
            self.script.push_front((delay, fragment));
            std::thread::sleep(self.poll_delay);
            return Ok(0);
        }

        let n = fragment.len().min(buf.len());
        buf[..n].copy_from_slice(&fragment[..n]);
        if n < fragment.len() {
            self.script.push_front((delay, fragment.split_off(n)));
        }
        Ok(n)
    }

    fn discard_input(&mut self) -> Result<(), TransportError> {
        self.discarded += self.script.iter().map(|(_, f)| f.len()).sum::<usize>();
        self.script.clear();
        Ok(())
    }

    fn connection_info(&self) -> String {
        "scripted channel".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_chunks_cycle() {
        let mut channel = ScriptedChannel::new().accept_chunks(&[3, 1]);
        assert_eq!(channel.write(b"abcdef").unwrap(), 3);
        assert_eq!(channel.write(b"def").unwrap(), 1);
        assert_eq!(channel.write(b"ef").unwrap(), 2);
        assert_eq!(channel.written(), b"abcdef");
    }

    #[test]
    fn test_fragments_served_one_per_poll() {
        let mut channel = ScriptedChannel::new().respond(b"ab").respond(b"cd");
        let mut buf = [0u8; 8];
        assert_eq!(channel.read_chunk(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ab");
        assert_eq!(channel.read_chunk(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"cd");
        assert_eq!(channel.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_oversized_fragment_is_split() {
        let mut channel = ScriptedChannel::new().respond(b"abcdef");
        let mut buf = [0u8; 4];
        assert_eq!(channel.read_chunk(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"abcd");
        assert_eq!(channel.read_chunk(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
    }

    #[test]
    fn test_discard_counts_unserved_bytes() {
        let mut channel = ScriptedChannel::new().respond(b"abc").respond(b"de");
        let mut buf = [0u8; 8];
        channel.read_chunk(&mut buf).unwrap();
        channel.discard_input().unwrap();
        assert_eq!(channel.discarded(), 2);
    }
}
