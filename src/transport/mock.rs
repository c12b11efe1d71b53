//! Mock Pulsar transport
//!
//! Simulates the device end of the serial line without hardware. Every byte
//! written is logged and answered according to an [`EchoMode`]; reads with
//! nothing pending fail with `TimedOut`, the same way a serial port read
//! does when the device stays silent. [`EchoMode::Late`] delivers the
//! answer only once that read has timed out, where it waits in the input
//! buffer until read or discarded.
//!
//! `MockTransport` is a cheap-clone handle over shared state, so a test can
//! keep one clone to inspect traffic after handing another to the driver.
//!
//! # Example
//!
//! ```rust
//! use pulsar_daq::transport::{EchoMode, MockTransport};
//! use std::io::{Read, Write};
//!
//! let mut mock = MockTransport::with_mode(EchoMode::Echo);
//! mock.write_all(&[0x20]).unwrap();
//! let mut echo = [0u8; 1];
//! mock.read_exact(&mut echo).unwrap();
//! assert_eq!(echo, [0x20]);
//! assert_eq!(mock.written(), vec![0x20]);
//! ```

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::Arc;

use super::Transport;

/// How the simulated device answers each byte it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoMode {
    /// Echo the byte back unchanged (healthy device)
    #[default]
    Echo,
    /// Always answer with this byte
    Fixed(u8),
    /// Answer with the received byte XOR this pattern
    Corrupt(u8),
    /// Never answer
    Silent,
    /// Echo the byte unchanged, but only after the pending read times out
    Late,
}

impl EchoMode {
    fn respond(self, byte: u8) -> Option<u8> {
        match self {
            EchoMode::Echo => Some(byte),
            EchoMode::Fixed(reply) => Some(reply),
            EchoMode::Corrupt(pattern) => Some(byte ^ pattern),
            EchoMode::Silent | EchoMode::Late => None,
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    mode: EchoMode,
    written: Vec<u8>,
    read: Vec<u8>,
    pending: VecDeque<u8>,
    /// Late echoes not yet delivered
    in_flight: VecDeque<u8>,
    write_failure: Option<io::ErrorKind>,
}

/// In-memory stand-in for the Pulsar serial line.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock that echoes every byte.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock answering according to `mode`.
    pub fn with_mode(mode: EchoMode) -> Self {
        let mock = Self::new();
        mock.set_mode(mode);
        mock
    }

    /// Change how subsequent writes are answered.
    pub fn set_mode(&self, mode: EchoMode) {
        self.state.lock().mode = mode;
    }

    /// Make every subsequent write fail with `kind` until cleared with `None`.
    pub fn fail_writes(&self, kind: Option<io::ErrorKind>) {
        self.state.lock().write_failure = kind;
    }

    /// Every byte written so far, in order.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().written.clone()
    }

    /// Every byte handed back to the host so far, in order.
    pub fn read_back(&self) -> Vec<u8> {
        self.state.lock().read.clone()
    }

    /// Last byte written, if any.
    pub fn last_written(&self) -> Option<u8> {
        self.state.lock().written.last().copied()
    }

    /// Forget logged traffic. Pending replies are kept.
    pub fn clear_log(&self) {
        let mut state = self.state.lock();
        state.written.clear();
        state.read.clear();
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock();
        if let Some(kind) = state.write_failure {
            return Err(io::Error::new(kind, "mock write failure"));
        }

        for &byte in buf {
            state.written.push(byte);
            if state.mode == EchoMode::Late {
                state.in_flight.push_back(byte);
            } else if let Some(reply) = state.mode.respond(byte) {
                state.pending.push_back(reply);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock();
        if state.pending.is_empty() {
            let arrived = std::mem::take(&mut state.in_flight);
            state.pending.extend(arrived);
            return Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "mock read timed out",
            ));
        }

        let mut n = 0;
        while n < buf.len() {
            match state.pending.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    state.read.push(byte);
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

impl Transport for MockTransport {
    fn discard_input(&mut self) -> io::Result<()> {
        self.state.lock().pending.clear();
        Ok(())
    }
}
