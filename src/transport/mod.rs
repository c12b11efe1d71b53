//! Byte-stream transports for the Pulsar.
//!
//! The device protocol is one raw byte out and one raw byte back, so any
//! blocking `std::io::Read + std::io::Write` value can carry it, provided
//! it can also drop input that arrived outside a round trip. The serial
//! port opened by [`open_serial`] and the in-memory [`MockTransport`] both
//! implement [`Transport`].

pub mod mock;
#[cfg(feature = "instrument_serial")]
pub mod serial;

pub use mock::{EchoMode, MockTransport};
#[cfg(feature = "instrument_serial")]
pub use serial::{open_serial, SerialTransport};

use std::io::{self, Read, Write};

/// Blocking byte-oriented connection to a device.
pub trait Transport: Read + Write {
    /// Drop any bytes received but not yet read.
    ///
    /// Called before every write so that an echo arriving after a read
    /// timeout is not taken as the answer to the next write.
    fn discard_input(&mut self) -> io::Result<()>;
}
