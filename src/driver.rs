//! Pulsar 8-bit phase shifter driver
//!
//! Protocol Overview:
//! - Host → device: one raw byte, the phase mask (bit `i` switches in
//!   phase increment `i`). No framing, checksum or terminator.
//! - Device → host: one raw byte echoing the mask just received.
//! - Line settings: configurable baud rate (default 9600), 8N1.
//!
//! The driver keeps the authoritative copy of the mask in memory. Every
//! change is written to the device and confirmed by the echo before the
//! call returns. The register is never read back at startup; construction
//! writes `0x00` instead.
//!
//! # Example Usage
//!
//! ```no_run
//! use pulsar_daq::config::PulsarConfig;
//! use pulsar_daq::driver::PhaseShifter;
//! use pulsar_daq::phase::PhaseBit;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = PulsarConfig::for_address("/dev/ttyUSB0");
//!     let mut pulsar = PhaseShifter::open(&config)?;
//!
//!     pulsar.set_bit(PhaseBit::Phase45, true)?;
//!     pulsar.set_parameter("phase_90", "on")?;
//!     println!("Phase: {:.1}°", pulsar.phase_degrees());
//!
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use serde_json::json;
use std::io::{Read, Write};
use std::time::Instant;
use tracing::{debug, error, info};

#[cfg(feature = "instrument_serial")]
use crate::config::PulsarConfig;
use crate::error::{AppResult, PulsarError};
use crate::parameter;
use crate::phase::{OnOff, PhaseBit, PhaseMask};
#[cfg(feature = "instrument_serial")]
use crate::transport::{open_serial, SerialTransport};
use crate::transport::Transport;

/// Identification record reported by the driver.
///
/// The Pulsar has no identification command; these values are constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Serial number
    pub serial: u32,
    /// Hardware revision
    pub hardware_version: u32,
}

/// Identity reported for every Pulsar.
pub const PULSAR_IDENTITY: Identity = Identity {
    serial: 1234,
    hardware_version: 4321,
};

/// Driver for one Pulsar phase shifter.
///
/// Single-owner and blocking: each mutating call holds `&mut self` for the
/// whole write-and-echo round trip.
pub struct PhaseShifter<T: Transport> {
    /// Instrument name used in logs and snapshots
    name: String,
    transport: T,
    /// Last mask written to the device
    mask: PhaseMask,
}

#[cfg(feature = "instrument_serial")]
impl PhaseShifter<SerialTransport> {
    /// Open the serial port named in `config` and initialise the device.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid, the serial port cannot
    /// be opened, or the initial write is not echoed correctly.
    pub fn open(config: &PulsarConfig) -> AppResult<Self> {
        config.validate()?;
        let port = open_serial(&config.serial)?;
        Self::with_transport(config.application.name.clone(), port)
    }
}

impl<T: Transport> PhaseShifter<T> {
    /// Initialise a Pulsar reachable through `transport`.
    ///
    /// Writes an all-off mask and verifies the echo, then logs the connect
    /// message.
    pub fn with_transport(name: impl Into<String>, transport: T) -> AppResult<Self> {
        let started = Instant::now();
        let mut driver = Self {
            name: name.into(),
            transport,
            mask: PhaseMask::EMPTY,
        };

        driver.sync_to_device()?;
        driver.connect_message(started);
        Ok(driver)
    }

    /// Instrument name used in logs and snapshots.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constant identification record; not read from the hardware.
    pub fn identity(&self) -> Identity {
        PULSAR_IDENTITY
    }

    /// Current mask as last confirmed by the device (or as attempted, after
    /// a fatal error).
    pub fn mask(&self) -> PhaseMask {
        self.mask
    }

    /// Total phase shift currently switched in, in degrees.
    pub fn phase_degrees(&self) -> f64 {
        self.mask.phase_degrees()
    }

    /// Switch one phase bit in or out and synchronise the device.
    ///
    /// Repeated calls with the same value still perform a full round trip.
    ///
    /// # Errors
    /// [`PulsarError::EchoMismatch`] if the device echoes a different byte,
    /// or [`PulsarError::Io`] if the write or the echo read fails. The
    /// in-memory mask keeps the new value in both cases and the device
    /// state is unconfirmed, so the error is fatal
    /// ([`PulsarError::is_fatal`]) and the driver must not be used further.
    pub fn set_bit(&mut self, bit: PhaseBit, enabled: bool) -> AppResult<()> {
        self.mask.set(bit, enabled);
        self.sync_to_device()
    }

    /// State of one phase bit from the in-memory mask. No device access.
    pub fn get_bit(&self, bit: PhaseBit) -> OnOff {
        self.mask.state(bit)
    }

    /// Set a control by name from its string value (`"on"` / `"off"`).
    ///
    /// The name and value are validated before the mask changes.
    pub fn set_parameter(&mut self, name: &str, value: &str) -> AppResult<()> {
        let bit = parameter::lookup(name)?;
        let value = parameter::validate_value(name, value)?;
        self.set_bit(bit, value.is_on())
    }

    /// Read a control by name.
    pub fn get_parameter(&self, name: &str) -> AppResult<OnOff> {
        let bit = parameter::lookup(name)?;
        Ok(self.get_bit(bit))
    }

    /// JSON snapshot of the driver state.
    pub fn snapshot(&self) -> serde_json::Value {
        let parameters: serde_json::Map<String, serde_json::Value> = PhaseBit::ALL
            .into_iter()
            .map(|bit| (bit.name().to_string(), json!(self.get_bit(bit))))
            .collect();

        json!({
            "name": self.name,
            "identity": self.identity(),
            "mask": self.mask.bits(),
            "phase_degrees": self.phase_degrees(),
            "parameters": parameters,
        })
    }

    /// Release the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Write the mask and verify the device echoes the same byte.
    ///
    /// Input left over from an earlier round trip, such as an echo that
    /// arrived after a read timeout, is discarded first.
    fn sync_to_device(&mut self) -> AppResult<()> {
        let sent = self.mask.bits();
        self.transport.discard_input()?;
        self.transport.write_all(&[sent])?;
        self.transport.flush()?;
        debug!("[{}] Sent mask: 0x{:02X}", self.name, sent);

        let mut echo = [0u8; 1];
        self.transport.read_exact(&mut echo)?;
        let received = echo[0];
        debug!("[{}] Received echo: 0x{:02X}", self.name, received);

        if received != sent {
            error!(
                "[{}] Echo mismatch (sent 0x{:02X}, received 0x{:02X}); device state unknown",
                self.name, sent, received
            );
            return Err(PulsarError::EchoMismatch { sent, received });
        }
        Ok(())
    }

    fn connect_message(&self, started: Instant) {
        let identity = self.identity();
        info!(
            "Connected to: {} (serial:{}, hardware_version:{}) in {:.2}s",
            self.name,
            identity.serial,
            identity.hardware_version,
            started.elapsed().as_secs_f64()
        );
    }
}
