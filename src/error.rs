//! Custom error types for the driver.
//!
//! `PulsarError` is the single error type returned by every fallible
//! operation in the crate. It separates three kinds of failure:
//!
//! - **Caller errors**: `UnknownBit`, `UnknownParameter`, `InvalidValue`
//!   and `MalformedAssignment` are raised before the in-memory mask is
//!   touched.
//! - **Integrity failures**: `EchoMismatch` means the byte echoed by the
//!   device differs from the byte just written. The driver's mask and the
//!   hardware register may have diverged, so the error is fatal; see
//!   [`PulsarError::is_fatal`].
//! - **Transport and configuration errors**: `Io`, `Serial` and `Config`
//!   carry the underlying error unchanged (`#[error(transparent)]`). An
//!   `Io` error can only come from a write-and-echo round trip, after the
//!   mask was already changed, so it is fatal as well.

use thiserror::Error;

/// Convenience alias for results using the driver error type.
pub type AppResult<T> = std::result::Result<T, PulsarError>;

/// Error type for every fallible driver operation.
#[derive(Error, Debug)]
pub enum PulsarError {
    /// Name does not match any phase bit
    #[error("Unknown phase bit: '{0}'")]
    UnknownBit(String),

    /// Name does not match any control
    #[error("Unknown parameter: '{0}'")]
    UnknownParameter(String),

    /// Control value other than `on` / `off`
    #[error("Invalid value '{value}' for parameter '{parameter}'. Must be one of: on, off")]
    InvalidValue {
        /// Control the value was given for
        parameter: String,
        /// Rejected value
        value: String,
    },

    /// Assignment not of the form `name=value`
    #[error("Malformed assignment '{0}': expected name=value")]
    MalformedAssignment(String),

    /// Device answered with a different byte than the one written
    #[error("Device echo mismatch: sent 0x{sent:02X}, received 0x{received:02X}")]
    EchoMismatch {
        /// Mask byte written
        sent: u8,
        /// Byte echoed back
        received: u8,
    },

    /// Read, write or timeout on the transport
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serial port could not be opened
    #[cfg(feature = "instrument_serial")]
    #[error(transparent)]
    Serial(#[from] serialport::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Loaded configuration is invalid
    #[error("Configuration validation error: {0}")]
    Configuration(String),
}

impl PulsarError {
    /// Returns true when the driver can no longer be trusted to mirror the
    /// hardware register and must be dropped.
    ///
    /// Covers echo mismatches and transport errors during a round trip:
    /// in both cases the mask was changed but the device never confirmed it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PulsarError::EchoMismatch { .. } | PulsarError::Io(_)
        )
    }
}

impl From<figment::Error> for PulsarError {
    fn from(err: figment::Error) -> Self {
        PulsarError::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PulsarError::EchoMismatch {
            sent: 0x20,
            received: 0x00,
        };
        assert_eq!(
            err.to_string(),
            "Device echo mismatch: sent 0x20, received 0x00"
        );

        let err = PulsarError::InvalidValue {
            parameter: "phase_45".into(),
            value: "maybe".into(),
        };
        assert!(err.to_string().contains("phase_45"));
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn test_unconfirmed_device_state_is_fatal() {
        assert!(PulsarError::EchoMismatch {
            sent: 1,
            received: 2
        }
        .is_fatal());
        assert!(PulsarError::Io(std::io::ErrorKind::TimedOut.into()).is_fatal());

        assert!(!PulsarError::UnknownBit("phase_7".into()).is_fatal());
        assert!(!PulsarError::MalformedAssignment("phase_90".into()).is_fatal());
        assert!(!PulsarError::Configuration("empty address".into()).is_fatal());
    }

    #[test]
    fn test_malformed_assignment_display() {
        let err = PulsarError::MalformedAssignment("phase_90".into());
        assert_eq!(
            err.to_string(),
            "Malformed assignment 'phase_90': expected name=value"
        );
    }

    #[test]
    fn test_io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "cable pulled");
        let err = PulsarError::from(io);
        assert_eq!(err.to_string(), "cable pulled");
    }
}
