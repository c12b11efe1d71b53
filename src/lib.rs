//! Driver library for the Pulsar 8-bit phase shifter.
//!
//! The Pulsar switches eight binary-weighted delay lines (1.4° to 180°)
//! selected by a single register byte sent over a serial line. This crate
//! keeps the register mirrored in memory, writes it on every change and
//! verifies the device echo.
//!
//! - [`phase`]: bit table, [`PhaseMask`](phase::PhaseMask) and on/off values
//! - [`driver`]: [`PhaseShifter`](driver::PhaseShifter)
//! - [`parameter`]: named control surface and value validation
//! - [`transport`]: serial and mock byte transports
//! - [`config`]: Figment-based settings
//! - [`error`]: [`PulsarError`](error::PulsarError)
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod parameter;
pub mod phase;
pub mod transport;

pub use driver::{Identity, PhaseShifter, PULSAR_IDENTITY};
pub use error::{AppResult, PulsarError};
pub use phase::{OnOff, PhaseBit, PhaseMask, PHASE_BITS};
