//! Named on/off controls exposed by the driver.
//!
//! Each control is bound to one phase bit through the static table in
//! [`crate::phase`]; there are no per-control closures. Values are
//! validated here before the driver touches the mask: only the exact
//! strings `"on"` and `"off"` are accepted.

use serde::Serialize;

use crate::error::{AppResult, PulsarError};
use crate::phase::{OnOff, PhaseBit};

/// Accepted values for every control.
pub const VALID_VALUES: [&str; 2] = ["on", "off"];

/// Metadata describing one control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterInfo {
    /// Control name, e.g. `phase_45`
    pub name: &'static str,
    /// Display label
    pub label: &'static str,
    /// Register bit driven by the control
    pub mask: u8,
    /// Phase increment switched in when the control is on
    pub degrees: f64,
    /// Accepted values
    pub values: [&'static str; 2],
}

impl From<PhaseBit> for ParameterInfo {
    fn from(bit: PhaseBit) -> Self {
        Self {
            name: bit.name(),
            label: bit.name(),
            mask: bit.mask(),
            degrees: bit.degrees(),
            values: VALID_VALUES,
        }
    }
}

/// Metadata for all eight controls, least significant bit first.
pub fn all() -> impl Iterator<Item = ParameterInfo> {
    PhaseBit::ALL.into_iter().map(ParameterInfo::from)
}

/// Resolve a control name (`phase_45`) to its bit.
pub fn lookup(name: &str) -> AppResult<PhaseBit> {
    PhaseBit::ALL
        .into_iter()
        .find(|bit| bit.name() == name)
        .ok_or_else(|| PulsarError::UnknownParameter(name.to_string()))
}

/// Check a raw value for the control `name`.
pub fn validate_value(name: &str, raw: &str) -> AppResult<OnOff> {
    raw.parse::<OnOff>()
        .map_err(|invalid| PulsarError::InvalidValue {
            parameter: name.to_string(),
            value: invalid.0,
        })
}

/// Parse a `name=value` assignment, e.g. `phase_90=on`.
pub fn parse_assignment(assignment: &str) -> AppResult<(PhaseBit, OnOff)> {
    let (name, raw) = assignment
        .split_once('=')
        .ok_or_else(|| PulsarError::MalformedAssignment(assignment.to_string()))?;
    let name = name.trim();
    let bit = lookup(name)?;
    let value = validate_value(name, raw.trim())?;
    Ok((bit, value))
}
