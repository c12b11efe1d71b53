//! Phase bit table and the in-memory register mirror.
//!
//! The Pulsar switches eight delay lines in or out. Each line adds a fixed
//! phase increment and is driven by one bit of a single register byte:
//!
//! | Control      | Mask | Increment |
//! |--------------|------|-----------|
//! | `phase_1_4`  | 0x01 | 1.4°      |
//! | `phase_2_8`  | 0x02 | 2.8°      |
//! | `phase_5_6`  | 0x04 | 5.6°      |
//! | `phase_11_2` | 0x08 | 11.2°     |
//! | `phase_22_5` | 0x10 | 22.5°     |
//! | `phase_45`   | 0x20 | 45°       |
//! | `phase_90`   | 0x40 | 90°       |
//! | `phase_180`  | 0x80 | 180°      |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PulsarError;

/// Immutable description of one phase bit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BitDefinition {
    /// Control name, e.g. `phase_45`
    pub name: &'static str,
    /// Register mask with exactly one bit set
    pub mask: u8,
    /// Phase increment in degrees
    pub degrees: f64,
}

/// The eight phase bits, ordered from the least significant bit.
pub static PHASE_BITS: [BitDefinition; 8] = [
    BitDefinition { name: "phase_1_4", mask: 0x01, degrees: 1.4 },
    BitDefinition { name: "phase_2_8", mask: 0x02, degrees: 2.8 },
    BitDefinition { name: "phase_5_6", mask: 0x04, degrees: 5.6 },
    BitDefinition { name: "phase_11_2", mask: 0x08, degrees: 11.2 },
    BitDefinition { name: "phase_22_5", mask: 0x10, degrees: 22.5 },
    BitDefinition { name: "phase_45", mask: 0x20, degrees: 45.0 },
    BitDefinition { name: "phase_90", mask: 0x40, degrees: 90.0 },
    BitDefinition { name: "phase_180", mask: 0x80, degrees: 180.0 },
];

/// One of the eight phase bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseBit {
    /// 1.4°, mask 0x01
    #[serde(rename = "phase_1_4")]
    Phase1_4,
    /// 2.8°, mask 0x02
    #[serde(rename = "phase_2_8")]
    Phase2_8,
    /// 5.6°, mask 0x04
    #[serde(rename = "phase_5_6")]
    Phase5_6,
    /// 11.2°, mask 0x08
    #[serde(rename = "phase_11_2")]
    Phase11_2,
    /// 22.5°, mask 0x10
    #[serde(rename = "phase_22_5")]
    Phase22_5,
    /// 45°, mask 0x20
    #[serde(rename = "phase_45")]
    Phase45,
    /// 90°, mask 0x40
    #[serde(rename = "phase_90")]
    Phase90,
    /// 180°, mask 0x80
    #[serde(rename = "phase_180")]
    Phase180,
}

impl PhaseBit {
    /// All bits, least significant first.
    pub const ALL: [PhaseBit; 8] = [
        PhaseBit::Phase1_4,
        PhaseBit::Phase2_8,
        PhaseBit::Phase5_6,
        PhaseBit::Phase11_2,
        PhaseBit::Phase22_5,
        PhaseBit::Phase45,
        PhaseBit::Phase90,
        PhaseBit::Phase180,
    ];

    /// Table entry for this bit.
    pub fn definition(self) -> &'static BitDefinition {
        &PHASE_BITS[self as usize]
    }

    /// Control name, e.g. `phase_90`.
    pub fn name(self) -> &'static str {
        self.definition().name
    }

    /// Register mask.
    pub fn mask(self) -> u8 {
        self.definition().mask
    }

    /// Phase increment in degrees.
    pub fn degrees(self) -> f64 {
        self.definition().degrees
    }
}

impl fmt::Display for PhaseBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PhaseBit {
    type Err = PulsarError;

    /// Accepts the control name (`phase_22_5`) or the bare key (`22_5`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.strip_prefix("phase_").unwrap_or(s);
        PhaseBit::ALL
            .into_iter()
            .find(|bit| bit.name().strip_prefix("phase_") == Some(key))
            .ok_or_else(|| PulsarError::UnknownBit(s.to_string()))
    }
}

/// On/off state of a single control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnOff {
    /// Phase increment switched in
    On,
    /// Phase increment switched out
    Off,
}

impl OnOff {
    /// Map the raw register value (1/0) to a control value.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(OnOff::On),
            0 => Some(OnOff::Off),
            _ => None,
        }
    }

    /// Raw register value: 1 for on, 0 for off.
    pub fn raw(self) -> u8 {
        match self {
            OnOff::On => 1,
            OnOff::Off => 0,
        }
    }

    /// True for [`OnOff::On`].
    pub fn is_on(self) -> bool {
        self == OnOff::On
    }

    /// `"on"` or `"off"`.
    pub fn as_str(self) -> &'static str {
        match self {
            OnOff::On => "on",
            OnOff::Off => "off",
        }
    }
}

impl From<bool> for OnOff {
    fn from(enabled: bool) -> Self {
        if enabled {
            OnOff::On
        } else {
            OnOff::Off
        }
    }
}

impl From<OnOff> for bool {
    fn from(value: OnOff) -> Self {
        value.is_on()
    }
}

impl fmt::Display for OnOff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse error for [`OnOff`]; the parameter name is filled in by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOnOff(pub String);

impl FromStr for OnOff {
    type Err = InvalidOnOff;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(OnOff::On),
            "off" => Ok(OnOff::Off),
            other => Err(InvalidOnOff(other.to_string())),
        }
    }
}

/// In-memory mirror of the device register.
///
/// Bit `i` set means phase increment `i` is switched in. Every mutation
/// recomputes the whole byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseMask(u8);

impl PhaseMask {
    /// All phases off.
    pub const EMPTY: PhaseMask = PhaseMask(0x00);

    /// Mask from a raw register byte.
    pub fn from_bits(bits: u8) -> Self {
        PhaseMask(bits)
    }

    /// Raw register byte.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Switch a bit in (OR) or out (AND with the 8-bit complement).
    pub fn set(&mut self, bit: PhaseBit, enabled: bool) {
        if enabled {
            self.0 |= bit.mask();
        } else {
            self.0 &= !bit.mask();
        }
    }

    /// True if `bit` is switched in.
    pub fn is_set(self, bit: PhaseBit) -> bool {
        self.0 & bit.mask() != 0
    }

    /// State of `bit` as a control value.
    pub fn state(self, bit: PhaseBit) -> OnOff {
        OnOff::from(self.is_set(bit))
    }

    /// Bits currently switched in, least significant first.
    pub fn enabled_bits(self) -> impl Iterator<Item = PhaseBit> {
        PhaseBit::ALL.into_iter().filter(move |bit| self.is_set(*bit))
    }

    /// Total phase shift in degrees.
    pub fn phase_degrees(self) -> f64 {
        self.enabled_bits().map(PhaseBit::degrees).sum()
    }
}

impl FromIterator<PhaseBit> for PhaseMask {
    fn from_iter<I: IntoIterator<Item = PhaseBit>>(iter: I) -> Self {
        let mut mask = PhaseMask::EMPTY;
        for bit in iter {
            mask.set(bit, true);
        }
        mask
    }
}

impl fmt::Display for PhaseMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}
