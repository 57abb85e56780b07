//! Logical device slots.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the two independently addressed launchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceSlot {
    /// Device 1.
    One,
    /// Device 2.
    Two,
}

/// Error returned when a slot number is not 1 or 2.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid device slot '{0}': expected 1 or 2")]
pub struct SlotParseError(pub String);

impl DeviceSlot {
    /// Both slots, in order.
    pub const ALL: [DeviceSlot; 2] = [DeviceSlot::One, DeviceSlot::Two];

    /// Zero-based index into per-slot storage.
    pub fn index(self) -> usize {
        match self {
            DeviceSlot::One => 0,
            DeviceSlot::Two => 1,
        }
    }

    /// The human-facing slot number.
    pub fn number(self) -> u8 {
        match self {
            DeviceSlot::One => 1,
            DeviceSlot::Two => 2,
        }
    }
}

impl TryFrom<u8> for DeviceSlot {
    type Error = SlotParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DeviceSlot::One),
            2 => Ok(DeviceSlot::Two),
            other => Err(SlotParseError(other.to_string())),
        }
    }
}

impl FromStr for DeviceSlot {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(DeviceSlot::One),
            "2" => Ok(DeviceSlot::Two),
            other => Err(SlotParseError(other.to_string())),
        }
    }
}

impl fmt::Display for DeviceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device {}", self.number())
    }
}
