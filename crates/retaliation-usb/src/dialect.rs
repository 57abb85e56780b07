//! Wire dialects spoken by the two launcher families.
//!
//! Both families accept the same one-byte command flags but frame them
//! differently:
//!
//! | Family   | `wValue` | Payload                         | LED |
//! |----------|----------|---------------------------------|-----|
//! | Thunder  | `0`      | `[0x02, cmd, 0, 0, 0, 0, 0, 0]` | yes |
//! | Original | `0x0200` | `[cmd]`                         | no  |
//!
//! Only one dialect is active per process; it is chosen at discovery.

use std::fmt;

use retaliation_models::Direction;

use crate::transfer::ControlTransfer;

/// Report prefix for motion and fire commands on Thunder devices.
const THUNDER_COMMAND_REPORT: u8 = 0x02;

/// Report prefix for LED commands on Thunder devices.
const THUNDER_LED_REPORT: u8 = 0x03;

/// Length of a Thunder report.
const THUNDER_REPORT_LEN: usize = 8;

/// `wValue` used by original launchers.
const ORIGINAL_REPORT_VALUE: u16 = 0x0200;

/// Command flag bytes shared by both families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandByte {
    Down = 0x01,
    Up = 0x02,
    Left = 0x04,
    Right = 0x08,
    Fire = 0x10,
    Stop = 0x20,
}

impl CommandByte {
    /// Raw flag value.
    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl From<Direction> for CommandByte {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => CommandByte::Up,
            Direction::Down => CommandByte::Down,
            Direction::Left => CommandByte::Left,
            Direction::Right => CommandByte::Right,
        }
    }
}

/// Wire dialect of the attached launcher family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Dream Cheeky Thunder: 8-byte reports, has an LED.
    Thunder,
    /// The original USB launcher: bare command byte, no LED.
    Original,
}

impl Dialect {
    /// Encodes a motion, fire or stop command.
    pub fn command_transfer(self, command: CommandByte) -> ControlTransfer {
        match self {
            Dialect::Thunder => {
                ControlTransfer::set_report(0, thunder_report(THUNDER_COMMAND_REPORT, command.bits()))
            }
            Dialect::Original => {
                ControlTransfer::set_report(ORIGINAL_REPORT_VALUE, vec![command.bits()])
            }
        }
    }

    /// Encodes an LED command, or `None` if this family has no LED.
    pub fn led_transfer(self, on: bool) -> Option<ControlTransfer> {
        match self {
            Dialect::Thunder => Some(ControlTransfer::set_report(
                0,
                thunder_report(THUNDER_LED_REPORT, u8::from(on)),
            )),
            Dialect::Original => None,
        }
    }

    /// Whether this family has a controllable LED.
    pub fn has_led(self) -> bool {
        matches!(self, Dialect::Thunder)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Thunder => f.write_str("Thunder"),
            Dialect::Original => f.write_str("Original"),
        }
    }
}

fn thunder_report(prefix: u8, payload: u8) -> Vec<u8> {
    let mut report = vec![0u8; THUNDER_REPORT_LEN];
    report[0] = prefix;
    report[1] = payload;
    report
}

/// USB identity of a launcher family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub vendor_id: u16,
    pub product_id: u16,
    pub dialect: Dialect,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:04x}:{:04x})",
            self.dialect, self.vendor_id, self.product_id
        )
    }
}

/// Known launcher families, in the order discovery tries them.
pub const SIGNATURES: [Signature; 2] = [
    Signature {
        vendor_id: 0x2123,
        product_id: 0x1010,
        dialect: Dialect::Thunder,
    },
    Signature {
        vendor_id: 0x0a81,
        product_id: 0x0701,
        dialect: Dialect::Original,
    },
];
