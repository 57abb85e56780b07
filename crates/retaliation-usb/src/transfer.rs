//! Raw control transfers.

use std::fmt;

/// A host-to-device control transfer, exactly as it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlTransfer {
    /// `bmRequestType`.
    pub request_type: u8,
    /// `bRequest`.
    pub request: u8,
    /// `wValue`.
    pub value: u16,
    /// `wIndex`.
    pub index: u16,
    /// Payload bytes.
    pub data: Vec<u8>,
}

impl ControlTransfer {
    /// HID class request to an interface (`0x21`).
    pub const HID_CLASS_INTERFACE_OUT: u8 = 0x21;

    /// HID `SET_REPORT` (`0x09`).
    pub const SET_REPORT: u8 = 0x09;

    /// Builds a `SET_REPORT` transfer with the given `wValue` and payload.
    pub fn set_report(value: u16, data: Vec<u8>) -> Self {
        Self {
            request_type: Self::HID_CLASS_INTERFACE_OUT,
            request: Self::SET_REPORT,
            value,
            index: 0,
            data,
        }
    }
}

impl fmt::Display for ControlTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ctrl(0x{:02x}, 0x{:02x}, 0x{:04x}, {}) {:02x?}",
            self.request_type, self.request, self.value, self.index, self.data
        )
    }
}
