//! Error types for launcher hardware access.

use thiserror::Error;

/// Errors that can occur while talking to launcher hardware.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Fewer than two launchers of a single family are attached.
    #[error("missile launchers not found: {0}")]
    DeviceNotFound(String),

    /// The device could not be switched to its default configuration.
    #[error("failed to configure launcher at bus {bus} address {address}: {source}")]
    Configure {
        bus: u8,
        address: u8,
        #[source]
        source: rusb::Error,
    },

    /// A control transfer was rejected or timed out.
    #[error("control transfer to {device} failed: {source}")]
    Transfer {
        device: String,
        #[source]
        source: rusb::Error,
    },

    /// Any other libusb failure (enumeration, open).
    #[error("usb error: {0}")]
    Usb(#[from] rusb::Error),
}

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, DeviceError>;
