//! Device handles.

use std::time::Duration;

use rusb::{DeviceHandle, GlobalContext};
use tracing::{debug, trace};

use crate::transfer::ControlTransfer;
use crate::{DeviceError, Result};

/// How long a single control transfer may take.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_millis(1000);

/// Interface the launchers expose their HID report on.
const LAUNCHER_INTERFACE: u8 = 0;

/// Configuration activated on every launcher.
const LAUNCHER_CONFIGURATION: u8 = 1;

/// A connection to one physical launcher.
pub trait LauncherHandle {
    /// Sends a control transfer, returning the number of bytes written.
    fn write_control(&mut self, transfer: &ControlTransfer) -> Result<usize>;

    /// Short description for log fields (bus/address, or a test label).
    fn describe(&self) -> String;
}

/// A launcher opened through libusb.
pub struct UsbLauncher {
    handle: DeviceHandle<GlobalContext>,
    bus: u8,
    address: u8,
}

impl UsbLauncher {
    /// Opens a launcher and prepares it for control transfers.
    ///
    /// Where the platform allows it, the kernel HID driver is detached
    /// first. Failure to detach is ignored because the device is usually
    /// just not bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be opened or configured.
    pub fn open(device: rusb::Device<GlobalContext>) -> Result<Self> {
        let bus = device.bus_number();
        let address = device.address();
        debug!(bus, address, "opening launcher");

        let mut handle = device.open()?;

        if rusb::supports_detach_kernel_driver() {
            if let Err(e) = handle.detach_kernel_driver(LAUNCHER_INTERFACE) {
                debug!(bus, address, error = %e, "kernel driver not detached");
            }
        }

        handle
            .set_active_configuration(LAUNCHER_CONFIGURATION)
            .map_err(|source| DeviceError::Configure {
                bus,
                address,
                source,
            })?;

        Ok(Self {
            handle,
            bus,
            address,
        })
    }
}

impl LauncherHandle for UsbLauncher {
    fn write_control(&mut self, transfer: &ControlTransfer) -> Result<usize> {
        trace!(bus = self.bus, address = self.address, %transfer, "control transfer");
        self.handle
            .write_control(
                transfer.request_type,
                transfer.request,
                transfer.value,
                transfer.index,
                &transfer.data,
                TRANSFER_TIMEOUT,
            )
            .map_err(|source| DeviceError::Transfer {
                device: self.describe(),
                source,
            })
    }

    fn describe(&self) -> String {
        format!("usb {:03}:{:03}", self.bus, self.address)
    }
}
