//! Launcher discovery and per-slot device ownership.

use std::fmt;

use rusb::GlobalContext;
use tracing::{debug, info, trace, warn};

use retaliation_models::DeviceSlot;

use crate::dialect::{Dialect, Signature, SIGNATURES};
use crate::handle::{LauncherHandle, UsbLauncher};
use crate::transfer::ControlTransfer;
use crate::{DeviceError, Result};

/// One launcher bound to a slot.
pub struct Device {
    slot: DeviceSlot,
    dialect: Dialect,
    handle: Box<dyn LauncherHandle>,
}

impl Device {
    /// Binds a handle to a slot.
    pub fn new(slot: DeviceSlot, dialect: Dialect, handle: Box<dyn LauncherHandle>) -> Self {
        Self {
            slot,
            dialect,
            handle,
        }
    }

    /// Slot this device answers to.
    pub fn slot(&self) -> DeviceSlot {
        self.slot
    }

    /// Dialect the device speaks.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Sends one control transfer.
    pub fn send(&mut self, transfer: &ControlTransfer) -> Result<usize> {
        self.handle.write_control(transfer)
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("slot", &self.slot)
            .field("dialect", &self.dialect)
            .field("handle", &self.handle.describe())
            .finish()
    }
}

/// Both launchers plus the dialect they share.
///
/// Returned by [`discover`] and owned by whoever drives the hardware.
#[derive(Debug)]
pub struct RegistryHandle {
    dialect: Dialect,
    devices: [Device; 2],
}

impl RegistryHandle {
    /// Builds a registry from two already-open handles.
    ///
    /// `first` becomes device 1 and `second` device 2.
    pub fn from_handles(
        dialect: Dialect,
        first: Box<dyn LauncherHandle>,
        second: Box<dyn LauncherHandle>,
    ) -> Self {
        Self {
            dialect,
            devices: [
                Device::new(DeviceSlot::One, dialect, first),
                Device::new(DeviceSlot::Two, dialect, second),
            ],
        }
    }

    /// The active wire dialect.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The device in `slot`.
    pub fn device(&self, slot: DeviceSlot) -> &Device {
        &self.devices[slot.index()]
    }

    /// Mutable access to the device in `slot`.
    pub fn device_mut(&mut self, slot: DeviceSlot) -> &mut Device {
        &mut self.devices[slot.index()]
    }
}

/// Picks the launcher family to drive.
///
/// `scan` lists the attached devices matching a signature. Signatures are
/// tried in [`SIGNATURES`] order and the first one with at least two devices
/// wins. A mixed pair (one device of each family) is not supported and is
/// reported as not found.
///
/// # Errors
///
/// Returns `DeviceError::DeviceNotFound` if no family has two devices, or
/// whatever error `scan` returns.
pub fn select_family<H, F>(mut scan: F) -> Result<(Dialect, Vec<H>)>
where
    F: FnMut(&Signature) -> Result<Vec<H>>,
{
    let mut counts = Vec::with_capacity(SIGNATURES.len());

    for signature in &SIGNATURES {
        let found = scan(signature)?;
        debug!(signature = %signature, count = found.len(), "scanned launcher family");

        if found.len() >= 2 {
            if found.len() > 2 {
                warn!(
                    signature = %signature,
                    count = found.len(),
                    "more than two launchers attached, using the first two"
                );
            }
            return Ok((signature.dialect, found));
        }

        counts.push(format!("{} x{}", signature, found.len()));
    }

    Err(DeviceError::DeviceNotFound(format!(
        "two launchers of one family are required, found {}",
        counts.join(", ")
    )))
}

/// Finds both launchers, opens them, and returns the registry.
///
/// # Errors
///
/// Returns `DeviceError::DeviceNotFound` when fewer than two launchers of a
/// known family are attached, or a libusb error if they cannot be opened
/// or configured.
pub fn discover() -> Result<RegistryHandle> {
    let (dialect, devices) = select_family(find_devices)?;

    let mut opened = devices.into_iter().take(2).map(UsbLauncher::open);
    let (first, second) = match (opened.next(), opened.next()) {
        (Some(first), Some(second)) => (first?, second?),
        _ => {
            return Err(DeviceError::DeviceNotFound(
                "launcher disappeared during discovery".to_string(),
            ))
        }
    };

    info!(dialect = %dialect, "launchers ready");
    Ok(RegistryHandle::from_handles(
        dialect,
        Box::new(first),
        Box::new(second),
    ))
}

fn find_devices(signature: &Signature) -> Result<Vec<rusb::Device<GlobalContext>>> {
    let mut found = Vec::new();

    for device in rusb::devices()?.iter() {
        let descriptor = match device.device_descriptor() {
            Ok(d) => d,
            Err(e) => {
                trace!(error = %e, "skipping device without descriptor");
                continue;
            }
        };

        if descriptor.vendor_id() == signature.vendor_id
            && descriptor.product_id() == signature.product_id
        {
            found.push(device);
        }
    }

    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::CommandByte;
    use std::sync::{Arc, Mutex};

    struct FakeHandle {
        label: &'static str,
        sent: Arc<Mutex<Vec<ControlTransfer>>>,
    }

    impl LauncherHandle for FakeHandle {
        fn write_control(&mut self, transfer: &ControlTransfer) -> Result<usize> {
            self.sent.lock().unwrap().push(transfer.clone());
            Ok(transfer.data.len())
        }

        fn describe(&self) -> String {
            self.label.to_string()
        }
    }

    fn scan_counts(thunder: usize, original: usize) -> impl FnMut(&Signature) -> Result<Vec<u8>> {
        move |sig: &Signature| {
            let n = match sig.dialect {
                Dialect::Thunder => thunder,
                Dialect::Original => original,
            };
            Ok(vec![0u8; n])
        }
    }

    #[test]
    fn test_select_prefers_thunder() {
        let (dialect, found) = select_family(scan_counts(2, 2)).unwrap();
        assert_eq!(dialect, Dialect::Thunder);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_select_falls_back_to_original() {
        let (dialect, _) = select_family(scan_counts(1, 2)).unwrap();
        assert_eq!(dialect, Dialect::Original);
    }

    #[test]
    fn test_select_fails_when_neither_family_has_two() {
        let err = select_family(scan_counts(1, 1)).unwrap_err();
        assert!(matches!(err, DeviceError::DeviceNotFound(_)));
        assert!(err.to_string().contains("Thunder (2123:1010) x1"));
        assert!(err.to_string().contains("Original (0a81:0701) x1"));
    }

    #[test]
    fn test_select_with_nothing_attached() {
        assert!(select_family(scan_counts(0, 0)).is_err());
    }

    #[test]
    fn test_select_keeps_extra_devices_for_caller() {
        let (_, found) = select_family(scan_counts(3, 0)).unwrap();
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_scan_error_propagates() {
        let result: Result<(Dialect, Vec<u8>)> =
            select_family(|_| Err(DeviceError::Usb(rusb::Error::Access)));
        assert!(matches!(result, Err(DeviceError::Usb(rusb::Error::Access))));
    }

    #[test]
    fn test_registry_routes_by_slot() {
        let one = Arc::new(Mutex::new(Vec::new()));
        let two = Arc::new(Mutex::new(Vec::new()));
        let mut registry = RegistryHandle::from_handles(
            Dialect::Original,
            Box::new(FakeHandle {
                label: "one",
                sent: Arc::clone(&one),
            }),
            Box::new(FakeHandle {
                label: "two",
                sent: Arc::clone(&two),
            }),
        );

        let stop = registry.dialect().command_transfer(CommandByte::Stop);
        registry.device_mut(DeviceSlot::Two).send(&stop).unwrap();

        assert!(one.lock().unwrap().is_empty());
        assert_eq!(two.lock().unwrap().as_slice(), &[stop]);
        assert_eq!(registry.device(DeviceSlot::One).slot(), DeviceSlot::One);
        assert_eq!(registry.device(DeviceSlot::Two).dialect(), Dialect::Original);
    }
}
