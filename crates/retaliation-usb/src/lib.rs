//! USB plumbing for Retaliation.
//!
//! This crate owns everything that touches launcher hardware:
//! - Find the attached launchers and work out which family they belong to
//! - Encode commands in the wire dialect that family speaks
//! - Send control transfers to a specific device slot
//!
//! Exactly two launchers of the same family must be attached. Discovery
//! returns a [`RegistryHandle`] that owns both devices and the active
//! [`Dialect`]; callers pass it around explicitly.
//!
//! # Example
//!
//! ```no_run
//! use retaliation_models::DeviceSlot;
//! use retaliation_usb::{discover, CommandByte};
//!
//! let mut registry = discover().expect("launchers not attached");
//! let transfer = registry.dialect().command_transfer(CommandByte::Stop);
//! registry.device_mut(DeviceSlot::One).send(&transfer).unwrap();
//! ```
//!
//! # Testing Without Hardware
//!
//! Devices are driven through the [`LauncherHandle`] trait, so a registry
//! can be assembled from any handle with [`RegistryHandle::from_handles`].

pub mod dialect;
pub mod error;
pub mod handle;
pub mod registry;
pub mod transfer;

pub use dialect::{CommandByte, Dialect, Signature, SIGNATURES};
pub use error::{DeviceError, Result};
pub use handle::{LauncherHandle, UsbLauncher, TRANSFER_TIMEOUT};
pub use registry::{discover, select_family, Device, RegistryHandle};
pub use transfer::ControlTransfer;
