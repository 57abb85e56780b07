//! Core data models for Retaliation.
//!
//! This crate provides the types shared by every other Retaliation crate:
//! the symbolic launcher instruction set, the two device slots, targeting
//! entries, and the transient build-failure record produced by a status
//! source.

pub mod command;
pub mod event;
pub mod sequence;
pub mod slot;

// Re-export main types
pub use command::{
    effective_shots, Command, CommandParseError, Direction, MAX_SHOTS, PARK_DOWN_MS, PARK_LEFT_MS,
};
pub use event::{BuildEvent, BuildStatus};
pub use sequence::{InstructionSequence, TargetEntry};
pub use slot::{DeviceSlot, SlotParseError};
