//! Instruction sequences and targeting entries.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::slot::DeviceSlot;

/// An ordered list of commands bound to one launcher.
///
/// Order is part of the aim: commands must be executed exactly as listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionSequence {
    /// Launcher the sequence is written for.
    pub slot: DeviceSlot,
    /// Commands in execution order.
    pub commands: Vec<Command>,
}

impl InstructionSequence {
    /// Creates a sequence for `slot`.
    pub fn new(slot: DeviceSlot, commands: Vec<Command>) -> Self {
        Self { slot, commands }
    }

    /// Number of commands in the sequence.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if the sequence has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterates over the commands in order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }
}

/// A person the launchers know how to aim at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Identifier as written in the targeting table (matched case-insensitively).
    pub key: String,
    /// The aiming sequence, including the launcher it runs on.
    pub sequence: InstructionSequence,
}

impl TargetEntry {
    /// Creates a target entry.
    pub fn new(key: impl Into<String>, slot: DeviceSlot, commands: Vec<Command>) -> Self {
        Self {
            key: key.into(),
            sequence: InstructionSequence::new(slot, commands),
        }
    }

    /// Launcher this target is bound to.
    pub fn slot(&self) -> DeviceSlot {
        self.sequence.slot
    }

    /// Case-insensitive key comparison.
    pub fn matches(&self, identifier: &str) -> bool {
        self.key.to_lowercase() == identifier.to_lowercase()
    }
}
