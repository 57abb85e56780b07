//! Target resolution.

use std::collections::HashMap;

use tracing::debug;

use retaliation_models::{DeviceSlot, TargetEntry};

use crate::error::TargetError;

/// Looks users up in the targeting table.
///
/// The table is small (one entry per developer), so lookup is a linear scan
/// with case-insensitive comparison.
#[derive(Debug, Clone, Default)]
pub struct TargetResolver {
    entries: Vec<TargetEntry>,
}

impl TargetResolver {
    /// Builds a resolver from both device tables.
    ///
    /// # Errors
    ///
    /// Returns `TargetError::DuplicateTarget` if two entries share a key,
    /// ignoring case, whether on the same launcher or on different ones.
    pub fn new(entries: Vec<TargetEntry>) -> Result<Self, TargetError> {
        let mut seen: HashMap<String, DeviceSlot> = HashMap::new();

        for entry in &entries {
            if let Some(first) = seen.insert(entry.key.to_lowercase(), entry.slot()) {
                return Err(TargetError::DuplicateTarget {
                    key: entry.key.clone(),
                    first,
                    second: entry.slot(),
                });
            }
        }

        debug!(targets = entries.len(), "targeting table loaded");
        Ok(Self { entries })
    }

    /// Finds the entry for `identifier`, ignoring case.
    pub fn resolve(&self, identifier: &str) -> Option<&TargetEntry> {
        let identifier = identifier.trim();
        self.entries.iter().find(|entry| entry.matches(identifier))
    }

    /// Every known target.
    pub fn entries(&self) -> &[TargetEntry] {
        &self.entries
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no targets are defined.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
