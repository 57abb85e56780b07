//! The targeting table.
//!
//! Targets come from a JSON file when one is configured, and from the
//! built-in table otherwise. The file mirrors how operators write the table
//! by hand, one map per launcher, each step a `[name, value]` pair:
//!
//! ```json
//! {
//!   "device1": { "tom": [["zero", 0], ["right", 4400], ["up", 200], ["fire", 4], ["zero", 0]] },
//!   "device2": { "leandro": [["zero", 0], ["fire", 3]] }
//! }
//! ```
//!
//! Steps with an unknown command name are reported and dropped; the rest of
//! the sequence is kept. Tables keep file order and repeated keys, so a
//! target written twice is caught by [`TargetResolver::new`].

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use retaliation_models::{Command, DeviceSlot, TargetEntry};

use crate::error::TargetError;
use crate::resolver::TargetResolver;

/// One `[name, value]` step as written in the table.
pub type RawStep = (String, i64);

/// One device's targets, in file order.
pub type DeviceTable = Vec<(String, Vec<RawStep>)>;

/// On-disk targeting table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFile {
    /// Targets aimed with launcher 1.
    #[serde(default, deserialize_with = "table_entries", serialize_with = "table_map")]
    pub device1: DeviceTable,
    /// Targets aimed with launcher 2.
    #[serde(default, deserialize_with = "table_entries", serialize_with = "table_map")]
    pub device2: DeviceTable,
}

/// Reads a JSON object as its list of entries, duplicates included.
fn table_entries<'de, D>(deserializer: D) -> Result<DeviceTable, D::Error>
where
    D: Deserializer<'de>,
{
    struct TableVisitor;

    impl<'de> Visitor<'de> for TableVisitor {
        type Value = DeviceTable;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of target names to [name, value] steps")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut table = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, Vec<RawStep>>()? {
                table.push(entry);
            }
            Ok(table)
        }
    }

    deserializer.deserialize_map(TableVisitor)
}

fn table_map<S>(table: &DeviceTable, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(table.iter().map(|(key, steps)| (key, steps)))
}

impl TargetFile {
    /// Converts the raw table into target entries.
    ///
    /// Unknown or malformed steps are logged and skipped.
    pub fn into_entries(self) -> Vec<TargetEntry> {
        let tables = [(DeviceSlot::One, self.device1), (DeviceSlot::Two, self.device2)];

        tables
            .into_iter()
            .flat_map(|(slot, table)| {
                table.into_iter().map(move |(key, steps)| {
                    let commands = parse_steps(&key, &steps);
                    TargetEntry::new(key, slot, commands)
                })
            })
            .collect()
    }
}

/// Parses a target's steps, dropping the ones that do not parse.
pub fn parse_steps<S: AsRef<str>>(key: &str, steps: &[(S, i64)]) -> Vec<Command> {
    steps
        .iter()
        .enumerate()
        .filter_map(|(position, (name, value))| {
            match Command::parse(name.as_ref(), *value) {
                Ok(command) => Some(command),
                Err(e) => {
                    warn!(target_key = %key, position, error = %e, "skipping step");
                    None
                }
            }
        })
        .collect()
}

/// Parses a targets file body.
pub fn parse_targets(json: &str) -> serde_json::Result<Vec<TargetEntry>> {
    let file: TargetFile = serde_json::from_str(json)?;
    Ok(file.into_entries())
}

/// Reads and parses a targets file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid JSON.
pub fn load_targets(path: &Path) -> Result<Vec<TargetEntry>, TargetError> {
    let json = fs::read_to_string(path).map_err(|source| TargetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_targets(&json).map_err(|source| TargetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds the resolver from `path`, or from the built-in table.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or defines the same
/// target twice.
pub fn load_resolver(path: Option<&Path>) -> Result<TargetResolver, TargetError> {
    let entries = match path {
        Some(path) => {
            debug!(path = %path.display(), "loading targets file");
            load_targets(path)?
        }
        None => {
            debug!("using built-in targeting table");
            default_targets()
        }
    };

    TargetResolver::new(entries)
}

type BuiltinTable = &'static [(&'static str, &'static [(&'static str, i64)])];

// Start and end every set with "zero" so the launcher is always parked at
// the bottom-left reference point.
const DEVICE1_TARGETS: BuiltinTable = &[
    (
        "wuhqureshi",
        &[
            ("zero", 0),
            ("led", 1),
            ("right", 3250),
            ("up", 240),
            ("fire", 4),
            ("led", 0),
            ("zero", 0),
        ],
    ),
    (
        "paul.ness",
        &[
            ("zero", 0),
            ("led", 1),
            ("right", 3250),
            ("zero", 0),
            ("right", 1850),
            ("up", 140),
            ("fire", 4),
            ("led", 0),
            ("zero", 0),
        ],
    ),
    (
        "tom",
        &[("zero", 0), ("right", 4400), ("up", 200), ("fire", 4), ("zero", 0)],
    ),
    (
        "phil",
        &[
            ("zero", 0),
            ("right", 5200),
            ("up", 500),
            ("pause", 5000),
            ("left", 2200),
            ("down", 500),
            ("fire", 1),
            ("zero", 0),
        ],
    ),
];

const DEVICE2_TARGETS: BuiltinTable = &[(
    "leandro",
    &[
        ("zero", 0),
        ("led", 1),
        ("right", 3250),
        ("up", 300),
        ("fire", 3),
        ("led", 0),
        ("zero", 0),
    ],
)];

/// The built-in targeting table.
pub fn default_targets() -> Vec<TargetEntry> {
    [(DeviceSlot::One, DEVICE1_TARGETS), (DeviceSlot::Two, DEVICE2_TARGETS)]
        .into_iter()
        .flat_map(|(slot, table)| {
            table
                .iter()
                .map(move |(key, steps)| TargetEntry::new(*key, slot, parse_steps(key, *steps)))
        })
        .collect()
}
