use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::world::Dir;

/// One room's record in a serialized map file.
///
/// A map file is a JSON object keyed by room id (JSON object keys are
/// strings, so ids are written as `"0"`, `"1"`, ...):
///
/// ```json
/// {
///   "0": { "coordinates": [0, 1], "exits": { "e": 1, "s": 3 } },
///   "1": { "exits": { "w": 0 } }
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Optional display hint; mazes produced by the generator always carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<(i64, i64)>,
    /// Direction token to adjacent room id.
    pub exits: BTreeMap<Dir, usize>,
}

/// A whole serialized map, keyed by room id.
pub type MapFile = BTreeMap<String, RoomRecord>;

/// Parses a map from JSON text.
pub fn from_json_str(s: &str) -> Result<MapFile> {
    serde_json::from_str(s).context("Failed to parse map JSON")
}

/// Reads and parses a map file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<MapFile> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read map file: {}", path.display()))?;
    from_json_str(&text)
}
