//! The native reference and its JSON snapshot form.
//!
//! A snapshot is the output of the native harness: sizes of the scalar
//! typedefs and sizes plus field offsets of the composite records, as the
//! platform's compiler computed them.
//!
//! ```json
//! {
//!   "types":   { "TW_UINT16": { "size": 2 } },
//!   "structs": { "TW_FIX32": { "size": 4, "offsets": { "Whole": 0, "Frac": 2 } } }
//! }
//! ```
//!
//! The harness wraps this object in a `"typedefs"` key; both forms load.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use twlayout_core::{Catalog, LayoutEngine};
use twlayout_targets::PlatformProfile;

use crate::error::{Result, VerifyError};

/// Ground truth for type sizes and field offsets.
pub trait ReferenceOracle {
    /// Native size of a typedef or record, if the oracle knows the type.
    fn native_size(&self, type_name: &str) -> Option<u64>;

    /// Native offset of a record field. `None` when the oracle does not
    /// report that field.
    fn native_field_offset(&self, type_name: &str, field: &str) -> Option<u64>;

    /// Field names the oracle reports offsets for in a record.
    fn native_field_names(&self, _type_name: &str) -> Vec<String> {
        Vec::new()
    }

    /// Typedef names the oracle reports.
    fn native_typedef_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Record names the oracle reports.
    fn native_record_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Size of a scalar typedef.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    pub size: u64,
}

/// Size and field offsets of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructEntry {
    pub size: u64,
    #[serde(default)]
    pub offsets: BTreeMap<String, u64>,
}

/// Oracle answers captured as data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSnapshot {
    #[serde(default)]
    pub types: BTreeMap<String, TypeEntry>,
    #[serde(default)]
    pub structs: BTreeMap<String, StructEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Wrapped { typedefs: OracleSnapshot },
    Plain(OracleSnapshot),
}

impl OracleSnapshot {
    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot = match serde_json::from_str::<SnapshotFile>(json)? {
            SnapshotFile::Wrapped { typedefs } => typedefs,
            SnapshotFile::Plain(snapshot) => snapshot,
        };
        log::debug!(
            "oracle snapshot: {} types, {} structs",
            snapshot.types.len(),
            snapshot.structs.len()
        );
        Ok(snapshot)
    }

    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(VerifyError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Capture the engine's answers for every typedef and record of a
    /// catalog, in the same shape the native harness produces.
    pub fn from_layouts(catalog: &Catalog, profile: &PlatformProfile) -> Result<Self> {
        let mut engine = LayoutEngine::new(profile, catalog);
        let mut snapshot = OracleSnapshot::default();

        for td in catalog.typedefs() {
            let shape = engine.field_shape(&td.name, &td.name, &td.ty)?;
            snapshot
                .types
                .insert(td.name.clone(), TypeEntry { size: shape.size });
        }
        for d in catalog.types() {
            let layout = engine.layout_of(&d.name)?;
            let offsets = layout
                .fields
                .iter()
                .map(|f| (f.name.clone(), f.offset))
                .collect();
            snapshot.structs.insert(
                d.name.clone(),
                StructEntry {
                    size: layout.size,
                    offsets,
                },
            );
        }
        Ok(snapshot)
    }
}

impl ReferenceOracle for OracleSnapshot {
    fn native_size(&self, type_name: &str) -> Option<u64> {
        self.structs
            .get(type_name)
            .map(|s| s.size)
            .or_else(|| self.types.get(type_name).map(|t| t.size))
    }

    fn native_field_offset(&self, type_name: &str, field: &str) -> Option<u64> {
        self.structs.get(type_name)?.offsets.get(field).copied()
    }

    fn native_field_names(&self, type_name: &str) -> Vec<String> {
        self.structs
            .get(type_name)
            .map(|s| s.offsets.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn native_typedef_names(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    fn native_record_names(&self) -> Vec<String> {
        self.structs.keys().cloned().collect()
    }
}
