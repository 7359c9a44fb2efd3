//! Layout validation against a reference oracle.
//!
//! Typedefs are checked first: a wrong scalar width otherwise shows up as
//! many unrelated record mismatches. Records are then compared by total size
//! and by every field offset the oracle reports, including fields the catalog
//! does not lay out. Disagreements are collected, never raised.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use twlayout_core::{Catalog, LayoutEngine};
use twlayout_targets::PlatformProfile;

use crate::error::Result;
use crate::oracle::ReferenceOracle;

/// Outcome for one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "kebab-case")]
pub enum Status {
    Match,
    /// Computed and native layouts differ.
    Mismatch(String),
    /// The catalog has the type but the oracle does not report it.
    Missing(String),
    /// The oracle reports a type the catalog does not have.
    Extra(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Match => write!(f, "match"),
            Status::Mismatch(detail) => write!(f, "MISMATCH: {detail}"),
            Status::Missing(detail) => write!(f, "missing: {detail}"),
            Status::Extra(detail) => write!(f, "extra: {detail}"),
        }
    }
}

/// Which table a type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Typedef,
    Record,
}

/// Validation result for one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationEntry {
    pub type_name: String,
    pub kind: EntryKind,
    #[serde(flatten)]
    pub status: Status,
}

impl ValidationEntry {
    fn new(type_name: &str, kind: EntryKind, status: Status) -> Self {
        if let Status::Mismatch(ref detail) = status {
            log::warn!("{type_name}: {detail}");
        }
        Self {
            type_name: type_name.to_string(),
            kind,
            status,
        }
    }
}

/// Compare every typedef and record of `catalog` against `oracle`.
///
/// Entries come back in order: typedefs, records, then types only the
/// oracle knows (as [`Status::Extra`]). Fails only if the catalog itself cannot be laid out.
pub fn validate_all(
    catalog: &Catalog,
    profile: &PlatformProfile,
    oracle: &dyn ReferenceOracle,
) -> Result<Vec<ValidationEntry>> {
    let mut engine = LayoutEngine::new(profile, catalog);
    let mut entries = Vec::with_capacity(catalog.typedefs().len() + catalog.len());

    for td in catalog.typedefs() {
        let computed = engine.field_shape(&td.name, &td.name, &td.ty)?.size;
        let status = match oracle.native_size(&td.name) {
            None => Status::Missing("not reported by the oracle".into()),
            Some(native) if native == computed => Status::Match,
            Some(native) => Status::Mismatch(format!("size {computed} (native {native})")),
        };
        entries.push(ValidationEntry::new(&td.name, EntryKind::Typedef, status));
    }

    for d in catalog.types() {
        let layout = engine.layout_of(&d.name)?;
        let status = match oracle.native_size(&d.name) {
            None => Status::Missing("not reported by the oracle".into()),
            Some(native) => {
                let mut problems = Vec::new();
                if native != layout.size {
                    problems.push(format!("size {} (native {native})", layout.size));
                }
                for f in &layout.fields {
                    if let Some(offset) = oracle.native_field_offset(&d.name, &f.name) {
                        if offset != f.offset {
                            problems.push(format!(
                                "{} at offset {} (native {offset})",
                                f.name, f.offset
                            ));
                        }
                    }
                }
                for name in oracle.native_field_names(&d.name) {
                    if layout.field(&name).is_none() {
                        let offset = oracle.native_field_offset(&d.name, &name).unwrap_or_default();
                        problems.push(format!("{name} not laid out (native offset {offset})"));
                    }
                }
                if problems.is_empty() {
                    Status::Match
                } else {
                    Status::Mismatch(problems.join("; "))
                }
            }
        };
        entries.push(ValidationEntry::new(&d.name, EntryKind::Record, status));
    }

    let known: HashSet<&str> = catalog
        .typedefs()
        .iter()
        .map(|t| t.name.as_str())
        .chain(catalog.types().iter().map(|d| d.name.as_str()))
        .collect();
    let oracle_only = oracle
        .native_typedef_names()
        .into_iter()
        .map(|name| (name, EntryKind::Typedef))
        .chain(
            oracle
                .native_record_names()
                .into_iter()
                .map(|name| (name, EntryKind::Record)),
        );
    for (name, kind) in oracle_only {
        if !known.contains(name.as_str()) {
            entries.push(ValidationEntry::new(
                &name,
                kind,
                Status::Extra("not in the catalog".into()),
            ));
        }
    }

    let mismatched = entries
        .iter()
        .filter(|e| matches!(e.status, Status::Mismatch(_)))
        .count();
    log::info!(
        "validated {} types on {profile}: {mismatched} mismatched",
        entries.len()
    );
    Ok(entries)
}
