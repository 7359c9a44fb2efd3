//! Declarative descriptor files.
//!
//! A descriptor file lists scalar typedefs and composite types in TOML.
//! Types may appear in any order; they are defined in dependency order when
//! the catalog is built.
//!
//! ```toml
//! [[typedef]]
//! name = "TW_STR32"
//! type = "int8[34]"
//!
//! [[type]]
//! name = "TW_CALLBACK"
//!
//! [[type.field]]
//! name = "CallBackProc"
//! type = "entry-proc"
//!
//! [[type.field]]
//! name = "RefCon"
//! select = { macos = "mem-ref", default = "uint32" }
//!
//! [[type.field]]
//! name = "Message"
//! type = "uint16"
//! ```
//!
//! A field is exactly one of `type` (a type expression), `select` (a kind per
//! OS family, with an optional `default`) or a list of `[[type.field.member]]`
//! tables forming a union.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use twlayout_targets::{OsFamily, PlatformProfile, PrimitiveKind};

use crate::catalog::{Catalog, Typedef};
use crate::descriptor::{FieldDescriptor, FieldType, PlatformSelect, TypeDescriptor};
use crate::error::{LayoutError, Result};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default, rename = "typedef")]
    typedefs: Vec<RawTypedef>,
    #[serde(default, rename = "type")]
    types: Vec<RawType>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTypedef {
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawType {
    name: String,
    #[serde(default, rename = "field")]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    name: String,
    #[serde(default, rename = "type")]
    ty: Option<String>,
    #[serde(default)]
    select: Option<BTreeMap<String, String>>,
    #[serde(default, rename = "member")]
    members: Vec<RawField>,
}

/// Parse typedefs and descriptors without resolving them.
pub fn parse_descriptors(toml_str: &str) -> Result<(Vec<Typedef>, Vec<TypeDescriptor>)> {
    let file: SchemaFile = toml::from_str(toml_str)?;

    let typedefs = file
        .typedefs
        .into_iter()
        .map(|t| -> Result<Typedef> {
            let ty = FieldType::parse(&t.ty).map_err(|detail| LayoutError::InvalidDescriptor {
                type_name: t.name.clone(),
                detail,
            })?;
            Ok(Typedef { name: t.name, ty })
        })
        .collect::<Result<Vec<_>>>()?;

    let types = file
        .types
        .into_iter()
        .map(|t| -> Result<TypeDescriptor> {
            let fields = t
                .fields
                .into_iter()
                .map(|f| convert_field(&t.name, f))
                .collect::<Result<Vec<_>>>()?;
            Ok(TypeDescriptor::new(t.name, fields))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((typedefs, types))
}

/// Parse a descriptor file and build a catalog for `profile`.
pub fn parse_catalog(toml_str: &str, profile: &PlatformProfile) -> Result<Catalog> {
    let (typedefs, types) = parse_descriptors(toml_str)?;
    log::debug!(
        "parsed {} typedefs and {} types from descriptor file",
        typedefs.len(),
        types.len()
    );
    Catalog::from_unordered(profile, typedefs, types)
}

/// Load a descriptor file and build a catalog for `profile`.
pub fn load_catalog(path: &Path, profile: &PlatformProfile) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)?;
    parse_catalog(&content, profile)
}

fn convert_field(type_name: &str, raw: RawField) -> Result<FieldDescriptor> {
    let invalid = |detail: String| LayoutError::InvalidDescriptor {
        type_name: type_name.to_string(),
        detail,
    };

    let ty = match (raw.ty, raw.select, raw.members.is_empty()) {
        (Some(expr), None, true) => FieldType::parse(&expr)
            .map_err(|e| invalid(format!("field '{}': {e}", raw.name)))?,
        (None, Some(select), true) => FieldType::Select(
            convert_select(select).map_err(|e| invalid(format!("field '{}': {e}", raw.name)))?,
        ),
        (None, None, false) => FieldType::Union(
            raw.members
                .into_iter()
                .map(|m| convert_field(type_name, m))
                .collect::<Result<Vec<_>>>()?,
        ),
        _ => {
            return Err(invalid(format!(
                "field '{}' needs exactly one of type, select or member",
                raw.name
            )))
        }
    };
    Ok(FieldDescriptor { name: raw.name, ty })
}

fn convert_select(map: BTreeMap<String, String>) -> std::result::Result<PlatformSelect, String> {
    let mut select = PlatformSelect {
        arms: Vec::new(),
        fallback: None,
    };
    for (key, value) in map {
        let kind: PrimitiveKind = value.parse()?;
        if key == "default" {
            select.fallback = Some(kind);
        } else {
            let family: OsFamily = key.parse().map_err(|e: twlayout_targets::TargetError| e.to_string())?;
            select.arms.push((family, kind));
        }
    }
    Ok(select)
}
