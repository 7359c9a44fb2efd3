//! Descriptor catalogs.
//!
//! A [`Catalog`] is an immutable, ordered set of descriptors resolved for one
//! platform profile. Construction goes through [`CatalogBuilder`], which only
//! accepts a descriptor once everything it references has been defined, so
//! a built catalog is always acyclic and free of platform-selected kinds.

use std::collections::HashMap;

use serde::Serialize;
use twlayout_targets::PlatformProfile;

use crate::descriptor::{FieldDescriptor, FieldType, TypeDescriptor};
use crate::error::{LayoutError, Result};

/// Lookup of descriptors by name.
pub trait Descriptors {
    fn descriptor(&self, name: &str) -> Option<&TypeDescriptor>;
}

impl Descriptors for [TypeDescriptor] {
    fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.iter().find(|d| d.name == name)
    }
}

impl Descriptors for Vec<TypeDescriptor> {
    fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.as_slice().descriptor(name)
    }
}

impl Descriptors for HashMap<String, TypeDescriptor> {
    fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.get(name)
    }
}

/// A named scalar typedef (a single field kind, such as a fixed string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Typedef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

/// An ordered, acyclic set of resolved descriptors.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    typedefs: Vec<Typedef>,
    types: Vec<TypeDescriptor>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    /// Descriptors in definition order.
    pub fn types(&self) -> &[TypeDescriptor] {
        &self.types
    }

    /// Scalar typedefs in definition order.
    pub fn typedefs(&self) -> &[Typedef] {
        &self.typedefs
    }

    /// Look up a typedef by name.
    pub fn typedef(&self, name: &str) -> Option<&Typedef> {
        self.typedefs.iter().find(|t| t.name == name)
    }

    /// Number of composite descriptors.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog holds no composite descriptors.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Build a catalog from descriptors in arbitrary order.
    ///
    /// Descriptors are defined in dependency order, keeping the given order
    /// among independent ones. A reference cycle is reported as
    /// [`LayoutError::CyclicDescriptor`].
    pub fn from_unordered(
        profile: &PlatformProfile,
        typedefs: Vec<Typedef>,
        descriptors: Vec<TypeDescriptor>,
    ) -> Result<Self> {
        let order = dependency_order(&descriptors)?;
        let mut slots: Vec<Option<TypeDescriptor>> = descriptors.into_iter().map(Some).collect();

        let mut builder = CatalogBuilder::new(profile);
        for td in typedefs {
            builder.typedef(td.name, td.ty)?;
        }
        for i in order {
            if let Some(d) = slots[i].take() {
                builder.define(d.name, d.fields)?;
            }
        }
        Ok(builder.build())
    }
}

impl Descriptors for Catalog {
    fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.get(name)
    }
}

/// Incremental, order-checked catalog construction.
#[derive(Debug)]
pub struct CatalogBuilder<'p> {
    profile: &'p PlatformProfile,
    catalog: Catalog,
}

impl<'p> CatalogBuilder<'p> {
    pub fn new(profile: &'p PlatformProfile) -> Self {
        Self {
            profile,
            catalog: Catalog {
                typedefs: Vec::new(),
                types: Vec::new(),
                index: HashMap::new(),
            },
        }
    }

    /// The profile descriptors are resolved against.
    pub fn profile(&self) -> &PlatformProfile {
        self.profile
    }

    /// Define a scalar typedef.
    pub fn typedef(&mut self, name: impl Into<String>, ty: impl Into<FieldType>) -> Result<&mut Self> {
        let name = name.into();
        if self.catalog.typedef(&name).is_some() {
            return Err(LayoutError::DuplicateType { name });
        }
        let ty = self.resolve(&name, &name, ty.into())?;
        self.catalog.typedefs.push(Typedef { name, ty });
        Ok(self)
    }

    /// Define a composite type. Every descriptor it references must already
    /// be defined.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Result<&mut Self> {
        let name = name.into();
        if self.catalog.index.contains_key(&name) {
            return Err(LayoutError::DuplicateType { name });
        }
        if fields.is_empty() {
            return Err(LayoutError::InvalidDescriptor {
                type_name: name,
                detail: "no fields".into(),
            });
        }

        let mut resolved = Vec::with_capacity(fields.len());
        for field in fields {
            if resolved.iter().any(|f: &FieldDescriptor| f.name == field.name) {
                return Err(LayoutError::InvalidDescriptor {
                    type_name: name,
                    detail: format!("duplicate field '{}'", field.name),
                });
            }
            let ty = self.resolve(&name, &field.name, field.ty)?;
            resolved.push(FieldDescriptor { name: field.name, ty });
        }

        log::debug!("defined {name} ({} fields)", resolved.len());
        self.catalog
            .index
            .insert(name.clone(), self.catalog.types.len());
        self.catalog.types.push(TypeDescriptor::new(name, resolved));
        Ok(self)
    }

    /// Finish construction.
    pub fn build(self) -> Catalog {
        self.catalog
    }

    /// Resolve platform-selected kinds and check references and bounds.
    fn resolve(&self, type_name: &str, field: &str, ty: FieldType) -> Result<FieldType> {
        match ty {
            FieldType::Primitive(_) => Ok(ty),
            FieldType::Select(select) => select
                .resolve(self.profile.os())
                .map(FieldType::Primitive)
                .map_err(|detail| LayoutError::UnknownFieldKind {
                    type_name: type_name.to_string(),
                    field: field.to_string(),
                    detail,
                }),
            FieldType::Array { element, count } => {
                if count == 0 {
                    return Err(LayoutError::InvalidDescriptor {
                        type_name: type_name.to_string(),
                        detail: format!("field '{field}' has array length 0"),
                    });
                }
                let element = self.resolve(type_name, field, *element)?;
                Ok(FieldType::array(element, count))
            }
            FieldType::Nested(reference) => {
                if self.catalog.index.contains_key(&reference) {
                    Ok(FieldType::Nested(reference))
                } else {
                    Err(LayoutError::UnknownFieldKind {
                        type_name: type_name.to_string(),
                        field: field.to_string(),
                        detail: format!("'{reference}' is not defined yet"),
                    })
                }
            }
            FieldType::Union(members) => {
                if members.is_empty() {
                    return Err(LayoutError::InvalidDescriptor {
                        type_name: type_name.to_string(),
                        detail: format!("union '{field}' has no members"),
                    });
                }
                let mut resolved = Vec::with_capacity(members.len());
                for m in members {
                    let ty = self.resolve(type_name, &m.name, m.ty)?;
                    resolved.push(FieldDescriptor { name: m.name, ty });
                }
                Ok(FieldType::Union(resolved))
            }
        }
    }
}

/// Kahn's algorithm over descriptor references, preferring declaration order.
fn dependency_order(descriptors: &[TypeDescriptor]) -> Result<Vec<usize>> {
    let index: HashMap<&str, usize> = descriptors
        .iter()
        .enumerate()
        .map(|(i, d)| (d.name.as_str(), i))
        .collect();
    if index.len() != descriptors.len() {
        let mut seen = std::collections::HashSet::new();
        for d in descriptors {
            if !seen.insert(d.name.as_str()) {
                return Err(LayoutError::DuplicateType {
                    name: d.name.clone(),
                });
            }
        }
    }

    // Unknown names are left for the builder to report.
    let deps: Vec<Vec<usize>> = descriptors
        .iter()
        .map(|d| {
            d.dependencies()
                .into_iter()
                .filter_map(|name| index.get(name).copied())
                .collect()
        })
        .collect();

    let mut in_degree: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut done = vec![false; descriptors.len()];
    let mut order = Vec::with_capacity(descriptors.len());

    while order.len() < descriptors.len() {
        let next = (0..descriptors.len()).find(|&i| !done[i] && in_degree[i] == 0);
        let Some(i) = next else {
            return Err(LayoutError::CyclicDescriptor {
                cycle: find_cycle(descriptors, &deps, &done),
            });
        };
        done[i] = true;
        order.push(i);
        for (j, d) in deps.iter().enumerate() {
            if !done[j] {
                in_degree[j] -= d.iter().filter(|&&k| k == i).count();
            }
        }
    }
    Ok(order)
}

/// Walk unfinished dependencies until a name repeats.
fn find_cycle(descriptors: &[TypeDescriptor], deps: &[Vec<usize>], done: &[bool]) -> Vec<String> {
    let Some(start) = (0..descriptors.len()).find(|&i| !done[i]) else {
        return Vec::new();
    };
    let mut path = vec![start];
    let mut current = start;
    loop {
        let Some(&next) = deps[current].iter().find(|&&k| !done[k]) else {
            break;
        };
        if let Some(pos) = path.iter().position(|&p| p == next) {
            let mut cycle: Vec<String> = path[pos..]
                .iter()
                .map(|&i| descriptors[i].name.clone())
                .collect();
            cycle.push(descriptors[next].name.clone());
            return cycle;
        }
        path.push(next);
        current = next;
    }
    path.iter().map(|&i| descriptors[i].name.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PlatformSelect;
    use twlayout_targets::{OsFamily, PrimitiveKind};

    fn linux64() -> PlatformProfile {
        PlatformProfile::resolve(OsFamily::Linux, 64, None).unwrap()
    }

    fn fix32() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("Whole", PrimitiveKind::Int16),
            FieldDescriptor::new("Frac", PrimitiveKind::UInt16),
        ]
    }

    #[test]
    fn define_in_dependency_order() {
        let profile = linux64();
        let mut b = CatalogBuilder::new(&profile);
        b.define("TW_FIX32", fix32()).unwrap();
        b.define(
            "TW_CIEPOINT",
            vec![
                FieldDescriptor::new("X", FieldType::nested("TW_FIX32")),
                FieldDescriptor::new("Y", FieldType::nested("TW_FIX32")),
            ],
        )
        .unwrap();
        let catalog = b.build();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.types()[1].name, "TW_CIEPOINT");
        assert!(catalog.get("TW_FIX32").is_some());
        assert!(catalog.get("TW_FRAME").is_none());
    }

    #[test]
    fn forward_reference_is_unknown_kind() {
        let profile = linux64();
        let mut b = CatalogBuilder::new(&profile);
        let err = b
            .define("TW_FRAME", vec![FieldDescriptor::new("Left", FieldType::nested("TW_FIX32"))])
            .unwrap_err();
        assert!(matches!(err, LayoutError::UnknownFieldKind { ref field, .. } if field == "Left"));
    }

    #[test]
    fn select_is_resolved_per_profile() {
        let select = FieldType::Select(PlatformSelect::on(
            OsFamily::MacOs,
            PrimitiveKind::MemRef,
            PrimitiveKind::UInt32,
        ));
        let fields = vec![FieldDescriptor::new("Id", select)];

        let profile = linux64();
        let mut b = CatalogBuilder::new(&profile);
        b.define("T", fields.clone()).unwrap();
        let linux = b.build();
        assert_eq!(
            linux.get("T").unwrap().fields[0].ty,
            FieldType::Primitive(PrimitiveKind::UInt32)
        );

        let mac = PlatformProfile::resolve(OsFamily::MacOs, 64, None).unwrap();
        let mut b = CatalogBuilder::new(&mac);
        b.define("T", fields).unwrap();
        assert_eq!(
            b.build().get("T").unwrap().fields[0].ty,
            FieldType::Primitive(PrimitiveKind::MemRef)
        );
    }

    #[test]
    fn unresolvable_select_fails() {
        let profile = linux64();
        let select = FieldType::Select(PlatformSelect {
            arms: vec![(OsFamily::MacOs, PrimitiveKind::MemRef)],
            fallback: None,
        });
        let mut b = CatalogBuilder::new(&profile);
        let err = b.define("T", vec![FieldDescriptor::new("RefCon", select)]).unwrap_err();
        assert!(matches!(err, LayoutError::UnknownFieldKind { .. }));
    }

    #[test]
    fn rejects_malformed_descriptors() {
        let profile = linux64();
        let mut b = CatalogBuilder::new(&profile);
        assert!(matches!(
            b.define("Empty", vec![]),
            Err(LayoutError::InvalidDescriptor { .. })
        ));
        assert!(matches!(
            b.define(
                "ZeroArray",
                vec![FieldDescriptor::new("a", FieldType::array(PrimitiveKind::UInt8.into(), 0))]
            ),
            Err(LayoutError::InvalidDescriptor { .. })
        ));
        assert!(matches!(
            b.define("EmptyUnion", vec![FieldDescriptor::new("u", FieldType::union(vec![]))]),
            Err(LayoutError::InvalidDescriptor { .. })
        ));
        assert!(matches!(
            b.define("Dup", [fix32(), fix32()].concat()),
            Err(LayoutError::InvalidDescriptor { .. })
        ));
        b.define("TW_FIX32", fix32()).unwrap();
        assert!(matches!(
            b.define("TW_FIX32", fix32()),
            Err(LayoutError::DuplicateType { .. })
        ));
    }

    #[test]
    fn typedefs() {
        let profile = linux64();
        let mut b = CatalogBuilder::new(&profile);
        b.typedef("TW_STR32", FieldType::array(PrimitiveKind::Int8.into(), 34))
            .unwrap()
            .typedef("TW_BOOL", PrimitiveKind::Bool)
            .unwrap();
        assert!(matches!(
            b.typedef("TW_BOOL", PrimitiveKind::UInt16),
            Err(LayoutError::DuplicateType { .. })
        ));
        let catalog = b.build();
        assert_eq!(catalog.typedefs().len(), 2);
        assert!(catalog.typedef("TW_STR32").is_some());
        assert!(catalog.is_empty());
    }

    #[test]
    fn unordered_input_is_sorted() {
        let profile = linux64();
        let frame = TypeDescriptor::new(
            "TW_FRAME",
            vec![
                FieldDescriptor::new("Left", FieldType::nested("TW_FIX32")),
                FieldDescriptor::new("Top", FieldType::nested("TW_FIX32")),
            ],
        );
        let fix = TypeDescriptor::new("TW_FIX32", fix32());
        let catalog = Catalog::from_unordered(&profile, vec![], vec![frame, fix]).unwrap();
        let names: Vec<&str> = catalog.types().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["TW_FIX32", "TW_FRAME"]);
    }

    #[test]
    fn unordered_cycle_is_reported() {
        let profile = linux64();
        let a = TypeDescriptor::new("A", vec![FieldDescriptor::new("b", FieldType::nested("B"))]);
        let b = TypeDescriptor::new("B", vec![FieldDescriptor::new("a", FieldType::nested("A"))]);
        let c = TypeDescriptor::new("C", vec![FieldDescriptor::new("x", PrimitiveKind::UInt8)]);
        let err = Catalog::from_unordered(&profile, vec![], vec![c, a, b]).unwrap_err();
        match err {
            LayoutError::CyclicDescriptor { cycle } => {
                assert_eq!(cycle, vec!["A", "B", "A"]);
            }
            other => panic!("expected CyclicDescriptor, got {other:?}"),
        }
    }

    #[test]
    fn unordered_self_reference_is_a_cycle() {
        let profile = linux64();
        let a = TypeDescriptor::new("A", vec![FieldDescriptor::new("a", FieldType::nested("A"))]);
        let err = Catalog::from_unordered(&profile, vec![], vec![a]).unwrap_err();
        assert!(matches!(err, LayoutError::CyclicDescriptor { ref cycle } if cycle == &["A", "A"]));
    }

    #[test]
    fn unordered_duplicate_names() {
        let profile = linux64();
        let a = TypeDescriptor::new("A", fix32());
        let err = Catalog::from_unordered(&profile, vec![], vec![a.clone(), a]).unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateType { .. }));
    }
}
