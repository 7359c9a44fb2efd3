//! Aggregate layout: field offsets, sizes and alignments under a packing rule.
//!
//! Fields are placed in declaration order. Each field is aligned to
//! `min(natural, cap)` where the cap comes from the platform profile, and the
//! aggregate's size is padded to a multiple of the largest effective alignment
//! seen. Union members all start at the union's own offset. A union's size is
//! its largest member size and is not rounded up to the union's alignment, so
//! `{int8[3]; uint16}` is 3 bytes where a C compiler would give 4.

use serde::{Deserialize, Serialize};
use twlayout_targets::{PlatformProfile, PrimitiveKind};

use crate::cache::{CacheStats, LayoutCache};
use crate::catalog::Descriptors;
use crate::descriptor::{FieldDescriptor, FieldType, TypeDescriptor};
use crate::error::{LayoutError, Result};

/// Size and natural alignment of a field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    /// Size in bytes.
    pub size: u64,
    /// Natural alignment in bytes, before the packing cap.
    pub align: u64,
}

/// Placement of one field inside an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    pub name: String,
    /// Byte offset from the start of the aggregate.
    pub offset: u64,
    pub size: u64,
    /// Effective alignment (after the packing cap).
    pub align: u64,
    /// Enclosing union, for union members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Computed layout of a composite type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub type_name: String,
    /// Total size including trailing padding.
    pub size: u64,
    /// Largest effective member alignment.
    pub align: u64,
    /// Fields in declaration order. Union members follow their union.
    pub fields: Vec<FieldLayout>,
}

impl Layout {
    /// Look up a field (or union member) by name.
    pub fn field(&self, name: &str) -> Option<&FieldLayout> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Offset of a field (or union member).
    pub fn offset_of(&self, name: &str) -> Option<u64> {
        self.field(name).map(|f| f.offset)
    }

    /// Fields declared directly on the aggregate, skipping union members.
    pub fn top_level(&self) -> impl Iterator<Item = &FieldLayout> {
        self.fields.iter().filter(|f| f.parent.is_none())
    }

    pub fn shape(&self) -> Shape {
        Shape {
            size: self.size,
            align: self.align,
        }
    }
}

/// Computes layouts for one profile over one descriptor set, memoizing
/// nested results.
pub struct LayoutEngine<'a, D: Descriptors + ?Sized> {
    profile: &'a PlatformProfile,
    descriptors: &'a D,
    cache: LayoutCache,
    /// Descriptors currently being computed, outermost first.
    in_progress: Vec<String>,
}

impl<'a, D: Descriptors + ?Sized> LayoutEngine<'a, D> {
    pub fn new(profile: &'a PlatformProfile, descriptors: &'a D) -> Self {
        Self {
            profile,
            descriptors,
            cache: LayoutCache::new(),
            in_progress: Vec::new(),
        }
    }

    pub fn profile(&self) -> &PlatformProfile {
        self.profile
    }

    /// Layout of a named descriptor.
    pub fn layout_of(&mut self, name: &str) -> Result<Layout> {
        if let Some(layout) = self.cache.lookup(name) {
            return Ok(layout.clone());
        }
        let descriptors: &'a D = self.descriptors;
        let descriptor = descriptors
            .descriptor(name)
            .ok_or_else(|| LayoutError::UnknownType {
                name: name.to_string(),
            })?;
        self.compute(descriptor)
    }

    /// Layout of a descriptor, which need not be part of the descriptor set.
    ///
    /// Only layouts of descriptors from the set are cached, so a foreign
    /// descriptor sharing a name with a set member never shadows it.
    pub fn compute(&mut self, descriptor: &TypeDescriptor) -> Result<Layout> {
        if let Some(pos) = self.in_progress.iter().position(|n| *n == descriptor.name) {
            let mut cycle = self.in_progress[pos..].to_vec();
            cycle.push(descriptor.name.clone());
            return Err(LayoutError::CyclicDescriptor { cycle });
        }

        self.in_progress.push(descriptor.name.clone());
        let result = self.place_fields(descriptor);
        self.in_progress.pop();
        let layout = result?;

        log::debug!(
            "{} laid out: size {} align {} ({} fields)",
            layout.type_name,
            layout.size,
            layout.align,
            layout.fields.len()
        );
        let descriptors: &'a D = self.descriptors;
        if descriptors.descriptor(&descriptor.name) == Some(descriptor) {
            self.cache.store(layout.clone());
        }
        Ok(layout)
    }

    /// Size and natural alignment of a field kind.
    pub fn field_shape(&mut self, type_name: &str, field: &str, ty: &FieldType) -> Result<Shape> {
        match ty {
            FieldType::Primitive(kind) => self.scalar_shape(type_name, field, *kind),
            FieldType::Select(select) => {
                let kind = select.resolve(self.profile.os()).map_err(|detail| {
                    LayoutError::UnresolvedKind {
                        type_name: type_name.to_string(),
                        field: field.to_string(),
                        detail,
                    }
                })?;
                self.scalar_shape(type_name, field, kind)
            }
            FieldType::Array { element, count } => {
                let element = self.field_shape(type_name, field, element)?;
                let size = element.size.checked_mul(u64::from(*count)).ok_or_else(|| {
                    LayoutError::InvalidDescriptor {
                        type_name: type_name.to_string(),
                        detail: format!("field '{field}' overflows"),
                    }
                })?;
                Ok(Shape {
                    size,
                    align: element.align,
                })
            }
            FieldType::Nested(name) => {
                let descriptors: &'a D = self.descriptors;
                if let Some(layout) = self.cache.lookup(name) {
                    return Ok(layout.shape());
                }
                let nested = descriptors.descriptor(name).ok_or_else(|| {
                    LayoutError::UnresolvedKind {
                        type_name: type_name.to_string(),
                        field: field.to_string(),
                        detail: format!("'{name}' is not defined"),
                    }
                })?;
                Ok(self.compute(nested)?.shape())
            }
            FieldType::Union(members) => {
                // Largest member, without trailing padding to `align`.
                let mut size = 0;
                let mut align = 1;
                for m in members {
                    let s = self.field_shape(type_name, &m.name, &m.ty)?;
                    size = size.max(s.size);
                    align = align.max(self.profile.effective_align(s.align));
                }
                Ok(Shape { size, align })
            }
        }
    }

    /// Cache usage so far.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.statistics()
    }

    fn scalar_shape(&self, type_name: &str, field: &str, kind: PrimitiveKind) -> Result<Shape> {
        let scalar = self
            .profile
            .scalar(kind)
            .ok_or_else(|| LayoutError::UnresolvedKind {
                type_name: type_name.to_string(),
                field: field.to_string(),
                detail: format!("{kind} has no width on {}", self.profile),
            })?;
        Ok(Shape {
            size: scalar.bytes,
            align: scalar.align,
        })
    }

    fn place_fields(&mut self, descriptor: &TypeDescriptor) -> Result<Layout> {
        let mut cursor: u64 = 0;
        let mut max_align: u64 = 1;
        let mut fields = Vec::with_capacity(descriptor.fields.len());

        for field in &descriptor.fields {
            let shape = self.field_shape(&descriptor.name, &field.name, &field.ty)?;
            let align = self.profile.effective_align(shape.align);
            cursor = align_up(cursor, align);
            fields.push(FieldLayout {
                name: field.name.clone(),
                offset: cursor,
                size: shape.size,
                align,
                parent: None,
            });
            if let FieldType::Union(members) = &field.ty {
                self.place_members(&descriptor.name, &field.name, members, cursor, &mut fields)?;
            }
            cursor += shape.size;
            max_align = max_align.max(align);
        }

        Ok(Layout {
            type_name: descriptor.name.clone(),
            size: align_up(cursor, max_align),
            align: max_align,
            fields,
        })
    }

    /// Record every union member at the union's offset, recursively.
    fn place_members(
        &mut self,
        type_name: &str,
        union_name: &str,
        members: &[FieldDescriptor],
        offset: u64,
        out: &mut Vec<FieldLayout>,
    ) -> Result<()> {
        for m in members {
            let shape = self.field_shape(type_name, &m.name, &m.ty)?;
            out.push(FieldLayout {
                name: m.name.clone(),
                offset,
                size: shape.size,
                align: self.profile.effective_align(shape.align),
                parent: Some(union_name.to_string()),
            });
            if let FieldType::Union(inner) = &m.ty {
                self.place_members(type_name, &m.name, inner, offset, out)?;
            }
        }
        Ok(())
    }
}

/// Compute the layout of a single descriptor.
pub fn compute_layout<D: Descriptors + ?Sized>(
    descriptor: &TypeDescriptor,
    descriptors: &D,
    profile: &PlatformProfile,
) -> Result<Layout> {
    LayoutEngine::new(profile, descriptors).compute(descriptor)
}

/// Round `value` up to the next multiple of `align`.
fn align_up(value: u64, align: u64) -> u64 {
    if align == 0 {
        return value;
    }
    value.div_ceil(align) * align
}
