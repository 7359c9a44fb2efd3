//! Field kinds and composite type descriptors.
//!
//! Descriptors are declarative: an ordered field list whose order is the
//! declaration order of the external header. Offsets are never stored here;
//! they are derived by the [`layout`](crate::layout) engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use twlayout_targets::{OsFamily, PrimitiveKind};

/// The kind of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// A primitive kind resolved through the platform profile.
    Primitive(PrimitiveKind),
    /// A primitive kind chosen per OS family. Must be resolved to
    /// [`FieldType::Primitive`] before layout.
    Select(PlatformSelect),
    /// A fixed-size array. `count` is at least 1; a trailing array of one
    /// element keeps its nominal length.
    Array { element: Box<FieldType>, count: u32 },
    /// Another descriptor, by name.
    Nested(String),
    /// Overlapping members sharing one starting offset. Sized by the largest
    /// member, without padding up to the union's alignment.
    Union(Vec<FieldDescriptor>),
}

impl FieldType {
    /// Fixed-size array of `count` elements.
    pub fn array(element: FieldType, count: u32) -> Self {
        FieldType::Array {
            element: Box::new(element),
            count,
        }
    }

    /// Reference to a previously defined descriptor.
    pub fn nested(name: impl Into<String>) -> Self {
        FieldType::Nested(name.into())
    }

    /// Union of the given members.
    pub fn union(members: Vec<FieldDescriptor>) -> Self {
        FieldType::Union(members)
    }

    /// Parse a type expression: a primitive kind name or a type name,
    /// followed by zero or more `[N]` dimensions.
    ///
    /// `T[a][b]` is an array of `a` elements, each an array of `b` `T`s,
    /// following C declarator order.
    ///
    /// Examples:
    /// - `"uint16"`
    /// - `"int8[34]"`
    /// - `"TW_FIX32[3][3]"`
    pub fn parse(expr: &str) -> Result<Self, String> {
        let expr = expr.trim();
        let base_end = expr.find('[').unwrap_or(expr.len());
        let base = expr[..base_end].trim();
        if base.is_empty() {
            return Err(format!("missing base type in '{expr}'"));
        }
        if !base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(format!("invalid type name '{base}'"));
        }

        let mut dims = Vec::new();
        let mut rest = &expr[base_end..];
        while !rest.is_empty() {
            let inner = rest
                .strip_prefix('[')
                .ok_or_else(|| format!("expected '[' in '{expr}'"))?;
            let close = inner
                .find(']')
                .ok_or_else(|| format!("missing ']' in '{expr}'"))?;
            let count: u32 = inner[..close]
                .trim()
                .parse()
                .map_err(|_| format!("invalid array length '{}' in '{expr}'", &inner[..close]))?;
            dims.push(count);
            rest = inner[close + 1..].trim_start();
        }

        let mut ty = match base.parse::<PrimitiveKind>() {
            Ok(kind) => FieldType::Primitive(kind),
            Err(_) => FieldType::Nested(base.to_string()),
        };
        // Innermost dimension binds first.
        for count in dims.into_iter().rev() {
            ty = FieldType::array(ty, count);
        }
        Ok(ty)
    }
}

impl From<PrimitiveKind> for FieldType {
    fn from(kind: PrimitiveKind) -> Self {
        FieldType::Primitive(kind)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Primitive(kind) => write!(f, "{kind}"),
            FieldType::Select(select) => write!(f, "{select}"),
            FieldType::Array { .. } => {
                let mut dims = Vec::new();
                let mut ty = self;
                while let FieldType::Array { element, count } = ty {
                    dims.push(*count);
                    ty = &**element;
                }
                write!(f, "{ty}")?;
                for count in dims {
                    write!(f, "[{count}]")?;
                }
                Ok(())
            }
            FieldType::Nested(name) => write!(f, "{name}"),
            FieldType::Union(members) => {
                write!(f, "union {{ ")?;
                for member in members {
                    write!(f, "{}: {}; ", member.name, member.ty)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A primitive kind that depends on the OS family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformSelect {
    /// Per-family choices.
    pub arms: Vec<(OsFamily, PrimitiveKind)>,
    /// Choice for families without an arm.
    #[serde(default)]
    pub fallback: Option<PrimitiveKind>,
}

impl PlatformSelect {
    /// `on_family` on `family`, `otherwise` everywhere else.
    pub fn on(family: OsFamily, on_family: PrimitiveKind, otherwise: PrimitiveKind) -> Self {
        Self {
            arms: vec![(family, on_family)],
            fallback: Some(otherwise),
        }
    }

    /// Pick exactly one kind for `os`.
    pub fn resolve(&self, os: OsFamily) -> Result<PrimitiveKind, String> {
        let matching: Vec<PrimitiveKind> = self
            .arms
            .iter()
            .filter(|(family, _)| *family == os)
            .map(|(_, kind)| *kind)
            .collect();
        match matching.as_slice() {
            [kind] => Ok(*kind),
            [] => self
                .fallback
                .ok_or_else(|| format!("no kind selected for {os}")),
            _ => Err(format!("{} kinds selected for {os}", matching.len())),
        }
    }
}

impl fmt::Display for PlatformSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "select(")?;
        for (i, (family, kind)) in self.arms.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{family}: {kind}")?;
        }
        if let Some(fallback) = self.fallback {
            if !self.arms.is_empty() {
                write!(f, ", ")?;
            }
            write!(f, "*: {fallback}")?;
        }
        write!(f, ")")
    }
}

/// A named field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// A composite type: a name and its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Names of the descriptors this one references directly, including
    /// through arrays and unions.
    pub fn dependencies(&self) -> Vec<&str> {
        fn walk<'a>(ty: &'a FieldType, out: &mut Vec<&'a str>) {
            match ty {
                FieldType::Nested(name) => {
                    if !out.contains(&name.as_str()) {
                        out.push(name);
                    }
                }
                FieldType::Array { element, .. } => walk(element, out),
                FieldType::Union(members) => {
                    for m in members {
                        walk(&m.ty, out);
                    }
                }
                FieldType::Primitive(_) | FieldType::Select(_) => {}
            }
        }

        let mut out = Vec::new();
        for field in &self.fields {
            walk(&field.ty, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_primitive() {
        assert_eq!(
            FieldType::parse("uint16").unwrap(),
            FieldType::Primitive(PrimitiveKind::UInt16)
        );
    }

    #[test]
    fn parse_string_array() {
        assert_eq!(
            FieldType::parse("int8[34]").unwrap(),
            FieldType::array(PrimitiveKind::Int8.into(), 34)
        );
    }

    #[test]
    fn parse_two_dimensions() {
        let ty = FieldType::parse("TW_FIX32[3][2]").unwrap();
        assert_eq!(
            ty,
            FieldType::array(FieldType::array(FieldType::nested("TW_FIX32"), 2), 3)
        );
        assert_eq!(ty.to_string(), "TW_FIX32[3][2]");
    }

    #[test]
    fn parse_errors() {
        assert!(FieldType::parse("").is_err());
        assert!(FieldType::parse("[3]").is_err());
        assert!(FieldType::parse("uint8[").is_err());
        assert!(FieldType::parse("uint8[x]").is_err());
        assert!(FieldType::parse("uint8[2]x").is_err());
        assert!(FieldType::parse("unsigned short").is_err());
    }

    #[test]
    fn select_resolution() {
        let select = PlatformSelect::on(OsFamily::MacOs, PrimitiveKind::MemRef, PrimitiveKind::UInt32);
        assert_eq!(select.resolve(OsFamily::MacOs), Ok(PrimitiveKind::MemRef));
        assert_eq!(select.resolve(OsFamily::Linux), Ok(PrimitiveKind::UInt32));
    }

    #[test]
    fn select_must_pick_exactly_one() {
        let none = PlatformSelect {
            arms: vec![(OsFamily::MacOs, PrimitiveKind::MemRef)],
            fallback: None,
        };
        assert!(none.resolve(OsFamily::Windows).is_err());

        let both = PlatformSelect {
            arms: vec![
                (OsFamily::Linux, PrimitiveKind::Handle),
                (OsFamily::Linux, PrimitiveKind::UIntPtr),
            ],
            fallback: None,
        };
        assert!(both.resolve(OsFamily::Linux).is_err());
    }

    #[test]
    fn dependencies_walk_arrays_and_unions() {
        let ty = TypeDescriptor::new(
            "T",
            vec![
                FieldDescriptor::new("a", FieldType::array(FieldType::nested("A"), 3)),
                FieldDescriptor::new(
                    "u",
                    FieldType::union(vec![
                        FieldDescriptor::new("b", FieldType::nested("B")),
                        FieldDescriptor::new("a2", FieldType::nested("A")),
                    ]),
                ),
                FieldDescriptor::new("x", PrimitiveKind::UInt8),
            ],
        );
        assert_eq!(ty.dependencies(), vec!["A", "B"]);
    }

    #[test]
    fn display_union() {
        let ty = FieldType::union(vec![
            FieldDescriptor::new("ReturnCode", PrimitiveKind::UInt16),
            FieldDescriptor::new("CondCode", PrimitiveKind::UInt16),
        ]);
        assert_eq!(ty.to_string(), "union { ReturnCode: uint16; CondCode: uint16; }");
    }
}
