//! Abstract primitive kinds and their resolved scalar layouts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An abstract numeric or character kind.
///
/// The concrete width of a kind is not fixed: it is looked up in the
/// [`PlatformProfile`](crate::PlatformProfile) the layout is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveKind {
    Int8,
    #[serde(rename = "uint8")]
    UInt8,
    Int16,
    #[serde(rename = "uint16")]
    UInt16,
    /// Protocol 32-bit signed integer (declared `long` outside macOS).
    Int32,
    /// Protocol 32-bit unsigned integer (declared `unsigned long` outside macOS).
    #[serde(rename = "uint32")]
    UInt32,
    /// 16-bit boolean.
    Bool,
    /// Plain C `int`.
    CInt,
    /// Opaque handle.
    Handle,
    /// Untyped memory reference.
    MemRef,
    /// Unsigned integer sized by the processor word, per toolchain convention.
    #[serde(rename = "uint-ptr")]
    UIntPtr,
    /// Function pointer stored in an entry-point record.
    EntryProc,
}

impl PrimitiveKind {
    /// Every kind, in declaration order.
    pub const ALL: [PrimitiveKind; 12] = [
        PrimitiveKind::Int8,
        PrimitiveKind::UInt8,
        PrimitiveKind::Int16,
        PrimitiveKind::UInt16,
        PrimitiveKind::Int32,
        PrimitiveKind::UInt32,
        PrimitiveKind::Bool,
        PrimitiveKind::CInt,
        PrimitiveKind::Handle,
        PrimitiveKind::MemRef,
        PrimitiveKind::UIntPtr,
        PrimitiveKind::EntryProc,
    ];

    /// Whether the kind always has the platform's pointer width.
    pub fn is_pointer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Handle | PrimitiveKind::MemRef | PrimitiveKind::EntryProc
        )
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::UInt8 => "uint8",
            PrimitiveKind::Int16 => "int16",
            PrimitiveKind::UInt16 => "uint16",
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::UInt32 => "uint32",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::CInt => "c-int",
            PrimitiveKind::Handle => "handle",
            PrimitiveKind::MemRef => "mem-ref",
            PrimitiveKind::UIntPtr => "uint-ptr",
            PrimitiveKind::EntryProc => "entry-proc",
        };
        f.write_str(name)
    }
}

impl FromStr for PrimitiveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| format!("unknown primitive kind '{s}'"))
    }
}

/// Concrete size and natural alignment of a resolved kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scalar {
    /// Size in bytes.
    pub bytes: u64,
    /// Natural alignment in bytes, before any packing cap.
    pub align: u64,
}

impl Scalar {
    /// A scalar whose natural alignment equals its width.
    pub const fn natural(bytes: u64) -> Self {
        Self {
            bytes,
            align: bytes,
        }
    }
}
