//! Platform rule table.
//!
//! Each [`PlatformRule`] maps one combination of environment facts
//! (OS family, word size, toolchain convention) to the scalar widths and the
//! packing rule the native compiler applies there. The table is data: adding
//! a platform means adding a row, never touching layout arithmetic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TargetError;
use crate::kind::{PrimitiveKind, Scalar};

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OsFamily {
    Windows,
    Linux,
    #[serde(rename = "macos")]
    MacOs,
}

impl OsFamily {
    /// The family of the running host, if it is one the rule table knows about.
    pub fn host() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(OsFamily::Windows)
        } else if cfg!(target_os = "linux") {
            Some(OsFamily::Linux)
        } else if cfg!(target_os = "macos") {
            Some(OsFamily::MacOs)
        } else {
            None
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Windows => write!(f, "windows"),
            OsFamily::Linux => write!(f, "linux"),
            OsFamily::MacOs => write!(f, "macos"),
        }
    }
}

impl FromStr for OsFamily {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win32" => Ok(OsFamily::Windows),
            "linux" => Ok(OsFamily::Linux),
            "macos" | "darwin" | "osx" => Ok(OsFamily::MacOs),
            other => Err(TargetError::Validation {
                detail: format!("unknown OS family '{other}' (expected windows, linux or macos)"),
            }),
        }
    }
}

/// Toolchain convention that produced the native binary.
///
/// The word-sized integer kind depends on this, not only on OS and word size,
/// and it cannot be recovered from portable runtime facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Toolchain {
    Msvc,
    Gnu,
    Apple,
}

impl fmt::Display for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Toolchain::Msvc => write!(f, "msvc"),
            Toolchain::Gnu => write!(f, "gnu"),
            Toolchain::Apple => write!(f, "apple"),
        }
    }
}

impl FromStr for Toolchain {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "msvc" => Ok(Toolchain::Msvc),
            "gnu" | "mingw" => Ok(Toolchain::Gnu),
            "apple" | "clang" => Ok(Toolchain::Apple),
            other => Err(TargetError::Validation {
                detail: format!("unknown toolchain '{other}' (expected msvc, gnu or apple)"),
            }),
        }
    }
}

/// Aggregate packing rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Packing {
    /// Members keep their natural alignment.
    Natural,
    /// No member may impose an alignment above this many bytes.
    Capped(u64),
}

impl Packing {
    /// Apply the cap to a natural alignment.
    pub fn cap(self, natural: u64) -> u64 {
        match self {
            Packing::Natural => natural,
            Packing::Capped(limit) => natural.min(limit),
        }
    }

    /// The cap, if any.
    pub fn limit(self) -> Option<u64> {
        match self {
            Packing::Natural => None,
            Packing::Capped(limit) => Some(limit),
        }
    }
}

impl fmt::Display for Packing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Packing::Natural => write!(f, "natural"),
            Packing::Capped(n) => write!(f, "pack({n})"),
        }
    }
}

/// Explicit scalar layout for one kind, overriding the derived default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScalarOverride {
    pub kind: PrimitiveKind,
    pub bytes: u64,
    /// Natural alignment; defaults to `bytes`.
    #[serde(default)]
    pub align: Option<u64>,
}

/// One row of the platform rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformRule {
    pub os: OsFamily,
    pub toolchain: Toolchain,
    /// Processor word size in bits (32 or 64).
    pub word_bits: u32,
    /// Packing cap in bytes; absent means natural alignment.
    #[serde(default)]
    pub pack: Option<u64>,
    /// Width of the protocol's 32-bit integer kinds (`long` or `int`).
    pub int32_bytes: u64,
    /// Width of the word-sized unsigned integer kind.
    pub uintptr_bytes: u64,
    /// Per-kind overrides applied after the derived defaults.
    #[serde(default, rename = "scalar", skip_serializing_if = "Vec::is_empty")]
    pub scalars: Vec<ScalarOverride>,
}

impl PlatformRule {
    /// Whether this rule applies to the given facts.
    pub fn matches(&self, os: OsFamily, word_bits: u32, toolchain: Option<Toolchain>) -> bool {
        self.os == os
            && self.word_bits == word_bits
            && toolchain.map_or(true, |t| t == self.toolchain)
    }

    /// The packing rule declared by this row.
    pub fn packing(&self) -> Packing {
        match self.pack {
            Some(n) => Packing::Capped(n),
            None => Packing::Natural,
        }
    }

    /// Pointer width in bytes.
    pub fn pointer_bytes(&self) -> u64 {
        u64::from(self.word_bits / 8)
    }

    /// Scalar layout of a kind under this rule.
    pub fn scalar(&self, kind: PrimitiveKind) -> Scalar {
        if let Some(o) = self.scalars.iter().rev().find(|o| o.kind == kind) {
            return Scalar {
                bytes: o.bytes,
                align: o.align.unwrap_or(o.bytes),
            };
        }
        let bytes = match kind {
            PrimitiveKind::Int8 | PrimitiveKind::UInt8 => 1,
            PrimitiveKind::Int16 | PrimitiveKind::UInt16 | PrimitiveKind::Bool => 2,
            PrimitiveKind::Int32 | PrimitiveKind::UInt32 => self.int32_bytes,
            PrimitiveKind::CInt => 4,
            PrimitiveKind::UIntPtr => self.uintptr_bytes,
            PrimitiveKind::Handle | PrimitiveKind::MemRef | PrimitiveKind::EntryProc => {
                self.pointer_bytes()
            }
        };
        Scalar::natural(bytes)
    }
}

/// Compact row used to spell out the built-in table.
struct Row(OsFamily, Toolchain, u32, Option<u64>, u64, u64);

/// Protocol header packing: `#pragma pack(2)` everywhere except Apple, which
/// declares `#pragma options align = power`.
const PACK2: Option<u64> = Some(2);

const BUILTIN: &[Row] = &[
    Row(OsFamily::Windows, Toolchain::Msvc, 32, PACK2, 4, 4),
    // The word-sized integer stays 4 bytes on 64-bit MSVC builds.
    Row(OsFamily::Windows, Toolchain::Msvc, 64, PACK2, 4, 4),
    Row(OsFamily::Windows, Toolchain::Gnu, 32, PACK2, 4, 4),
    Row(OsFamily::Windows, Toolchain::Gnu, 64, PACK2, 4, 8),
    Row(OsFamily::Linux, Toolchain::Gnu, 32, PACK2, 4, 4),
    Row(OsFamily::Linux, Toolchain::Gnu, 64, PACK2, 8, 8),
    Row(OsFamily::MacOs, Toolchain::Apple, 32, None, 4, 4),
    Row(OsFamily::MacOs, Toolchain::Apple, 64, None, 4, 8),
];

/// The built-in rule table.
pub fn builtin_rules() -> Vec<PlatformRule> {
    BUILTIN
        .iter()
        .map(|&Row(os, toolchain, word_bits, pack, int32_bytes, uintptr_bytes)| PlatformRule {
            os,
            toolchain,
            word_bits,
            pack,
            int32_bytes,
            uintptr_bytes,
            scalars: Vec::new(),
        })
        .collect()
}

/// Word size of the running host in bits.
pub fn host_word_bits() -> u32 {
    if cfg!(target_pointer_width = "64") {
        64
    } else {
        32
    }
}
