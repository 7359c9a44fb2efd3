//! Resolved platform profile.
//!
//! A [`PlatformProfile`] is computed once from environment facts and is
//! immutable afterwards. It is passed explicitly into every computation that
//! needs scalar widths or the packing rule.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TargetError};
use crate::kind::{PrimitiveKind, Scalar};
use crate::rules::{self, OsFamily, Packing, PlatformRule, Toolchain};

/// Concrete scalar widths and packing rule for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformProfile {
    os: OsFamily,
    toolchain: Toolchain,
    word_bits: u32,
    packing: Packing,
    scalars: BTreeMap<PrimitiveKind, Scalar>,
}

impl PlatformProfile {
    /// Resolve a profile from the built-in rule table.
    ///
    /// `toolchain` may be omitted only when a single convention is defined
    /// for the OS family and word size.
    pub fn resolve(os: OsFamily, word_bits: u32, toolchain: Option<Toolchain>) -> Result<Self> {
        Self::resolve_in(&rules::builtin_rules(), os, word_bits, toolchain)
    }

    /// Resolve a profile from an explicit rule table.
    pub fn resolve_in(
        rules: &[PlatformRule],
        os: OsFamily,
        word_bits: u32,
        toolchain: Option<Toolchain>,
    ) -> Result<Self> {
        let candidates: Vec<&PlatformRule> = rules
            .iter()
            .filter(|r| r.matches(os, word_bits, toolchain))
            .collect();

        match candidates.as_slice() {
            [] => Err(TargetError::UnsupportedPlatform {
                os,
                word_bits,
                toolchain,
            }),
            [rule] => Ok(Self::from_rule(rule)),
            many => {
                let mut toolchains: Vec<Toolchain> = Vec::new();
                for rule in many {
                    if !toolchains.contains(&rule.toolchain) {
                        toolchains.push(rule.toolchain);
                    }
                }
                if toolchains.len() == 1 {
                    // Later rows shadow earlier ones for the same key.
                    let rule = many[many.len() - 1];
                    log::debug!("rule for {os}/{word_bits}/{} shadowed by a later row", rule.toolchain);
                    Ok(Self::from_rule(rule))
                } else {
                    Err(TargetError::ToolchainRequired {
                        os,
                        word_bits,
                        candidates: toolchains,
                    })
                }
            }
        }
    }

    /// Resolve the profile of the running host.
    pub fn host(toolchain: Option<Toolchain>) -> Result<Self> {
        let word_bits = rules::host_word_bits();
        let os = OsFamily::host().ok_or_else(|| TargetError::Validation {
            detail: "host operating system is not in the rule table".into(),
        })?;
        Self::resolve(os, word_bits, toolchain)
    }

    /// Build a profile from a single rule, resolving every kind up front.
    pub fn from_rule(rule: &PlatformRule) -> Self {
        let scalars = PrimitiveKind::ALL
            .iter()
            .map(|&kind| (kind, rule.scalar(kind)))
            .collect();
        let profile = Self {
            os: rule.os,
            toolchain: rule.toolchain,
            word_bits: rule.word_bits,
            packing: rule.packing(),
            scalars,
        };
        log::debug!("resolved platform profile {profile}");
        profile
    }

    pub fn os(&self) -> OsFamily {
        self.os
    }

    pub fn toolchain(&self) -> Toolchain {
        self.toolchain
    }

    /// Processor word size in bits.
    pub fn word_bits(&self) -> u32 {
        self.word_bits
    }

    /// Alignment cap applied uniformly to every aggregate.
    pub fn packing(&self) -> Packing {
        self.packing
    }

    /// Resolved scalar for a kind.
    pub fn scalar(&self, kind: PrimitiveKind) -> Option<Scalar> {
        self.scalars.get(&kind).copied()
    }

    /// All resolved scalars, ordered by kind.
    pub fn scalars(&self) -> impl Iterator<Item = (PrimitiveKind, Scalar)> + '_ {
        self.scalars.iter().map(|(k, s)| (*k, *s))
    }

    /// Pointer width in bytes.
    pub fn pointer_bytes(&self) -> u64 {
        u64::from(self.word_bits / 8)
    }

    /// Effective alignment of a member whose natural alignment is `natural`.
    pub fn effective_align(&self, natural: u64) -> u64 {
        self.packing.cap(natural)
    }
}

impl fmt::Display for PlatformProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}bit-{} ({})",
            self.os, self.word_bits, self.toolchain, self.packing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_64() {
        let p = PlatformProfile::resolve(OsFamily::Linux, 64, None).unwrap();
        assert_eq!(p.toolchain(), Toolchain::Gnu);
        assert_eq!(p.packing(), Packing::Capped(2));
        assert_eq!(p.pointer_bytes(), 8);
        assert_eq!(p.scalar(PrimitiveKind::Handle), Some(Scalar::natural(8)));
        assert_eq!(p.scalar(PrimitiveKind::Int32), Some(Scalar::natural(8)));
        assert_eq!(p.effective_align(8), 2);
    }

    #[test]
    fn macos_is_natural() {
        let p = PlatformProfile::resolve(OsFamily::MacOs, 64, None).unwrap();
        assert_eq!(p.packing(), Packing::Natural);
        assert_eq!(p.effective_align(8), 8);
        assert_eq!(p.scalar(PrimitiveKind::UInt32), Some(Scalar::natural(4)));
    }

    #[test]
    fn windows_requires_toolchain() {
        let err = PlatformProfile::resolve(OsFamily::Windows, 64, None).unwrap_err();
        match err {
            TargetError::ToolchainRequired { candidates, .. } => {
                assert_eq!(candidates, vec![Toolchain::Msvc, Toolchain::Gnu]);
            }
            other => panic!("expected ToolchainRequired, got {other:?}"),
        }
        let msvc = PlatformProfile::resolve(OsFamily::Windows, 64, Some(Toolchain::Msvc)).unwrap();
        assert_eq!(msvc.scalar(PrimitiveKind::UIntPtr).unwrap().bytes, 4);
        let gnu = PlatformProfile::resolve(OsFamily::Windows, 64, Some(Toolchain::Gnu)).unwrap();
        assert_eq!(gnu.scalar(PrimitiveKind::UIntPtr).unwrap().bytes, 8);
    }

    #[test]
    fn unsupported_combinations() {
        assert!(matches!(
            PlatformProfile::resolve(OsFamily::Linux, 16, None),
            Err(TargetError::UnsupportedPlatform { .. })
        ));
        assert!(matches!(
            PlatformProfile::resolve(OsFamily::MacOs, 64, Some(Toolchain::Msvc)),
            Err(TargetError::UnsupportedPlatform { .. })
        ));
    }

    #[test]
    fn every_kind_is_resolved() {
        let p = PlatformProfile::resolve(OsFamily::Linux, 32, None).unwrap();
        for kind in PrimitiveKind::ALL {
            assert!(p.scalar(kind).is_some(), "{kind} unresolved");
        }
        assert_eq!(p.scalars().count(), PrimitiveKind::ALL.len());
    }

    #[test]
    fn later_rule_shadows_earlier() {
        let mut table = rules::builtin_rules();
        let mut custom = table
            .iter()
            .find(|r| r.os == OsFamily::Linux && r.word_bits == 64)
            .cloned()
            .unwrap();
        custom.pack = Some(4);
        table.push(custom);
        let p = PlatformProfile::resolve_in(&table, OsFamily::Linux, 64, None).unwrap();
        assert_eq!(p.packing(), Packing::Capped(4));
    }

    #[test]
    fn accessors_reflect_rule() {
        let p = PlatformProfile::resolve(OsFamily::Windows, 32, Some(Toolchain::Msvc)).unwrap();
        assert_eq!(p.os(), OsFamily::Windows);
        assert_eq!(p.toolchain(), Toolchain::Msvc);
        assert_eq!(p.word_bits(), 32);
        assert_eq!(p.packing(), Packing::Capped(2));
        assert_eq!(p.effective_align(4), 2);
    }

    #[test]
    fn display() {
        let p = PlatformProfile::resolve(OsFamily::Linux, 64, None).unwrap();
        assert_eq!(p.to_string(), "linux-64bit-gnu (pack(2))");
    }
}
