//! CLI command implementations.

pub mod inspect;
pub mod platform;
pub mod validate;

use anyhow::{Context, Result};
use twlayout_core::Catalog;
use twlayout_targets::parse::{load_rules_toml, merged_rules};
use twlayout_targets::rules::{builtin_rules, host_word_bits};
use twlayout_targets::{OsFamily, PlatformProfile, Toolchain};

use crate::TargetArgs;

/// Resolve the platform profile from flags, defaulting OS and word size to
/// the host.
pub fn resolve_profile(args: &TargetArgs) -> Result<PlatformProfile> {
    let os = match &args.os {
        Some(s) => s.parse::<OsFamily>()?,
        None => OsFamily::host().context("host OS is not supported; pass --os")?,
    };
    let word_bits = args.word_bits.unwrap_or_else(host_word_bits);
    let toolchain = args
        .toolchain
        .as_deref()
        .map(str::parse::<Toolchain>)
        .transpose()?;

    let rules = match &args.rules {
        Some(path) => {
            let extra = load_rules_toml(path)
                .with_context(|| format!("loading rules from {}", path.display()))?;
            merged_rules(extra)
        }
        None => builtin_rules(),
    };

    let profile = PlatformProfile::resolve_in(&rules, os, word_bits, toolchain)?;
    log::debug!("using platform profile {profile}");
    Ok(profile)
}

/// Build the catalog for `profile`: the protocol catalog, or a descriptor
/// file when `--schema` is given.
pub fn load_catalog(args: &TargetArgs, profile: &PlatformProfile) -> Result<Catalog> {
    match &args.schema {
        Some(path) => twlayout_core::schema::load_catalog(path, profile)
            .with_context(|| format!("loading descriptors from {}", path.display())),
        None => Ok(twlayout_catalog::catalog(profile)?),
    }
}
