//! `twlayout platform`: describe the resolved profile.

use anyhow::{bail, Result};
use twlayout_targets::{Packing, PlatformProfile};

use super::resolve_profile;
use crate::TargetArgs;

/// Print the resolved profile and its scalar table.
pub fn run(args: &TargetArgs, format: Option<&str>) -> Result<()> {
    let profile = resolve_profile(args)?;
    match format {
        None | Some("text") => print!("{}", describe(&profile)),
        Some("json") => println!("{}", serde_json::to_string_pretty(&profile)?),
        Some(other) => bail!("unknown format '{other}' (expected text or json)"),
    }
    Ok(())
}

fn describe(profile: &PlatformProfile) -> String {
    let mut out = format!("=== Platform: {profile} ===\n");
    out.push_str(&format!("OS:        {}\n", profile.os()));
    out.push_str(&format!("Toolchain: {}\n", profile.toolchain()));
    out.push_str(&format!("Word size: {} bits\n", profile.word_bits()));
    let packing = match profile.packing() {
        Packing::Natural => "natural alignment".to_string(),
        Packing::Capped(n) => format!("members aligned to at most {n} bytes"),
    };
    out.push_str(&format!("Packing:   {packing}\n\n"));

    out.push_str("--- Scalars ---\n");
    for (kind, scalar) in profile.scalars() {
        let effective = profile.effective_align(scalar.align);
        out.push_str(&format!(
            "  {:<12} {} bytes, align {} (effective {effective})\n",
            kind.to_string(),
            scalar.bytes,
            scalar.align,
        ));
    }
    out
}
