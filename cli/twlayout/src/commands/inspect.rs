//! `twlayout list`, `twlayout show` and `twlayout export`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use twlayout_core::{Catalog, Layout, LayoutEngine};
use twlayout_targets::PlatformProfile;
use twlayout_verify::OracleSnapshot;

use super::{load_catalog, resolve_profile};
use crate::TargetArgs;

/// List every typedef and record in the catalog.
pub fn list(args: &TargetArgs) -> Result<()> {
    let profile = resolve_profile(args)?;
    let catalog = load_catalog(args, &profile)?;
    print!("{}", listing(&catalog, &profile)?);
    Ok(())
}

/// Show the layout of a single type.
pub fn show(args: &TargetArgs, name: &str, format: Option<&str>) -> Result<()> {
    let profile = resolve_profile(args)?;
    let catalog = load_catalog(args, &profile)?;
    let mut engine = LayoutEngine::new(&profile, &catalog);

    if let Some(td) = catalog.typedef(name) {
        let shape = engine.field_shape(&td.name, &td.name, &td.ty)?;
        match format {
            None | Some("text") => {
                println!("{} = {} ({} bytes, align {})", td.name, td.ty, shape.size, shape.align)
            }
            Some("json") => println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "name": td.name,
                    "type": td.ty.to_string(),
                    "size": shape.size,
                    "align": shape.align,
                }))?
            ),
            Some(other) => bail!("unknown format '{other}' (expected text or json)"),
        }
        return Ok(());
    }

    let layout = engine.layout_of(name)?;
    match format {
        None | Some("text") => print!("{}", render(&layout, &profile)),
        Some("json") => println!("{}", serde_json::to_string_pretty(&layout)?),
        Some(other) => bail!("unknown format '{other}' (expected text or json)"),
    }
    Ok(())
}

/// Export every layout as an oracle snapshot.
pub fn export(args: &TargetArgs, output: Option<&Path>) -> Result<()> {
    let profile = resolve_profile(args)?;
    let catalog = load_catalog(args, &profile)?;
    let json = OracleSnapshot::from_layouts(&catalog, &profile)?.to_json()?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("Exported {} layouts to {}", catalog.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn listing(catalog: &Catalog, profile: &PlatformProfile) -> Result<String> {
    let mut engine = LayoutEngine::new(profile, catalog);
    let mut out = format!("Types on {profile}:\n\n");

    out.push_str(&format!("Typedefs ({}):\n", catalog.typedefs().len()));
    for td in catalog.typedefs() {
        let shape = engine.field_shape(&td.name, &td.name, &td.ty)?;
        out.push_str(&format!("  {:<25} {:>5}  {}\n", td.name, shape.size, td.ty));
    }

    out.push_str(&format!("\nRecords ({}):\n", catalog.len()));
    for d in catalog.types() {
        let layout = engine.layout_of(&d.name)?;
        out.push_str(&format!(
            "  {:<25} {:>5}  {} fields\n",
            d.name,
            layout.size,
            d.fields.len()
        ));
    }
    out.push_str("\nUse 'twlayout show <name>' for details.\n");
    Ok(out)
}

fn render(layout: &Layout, profile: &PlatformProfile) -> String {
    let mut out = format!("=== {} on {profile} ===\n", layout.type_name);
    out.push_str(&format!("Size: {} bytes, align {}\n\n", layout.size, layout.align));
    out.push_str("  offset   size  align  field\n");
    for f in &layout.fields {
        let name = match &f.parent {
            Some(parent) => format!("  {}  (in {parent})", f.name),
            None => f.name.clone(),
        };
        out.push_str(&format!(
            "  {:>6} {:>6} {:>6}  {name}\n",
            f.offset, f.size, f.align
        ));
    }
    out
}
