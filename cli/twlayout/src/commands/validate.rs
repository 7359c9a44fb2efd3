//! `twlayout validate`: compare computed layouts with a native snapshot.

use std::path::Path;

use anyhow::{bail, Context, Result};
use twlayout_verify::{validate_all, OracleSnapshot, ValidationReport};

use super::{load_catalog, resolve_profile};
use crate::TargetArgs;

/// Run validation and fail when the report does not pass.
pub fn run(args: &TargetArgs, oracle: &Path, report_format: Option<&str>, strict: bool) -> Result<()> {
    let profile = resolve_profile(args)?;
    let catalog = load_catalog(args, &profile)?;
    let snapshot = OracleSnapshot::load(oracle)
        .with_context(|| format!("loading oracle snapshot {}", oracle.display()))?;

    let entries = validate_all(&catalog, &profile, &snapshot)?;
    let report = ValidationReport::build(&profile, entries);

    match report_format {
        None | Some("human") => print!("{report}"),
        Some("json") => println!("{}", report.to_json()?),
        Some(other) => bail!("unknown report format '{other}' (expected human or json)"),
    }

    if !report.passed(strict) {
        bail!(
            "validation failed: {} mismatched, {} missing, {} extra",
            report.summary.mismatched,
            report.summary.missing,
            report.summary.extra
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use twlayout_targets::PlatformProfile;

    fn args(os: &str, word_bits: u32) -> TargetArgs {
        TargetArgs {
            os: Some(os.into()),
            word_bits: Some(word_bits),
            ..TargetArgs::default()
        }
    }

    fn write_snapshot(dir: &Path, a: &TargetArgs) -> std::path::PathBuf {
        let profile: PlatformProfile = resolve_profile(a).unwrap();
        let catalog = load_catalog(a, &profile).unwrap();
        let path = dir.join("oracle.json");
        let json = OracleSnapshot::from_layouts(&catalog, &profile)
            .unwrap()
            .to_json()
            .unwrap();
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn passes_against_own_export() {
        let dir = tempfile::tempdir().unwrap();
        let a = args("linux", 64);
        let path = write_snapshot(dir.path(), &a);
        assert!(run(&a, &path, None, true).is_ok());
        assert!(run(&a, &path, Some("json"), false).is_ok());
    }

    #[test]
    fn fails_on_foreign_platform() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_snapshot(dir.path(), &args("macos", 64));
        let err = run(&args("linux", 64), &path, None, false).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn empty_snapshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        let a = args("linux", 64);
        let err = run(&a, &path, None, false).unwrap_err();
        assert!(err.to_string().contains("0 mismatched, 57 missing"), "{err}");
    }

    #[test]
    fn partial_snapshot_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(
            &path,
            r#"{ "structs": { "TW_FIX32": { "size": 4, "offsets": { "Whole": 0, "Frac": 2 } } } }"#,
        )
        .unwrap();
        assert!(run(&args("linux", 32), &path, None, false).is_err());
    }

    #[test]
    fn extra_types_fail_only_when_strict() {
        let dir = tempfile::tempdir().unwrap();
        let a = args("linux", 32);
        let path = write_snapshot(dir.path(), &a);
        let mut snapshot = OracleSnapshot::load(&path).unwrap();
        snapshot.types.insert(
            "TW_CUSTOMTHING".into(),
            twlayout_verify::oracle::TypeEntry { size: 4 },
        );
        std::fs::write(&path, snapshot.to_json().unwrap()).unwrap();

        assert!(run(&a, &path, None, false).is_ok());
        let err = run(&a, &path, None, true).unwrap_err();
        assert!(err.to_string().contains("1 extra"), "{err}");
    }

    #[test]
    fn missing_oracle_file() {
        let a = args("linux", 64);
        assert!(run(&a, Path::new("/nonexistent/oracle.json"), None, false).is_err());
    }
}
