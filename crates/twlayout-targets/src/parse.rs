//! TOML parsing, serialization and validation for platform rule files.
//!
//! A rule file holds extra rows for the rule table as an array of `[[rule]]`
//! tables. Rows loaded from a file are appended after the built-in table, so
//! a file can add platforms or shadow a built-in row with the same key. Within
//! one file each (os, toolchain, word-bits) key may appear only once.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TargetError};
use crate::rules::{builtin_rules, PlatformRule};

/// A validation issue found in a rule.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// On-disk shape of a rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default, rename = "rule")]
    pub rules: Vec<PlatformRule>,
}

/// Load rules from a TOML file.
pub fn load_rules_toml(path: &Path) -> Result<Vec<PlatformRule>> {
    if !path.exists() {
        return Err(TargetError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_rules_toml(&content)
}

/// Parse and validate rules from a TOML string.
pub fn parse_rules_toml(toml_str: &str) -> Result<Vec<PlatformRule>> {
    let file: RuleFile = toml::from_str(toml_str)?;
    let mut errors = Vec::new();
    for (i, rule) in file.rules.iter().enumerate() {
        if let Err(issues) = validate_rule(rule) {
            for issue in issues {
                if issue.severity == "error" {
                    errors.push(format!("rule #{}: {}", i + 1, issue.message));
                } else {
                    log::warn!("rule #{}: {}", i + 1, issue.message);
                }
            }
        }
    }

    let mut seen = HashMap::new();
    for (i, rule) in file.rules.iter().enumerate() {
        let key = (rule.os, rule.toolchain, rule.word_bits);
        if let Some(first) = seen.insert(key, i) {
            errors.push(format!(
                "rule #{}: duplicate key {}/{}/{} (first defined by rule #{})",
                i + 1,
                rule.os,
                rule.toolchain,
                rule.word_bits,
                first + 1
            ));
        }
    }
    if !errors.is_empty() {
        return Err(TargetError::Validation {
            detail: errors.join("; "),
        });
    }
    Ok(file.rules)
}

/// Serialize rules to pretty TOML.
pub fn rules_to_toml(rules: &[PlatformRule]) -> Result<String> {
    let file = RuleFile {
        rules: rules.to_vec(),
    };
    Ok(toml::to_string_pretty(&file)?)
}

/// The built-in table followed by `extra`.
pub fn merged_rules(extra: Vec<PlatformRule>) -> Vec<PlatformRule> {
    let mut rules = builtin_rules();
    rules.extend(extra);
    rules
}

/// Validate a rule for structural correctness.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_rule(rule: &PlatformRule) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    // 1. Word size is one the protocol header recognises
    if ![32, 64].contains(&rule.word_bits) {
        issues.push(ValidationIssue {
            severity: "error",
            message: format!("word size {} is not 32 or 64", rule.word_bits),
        });
    }

    // 2. Packing cap is a power of two
    if let Some(pack) = rule.pack {
        if !pack.is_power_of_two() {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("packing cap {pack} is not a power of two"),
            });
        }
    }

    // 3. Integer widths are plausible
    for (name, bytes) in [
        ("int32-bytes", rule.int32_bytes),
        ("uintptr-bytes", rule.uintptr_bytes),
    ] {
        if ![4, 8].contains(&bytes) {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("{name} is {bytes} (expected 4 or 8)"),
            });
        }
    }

    // 4. Word-sized integer wider than a pointer
    if rule.uintptr_bytes > rule.pointer_bytes() {
        issues.push(ValidationIssue {
            severity: "warning",
            message: format!(
                "uintptr-bytes ({}) exceeds pointer width ({})",
                rule.uintptr_bytes,
                rule.pointer_bytes()
            ),
        });
    }

    // 5. Overrides have non-zero size and power-of-two alignment
    for o in &rule.scalars {
        if o.bytes == 0 {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("scalar override for {} has size 0", o.kind),
            });
        }
        let align = o.align.unwrap_or(o.bytes);
        if !align.is_power_of_two() {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("scalar override for {} has alignment {align}", o.kind),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Generate a template rule file seeded from the built-in table.
pub fn generate_template() -> Result<String> {
    rules_to_toml(&builtin_rules())
}
