//! Validation report with summary statistics.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::validator::{EntryKind, Status, ValidationEntry};

/// Summary statistics for a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub missing: usize,
    pub extra: usize,
}

/// The complete validation report.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Profile the layouts were computed for.
    pub platform: String,
    pub summary: ReportSummary,
    pub entries: Vec<ValidationEntry>,
}

impl ValidationReport {
    /// Build a report from validator output.
    pub fn build(platform: impl fmt::Display, entries: Vec<ValidationEntry>) -> Self {
        let mut summary = ReportSummary {
            total: entries.len(),
            ..ReportSummary::default()
        };
        for e in &entries {
            match e.status {
                Status::Match => summary.matched += 1,
                Status::Mismatch(_) => summary.mismatched += 1,
                Status::Missing(_) => summary.missing += 1,
                Status::Extra(_) => summary.extra += 1,
            }
        }
        Self {
            platform: platform.to_string(),
            summary,
            entries,
        }
    }

    /// Whether the run passed. Every catalog type must be reported and
    /// match. Types only the oracle knows fail only in strict mode.
    pub fn passed(&self, strict: bool) -> bool {
        self.summary.mismatched == 0
            && self.summary.missing == 0
            && (!strict || self.summary.extra == 0)
    }

    /// Entries that did not match.
    pub fn problems(&self) -> impl Iterator<Item = &ValidationEntry> {
        self.entries.iter().filter(|e| e.status != Status::Match)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Layout Validation ({}) ===", self.platform)?;
        writeln!(
            f,
            "Total: {} | Matched: {} | Mismatched: {} | Missing: {} | Extra: {}",
            self.summary.total,
            self.summary.matched,
            self.summary.mismatched,
            self.summary.missing,
            self.summary.extra,
        )?;

        let mut problems = self.problems().peekable();
        if problems.peek().is_none() {
            writeln!(f, "All types match.")?;
        } else {
            writeln!(f, "--- Problems ---")?;
            for e in problems {
                let kind = match e.kind {
                    EntryKind::Typedef => "typedef",
                    EntryKind::Record => "record",
                };
                writeln!(f, "[{kind}] {}: {}", e.type_name, e.status)?;
            }
        }
        Ok(())
    }
}
