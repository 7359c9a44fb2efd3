//! Checking computed layouts against a native reference.
//!
//! A [`ReferenceOracle`] reports what the platform's own compiler produced
//! for each protocol type. [`validate_all`] compares every typedef and record
//! of a catalog against it and collects one [`ValidationEntry`] per type, so
//! a single run surfaces every disagreement.

pub mod error;
pub mod oracle;
pub mod report;
pub mod validator;

pub use error::{Result, VerifyError};
pub use oracle::{OracleSnapshot, ReferenceOracle};
pub use report::{ReportSummary, ValidationReport};
pub use validator::{validate_all, EntryKind, Status, ValidationEntry};
