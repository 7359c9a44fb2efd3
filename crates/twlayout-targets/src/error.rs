//! Error types for platform resolution.

use std::path::PathBuf;

use crate::rules::{OsFamily, Toolchain};

/// Errors that can occur while resolving or loading platform rules.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// No rule matches the requested environment facts.
    #[error("unsupported platform: {os} / {word_bits}-bit{}", toolchain.map(|t| format!(" / {t}")).unwrap_or_default())]
    UnsupportedPlatform {
        os: OsFamily,
        word_bits: u32,
        toolchain: Option<Toolchain>,
    },

    /// Several toolchain conventions exist for the platform and none was given.
    #[error("toolchain convention required for {os} / {word_bits}-bit (one of: {})", candidates.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", "))]
    ToolchainRequired {
        os: OsFamily,
        word_bits: u32,
        candidates: Vec<Toolchain>,
    },

    /// TOML deserialization error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O error reading a rule file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rule file not found.
    #[error("rule file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// A rule failed validation.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the validation failure.
        detail: String,
    },
}

/// Result type for target operations.
pub type Result<T> = std::result::Result<T, TargetError>;
