//! Descriptor and layout error types.

/// Errors raised while building descriptor catalogs or computing layouts.
///
/// Every variant indicates a defect in the descriptor tables, not a runtime
/// condition: re-running with the same catalog and platform reproduces it.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A field references a kind or descriptor that cannot be resolved while
    /// the catalog is being constructed.
    #[error("{type_name}.{field}: unknown field kind: {detail}")]
    UnknownFieldKind {
        type_name: String,
        field: String,
        detail: String,
    },

    /// A field's kind has no concrete layout under the active profile.
    #[error("{type_name}.{field}: unresolved kind: {detail}")]
    UnresolvedKind {
        type_name: String,
        field: String,
        detail: String,
    },

    /// A chain of nested references revisits a descriptor.
    #[error("cyclic descriptor: {}", cycle.join(" -> "))]
    CyclicDescriptor { cycle: Vec<String> },

    /// Two descriptors share a name.
    #[error("duplicate type: {name}")]
    DuplicateType { name: String },

    /// Lookup of a type the catalog does not contain.
    #[error("unknown type: {name}")]
    UnknownType { name: String },

    /// A descriptor is structurally malformed.
    #[error("invalid descriptor {type_name}: {detail}")]
    InvalidDescriptor { type_name: String, detail: String },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for descriptor and layout operations.
pub type Result<T> = std::result::Result<T, LayoutError>;
