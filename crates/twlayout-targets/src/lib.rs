//! Platform profiles for the twlayout layout engine.
//!
//! A platform is identified by three environment facts: OS family, processor
//! word size and toolchain convention. Those facts select a row of the rule
//! table, and the row resolves into an immutable [`PlatformProfile`]:
//!
//! - **Scalar table:** concrete width and natural alignment of every [`PrimitiveKind`]
//! - **Packing rule:** the alignment cap applied to every aggregate member
//!
//! Rules are data. The built-in table lives in [`rules`]; additional rows can
//! be loaded from TOML through [`parse`].

pub mod error;
pub mod kind;
pub mod parse;
pub mod platform;
pub mod rules;

pub use error::{Result, TargetError};
pub use kind::{PrimitiveKind, Scalar};
pub use platform::PlatformProfile;
pub use rules::{OsFamily, Packing, PlatformRule, Toolchain};
