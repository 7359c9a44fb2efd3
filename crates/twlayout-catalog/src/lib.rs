//! The TWAIN protocol type catalog.
//!
//! [`catalog`] builds the fixed set of scalar typedefs and composite records
//! for one platform profile. Records are defined in header order, which is
//! also a valid dependency order: every nested record is defined before the
//! first record that embeds it.

mod records;

#[cfg(test)]
mod host_abi;

use twlayout_core::{Catalog, CatalogBuilder, Result};
use twlayout_targets::PlatformProfile;

/// Build the protocol catalog for `profile`.
pub fn catalog(profile: &PlatformProfile) -> Result<Catalog> {
    let mut b = CatalogBuilder::new(profile);
    for (name, kind) in records::TYPEDEFS {
        b.typedef(*name, kind.field_type())?;
    }
    records::define(&mut b)?;
    let catalog = b.build();
    log::info!(
        "protocol catalog for {profile}: {} typedefs, {} records",
        catalog.typedefs().len(),
        catalog.len()
    );
    Ok(catalog)
}
