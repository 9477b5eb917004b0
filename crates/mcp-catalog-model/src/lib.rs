#![forbid(unsafe_code)]
//! Catalog model SSOT.
//!
//! Manifests are parsed once into [`Manifest`]; every object level keeps the
//! keys it does not model so that rewriting a manifest never drops harvester
//! data. Identity and on-disk placement are pure functions of the manifest's
//! provenance and transport.
//!
//! ```compile_fail
//! use mcp_catalog_model::LifecycleStatus;
//!
//! fn exhaustive_match(s: LifecycleStatus) -> &'static str {
//!     match s {
//!         LifecycleStatus::Active => "a",
//!         LifecycleStatus::Deprecated => "d",
//!         LifecycleStatus::Disabled => "x",
//!     }
//! }
//! ```

mod identity;
mod index;
mod layout;
mod manifest;
mod serde_helpers;

pub use identity::{
    normalize_repo_full, safe_slug, split_owner_repo, subpath_to_variant, IdentityKey, Transport,
    ValidationError, UNKNOWN_REPO_FULL,
};
pub use index::{GroupIndex, IndexCounts, IndexItem, IndexSource, TopIndex, VariantIndex};
pub use layout::{
    group_dir_name, variant_dir_name, CatalogLayout, VariantPaths, DEFAULT_INDEX_FILE,
    DEFAULT_SERVERS_DIR, MANIFEST_FILE_NAME, PROVENANCE_FILE_NAME, VARIANT_INDEX_FILE_NAME,
};
pub use manifest::{
    HarvestStatus, Lifecycle, LifecycleStatus, Manifest, Provenance, Registration, ServerSpec,
    MANIFEST_TYPE,
};
pub use serde_helpers::TextValue;

pub const CRATE_NAME: &str = "mcp-catalog-model";
