// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::IdentityKey;
use crate::layout::MANIFEST_FILE_NAME;
use crate::manifest::{Manifest, MANIFEST_TYPE};

/// Per-variant index; always lists exactly its own manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct VariantIndex {
    pub manifests: Vec<String>,
}

impl VariantIndex {
    #[must_use]
    pub fn single() -> Self {
        Self {
            manifests: vec![format!("./{MANIFEST_FILE_NAME}")],
        }
    }
}

impl Default for VariantIndex {
    fn default() -> Self {
        Self::single()
    }
}

/// Per-repository index of variant manifests, relative to the group directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct GroupIndex {
    pub manifests: Vec<String>,
}

impl GroupIndex {
    /// Sorted and de-duplicated.
    #[must_use]
    pub fn from_paths<I: IntoIterator<Item = String>>(paths: I) -> Self {
        let mut manifests: Vec<String> = paths.into_iter().collect();
        manifests.sort();
        manifests.dedup();
        Self { manifests }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct IndexSource {
    pub harvester: String,
    pub root_repo: String,
}

impl IndexSource {
    #[must_use]
    pub fn new(harvester: String, root_repo: String) -> Self {
        Self {
            harvester,
            root_repo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct IndexCounts {
    pub total_items: u64,
    pub active_manifests: u64,
    pub deprecated_added_this_run: u64,
}

impl IndexCounts {
    #[must_use]
    pub fn new(total_items: u64, active_manifests: u64, deprecated_added_this_run: u64) -> Self {
        Self {
            total_items,
            active_manifests,
            deprecated_added_this_run,
        }
    }
}

/// Audit row of the top-level index; present for every status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct IndexItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    /// The manifest's `name` as harvested, scalar or not.
    pub name: Option<Value>,
    pub transport: String,
    pub status: String,
    pub manifest_path: String,
    pub repo: String,
    pub subpath: String,
}

impl IndexItem {
    /// Status is the manifest's current lifecycle status; transport and
    /// repository come from its identity key.
    #[must_use]
    pub fn from_manifest(manifest: &Manifest, key: &IdentityKey, manifest_path: String) -> Self {
        Self {
            kind: MANIFEST_TYPE.to_string(),
            id: manifest.declared_id().unwrap_or_default().to_string(),
            name: manifest.name.as_ref().map(|n| n.as_value().clone()),
            transport: key.transport.to_string(),
            status: manifest.lifecycle_status().to_string(),
            manifest_path,
            repo: key.repo_url(),
            subpath: key.subpath.clone(),
        }
    }

    #[must_use]
    pub fn sort_key(&self) -> (&str, &str) {
        (&self.id, &self.manifest_path)
    }
}

/// Catalog-wide index; `manifests` is the ingestion contract and only ever
/// lists active entries by relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct TopIndex {
    pub generated_at: String,
    pub source: IndexSource,
    pub counts: IndexCounts,
    pub items: Vec<IndexItem>,
    pub manifests: Vec<String>,
}

impl TopIndex {
    /// Sorts items by `(id, manifest_path)`, sorts and de-duplicates
    /// `manifests`, and derives the item and manifest counts.
    #[must_use]
    pub fn new(
        generated_at: String,
        source: IndexSource,
        mut items: Vec<IndexItem>,
        mut manifests: Vec<String>,
        deprecated_added_this_run: u64,
    ) -> Self {
        items.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        manifests.sort();
        manifests.dedup();
        let counts = IndexCounts::new(
            items.len() as u64,
            manifests.len() as u64,
            deprecated_added_this_run,
        );
        Self {
            generated_at,
            source,
            counts,
            items,
            manifests,
        }
    }
}
