// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use mcp_catalog_core::canonical;
use mcp_catalog_model::{
    CatalogLayout, GroupIndex, IdentityKey, IndexItem, IndexSource, LifecycleStatus, Manifest,
    TopIndex, VariantIndex,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::SyncError;

/// Writes `value` as sorted, two-space indented JSON with a trailing newline,
/// creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }
    let bytes = canonical::pretty_json_bytes(value).map_err(|e| SyncError::io(path, e))?;
    fs::write(path, bytes).map_err(|e| SyncError::io(path, e))
}

/// Persists catalog entries and accumulates what the indexes need.
#[derive(Debug)]
pub struct CatalogWriter<'a> {
    layout: &'a CatalogLayout,
    source_repo: String,
    now: String,
    /// Group directory name to variant manifest paths relative to it.
    groups: BTreeMap<String, BTreeSet<String>>,
    /// Keyed by catalog-relative manifest path; one row per file.
    items: BTreeMap<String, IndexItem>,
    active: BTreeSet<String>,
    owners: BTreeMap<PathBuf, IdentityKey>,
    written: usize,
    deprecated_added: u64,
}

impl<'a> CatalogWriter<'a> {
    #[must_use]
    pub fn new(layout: &'a CatalogLayout, source_repo: &str, now: &str) -> Self {
        Self {
            layout,
            source_repo: source_repo.to_string(),
            now: now.to_string(),
            groups: BTreeMap::new(),
            items: BTreeMap::new(),
            active: BTreeSet::new(),
            owners: BTreeMap::new(),
            written: 0,
            deprecated_added: 0,
        }
    }

    /// Writes the manifest, its provenance sidecar and its variant index.
    pub fn write_harvested(&mut self, key: &IdentityKey, manifest: &Manifest) -> Result<(), SyncError> {
        let paths = self.layout.variant_paths(key);
        match self.owners.get(&paths.manifest) {
            Some(owner) if owner != key => warn!(
                path = %paths.manifest.display(),
                first = %owner,
                second = %key,
                "two identity keys map to one catalog directory; the later manifest wins"
            ),
            Some(_) => warn!(
                key = %key,
                "harvest produced the same identity key twice; the later manifest wins"
            ),
            None => {}
        }
        self.owners.insert(paths.manifest.clone(), key.clone());

        write_json(&paths.manifest, manifest)?;
        match manifest.non_empty_provenance() {
            Some(provenance) => write_json(&paths.provenance, provenance)?,
            None => write_json(
                &paths.provenance,
                &json!({
                    "repo_url": key.repo_url(),
                    "subpath": key.subpath,
                    "transport": key.transport.as_str(),
                    "harvested_from": self.source_repo,
                    "harvested_at": self.now,
                }),
            )?,
        }
        write_json(&paths.index, &VariantIndex::single())?;

        self.groups
            .entry(paths.group_name.clone())
            .or_default()
            .insert(paths.group_relative_manifest());

        let manifest_path = self.layout.relative_to_root(&paths.manifest)?;
        if manifest.lifecycle_status() == LifecycleStatus::Active {
            self.active.insert(manifest_path.clone());
        } else {
            self.active.remove(&manifest_path);
        }
        self.items.insert(
            manifest_path.clone(),
            IndexItem::from_manifest(manifest, key, manifest_path),
        );
        self.written += 1;
        Ok(())
    }

    /// Rewrites a pre-run entry that the harvest no longer produces, in place.
    pub fn write_stale(
        &mut self,
        key: &IdentityKey,
        path: &Path,
        manifest: &Manifest,
        transitioned: bool,
    ) -> Result<(), SyncError> {
        write_json(path, manifest)?;
        let manifest_path = self.layout.relative_to_root(path)?;
        self.items.insert(
            manifest_path.clone(),
            IndexItem::from_manifest(manifest, key, manifest_path),
        );
        if transitioned {
            self.deprecated_added += 1;
        }
        Ok(())
    }

    #[must_use]
    pub fn has_written(&self, path: &Path) -> bool {
        self.owners.contains_key(path)
    }

    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    #[must_use]
    pub fn deprecated_added(&self) -> u64 {
        self.deprecated_added
    }

    /// Writes one index per group touched this run and the top-level index.
    pub fn finish(self, index_path: &Path, source: IndexSource) -> Result<TopIndex, SyncError> {
        for (group_name, manifests) in self.groups {
            let group_index = GroupIndex::from_paths(manifests);
            let path = self
                .layout
                .group_dir(&group_name)
                .join(mcp_catalog_model::VARIANT_INDEX_FILE_NAME);
            write_json(&path, &group_index)?;
        }
        let index = TopIndex::new(
            self.now,
            source,
            self.items.into_values().collect(),
            self.active.into_iter().collect(),
            self.deprecated_added,
        );
        write_json(index_path, &index)?;
        Ok(index)
    }
}
