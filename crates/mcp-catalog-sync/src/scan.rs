// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use mcp_catalog_model::{IdentityKey, Manifest, MANIFEST_FILE_NAME};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq)]
pub struct PriorEntry {
    pub path: PathBuf,
    pub manifest: Manifest,
}

/// Catalog contents as found on disk before the run, by identity key.
#[derive(Debug, Clone, Default)]
pub struct PriorCatalog {
    entries: BTreeMap<IdentityKey, PriorEntry>,
}

impl PriorCatalog {
    /// A later entry for the same key replaces the earlier one.
    pub fn insert(&mut self, key: IdentityKey, entry: PriorEntry) -> Option<PriorEntry> {
        self.entries.insert(key, entry)
    }

    #[must_use]
    pub fn get(&self, key: &IdentityKey) -> Option<&PriorEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &IdentityKey> {
        self.entries.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> BTreeMap<IdentityKey, PriorEntry> {
        self.entries
    }
}

/// Indexes every `manifest.json` below `servers_root`.
///
/// Unreadable or unparseable files are logged and skipped; documents of a
/// foreign `type` are skipped silently. A missing root is an empty catalog.
#[must_use]
pub fn scan_catalog(servers_root: &Path) -> PriorCatalog {
    let mut catalog = PriorCatalog::default();
    if !servers_root.is_dir() {
        return catalog;
    }
    for entry in WalkDir::new(servers_root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable catalog path");
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE_NAME {
            continue;
        }
        let path = entry.into_path();
        let manifest = match fs::read(&path)
            .map_err(|e| e.to_string())
            .and_then(|raw| Manifest::parse_server(&raw).map_err(|e| e.to_string()))
        {
            Ok(Some(manifest)) => manifest,
            Ok(None) => continue,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unparseable catalog manifest");
                continue;
            }
        };
        let key = manifest.identity_key();
        if let Some(previous) = catalog.insert(key.clone(), PriorEntry { path, manifest }) {
            warn!(
                key = %key,
                replaced = %previous.path.display(),
                "two catalog manifests share one identity key; keeping the later one"
            );
        }
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::scan_catalog;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn scan_skips_broken_and_foreign_documents() {
        let tmp = tempdir().expect("tmp");
        let root = tmp.path().join("servers");
        fs::create_dir_all(root.join("a/one")).expect("mkdir");
        fs::create_dir_all(root.join("a/two")).expect("mkdir");
        fs::create_dir_all(root.join("b/three")).expect("mkdir");
        fs::write(
            root.join("a/one/manifest.json"),
            r#"{"type":"mcp_server","id":"one","provenance":{"repo_url":"acme/a","subpath":"one"}}"#,
        )
        .expect("write");
        fs::write(root.join("a/two/manifest.json"), "{broken").expect("write");
        fs::write(
            root.join("b/three/manifest.json"),
            r#"{"type":"mcp_tool","id":"three"}"#,
        )
        .expect("write");
        fs::write(root.join("a/one/provenance.json"), "{}").expect("write");
        fs::create_dir_all(root.join("b/four")).expect("mkdir");
        fs::write(
            root.join("b/four/manifest.json"),
            r#"{"type":"mcp_tool","id":{"ns":"x"},"provenance":"elsewhere"}"#,
        )
        .expect("write");

        let catalog = scan_catalog(&root);
        assert_eq!(catalog.len(), 1);
        let key = catalog.keys().next().expect("key").clone();
        assert_eq!(key.repo_full, "acme/a");
        assert_eq!(key.subpath, "one");
        assert_eq!(
            catalog.get(&key).expect("entry").path,
            root.join("a/one/manifest.json")
        );
    }

    #[test]
    fn structured_name_does_not_hide_a_manifest_from_the_scan() {
        let tmp = tempdir().expect("tmp");
        let root = tmp.path().join("servers");
        fs::create_dir_all(root.join("a/one")).expect("mkdir");
        fs::write(
            root.join("a/one/manifest.json"),
            r#"{"type":"mcp_server","id":"one","name":{"en":"One"},"provenance":{"repo_url":"acme/a"}}"#,
        )
        .expect("write");
        assert_eq!(scan_catalog(&root).len(), 1);
    }

    #[test]
    fn missing_root_is_an_empty_catalog() {
        let tmp = tempdir().expect("tmp");
        assert!(scan_catalog(&tmp.path().join("servers")).is_empty());
    }
}
