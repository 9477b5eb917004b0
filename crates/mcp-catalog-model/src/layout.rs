// SPDX-License-Identifier: Apache-2.0

use std::path::{Component, Path, PathBuf};

use crate::identity::{safe_slug, split_owner_repo, subpath_to_variant, IdentityKey, ValidationError};

pub const DEFAULT_SERVERS_DIR: &str = "servers";
pub const DEFAULT_INDEX_FILE: &str = "index.json";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const PROVENANCE_FILE_NAME: &str = "provenance.json";
pub const VARIANT_INDEX_FILE_NAME: &str = "index.json";

/// `<owner-slug>-<repo-slug>`
#[must_use]
pub fn group_dir_name(repo_full: &str) -> String {
    let (owner, repo) = split_owner_repo(repo_full);
    format!("{}-{}", safe_slug(&owner), safe_slug(&repo))
}

/// `<repo-slug>__<subpath token>`
#[must_use]
pub fn variant_dir_name(repo_full: &str, subpath: &str) -> String {
    let (_, repo) = split_owner_repo(repo_full);
    subpath_to_variant(&safe_slug(&repo), subpath)
}

/// Files of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct VariantPaths {
    pub group_name: String,
    pub variant_name: String,
    pub group_dir: PathBuf,
    pub variant_dir: PathBuf,
    pub manifest: PathBuf,
    pub provenance: PathBuf,
    pub index: PathBuf,
}

impl VariantPaths {
    /// Manifest path as listed in the group index.
    #[must_use]
    pub fn group_relative_manifest(&self) -> String {
        format!("{}/{MANIFEST_FILE_NAME}", self.variant_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CatalogLayout {
    catalog_root: PathBuf,
    servers_dir: PathBuf,
}

impl CatalogLayout {
    /// `servers_dir` must be a non-empty relative path that stays under the root.
    pub fn new(catalog_root: &Path, servers_dir: &Path) -> Result<Self, ValidationError> {
        if catalog_root.as_os_str().is_empty() {
            return Err(ValidationError("catalog root must not be empty".to_string()));
        }
        if servers_dir.as_os_str().is_empty() {
            return Err(ValidationError("servers dir must not be empty".to_string()));
        }
        if servers_dir
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
            || !servers_dir
                .components()
                .any(|c| matches!(c, Component::Normal(_)))
        {
            return Err(ValidationError(format!(
                "servers dir must be a relative path inside the catalog root: {}",
                servers_dir.display()
            )));
        }
        Ok(Self {
            catalog_root: catalog_root.to_path_buf(),
            servers_dir: servers_dir.to_path_buf(),
        })
    }

    #[must_use]
    pub fn catalog_root(&self) -> &Path {
        &self.catalog_root
    }

    #[must_use]
    pub fn servers_root(&self) -> PathBuf {
        self.catalog_root.join(&self.servers_dir)
    }

    #[must_use]
    pub fn group_dir(&self, group_name: &str) -> PathBuf {
        self.servers_root().join(group_name)
    }

    #[must_use]
    pub fn variant_paths(&self, key: &IdentityKey) -> VariantPaths {
        let group_name = group_dir_name(&key.repo_full);
        let variant_name = variant_dir_name(&key.repo_full, &key.subpath);
        let group_dir = self.group_dir(&group_name);
        let variant_dir = group_dir.join(&variant_name);
        VariantPaths {
            manifest: variant_dir.join(MANIFEST_FILE_NAME),
            provenance: variant_dir.join(PROVENANCE_FILE_NAME),
            index: variant_dir.join(VARIANT_INDEX_FILE_NAME),
            group_name,
            variant_name,
            group_dir,
            variant_dir,
        }
    }

    /// `/`-separated path of `path` relative to the catalog root.
    pub fn relative_to_root(&self, path: &Path) -> Result<String, ValidationError> {
        let rel = path.strip_prefix(&self.catalog_root).map_err(|_| {
            ValidationError(format!(
                "{} is outside catalog root {}",
                path.display(),
                self.catalog_root.display()
            ))
        })?;
        Ok(posix_join(rel))
    }
}

fn posix_join(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
