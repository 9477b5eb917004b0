// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use mcp_catalog_model::CatalogLayout;

use crate::{SyncError, SyncOptions};

/// Scratch directory the harvester writes into, relative to the catalog root.
pub const HARVEST_SCRATCH_DIR: &str = ".tmp/harvest";

#[derive(Debug, Clone)]
pub struct SyncJob {
    pub layout: CatalogLayout,
    pub harvest_out: PathBuf,
    pub index_path: PathBuf,
    pub options: SyncOptions,
}

impl SyncJob {
    pub fn from_options(options: &SyncOptions) -> Result<Self, SyncError> {
        if options.source_repo.trim().is_empty() {
            return Err(SyncError::InvalidOptions(
                "source repository is required".to_string(),
            ));
        }
        if options.max_parallel == 0 {
            return Err(SyncError::InvalidOptions(
                "max parallel must be at least 1".to_string(),
            ));
        }
        if options.index_file.as_os_str().is_empty() {
            return Err(SyncError::InvalidOptions(
                "index file must not be empty".to_string(),
            ));
        }
        let layout = CatalogLayout::new(&options.catalog_root, &options.servers_dir)?;
        Ok(Self {
            harvest_out: options.catalog_root.join(HARVEST_SCRATCH_DIR),
            index_path: options.catalog_root.join(&options.index_file),
            layout,
            options: options.clone(),
        })
    }
}
