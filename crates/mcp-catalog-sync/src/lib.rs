// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Catalog synchronization.
//!
//! One run harvests a source repository into a scratch directory, reconciles
//! the harvested manifests against what the catalog already holds, rewrites
//! the catalog tree and regenerates every index. Entries that disappear from
//! the harvest are deprecated in place; nothing is ever deleted.

mod collision;
mod harvest;
mod job;
mod logging;
mod reconcile;
mod scan;
mod write;

use mcp_catalog_core::{sha256_hex, Clock};
use mcp_catalog_model::{IdentityKey, IndexSource, Manifest, TopIndex, ValidationError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CRATE_NAME: &str = "mcp-catalog-sync";

pub use collision::CollisionGuard;
pub use harvest::{
    resolve_manifest_path, CommandHarvester, HarvestError, HarvestRequest, HarvestedIndex,
    Harvester, HARVEST_INDEX_FILE,
};
pub use job::SyncJob;
pub use logging::{SyncEvent, SyncLog, SyncStage};
pub use reconcile::{mark_active_seen, mark_deprecated, Admission, Reconciler, StaleEntry};
pub use scan::{scan_catalog, PriorCatalog, PriorEntry};
pub use write::{write_json, CatalogWriter};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("invalid sync options: {0}")]
    InvalidOptions(String),
    #[error("harvester failed: {0}")]
    HarvestFailed(String),
    #[error("harvest output index not found at {}", .path.display())]
    MissingHarvestIndex { path: PathBuf },
    #[error("harvest output index {} is malformed: {message}", .path.display())]
    MalformedHarvestIndex { path: PathBuf, message: String },
    #[error("harvest output index {} lists no manifests", .path.display())]
    EmptyManifestList { path: PathBuf },
    #[error("manifest has empty id ({key})")]
    MissingManifestId { key: IdentityKey },
    #[error("duplicate manifest id across different catalog keys: id={id} first={first} second={second}")]
    IdCollision {
        id: String,
        first: IdentityKey,
        second: IdentityKey,
    },
    #[error("failed to parse manifest {}: {message}", .path.display())]
    ManifestParse { path: PathBuf, message: String },
    #[error("{}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl SyncError {
    pub(crate) fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for SyncError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidOptions(value.0)
    }
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Repository handed to the harvester and recorded in the top-level index.
    pub source_repo: String,
    pub catalog_root: PathBuf,
    /// Relative to `catalog_root`.
    pub servers_dir: PathBuf,
    /// Relative to `catalog_root`.
    pub index_file: PathBuf,
    pub max_parallel: usize,
    /// Written to `source.harvester` of the top-level index.
    pub harvester_label: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            source_repo: String::new(),
            catalog_root: PathBuf::from("."),
            servers_dir: PathBuf::from(mcp_catalog_model::DEFAULT_SERVERS_DIR),
            index_file: PathBuf::from(mcp_catalog_model::DEFAULT_INDEX_FILE),
            max_parallel: 4,
            harvester_label: format!(
                "{} harvest-source",
                mcp_catalog_core::DEFAULT_HARVESTER_PROGRAM
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncResult {
    pub index_path: PathBuf,
    pub index: TopIndex,
    /// Harvested manifests written this run, active or not.
    pub written: usize,
    pub reactivated: usize,
    /// Harvest index entries that did not resolve to a file.
    pub unresolved: Vec<String>,
    /// SHA-256 of the newline-joined `manifests` list; equal across runs when
    /// the ingestion contract did not change.
    pub manifests_sha256: String,
}

pub fn sync_catalog(
    opts: &SyncOptions,
    harvester: &dyn Harvester,
    clock: &dyn Clock,
) -> Result<SyncResult, SyncError> {
    sync_catalog_with_events(opts, harvester, clock).map(|(result, _)| result)
}

pub fn sync_catalog_with_events(
    opts: &SyncOptions,
    harvester: &dyn Harvester,
    clock: &dyn Clock,
) -> Result<(SyncResult, Vec<SyncEvent>), SyncError> {
    let mut log = SyncLog::default();
    log.emit(
        SyncStage::Prepare,
        "sync.start",
        fields([("source_repo", opts.source_repo.clone())]),
    );
    let job = SyncJob::from_options(opts)?;
    let now = clock.now_rfc3339();

    let prior = scan_catalog(&job.layout.servers_root());
    log.emit(
        SyncStage::Prepare,
        "sync.scan.complete",
        fields([("prior_entries", prior.len().to_string())]),
    );

    log.emit(SyncStage::Harvest, "sync.harvest.begin", BTreeMap::new());
    reset_dir(&job.harvest_out)?;
    let request = HarvestRequest::for_source(&opts.source_repo, &job.harvest_out, opts.max_parallel);
    harvester
        .harvest(&request)
        .map_err(|e| SyncError::HarvestFailed(e.0))?;
    let harvested = HarvestedIndex::load(&job.harvest_out)?;
    log.emit(
        SyncStage::Harvest,
        "sync.harvest.complete",
        fields([("listed", harvested.entries.len().to_string())]),
    );

    let mut reconciler = Reconciler::new(prior);
    let mut writer = CatalogWriter::new(&job.layout, &opts.source_repo, &now);
    let mut unresolved = Vec::new();
    let mut reactivated = 0_usize;

    log.emit(SyncStage::Reconcile, "sync.reconcile.begin", BTreeMap::new());
    for entry in &harvested.entries {
        let Some(path) = resolve_manifest_path(&job.harvest_out, entry) else {
            warn!(entry = %entry, "harvested manifest not found; skipping");
            log.emit(
                SyncStage::Reconcile,
                "sync.manifest.unresolved",
                fields([("entry", entry.clone())]),
            );
            unresolved.push(entry.clone());
            continue;
        };
        let Some(manifest) = read_manifest(&path)? else {
            debug!(path = %path.display(), "skipping non-server document");
            continue;
        };
        let admission = reconciler.admit(manifest, &now)?;
        if admission.reactivated {
            reactivated += 1;
            info!(key = %admission.key, "reactivated catalog entry");
        }
        writer.write_harvested(&admission.key, &admission.manifest)?;
    }

    let reason = format!("Not found in latest harvest from {}", opts.source_repo);
    for stale in reconciler.finish() {
        if writer.has_written(&stale.path) {
            warn!(
                key = %stale.key,
                path = %stale.path.display(),
                "stale entry shares a path rewritten this run; leaving it to the new owner"
            );
            continue;
        }
        let Some(mut manifest) = read_manifest(&stale.path)? else {
            warn!(path = %stale.path.display(), "stale entry is no longer a server manifest");
            continue;
        };
        let transitioned = mark_deprecated(&mut manifest, &reason, &now);
        if transitioned {
            info!(key = %stale.key, "deprecated catalog entry");
        }
        writer.write_stale(&stale.key, &stale.path, &manifest, transitioned)?;
    }
    log.emit(
        SyncStage::Reconcile,
        "sync.reconcile.complete",
        fields([
            ("written", writer.written().to_string()),
            ("deprecated_added", writer.deprecated_added().to_string()),
            ("reactivated", reactivated.to_string()),
        ]),
    );

    log.emit(SyncStage::Persist, "sync.persist.begin", BTreeMap::new());
    let written = writer.written();
    let source = IndexSource::new(opts.harvester_label.clone(), opts.source_repo.clone());
    let index = writer.finish(&job.index_path, source)?;
    let manifests_sha256 = sha256_hex(index.manifests.join("\n").as_bytes());
    log.emit(
        SyncStage::Finalize,
        "sync.persist.complete",
        fields([
            ("total_items", index.counts.total_items.to_string()),
            ("active_manifests", index.counts.active_manifests.to_string()),
            ("manifests_sha256", manifests_sha256.clone()),
        ]),
    );
    info!(
        items = index.counts.total_items,
        active = index.counts.active_manifests,
        deprecated_added = index.counts.deprecated_added_this_run,
        index = %job.index_path.display(),
        "catalog sync complete"
    );

    let result = SyncResult {
        index_path: job.index_path.clone(),
        index,
        written,
        reactivated,
        unresolved,
        manifests_sha256,
    };
    Ok((result, log.events().to_vec()))
}

/// `Ok(None)` for a document whose `type` is not `mcp_server`.
pub(crate) fn read_manifest(path: &Path) -> Result<Option<Manifest>, SyncError> {
    let raw = fs::read(path).map_err(|e| SyncError::io(path, e))?;
    Manifest::parse_server(&raw).map_err(|e| SyncError::ManifestParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn reset_dir(dir: &Path) -> Result<(), SyncError> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| SyncError::io(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| SyncError::io(dir, e))
}

fn fields<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
