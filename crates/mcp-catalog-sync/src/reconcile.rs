// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeSet;
use std::path::PathBuf;

use mcp_catalog_model::{HarvestStatus, IdentityKey, Lifecycle, LifecycleStatus, Manifest};
use serde_json::Value;

use crate::collision::CollisionGuard;
use crate::scan::PriorCatalog;
use crate::SyncError;

/// A harvested manifest accepted into this run.
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    pub key: IdentityKey,
    pub manifest: Manifest,
    /// The entry was deprecated before this run and is active again.
    pub reactivated: bool,
}

/// A pre-run entry the harvest did not produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleEntry {
    pub key: IdentityKey,
    pub path: PathBuf,
}

/// Run state for lifecycle reconciliation: the pre-run catalog, the keys seen
/// so far and the id collision table. Holds no file handles.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    prior: PriorCatalog,
    seen: BTreeSet<IdentityKey>,
    guard: CollisionGuard,
}

impl Reconciler {
    #[must_use]
    pub fn new(prior: PriorCatalog) -> Self {
        Self {
            prior,
            seen: BTreeSet::new(),
            guard: CollisionGuard::default(),
        }
    }

    /// Accepts one harvested manifest.
    ///
    /// Fails on a blank id or an id already bound to another key. When the
    /// catalog already holds the key, its lifecycle replaces whatever the
    /// harvester emitted; the catalog owns lifecycle state. The manifest is
    /// then marked active and seen at `now`.
    pub fn admit(&mut self, mut manifest: Manifest, now: &str) -> Result<Admission, SyncError> {
        let key = manifest.identity_key();
        let id = manifest
            .declared_id()
            .ok_or_else(|| SyncError::MissingManifestId { key: key.clone() })?
            .to_string();
        self.guard.observe(&id, &key)?;

        let known = match self.prior.get(&key) {
            Some(prior) => {
                manifest.lifecycle = prior.manifest.lifecycle.clone();
                true
            }
            None => false,
        };
        let reactivated = mark_active_seen(&mut manifest, now) && known;
        self.seen.insert(key.clone());
        Ok(Admission {
            key,
            manifest,
            reactivated,
        })
    }

    #[must_use]
    pub fn is_seen(&self, key: &IdentityKey) -> bool {
        self.seen.contains(key)
    }

    /// Pre-run entries not admitted this run, in key order.
    #[must_use]
    pub fn finish(self) -> Vec<StaleEntry> {
        let seen = self.seen;
        self.prior
            .into_entries()
            .into_iter()
            .filter(|(key, _)| !seen.contains(key))
            .map(|(key, entry)| StaleEntry {
                key,
                path: entry.path,
            })
            .collect()
    }
}

/// Marks a manifest as present in the latest harvest.
///
/// `deprecated` becomes `active` with `reactivated_at = now`, the deprecation
/// reason is dropped and the return value is `true`. `deprecated_at` stays as
/// history. `disabled` and unrecognized statuses are left alone.
pub fn mark_active_seen(manifest: &mut Manifest, now: &str) -> bool {
    let lifecycle = manifest.lifecycle.get_or_insert_with(Lifecycle::default);
    let reactivated = lifecycle.status == LifecycleStatus::Deprecated;
    if reactivated {
        lifecycle.status = LifecycleStatus::Active;
        lifecycle.reactivated_at = Some(now.into());
        lifecycle.reason = None;
    }
    let harvest = manifest.harvest.get_or_insert_with(HarvestStatus::default);
    harvest.seen_in_latest_run = Some(true);
    harvest.last_seen_at = Some(now.into());
    reactivated
}

/// Marks a manifest as missing from the latest harvest.
///
/// Returns `true` only when the status changed to `deprecated` here; that is
/// when `deprecated_at` is stamped. An entry that was already deprecated keeps
/// its timestamp and gets the refreshed reason. `disabled` keeps its whole
/// lifecycle.
pub fn mark_deprecated(manifest: &mut Manifest, reason: &str, now: &str) -> bool {
    let lifecycle = manifest.lifecycle.get_or_insert_with(Lifecycle::default);
    let mut transitioned = false;
    if lifecycle.status != LifecycleStatus::Disabled {
        if lifecycle.status != LifecycleStatus::Deprecated {
            lifecycle.status = LifecycleStatus::Deprecated;
            lifecycle.deprecated_at = Some(now.into());
            transitioned = true;
        } else if lifecycle.deprecated_at.is_none() {
            lifecycle.deprecated_at = Some(now.into());
        }
        lifecycle.reason = Some(reason.into());
        if lifecycle.replaced_by.is_none() {
            lifecycle.replaced_by = Some(Value::Null);
        }
    }
    let harvest = manifest.harvest.get_or_insert_with(HarvestStatus::default);
    harvest.seen_in_latest_run = Some(false);
    if harvest.last_seen_at.is_none() {
        harvest.last_seen_at = Some(now.into());
    }
    transitioned
}
