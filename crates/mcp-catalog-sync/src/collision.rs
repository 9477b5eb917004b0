// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use mcp_catalog_model::IdentityKey;

use crate::SyncError;

/// Per-run `id -> identity key` table.
///
/// Downstream consumers key on `id`, so two catalog entries that declare the
/// same id would silently overwrite each other there.
#[derive(Debug, Default, Clone)]
pub struct CollisionGuard {
    by_id: BTreeMap<String, IdentityKey>,
}

impl CollisionGuard {
    /// Records `id` for `key`. Repeating a pair is harmless; binding an id to
    /// a second key is an error naming both.
    pub fn observe(&mut self, id: &str, key: &IdentityKey) -> Result<(), SyncError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(SyncError::MissingManifestId { key: key.clone() });
        }
        match self.by_id.get(id) {
            Some(first) if first != key => Err(SyncError::IdCollision {
                id: id.to_string(),
                first: first.clone(),
                second: key.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.by_id.insert(id.to_string(), key.clone());
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
