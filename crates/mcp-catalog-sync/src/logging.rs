// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    Prepare,
    Harvest,
    Reconcile,
    Persist,
    Finalize,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncEvent {
    pub stage: SyncStage,
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

/// Ordered record of what a run did, returned alongside its result.
#[derive(Debug, Default, Clone)]
pub struct SyncLog {
    events: Vec<SyncEvent>,
}

impl SyncLog {
    pub fn emit(&mut self, stage: SyncStage, name: impl Into<String>, fields: BTreeMap<String, String>) {
        let event = SyncEvent {
            stage,
            name: name.into(),
            fields,
        };
        tracing::debug!(stage = ?event.stage, event = %event.name, fields = ?event.fields, "sync event");
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[SyncEvent] {
        &self.events
    }
}
