// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::identity::{IdentityKey, Transport};
use crate::serde_helpers::{present, TextValue};

/// Literal `type` of every document the catalog owns.
pub const MANIFEST_TYPE: &str = "mcp_server";

#[derive(Debug, Clone, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum LifecycleStatus {
    #[default]
    Active,
    Deprecated,
    Disabled,
    Other(String),
}

impl LifecycleStatus {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "active" => Self::Active,
            "deprecated" => Self::Deprecated,
            "disabled" => Self::Disabled,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Deprecated => "deprecated",
            Self::Disabled => "disabled",
            Self::Other(raw) => raw,
        }
    }
}

impl Display for LifecycleStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LifecycleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LifecycleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => Self::Active,
            Value::String(raw) => Self::parse(&raw),
            other => Self::Other(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Provenance {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub repo_url: Option<TextValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub repo: Option<TextValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub source_repo: Option<TextValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub subpath: Option<TextValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub path: Option<TextValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub source_path: Option<TextValue>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Provenance {
    /// First non-empty of `repo_url`, `repo`, `source_repo`.
    #[must_use]
    pub fn repo_ref(&self) -> Option<&str> {
        [&self.repo_url, &self.repo, &self.source_repo]
            .into_iter()
            .filter_map(|v| v.as_ref().and_then(TextValue::as_str))
            .find(|v| !v.is_empty())
    }

    /// First non-empty of `subpath`, `path`, `source_path`, without leading `/`.
    #[must_use]
    pub fn subpath(&self) -> Option<&str> {
        [&self.subpath, &self.path, &self.source_path]
            .into_iter()
            .filter_map(|v| v.as_ref().and_then(TextValue::as_str))
            .find(|v| !v.is_empty())
            .map(|v| v.trim_start_matches('/'))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repo_url.is_none()
            && self.repo.is_none()
            && self.source_repo.is_none()
            && self.subpath.is_none()
            && self.path.is_none()
            && self.source_path.is_none()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ServerSpec {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub transport: Option<TextValue>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Registration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerSpec>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Lifecycle {
    #[serde(default)]
    pub status: LifecycleStatus,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub deprecated_at: Option<TextValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub reactivated_at: Option<TextValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub reason: Option<TextValue>,
    /// `Some(Value::Null)` when the key is present with `null`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub replaced_by: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct HarvestStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen_in_latest_run: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub last_seen_at: Option<TextValue>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One server manifest as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Manifest {
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub kind: Option<TextValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub id: Option<TextValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present::deserialize"
    )]
    pub name: Option<TextValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_registration: Option<Registration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest: Option<HarvestStatus>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Manifest {
    /// Parses a catalog document, or `Ok(None)` when its `type` is not
    /// `mcp_server`. Foreign documents are never read into the typed model.
    pub fn parse_server(bytes: &[u8]) -> Result<Option<Self>, serde_json::Error> {
        let raw: Value = serde_json::from_slice(bytes)?;
        if raw.get("type").and_then(Value::as_str) != Some(MANIFEST_TYPE) {
            return Ok(None);
        }
        serde_json::from_value(raw).map(Some)
    }

    #[must_use]
    pub fn is_catalog_server(&self) -> bool {
        self.kind.as_ref().and_then(|k| k.as_value().as_str()) == Some(MANIFEST_TYPE)
    }

    /// Trimmed text form of `id`, or `None` when absent, blank or structured.
    #[must_use]
    pub fn declared_id(&self) -> Option<&str> {
        self.id
            .as_ref()
            .and_then(TextValue::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn raw_transport(&self) -> Option<&str> {
        self.mcp_registration
            .as_ref()
            .and_then(|r| r.server.as_ref())
            .and_then(|s| s.transport.as_ref())
            .and_then(TextValue::as_str)
    }

    #[must_use]
    pub fn transport(&self) -> Transport {
        Transport::parse(self.raw_transport())
    }

    #[must_use]
    pub fn identity_key(&self) -> IdentityKey {
        let provenance = self.provenance.as_ref();
        IdentityKey::new(
            provenance.and_then(Provenance::repo_ref),
            provenance.and_then(Provenance::subpath),
            self.transport(),
        )
    }

    #[must_use]
    pub fn lifecycle_status(&self) -> LifecycleStatus {
        self.lifecycle
            .as_ref()
            .map(|l| l.status.clone())
            .unwrap_or_default()
    }

    /// Provenance object worth writing as a sidecar, if the manifest has one.
    #[must_use]
    pub fn non_empty_provenance(&self) -> Option<&Provenance> {
        self.provenance.as_ref().filter(|p| !p.is_empty())
    }
}
