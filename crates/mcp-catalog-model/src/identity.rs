// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

/// Repository used when a manifest's provenance names no source at all.
///
/// Every such manifest with an empty subpath and the same transport shares
/// one identity key.
pub const UNKNOWN_REPO_FULL: &str = "unknown/unknown";

/// Reduces a repository reference to `owner/repo`.
///
/// Accepts full URLs (`https://github.com/acme/widget.git`), scheme-less
/// hosts (`github.com/acme/widget`) and bare `owner/repo` forms.
#[must_use]
pub fn normalize_repo_full(reference: &str) -> String {
    let mut s = reference.trim().trim_end_matches('/');
    if let Some((_, rest)) = s.split_once("github.com/") {
        s = rest;
    } else if let Some((_, rest)) = s.split_once("://") {
        s = rest.split_once('/').map_or("", |(_, path)| path);
    }
    let s = s.strip_suffix(".git").unwrap_or(s);
    s.trim_matches('/').to_string()
}

/// Lowercases and collapses every run of characters outside `[a-z0-9]` into `-`.
#[must_use]
pub fn safe_slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        "unknown".to_string()
    } else {
        out
    }
}

/// `<repo_slug>__<token>` where the token flattens the subpath with `__`
/// separators and the repository root is `.`.
#[must_use]
pub fn subpath_to_variant(repo_slug: &str, subpath: &str) -> String {
    let trimmed = subpath.trim_start_matches('/').trim();
    let token = if trimmed.is_empty() {
        ".".to_string()
    } else {
        trimmed.replace('\\', "/").replace('/', "__")
    };
    format!("{repo_slug}__{token}")
}

/// Splits `owner/repo` on the first `/`; a missing half becomes `unknown`.
#[must_use]
pub fn split_owner_repo(repo_full: &str) -> (String, String) {
    match repo_full.split_once('/') {
        Some((owner, repo)) => (owner.to_string(), repo.to_string()),
        None => (repo_full.to_string(), "unknown".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Transport {
    Sse,
    Stdio,
    Ws,
    /// Declared but outside the known set; keeps its upper-cased spelling.
    Other(String),
    Unknown,
}

impl Transport {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let normalized = raw.map(|s| s.trim().to_ascii_uppercase()).unwrap_or_default();
        match normalized.as_str() {
            "" | "UNKNOWN" => Self::Unknown,
            "SSE" => Self::Sse,
            "STDIO" => Self::Stdio,
            "WS" => Self::Ws,
            _ => Self::Other(normalized),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sse => "SSE",
            Self::Stdio => "STDIO",
            Self::Ws => "WS",
            Self::Other(raw) => raw,
            Self::Unknown => "UNKNOWN",
        }
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Sse | Self::Stdio | Self::Ws)
    }
}

impl Display for Transport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Transport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Transport {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::parse(raw.as_deref()))
    }
}

/// Stable identity of one catalog entry across runs.
///
/// Deliberately independent of the manifest's declared `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct IdentityKey {
    pub repo_full: String,
    pub subpath: String,
    pub transport: Transport,
}

impl IdentityKey {
    /// Builds a key from a raw repository reference and subpath.
    ///
    /// The repository is normalized; an absent or unusable one falls back to
    /// [`UNKNOWN_REPO_FULL`]. Leading `/` is stripped from the subpath.
    #[must_use]
    pub fn new(repo_ref: Option<&str>, subpath: Option<&str>, transport: Transport) -> Self {
        let repo_full = repo_ref
            .map(normalize_repo_full)
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| UNKNOWN_REPO_FULL.to_string());
        Self {
            repo_full,
            subpath: subpath.unwrap_or_default().trim_start_matches('/').to_string(),
            transport,
        }
    }

    #[must_use]
    pub fn repo_url(&self) -> String {
        format!("https://github.com/{}", self.repo_full)
    }
}

impl Display for IdentityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CatalogKey(repo_full={}, subpath={}, transport={})",
            self.repo_full, self.subpath, self.transport
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_references_normalize_to_owner_repo() {
        for input in [
            "https://github.com/acme/widget",
            "https://github.com/acme/widget.git",
            "https://github.com/acme/widget/",
            "  github.com/acme/widget  ",
            "git@github.com/acme/widget.git",
            "acme/widget",
            "/acme/widget/",
            "https://gitlab.example.org/acme/widget.git",
        ] {
            assert_eq!(normalize_repo_full(input), "acme/widget", "input {input:?}");
        }
    }

    #[test]
    fn slug_collapses_runs_and_trims_dashes() {
        assert_eq!(safe_slug("Acme Corp"), "acme-corp");
        assert_eq!(safe_slug("--my__repo.js--"), "my-repo-js");
        assert_eq!(safe_slug("Widget"), "widget");
        assert_eq!(safe_slug(""), "unknown");
        assert_eq!(safe_slug("___"), "unknown");
    }

    #[test]
    fn variant_names_flatten_subpaths() {
        assert_eq!(subpath_to_variant("widget", "src/server"), "widget__src__server");
        assert_eq!(subpath_to_variant("widget", "/src/server"), "widget__src__server");
        assert_eq!(subpath_to_variant("widget", "src\\server"), "widget__src__server");
        assert_eq!(subpath_to_variant("widget", ""), "widget__.");
        assert_eq!(subpath_to_variant("widget", "  "), "widget__.");
    }

    #[test]
    fn owner_repo_split_pads_missing_half() {
        assert_eq!(
            split_owner_repo("acme/widget"),
            ("acme".to_string(), "widget".to_string())
        );
        assert_eq!(
            split_owner_repo("acme"),
            ("acme".to_string(), "unknown".to_string())
        );
        assert_eq!(
            split_owner_repo("acme/widget/extra"),
            ("acme".to_string(), "widget/extra".to_string())
        );
    }

    #[test]
    fn transport_parse_uppercases_and_keeps_unknown_spellings() {
        assert_eq!(Transport::parse(Some(" stdio ")), Transport::Stdio);
        assert_eq!(Transport::parse(Some("sse")), Transport::Sse);
        assert_eq!(Transport::parse(Some("Ws")), Transport::Ws);
        assert_eq!(
            Transport::parse(Some("http")),
            Transport::Other("HTTP".to_string())
        );
        assert_eq!(Transport::parse(Some("")), Transport::Unknown);
        assert_eq!(Transport::parse(None), Transport::Unknown);
        assert!(!Transport::parse(Some("http")).is_known());
    }

    #[test]
    fn key_falls_back_to_unknown_repository() {
        let key = IdentityKey::new(None, Some("/pkg"), Transport::Stdio);
        assert_eq!(key.repo_full, UNKNOWN_REPO_FULL);
        assert_eq!(key.subpath, "pkg");
        let key = IdentityKey::new(Some("https://github.com/"), None, Transport::Unknown);
        assert_eq!(key.repo_full, UNKNOWN_REPO_FULL);
    }

    #[test]
    fn key_display_names_all_components() {
        let key = IdentityKey::new(Some("acme/widget"), Some("src/server"), Transport::Stdio);
        assert_eq!(
            key.to_string(),
            "CatalogKey(repo_full=acme/widget, subpath=src/server, transport=STDIO)"
        );
        assert_eq!(key.repo_url(), "https://github.com/acme/widget");
    }
}
