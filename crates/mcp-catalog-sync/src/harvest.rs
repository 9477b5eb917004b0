// SPDX-License-Identifier: Apache-2.0

use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::SyncError;

pub const HARVEST_INDEX_FILE: &str = "index.json";

#[derive(Debug)]
pub struct HarvestError(pub String);

impl Display for HarvestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for HarvestError {}

/// What the catalog asks of the harvester for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct HarvestRequest {
    pub source_repo: String,
    pub out_dir: PathBuf,
    pub max_parallel: usize,
    /// Answer harvester prompts automatically.
    pub yes: bool,
    pub only_github: bool,
    /// Registration with a hub stays off; the catalog is the only consumer.
    pub register: bool,
    pub matrixhub: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl HarvestRequest {
    #[must_use]
    pub fn for_source(source_repo: &str, out_dir: &Path, max_parallel: usize) -> Self {
        Self {
            source_repo: source_repo.to_string(),
            out_dir: out_dir.to_path_buf(),
            max_parallel,
            yes: true,
            only_github: true,
            register: false,
            matrixhub: None,
            log_file: None,
        }
    }
}

/// Fills `request.out_dir` with manifests and an `index.json` listing them.
pub trait Harvester {
    fn harvest(&self, request: &HarvestRequest) -> Result<(), HarvestError>;
}

/// Runs the external harvester executable to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHarvester {
    program: PathBuf,
}

impl CommandHarvester {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Label recorded as `source.harvester` in the top-level index.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} harvest-source", self.program.display())
    }

    #[must_use]
    pub fn arguments(request: &HarvestRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "harvest-source".into(),
            request.source_repo.clone().into(),
            "--out".into(),
            request.out_dir.clone().into_os_string(),
            "--max-parallel".into(),
            request.max_parallel.to_string().into(),
        ];
        if request.yes {
            args.push("--yes".into());
        }
        if request.only_github {
            args.push("--only-github".into());
        }
        args.push(if request.register { "--register" } else { "--no-register" }.into());
        if let Some(hub) = &request.matrixhub {
            args.push("--matrixhub".into());
            args.push(hub.clone().into());
        }
        if let Some(log_file) = &request.log_file {
            args.push("--log-file".into());
            args.push(log_file.clone().into_os_string());
        }
        args
    }
}

impl Harvester for CommandHarvester {
    fn harvest(&self, request: &HarvestRequest) -> Result<(), HarvestError> {
        info!(
            program = %self.program.display(),
            source = %request.source_repo,
            out = %request.out_dir.display(),
            "running harvester"
        );
        // Harvester chatter goes to stderr so stdout stays machine-readable.
        let status = Command::new(&self.program)
            .args(Self::arguments(request))
            .stdout(std::io::stderr())
            .status()
            .map_err(|e| {
                HarvestError(format!(
                    "failed to start harvester at {}: {e}",
                    self.program.display()
                ))
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(HarvestError(format!("harvester exited with status {status}")))
        }
    }
}

/// `index.json` produced by the harvester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestedIndex {
    pub path: PathBuf,
    /// Manifest references as listed, in order.
    pub entries: Vec<String>,
}

impl HarvestedIndex {
    /// Reads `manifests`, falling back to `manifest_paths` when the former is
    /// absent or empty.
    pub fn load(out_dir: &Path) -> Result<Self, SyncError> {
        let path = out_dir.join(HARVEST_INDEX_FILE);
        if !path.is_file() {
            return Err(SyncError::MissingHarvestIndex { path });
        }
        let raw = fs::read(&path).map_err(|e| SyncError::io(&path, e))?;
        let doc: Value = serde_json::from_slice(&raw).map_err(|e| SyncError::MalformedHarvestIndex {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let listed = ["manifests", "manifest_paths"]
            .into_iter()
            .filter_map(|k| doc.get(k).and_then(Value::as_array))
            .find(|list| !list.is_empty());
        let Some(listed) = listed else {
            return Err(SyncError::EmptyManifestList { path });
        };
        let mut entries = Vec::with_capacity(listed.len());
        for item in listed {
            match item.as_str() {
                Some(s) => entries.push(s.to_string()),
                None => warn!(entry = %item, "ignoring non-string harvest index entry"),
            }
        }
        if entries.is_empty() {
            return Err(SyncError::EmptyManifestList { path });
        }
        Ok(Self { path, entries })
    }
}

/// Locates a harvested manifest: an existing absolute path, then a path
/// relative to the harvest directory, then the only file anywhere below the
/// harvest directory with the same file name.
#[must_use]
pub fn resolve_manifest_path(out_dir: &Path, entry: &str) -> Option<PathBuf> {
    let candidate = Path::new(entry);
    if candidate.is_absolute() && candidate.exists() {
        return Some(candidate.to_path_buf());
    }
    let relative = out_dir.join(candidate);
    if relative.exists() {
        return Some(relative);
    }
    let name = candidate.file_name()?;
    let mut matches = WalkDir::new(out_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == name)
        .map(walkdir::DirEntry::into_path);
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first)
}
