// SPDX-License-Identifier: Apache-2.0

pub(crate) use crate::helpers::display_relative;
use crate::OutputMode;
use mcp_catalog_model::{LifecycleStatus, Transport, MANIFEST_FILE_NAME, MANIFEST_TYPE};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

mod index_integrity;
mod schema;
mod structure;

pub(crate) use index_integrity::validate_index;
pub(crate) use schema::validate_schema;
pub(crate) use structure::validate_structure;

/// Outcome of one full validator pass. Fatal problems that stop the pass
/// early are reported as `Err(String)` by the validators instead.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ValidationReport {
    /// Manifests examined.
    pub(crate) checked: usize,
    pub(crate) errors: Vec<String>,
    pub(crate) warnings: Vec<String>,
}

impl ValidationReport {
    pub(crate) fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    #[must_use]
    pub(crate) fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

pub(crate) fn emit_report(
    command: &str,
    report: &ValidationReport,
    output_mode: OutputMode,
) -> Result<(), String> {
    if output_mode.json {
        let payload = json!({
            "command": command,
            "status": if report.passed() { "ok" } else { "failed" },
            "checked": report.checked,
            "errors": report.errors,
            "warnings": report.warnings,
        });
        println!(
            "{}",
            serde_json::to_string(&payload).map_err(|e| e.to_string())?
        );
        return Ok(());
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        println!("error: {error}");
    }
    if report.passed() {
        println!("{command}: ok ({} manifest(s) checked)", report.checked);
    } else {
        println!(
            "{command}: {} error(s), {} warning(s) across {} manifest(s)",
            report.errors.len(),
            report.warnings.len(),
            report.checked
        );
    }
    Ok(())
}

/// Every `manifest.json` below `servers_root`, in path order.
pub(crate) fn discover_manifests(servers_root: &Path) -> Vec<PathBuf> {
    WalkDir::new(servers_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.file_name() == MANIFEST_FILE_NAME)
        .map(walkdir::DirEntry::into_path)
        .collect()
}

pub(crate) fn read_json(path: &Path) -> Result<Value, String> {
    let raw = fs::read(path).map_err(|e| e.to_string())?;
    serde_json::from_slice(&raw).map_err(|e| format!("invalid JSON: {e}"))
}

pub(crate) fn is_server_document(doc: &Value) -> bool {
    doc.get("type").and_then(Value::as_str) == Some(MANIFEST_TYPE)
}

/// Lifecycle status exactly as written; an absent or null status reads as
/// active. `"ACTIVE"` is not `"active"`, matching the reconciler.
pub(crate) fn lifecycle_status(doc: &Value) -> String {
    match doc.pointer("/lifecycle/status") {
        None | Some(Value::Null) => LifecycleStatus::Active.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Missing, null, empty string, empty array and empty object all count as blank.
pub(crate) fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

pub(crate) fn declared_transport(doc: &Value) -> Option<Transport> {
    match doc.pointer("/mcp_registration/server/transport")? {
        Value::String(s) if !s.trim().is_empty() => Some(Transport::parse(Some(s))),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
