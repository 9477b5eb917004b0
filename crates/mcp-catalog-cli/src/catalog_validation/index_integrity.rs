use super::*;
use regex::Regex;

const URL_SCHEME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9+.\-]*://";

/// Checks that every path in the top-level `manifests` list is a relative,
/// existing, active catalog server manifest, and that every `items` row
/// points at a file that exists.
pub(crate) fn validate_index(catalog_root: &Path, index_file: &Path) -> Result<ValidationReport, String> {
    let index_path = catalog_root.join(index_file);
    if !index_path.is_file() {
        return Err(format!("index file not found: {}", index_path.display()));
    }
    let index = read_json(&index_path).map_err(|e| format!("{}: {e}", index_path.display()))?;
    let manifests = match index.get("manifests") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(list)) => list.clone(),
        Some(_) => {
            return Err(format!(
                "{}: 'manifests' must be a list",
                index_path.display()
            ))
        }
    };
    let url_scheme = Regex::new(URL_SCHEME_PATTERN).map_err(|e| e.to_string())?;

    let mut report = ValidationReport::default();
    for (i, entry) in manifests.iter().enumerate() {
        report.checked += 1;
        let Some(rel) = entry.as_str() else {
            report.error(format!("manifests[{i}] is not a string: {entry}"));
            continue;
        };
        if let Some(problem) = reference_problem(&url_scheme, rel) {
            report.error(format!("manifests[{i}] {problem}: {rel}"));
            continue;
        }
        let path = catalog_root.join(rel);
        if !path.is_file() {
            report.error(format!("manifests[{i}] points to a missing file: {rel}"));
            continue;
        }
        let doc = match read_json(&path) {
            Ok(doc) => doc,
            Err(e) => {
                report.error(format!("{rel}: {e}"));
                continue;
            }
        };
        if !is_server_document(&doc) {
            report.error(format!("{rel}: type is not '{MANIFEST_TYPE}'"));
        }
        let status = lifecycle_status(&doc);
        if status != "active" {
            report.error(format!(
                "{rel}: listed in manifests but lifecycle status is '{status}'"
            ));
        }
    }

    if let Some(Value::Array(items)) = index.get("items") {
        for (i, item) in items.iter().enumerate() {
            let Some(rel) = item.get("manifest_path").and_then(Value::as_str) else {
                report.error(format!("items[{i}] has no manifest_path"));
                continue;
            };
            if let Some(problem) = reference_problem(&url_scheme, rel) {
                report.error(format!("items[{i}].manifest_path {problem}: {rel}"));
                continue;
            }
            if !catalog_root.join(rel).is_file() {
                report.error(format!("items[{i}].manifest_path points to a missing file: {rel}"));
            }
        }
    }
    Ok(report)
}

/// Why a manifest reference cannot be a catalog-relative path, if it cannot.
fn reference_problem(url_scheme: &Regex, rel: &str) -> Option<&'static str> {
    if rel.trim().is_empty() {
        Some("is empty")
    } else if url_scheme.is_match(rel) {
        Some("is a URL, expected a catalog-relative path")
    } else if rel.starts_with('/') || Path::new(rel).is_absolute() {
        Some("is absolute, expected a catalog-relative path")
    } else if rel.contains("...") {
        Some("contains an ellipsis placeholder")
    } else {
        None
    }
}
