use super::*;
use jsonschema::Draft;

pub(crate) fn validate_schema(
    catalog_root: &Path,
    servers_dir: &Path,
    schema_path: &Path,
) -> Result<ValidationReport, String> {
    let schema_path = if schema_path.is_absolute() {
        schema_path.to_path_buf()
    } else {
        catalog_root.join(schema_path)
    };
    if !schema_path.is_file() {
        return Err(format!("schema not found: {}", schema_path.display()));
    }
    let schema = read_json(&schema_path).map_err(|e| format!("{}: {e}", schema_path.display()))?;
    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|e| format!("{}: schema does not compile: {e}", schema_path.display()))?;

    let servers_root = catalog_root.join(servers_dir);
    let manifests = discover_manifests(&servers_root);
    if manifests.is_empty() {
        return Err(format!(
            "no {MANIFEST_FILE_NAME} files found under {}",
            servers_root.display()
        ));
    }

    let mut report = ValidationReport::default();
    for path in manifests {
        report.checked += 1;
        let rel = display_relative(catalog_root, &path);
        let doc = match read_json(&path) {
            Ok(doc) => doc,
            Err(e) => {
                report.error(format!("{rel}: {e}"));
                continue;
            }
        };
        for err in validator.iter_errors(&doc) {
            let at = readable_pointer(&err.instance_path.to_string());
            report.error(format!("{rel}: {at}: {err}"));
        }
    }
    Ok(report)
}

/// `/a/0/b` becomes `a -> 0 -> b`; the empty pointer becomes `root`.
pub(crate) fn readable_pointer(pointer: &str) -> String {
    let trimmed = pointer.strip_prefix('/').unwrap_or(pointer);
    if trimmed.is_empty() {
        return "root".to_string();
    }
    trimmed
        .split('/')
        .map(|token| token.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(" -> ")
}
