use super::*;

const REQUIRED_FIELDS: [&str; 3] = ["id", "name", "mcp_registration"];

pub(crate) fn validate_structure(
    catalog_root: &Path,
    index_file: &Path,
    servers_dir: &Path,
) -> Result<ValidationReport, String> {
    let mut report = ValidationReport::default();
    check_index_keys(&catalog_root.join(index_file), &mut report);

    let manifests = discover_manifests(&catalog_root.join(servers_dir));
    if manifests.is_empty() {
        report.error(format!(
            "no {MANIFEST_FILE_NAME} files found under {}",
            catalog_root.join(servers_dir).display()
        ));
    }
    for path in manifests {
        report.checked += 1;
        let rel = display_relative(catalog_root, &path);
        match read_json(&path) {
            Ok(doc) => check_manifest(&rel, &doc, &mut report),
            Err(e) => report.error(format!("{rel}: {e}")),
        }
    }
    Ok(report)
}

fn check_index_keys(index_path: &Path, report: &mut ValidationReport) {
    if !index_path.is_file() {
        report.error(format!("index file not found: {}", index_path.display()));
        return;
    }
    let index = match read_json(index_path) {
        Ok(index) => index,
        Err(e) => {
            report.error(format!("{}: {e}", index_path.display()));
            return;
        }
    };
    match index.get("manifests") {
        Some(Value::Array(_)) => {}
        Some(_) => report.error(format!("{}: 'manifests' must be a list", index_path.display())),
        None => report.error(format!("{}: missing 'manifests'", index_path.display())),
    }
    if index.get("items").is_none() {
        report.warning(format!("{}: missing 'items'", index_path.display()));
    }
}

fn check_manifest(rel: &str, doc: &Value, report: &mut ValidationReport) {
    if !is_server_document(doc) {
        report.error(format!("{rel}: type is not '{MANIFEST_TYPE}'"));
    }
    for field in REQUIRED_FIELDS {
        if is_blank(doc.get(field)) {
            report.error(format!("{rel}: missing or empty '{field}'"));
        }
    }
    let Some(transport) = declared_transport(doc) else {
        report.error(format!("{rel}: missing mcp_registration.server.transport"));
        return;
    };
    let required = match transport {
        Transport::Sse | Transport::Ws => "url",
        Transport::Stdio => "exec",
        _ => {
            report.warning(format!("{rel}: unrecognized transport '{transport}'"));
            return;
        }
    };
    if is_blank(doc.pointer(&format!("/mcp_registration/server/{required}"))) {
        report.error(format!(
            "{rel}: {transport} transport requires mcp_registration.server.{required}"
        ));
    }
}
