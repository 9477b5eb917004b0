use super::schema::readable_pointer;
use super::{validate_index, validate_schema, validate_structure};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, value: &Value) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, serde_json::to_vec_pretty(value).expect("encode")).expect("write");
}

fn stdio_manifest(id: &str) -> Value {
    json!({
        "type": "mcp_server",
        "id": id,
        "name": "Widget",
        "mcp_registration": {"server": {"transport": "STDIO", "exec": {"cmd": ["widget"]}}}
    })
}

const WIDGET: &str = "servers/acme-widget/widget__src/manifest.json";

#[test]
fn index_validator_accepts_a_consistent_catalog() {
    let tmp = tempdir().expect("tmp");
    write(tmp.path(), WIDGET, &stdio_manifest("w1"));
    write(
        tmp.path(),
        "index.json",
        &json!({"manifests": [WIDGET], "items": [{"manifest_path": WIDGET}]}),
    );
    let report = validate_index(tmp.path(), Path::new("index.json")).expect("report");
    assert!(report.passed(), "{:?}", report.errors);
    assert_eq!(report.checked, 1);
}

#[test]
fn index_validator_reports_missing_manifest_path() {
    let tmp = tempdir().expect("tmp");
    write(tmp.path(), "index.json", &json!({"manifests": ["servers/gone/x__./manifest.json"]}));
    let report = validate_index(tmp.path(), Path::new("index.json")).expect("report");
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("servers/gone/x__./manifest.json"));
    assert!(report.errors[0].contains("missing file"));
}

#[test]
fn index_validator_collects_every_violation_in_one_pass() {
    let tmp = tempdir().expect("tmp");
    write(tmp.path(), WIDGET, &stdio_manifest("w1"));
    let mut retired = stdio_manifest("w2");
    retired["lifecycle"] = json!({"status": "deprecated"});
    write(tmp.path(), "servers/acme-old/old__./manifest.json", &retired);
    write(tmp.path(), "servers/other/doc.json", &json!({"type": "note"}));
    write(
        tmp.path(),
        "index.json",
        &json!({
            "manifests": [
                WIDGET,
                "https://example.com/manifest.json",
                "/abs/manifest.json",
                "servers/.../manifest.json",
                7,
                "servers/acme-old/old__./manifest.json",
                "servers/other/doc.json"
            ],
            "items": [{"manifest_path": "servers/nowhere/manifest.json"}, {"id": "x"}]
        }),
    );
    let report = validate_index(tmp.path(), Path::new("index.json")).expect("report");
    assert_eq!(report.checked, 7);
    let errors = report.errors.join("\n");
    assert!(errors.contains("manifests[1] is a URL"));
    assert!(errors.contains("manifests[2] is absolute"));
    assert!(errors.contains("manifests[3] contains an ellipsis"));
    assert!(errors.contains("manifests[4] is not a string"));
    assert!(errors.contains("lifecycle status is 'deprecated'"));
    assert!(errors.contains("servers/other/doc.json: type is not 'mcp_server'"));
    assert!(errors.contains("items[0].manifest_path points to a missing file"));
    assert!(errors.contains("items[1] has no manifest_path"));
    assert_eq!(report.errors.len(), 8);
}

#[test]
fn index_validator_compares_lifecycle_status_exactly() {
    let tmp = tempdir().expect("tmp");
    let mut shouting = stdio_manifest("w1");
    shouting["lifecycle"] = json!({"status": "ACTIVE"});
    write(tmp.path(), WIDGET, &shouting);
    let mut padded = stdio_manifest("w2");
    padded["lifecycle"] = json!({"status": " active "});
    write(tmp.path(), "servers/acme-pad/pad__./manifest.json", &padded);
    write(
        tmp.path(),
        "index.json",
        &json!({"manifests": [WIDGET, "servers/acme-pad/pad__./manifest.json"]}),
    );
    let report = validate_index(tmp.path(), Path::new("index.json")).expect("report");
    assert_eq!(
        report.errors,
        [
            format!("{WIDGET}: listed in manifests but lifecycle status is 'ACTIVE'"),
            "servers/acme-pad/pad__./manifest.json: listed in manifests but lifecycle status is ' active '"
                .to_string(),
        ]
    );
}

#[test]
fn index_validator_treats_unreadable_index_as_fatal() {
    let tmp = tempdir().expect("tmp");
    assert!(validate_index(tmp.path(), Path::new("index.json"))
        .expect_err("missing")
        .contains("index file not found"));
    fs::write(tmp.path().join("index.json"), "{oops").expect("write");
    assert!(validate_index(tmp.path(), Path::new("index.json")).is_err());
    write(tmp.path(), "index.json", &json!({"manifests": "servers"}));
    assert!(validate_index(tmp.path(), Path::new("index.json"))
        .expect_err("non-list")
        .contains("must be a list"));
}

#[test]
fn structure_validator_checks_transport_requirements() {
    let tmp = tempdir().expect("tmp");
    write(tmp.path(), "index.json", &json!({"manifests": []}));
    write(tmp.path(), WIDGET, &stdio_manifest("w1"));
    write(
        tmp.path(),
        "servers/acme-sse/sse__./manifest.json",
        &json!({
            "type": "mcp_server",
            "id": "s1",
            "name": "",
            "mcp_registration": {"server": {"transport": "sse"}}
        }),
    );
    write(
        tmp.path(),
        "servers/acme-grpc/grpc__./manifest.json",
        &json!({
            "type": "mcp_server",
            "id": "g1",
            "name": "G",
            "mcp_registration": {"server": {"transport": "GRPC"}}
        }),
    );
    let report = validate_structure(tmp.path(), Path::new("index.json"), Path::new("servers"))
        .expect("report");
    assert_eq!(report.checked, 3);
    assert_eq!(
        report.errors,
        [
            "servers/acme-sse/sse__./manifest.json: missing or empty 'name'",
            "servers/acme-sse/sse__./manifest.json: SSE transport requires mcp_registration.server.url",
        ]
    );
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("unrecognized transport 'GRPC'")));
    assert!(report.warnings.iter().any(|w| w.contains("missing 'items'")));
}

#[test]
fn structure_validator_flags_an_empty_catalog() {
    let tmp = tempdir().expect("tmp");
    let report = validate_structure(tmp.path(), Path::new("index.json"), Path::new("servers"))
        .expect("report");
    assert!(!report.passed());
    assert!(report.errors.iter().any(|e| e.contains("index file not found")));
    assert!(report.errors.iter().any(|e| e.contains("no manifest.json files")));
}

#[test]
fn schema_validator_reports_instance_paths() {
    let tmp = tempdir().expect("tmp");
    write(
        tmp.path(),
        "schema/mcp_server.schema.json",
        &json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": {"type": "string"},
                "mcp_registration": {
                    "type": "object",
                    "properties": {"server": {"type": "object"}}
                }
            }
        }),
    );
    write(tmp.path(), WIDGET, &stdio_manifest("w1"));
    write(
        tmp.path(),
        "servers/acme-bad/bad__./manifest.json",
        &json!({"mcp_registration": {"server": 5}}),
    );
    let report = validate_schema(
        tmp.path(),
        Path::new("servers"),
        Path::new("schema/mcp_server.schema.json"),
    )
    .expect("report");
    assert_eq!(report.checked, 2);
    assert_eq!(report.errors.len(), 2);
    assert!(report
        .errors
        .iter()
        .all(|e| e.starts_with("servers/acme-bad/bad__./manifest.json: ")));
    assert!(report.errors.iter().any(|e| e.contains(": root: ")));
    assert!(report
        .errors
        .iter()
        .any(|e| e.contains(": mcp_registration -> server: ")));
}

#[test]
fn schema_validator_requires_schema_and_manifests() {
    let tmp = tempdir().expect("tmp");
    let missing = validate_schema(tmp.path(), Path::new("servers"), Path::new("schema.json"))
        .expect_err("missing schema");
    assert!(missing.contains("schema not found"));

    write(tmp.path(), "schema.json", &json!({"type": "object"}));
    let empty = validate_schema(tmp.path(), Path::new("servers"), Path::new("schema.json"))
        .expect_err("no manifests");
    assert!(empty.contains("no manifest.json files"));
}

#[test]
fn shipped_schema_accepts_a_synced_manifest() {
    let schema = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schema/mcp_server.schema.json");
    let tmp = tempdir().expect("tmp");
    let mut manifest = stdio_manifest("w1");
    manifest["lifecycle"] = json!({"status": "active", "reactivated_at": "2026-01-01T00:00:00+00:00"});
    manifest["harvest"] = json!({"seen_in_latest_run": true, "last_seen_at": "2026-01-01T00:00:00+00:00"});
    write(tmp.path(), WIDGET, &manifest);
    let report = validate_schema(tmp.path(), Path::new("servers"), &schema).expect("report");
    assert!(report.passed(), "{:?}", report.errors);
}

#[test]
fn json_pointers_render_as_arrow_paths() {
    assert_eq!(readable_pointer(""), "root");
    assert_eq!(readable_pointer("/a/0/b"), "a -> 0 -> b");
    assert_eq!(readable_pointer("/x~1y/z~0"), "x/y -> z~");
}
