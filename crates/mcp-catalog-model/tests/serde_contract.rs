use mcp_catalog_model::{IdentityKey, LifecycleStatus, Manifest, Transport};
use serde_json::json;

#[test]
fn harvested_manifest_keeps_every_field_through_reencode() {
    let raw = json!({
        "type": "mcp_server",
        "id": "acme-widget-1",
        "name": "Widget",
        "version": "0.3.1",
        "capabilities": ["tools", "prompts"],
        "provenance": {
            "repo_url": "https://github.com/acme/widget.git",
            "subpath": "/src/server",
            "harvested_at": "2026-01-01T00:00:00+00:00"
        },
        "mcp_registration": {
            "resource": {"uri": "file://widget"},
            "server": {"transport": "stdio", "exec": {"cmd": ["python", "-m", "widget"]}}
        }
    });
    let manifest: Manifest = serde_json::from_value(raw.clone()).expect("parse");
    assert!(manifest.is_catalog_server());
    assert_eq!(manifest.transport(), Transport::Stdio);
    assert_eq!(manifest.lifecycle_status(), LifecycleStatus::Active);
    assert_eq!(serde_json::to_value(&manifest).expect("encode"), raw);
}

#[test]
fn identity_key_ignores_declared_id() {
    let a: Manifest = serde_json::from_value(json!({
        "type": "mcp_server",
        "id": "one",
        "provenance": {"repo": "acme/widget"},
        "mcp_registration": {"server": {"transport": "SSE"}}
    }))
    .expect("a");
    let b: Manifest = serde_json::from_value(json!({
        "type": "mcp_server",
        "id": "two",
        "provenance": {"repo_url": "https://github.com/acme/widget"},
        "mcp_registration": {"server": {"transport": " sse "}}
    }))
    .expect("b");
    assert_eq!(a.identity_key(), b.identity_key());
    assert_eq!(
        a.identity_key(),
        IdentityKey::new(Some("acme/widget"), None, Transport::Sse)
    );
}

#[test]
fn foreign_documents_are_recognized() {
    let doc: Manifest =
        serde_json::from_value(json!({"type": "mcp_tool", "id": "x"})).expect("parse");
    assert!(!doc.is_catalog_server());
    let untyped: Manifest = serde_json::from_value(json!({"id": "x"})).expect("parse");
    assert!(!untyped.is_catalog_server());
}
