//! Snapshot rules for documents persisted by the content engine.
//!
//! The engine owns live content. The metadata store only keeps append-only
//! snapshots, and only when a persisted document actually differs from the
//! latest one. Clearing a document is recorded once as an empty snapshot so
//! the newest version never shows text that no longer exists.

use serde_json::Value;

use crate::hashing::sha256_hex;

/// Node types that carry no content on their own.
const STRUCTURAL_NODES: &[&str] = &["doc", "paragraph"];

/// SHA-256 hex digest of the document's canonical JSON form.
///
/// `serde_json` keeps object keys sorted, so two documents that differ only
/// in key order share a fingerprint.
pub fn fingerprint(document: &Value) -> String {
    sha256_hex(document.to_string().as_bytes())
}

/// True when the document holds nothing worth snapshotting: `null`, empty
/// containers, or a tree of bare doc/paragraph nodes without text.
pub fn is_empty_document(document: &Value) -> bool {
    !has_substance(document)
}

fn has_substance(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
        // Encoded engine state (e.g. base64 update) counts when non-empty.
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => items.iter().any(has_substance),
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                if !text.trim().is_empty() {
                    return true;
                }
            }
            if let Some(Value::String(kind)) = map.get("type") {
                if !STRUCTURAL_NODES.contains(&kind.as_str()) && kind != "text" {
                    return true;
                }
            }
            map.get("content").is_some_and(has_substance)
        }
    }
}

/// Decide whether a persisted document should become a new version.
///
/// `latest` is the fingerprint and snapshot of the post's newest version.
/// An empty document is only recorded when it clears a non-empty one.
pub fn should_snapshot(latest: Option<(&str, &Value)>, document: &Value) -> bool {
    if is_empty_document(document) {
        return latest.is_some_and(|(_, snapshot)| !is_empty_document(snapshot));
    }
    latest.map(|(fp, _)| fp) != Some(fingerprint(document).as_str())
}
