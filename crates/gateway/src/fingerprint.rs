//! Order-independent payload fingerprints

use aegis_core::Payload;
use serde_json::Value;

/// Deterministic encoding of a request payload, used only for equality
///
/// The payload is flattened into `(path, value)` tuples sorted by path;
/// nested objects contribute dotted paths of quoted keys and arrays
/// indexed ones. Two payloads with the same content therefore compare equal
/// whatever order their keys were inserted in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PayloadFingerprint(Vec<(String, String)>);

impl PayloadFingerprint {
    pub fn of(payload: &Payload) -> Self {
        let mut entries = Vec::with_capacity(payload.len());
        flatten_object("", payload, &mut entries);
        entries.sort();
        Self(entries)
    }

    /// Fingerprint of an entry seeded without a known request
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Keys are JSON-quoted so `{"a": {"b": 1}}` and `{"a.b": 1}` stay distinct
fn join(prefix: &str, key: &str) -> String {
    let quoted = Value::String(key.to_string()).to_string();
    if prefix.is_empty() {
        quoted
    } else {
        format!("{}.{}", prefix, quoted)
    }
}

fn flatten_object(prefix: &str, object: &Payload, out: &mut Vec<(String, String)>) {
    for (key, value) in object {
        flatten_value(join(prefix, key), value, out);
    }
}

fn flatten_value(path: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(object) if !object.is_empty() => flatten_object(&path, object, out),
        Value::Array(items) if !items.is_empty() => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(format!("{}[{}]", path, index), item, out);
            }
        }
        // Scalars and empty containers render as their JSON text
        other => out.push((path, other.to_string())),
    }
}
