//! Loading a database export into a `MemoryStore`
//!
//! The export is a JSON document holding the collection hierarchy, with field
//! values in the Firestore REST typed-value encoding:
//!
//! ```json
//! {
//!   "projectId": "demo",
//!   "collections": {
//!     "users": {
//!       "user123": {
//!         "fields": { "createdAt": { "timestampValue": "2024-01-01T00:00:00Z" } },
//!         "collections": { "orders": { "o1": { "fields": {} } } }
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::value::{FieldValue, Fields, GeoPoint, Timestamp};

use super::memory::MemoryStore;
use super::{CollectionRef, DocumentRef};

/// Structural problems with an export. A field value that cannot be decoded
/// is not one of them: it loads as `FieldValue::Corrupt`.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid export JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid path segment '{0}'")]
    InvalidSegment(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportFile {
    project_id: Option<String>,
    #[serde(default)]
    collections: BTreeMap<String, ExportCollection>,
}

type ExportCollection = BTreeMap<String, ExportDocument>;

#[derive(Debug, Default, Deserialize)]
struct ExportDocument {
    #[serde(default)]
    fields: Map<String, Value>,
    #[serde(default)]
    collections: BTreeMap<String, ExportCollection>,
}

/// Read and parse an export file.
pub fn load_snapshot(path: &Path) -> Result<MemoryStore, SnapshotError> {
    let json = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_snapshot(&json)
}

/// Parse an export held in memory.
pub fn parse_snapshot(json: &str) -> Result<MemoryStore, SnapshotError> {
    let export: ExportFile = serde_json::from_str(json)?;
    let mut store = MemoryStore::new();
    if let Some(project_id) = export.project_id {
        store.set_project_id(project_id);
    }
    for (name, collection) in &export.collections {
        check_segment(name)?;
        load_collection(&mut store, &CollectionRef::root(name.as_str()), collection)?;
    }
    debug!(documents = store.document_count(), "export loaded");
    Ok(store)
}

fn check_segment(segment: &str) -> Result<(), SnapshotError> {
    if segment.is_empty() || segment.contains('/') {
        return Err(SnapshotError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

fn load_collection(
    store: &mut MemoryStore,
    collection: &CollectionRef,
    docs: &ExportCollection,
) -> Result<(), SnapshotError> {
    store.ensure_collection(collection);
    for (id, doc) in docs {
        check_segment(id)?;
        let reference = collection.document(id.as_str());
        store.insert(&reference, decode_fields(&reference, &doc.fields));
        for (name, sub) in &doc.collections {
            check_segment(name)?;
            load_collection(store, &reference.collection(name.as_str()), sub)?;
        }
    }
    Ok(())
}

fn decode_fields(document: &DocumentRef, raw: &Map<String, Value>) -> Fields {
    raw.iter()
        .map(|(name, value)| {
            let decoded = decode_value(value);
            if let FieldValue::Corrupt { kind, reason } = &decoded {
                debug!(document = %document.path(), field = %name, kind = *kind, reason = %reason, "corrupt field value");
            }
            (name.clone(), decoded)
        })
        .collect()
}

/// Decode one typed value such as `{"integerValue": "42"}`.
///
/// A value whose type is known but whose payload is malformed becomes
/// `FieldValue::Corrupt`; an unknown type key becomes `FieldValue::Unsupported`.
pub fn decode_value(value: &Value) -> FieldValue {
    let Some(object) = value.as_object() else {
        return corrupt("value", format!("expected a typed value object, found {}", value));
    };
    let mut entries = object.iter();
    let (key, inner) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => return corrupt("value", format!("expected exactly one type key, found {}", object.len())),
    };
    let Some(kind) = value_kind(key) else {
        return FieldValue::Unsupported {
            type_name: key.clone(),
            repr: inner.to_string(),
        };
    };
    decode_typed(key, inner).unwrap_or_else(|reason| corrupt(kind, reason))
}

fn corrupt(kind: &'static str, reason: String) -> FieldValue {
    FieldValue::Corrupt { kind, reason }
}

/// Placeholder kind for each type key this loader understands.
fn value_kind(key: &str) -> Option<&'static str> {
    Some(match key {
        "nullValue" => "null",
        "booleanValue" => "boolean",
        "integerValue" => "integer",
        "doubleValue" => "double",
        "timestampValue" => "timestamp",
        "stringValue" => "string",
        "bytesValue" => "bytes",
        "referenceValue" => "reference",
        "geoPointValue" => "geopoint",
        "arrayValue" => "array",
        "mapValue" => "map",
        _ => return None,
    })
}

fn decode_typed(key: &str, inner: &Value) -> Result<FieldValue, String> {
    match key {
        "nullValue" => Ok(FieldValue::Null),
        "booleanValue" => inner
            .as_bool()
            .map(FieldValue::Boolean)
            .ok_or_else(|| format!("booleanValue must be a bool, found {}", inner)),
        "integerValue" => decode_integer(inner).map(FieldValue::Integer),
        "doubleValue" => decode_double(inner).map(FieldValue::Double),
        "timestampValue" => {
            let text = expect_str(key, inner)?;
            let parsed = DateTime::parse_from_rfc3339(text)
                .map_err(|e| format!("bad timestamp '{}': {}", text, e))?;
            Ok(FieldValue::Timestamp(Timestamp::from_datetime(
                parsed.with_timezone(&Utc),
            )))
        }
        "stringValue" => expect_str(key, inner).map(|s| FieldValue::String(s.to_string())),
        "bytesValue" => {
            let text = expect_str(key, inner)?;
            BASE64
                .decode(text)
                .map(FieldValue::Bytes)
                .map_err(|e| format!("bad base64: {}", e))
        }
        "referenceValue" => {
            expect_str(key, inner).map(|s| FieldValue::Reference(strip_resource_prefix(s).to_string()))
        }
        "geoPointValue" => {
            if !inner.is_object() {
                return Err(format!("geoPointValue must be an object, found {}", inner));
            }
            Ok(FieldValue::GeoPoint(GeoPoint {
                latitude: coordinate(inner, "latitude")?,
                longitude: coordinate(inner, "longitude")?,
            }))
        }
        "arrayValue" => match inner.get("values") {
            None => Ok(FieldValue::Array(Vec::new())),
            Some(Value::Array(values)) => Ok(FieldValue::Array(values.iter().map(decode_value).collect())),
            Some(other) => Err(format!("arrayValue.values must be a list, found {}", other)),
        },
        "mapValue" => match inner.get("fields") {
            None => Ok(FieldValue::Map(BTreeMap::new())),
            Some(Value::Object(fields)) => Ok(FieldValue::Map(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), decode_value(v)))
                    .collect(),
            )),
            Some(other) => Err(format!("mapValue.fields must be an object, found {}", other)),
        },
        other => Err(format!("unknown type key '{}'", other)),
    }
}

/// Both coordinates must be present and numeric.
fn coordinate(point: &Value, name: &str) -> Result<f64, String> {
    match point.get(name) {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| format!("geoPointValue.{} must be a number, found {}", name, value)),
        None => Err(format!("geoPointValue.{} is missing", name)),
    }
}

fn expect_str<'a>(kind: &str, value: &'a Value) -> Result<&'a str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("{} must be a string, found {}", kind, value))
}

/// Integers arrive as strings in the REST encoding, but plain numbers are accepted.
fn decode_integer(value: &Value) -> Result<i64, String> {
    match value {
        Value::String(s) => s.parse().map_err(|_| format!("bad integer '{}'", s)),
        Value::Number(n) => n.as_i64().ok_or_else(|| format!("bad integer {}", n)),
        other => Err(format!("integerValue must be a string or number, found {}", other)),
    }
}

fn decode_double(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| format!("bad double {}", n)),
        Value::String(s) => match s.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => s.parse().map_err(|_| format!("bad double '{}'", s)),
        },
        other => Err(format!("doubleValue must be a number, found {}", other)),
    }
}

/// `projects/p/databases/(default)/documents/users/u1` becomes `users/u1`.
fn strip_resource_prefix(name: &str) -> &str {
    if name.starts_with("projects/") {
        if let Some(idx) = name.find("/documents/") {
            return &name[idx + "/documents/".len()..];
        }
    }
    name
}
