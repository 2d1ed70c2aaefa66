//! Field values and their JSON rendering
//!
//! Documents carry typed values that plain JSON cannot hold directly
//! (timestamps, references, bytes, geo points). `FieldValue::to_json` maps
//! each of them onto a JSON-safe form; `render_fields` does this for a whole
//! document and substitutes a placeholder for any field that fails.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::warn;

/// Field map of a single document, ordered by field name.
pub type Fields = BTreeMap<String, FieldValue>;

/// Firestore supports years 1 through 9999.
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;
const NANOS_PER_SECOND: i32 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("non-finite double {0}")]
    NonFiniteDouble(f64),

    #[error("timestamp out of range (seconds={seconds}, nanos={nanos})")]
    TimestampOutOfRange { seconds: i64, nanos: i32 },

    #[error("corrupt {kind} value: {reason}")]
    Corrupt { kind: &'static str, reason: String },
}

impl ValueError {
    /// Kind of the value that failed, used in placeholders.
    pub fn kind(&self) -> &'static str {
        match self {
            ValueError::NonFiniteDouble(_) => "double",
            ValueError::TimestampOutOfRange { .. } => "timestamp",
            ValueError::Corrupt { kind, .. } => *kind,
        }
    }
}

/// A point in time as stored: seconds since the Unix epoch plus nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos() as i32,
        }
    }

    pub fn to_datetime(self) -> Result<DateTime<Utc>, ValueError> {
        let out_of_range = ValueError::TimestampOutOfRange {
            seconds: self.seconds,
            nanos: self.nanos,
        };
        if !(0..NANOS_PER_SECOND).contains(&self.nanos) {
            return Err(out_of_range);
        }
        let dt = DateTime::from_timestamp(self.seconds, self.nanos as u32).ok_or(out_of_range.clone())?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&dt.year()) {
            return Err(out_of_range);
        }
        Ok(dt)
    }

    /// RFC 3339 / ISO-8601 in UTC with a `Z` suffix.
    ///
    /// Fractional seconds appear only when the source has them, at
    /// millisecond, microsecond or nanosecond width.
    pub fn to_iso8601(self) -> Result<String, ValueError> {
        Ok(self
            .to_datetime()?
            .to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint({}, {})", self.latitude, self.longitude)
    }
}

/// A single typed value inside a document.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(Timestamp),
    Bytes(Vec<u8>),
    /// Path of another document. Rendered, never followed.
    Reference(String),
    GeoPoint(GeoPoint),
    Array(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
    /// A native type this tool has no mapping for, kept as text.
    Unsupported { type_name: String, repr: String },
    /// A value of a known type whose stored form could not be decoded.
    Corrupt { kind: &'static str, reason: String },
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Double(_) => "double",
            FieldValue::String(_) => "string",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Reference(_) => "reference",
            FieldValue::GeoPoint(_) => "geopoint",
            FieldValue::Array(_) => "array",
            FieldValue::Map(_) => "map",
            FieldValue::Unsupported { .. } => "unsupported",
            FieldValue::Corrupt { kind, .. } => *kind,
        }
    }

    /// Convert to a JSON value, recursing through arrays and maps.
    pub fn to_json(&self) -> Result<Value, ValueError> {
        Ok(match self {
            FieldValue::Null => Value::Null,
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Integer(i) => Value::Number((*i).into()),
            FieldValue::Double(d) => {
                Value::Number(Number::from_f64(*d).ok_or(ValueError::NonFiniteDouble(*d))?)
            }
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Timestamp(ts) => Value::String(ts.to_iso8601()?),
            FieldValue::Bytes(bytes) => Value::String(BASE64.encode(bytes)),
            FieldValue::Reference(path) => Value::String(path.clone()),
            FieldValue::GeoPoint(point) => Value::String(point.to_string()),
            FieldValue::Array(items) => Value::Array(
                items
                    .iter()
                    .map(FieldValue::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            FieldValue::Map(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json()?);
                }
                Value::Object(map)
            }
            FieldValue::Unsupported { type_name, repr } => {
                Value::String(format!("{}({})", type_name, repr))
            }
            FieldValue::Corrupt { kind, reason } => {
                return Err(ValueError::Corrupt {
                    kind: *kind,
                    reason: reason.clone(),
                });
            }
        })
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<f64> for FieldValue {
    fn from(d: f64) -> Self {
        FieldValue::Double(d)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<Timestamp> for FieldValue {
    fn from(ts: Timestamp) -> Self {
        FieldValue::Timestamp(ts)
    }
}

/// Placeholder written in place of a field that cannot be rendered.
pub fn placeholder(err: &ValueError) -> Value {
    Value::String(format!("Unserializable({})", err.kind()))
}

/// Render a document's fields to a JSON object.
///
/// A field that fails to convert is replaced by a placeholder; the remaining
/// fields are unaffected.
pub fn render_fields(fields: &Fields) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in fields {
        let rendered = value.to_json().unwrap_or_else(|err| {
            warn!(field = %name, error = %err, "field could not be serialized");
            placeholder(&err)
        });
        map.insert(name.clone(), rendered);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(s: &str) -> Timestamp {
        Timestamp::from_datetime(DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc))
    }

    #[test]
    fn test_timestamp_whole_seconds() {
        assert_eq!(
            ts("2024-01-01T00:00:00Z").to_iso8601().unwrap(),
            "2024-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_timestamp_keeps_subsecond_precision() {
        assert_eq!(
            ts("2024-01-01T00:00:00.250Z").to_iso8601().unwrap(),
            "2024-01-01T00:00:00.250Z"
        );
        assert_eq!(
            ts("2024-01-01T00:00:00.123456789Z").to_iso8601().unwrap(),
            "2024-01-01T00:00:00.123456789Z"
        );
    }

    #[test]
    fn test_timestamp_round_trip() {
        let original = Timestamp::new(1_717_171_717, 42_000_000);
        let rendered = original.to_iso8601().unwrap();
        let parsed = DateTime::parse_from_rfc3339(&rendered).unwrap();
        assert_eq!(Timestamp::from_datetime(parsed.with_timezone(&Utc)), original);
    }

    #[test]
    fn test_timestamp_out_of_range() {
        assert!(Timestamp::new(0, -1).to_iso8601().is_err());
        assert!(Timestamp::new(0, NANOS_PER_SECOND).to_iso8601().is_err());
        assert!(Timestamp::new(i64::MAX, 0).to_iso8601().is_err());
        // Year 10000
        assert!(Timestamp::new(253_402_300_800, 0).to_iso8601().is_err());
    }

    #[test]
    fn test_scalars() {
        assert_eq!(FieldValue::Null.to_json().unwrap(), Value::Null);
        assert_eq!(FieldValue::from(true).to_json().unwrap(), json!(true));
        assert_eq!(FieldValue::from(7i64).to_json().unwrap(), json!(7));
        assert_eq!(FieldValue::from(1.5).to_json().unwrap(), json!(1.5));
        assert_eq!(FieldValue::from("hi").to_json().unwrap(), json!("hi"));
    }

    #[test]
    fn test_reference_renders_path_only() {
        let value = FieldValue::Reference("users/u2".to_string());
        assert_eq!(value.to_json().unwrap(), json!("users/u2"));
    }

    #[test]
    fn test_bytes_and_geopoint_render_as_text() {
        assert_eq!(
            FieldValue::Bytes(b"hello".to_vec()).to_json().unwrap(),
            json!("aGVsbG8=")
        );
        let point = FieldValue::GeoPoint(GeoPoint {
            latitude: 52.5,
            longitude: 13.25,
        });
        assert_eq!(point.to_json().unwrap(), json!("GeoPoint(52.5, 13.25)"));
    }

    #[test]
    fn test_unsupported_renders_repr() {
        let value = FieldValue::Unsupported {
            type_name: "vectorValue".to_string(),
            repr: "{\"values\":[1,2]}".to_string(),
        };
        assert_eq!(
            value.to_json().unwrap(),
            json!("vectorValue({\"values\":[1,2]})")
        );
    }

    #[test]
    fn test_corrupt_value_fails_with_its_kind() {
        let value = FieldValue::Corrupt {
            kind: "timestamp",
            reason: "bad timestamp 'yesterday'".to_string(),
        };
        let err = value.to_json().unwrap_err();
        assert_eq!(err.kind(), "timestamp");
        assert_eq!(placeholder(&err), json!("Unserializable(timestamp)"));

        let nested = FieldValue::Map(BTreeMap::from([("when".to_string(), value)]));
        assert_eq!(nested.to_json().unwrap_err().kind(), "timestamp");
    }

    #[test]
    fn test_nested_structure_preserved() {
        let mut inner = BTreeMap::new();
        inner.insert("at".to_string(), FieldValue::from(ts("2024-03-01T12:00:00Z")));
        let value = FieldValue::Array(vec![FieldValue::from(1i64), FieldValue::Map(inner)]);
        assert_eq!(
            value.to_json().unwrap(),
            json!([1, {"at": "2024-03-01T12:00:00Z"}])
        );
    }

    #[test]
    fn test_non_finite_double_fails() {
        let err = FieldValue::Double(f64::NAN).to_json().unwrap_err();
        assert_eq!(err.kind(), "double");
        let nested = FieldValue::Array(vec![FieldValue::Double(f64::INFINITY)]);
        assert!(nested.to_json().is_err());
    }

    #[test]
    fn test_render_fields_replaces_only_failing_field() {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), "John".into());
        fields.insert("score".to_string(), FieldValue::Double(f64::NAN));
        fields.insert("when".to_string(), FieldValue::Timestamp(Timestamp::new(0, -5)));
        fields.insert(
            "photo".to_string(),
            FieldValue::Corrupt {
                kind: "bytes",
                reason: "bad base64".to_string(),
            },
        );

        let rendered = render_fields(&fields);
        assert_eq!(rendered["name"], json!("John"));
        assert_eq!(rendered["score"], json!("Unserializable(double)"));
        assert_eq!(rendered["when"], json!("Unserializable(timestamp)"));
        assert_eq!(rendered["photo"], json!("Unserializable(bytes)"));
    }
}
