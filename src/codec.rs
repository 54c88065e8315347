//! Value codec: scalar encoding between the generic `serde_json::Value`
//! representation and storage values, plus flatten/unflatten of embedded
//! value objects via prefixed column names.

use crate::error::StoreError;
use crate::model::{AnalyzedGraph, FieldType, ScalarType};
use crate::typemap::Dialect;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;

/// A storage-level value bound to or read from a statement.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

/// A row as returned by the connection: column name to storage value.
pub type Row = HashMap<String, SqlValue>;

/// Encode a generic scalar for storage.
///
/// Identifiers travel as native uuids on Postgres and 16-byte blobs on
/// SQLite; timestamps as native timestamps vs. epoch-millisecond integers;
/// booleans natively vs. 0/1 integers. Byte arrays arrive as JSON number
/// arrays (serde's default for `Vec<u8>`).
pub fn encode(value: &JsonValue, ty: ScalarType, dialect: Dialect) -> Result<SqlValue, StoreError> {
    if value.is_null() {
        return Ok(SqlValue::Null);
    }
    match ty {
        ScalarType::Uuid => {
            let s = expect_str(value, "uuid")?;
            let u = Uuid::parse_str(s).map_err(|e| codec(format!("invalid uuid '{s}': {e}")))?;
            Ok(match dialect {
                Dialect::Postgres => SqlValue::Uuid(u),
                Dialect::Sqlite => SqlValue::Bytes(u.as_bytes().to_vec()),
            })
        }
        ScalarType::Text => Ok(SqlValue::Text(expect_str(value, "text")?.to_string())),
        ScalarType::Int | ScalarType::BigInt => value
            .as_i64()
            .map(SqlValue::I64)
            .ok_or_else(|| codec(format!("expected integer, got {value}"))),
        ScalarType::Float => value
            .as_f64()
            .map(SqlValue::F64)
            .ok_or_else(|| codec(format!("expected float, got {value}"))),
        ScalarType::Bool => {
            let b = value
                .as_bool()
                .ok_or_else(|| codec(format!("expected boolean, got {value}")))?;
            Ok(match dialect {
                Dialect::Postgres => SqlValue::Bool(b),
                Dialect::Sqlite => SqlValue::I64(b as i64),
            })
        }
        ScalarType::Timestamp => {
            let s = expect_str(value, "timestamp")?;
            let dt = DateTime::parse_from_rfc3339(s)
                .map_err(|e| codec(format!("invalid timestamp '{s}': {e}")))?
                .with_timezone(&Utc);
            Ok(match dialect {
                Dialect::Postgres => SqlValue::Timestamp(dt),
                Dialect::Sqlite => SqlValue::I64(dt.timestamp_millis()),
            })
        }
        ScalarType::Bytes => {
            let arr = value
                .as_array()
                .ok_or_else(|| codec(format!("expected byte array, got {value}")))?;
            let mut bytes = Vec::with_capacity(arr.len());
            for b in arr {
                let n = b
                    .as_u64()
                    .filter(|n| *n <= 255)
                    .ok_or_else(|| codec(format!("expected byte, got {b}")))?;
                bytes.push(n as u8);
            }
            Ok(SqlValue::Bytes(bytes))
        }
    }
}

/// Decode a storage value back to the generic representation.
///
/// The source scalar type comes from the per-table decode map built by the
/// schema builder, disambiguating representations that collide in storage
/// (blob identifiers vs. raw bytes, integers vs. booleans vs. timestamps).
pub fn decode(value: &SqlValue, ty: ScalarType) -> Result<JsonValue, StoreError> {
    match (ty, value) {
        (_, SqlValue::Null) => Ok(JsonValue::Null),
        (ScalarType::Uuid, SqlValue::Uuid(u)) => Ok(JsonValue::String(u.to_string())),
        (ScalarType::Uuid, SqlValue::Bytes(b)) => Uuid::from_slice(b)
            .map(|u| JsonValue::String(u.to_string()))
            .map_err(|e| codec(format!("invalid uuid bytes: {e}"))),
        (ScalarType::Uuid, SqlValue::Text(s)) => Uuid::parse_str(s)
            .map(|u| JsonValue::String(u.to_string()))
            .map_err(|e| codec(format!("invalid uuid '{s}': {e}"))),
        (ScalarType::Text, SqlValue::Text(s)) => Ok(JsonValue::String(s.clone())),
        (ScalarType::Int | ScalarType::BigInt, SqlValue::I64(n)) => Ok(JsonValue::from(*n)),
        (ScalarType::Float, SqlValue::F64(n)) => serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .ok_or_else(|| codec(format!("non-finite float {n}"))),
        (ScalarType::Float, SqlValue::I64(n)) => Ok(JsonValue::from(*n as f64)),
        (ScalarType::Bool, SqlValue::Bool(b)) => Ok(JsonValue::Bool(*b)),
        (ScalarType::Bool, SqlValue::I64(n)) => Ok(JsonValue::Bool(*n != 0)),
        (ScalarType::Timestamp, SqlValue::Timestamp(dt)) => Ok(JsonValue::String(
            dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        )),
        (ScalarType::Timestamp, SqlValue::I64(ms)) => Utc
            .timestamp_millis_opt(*ms)
            .single()
            .map(|dt| JsonValue::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            .ok_or_else(|| codec(format!("out-of-range timestamp {ms}"))),
        (ScalarType::Bytes, SqlValue::Bytes(b)) => {
            Ok(JsonValue::Array(b.iter().map(|n| JsonValue::from(*n)).collect()))
        }
        (ty, other) => Err(codec(format!(
            "cannot decode {other:?} as {ty:?}"
        ))),
    }
}

/// Canonical text encoding for a map key, compatible with the
/// `(parent, map_key)` uniqueness constraint.
pub fn encode_map_key(key: &str, ty: ScalarType) -> Result<String, StoreError> {
    match ty {
        ScalarType::Text => Ok(key.to_string()),
        ScalarType::Uuid => Uuid::parse_str(key)
            .map(|u| u.to_string())
            .map_err(|e| codec(format!("invalid uuid map key '{key}': {e}"))),
        ScalarType::Int | ScalarType::BigInt => key
            .parse::<i64>()
            .map(|n| n.to_string())
            .map_err(|e| codec(format!("invalid integer map key '{key}': {e}"))),
        ScalarType::Bool => match key {
            "true" | "false" => Ok(key.to_string()),
            _ => Err(codec(format!("invalid boolean map key '{key}'"))),
        },
        ScalarType::Timestamp => DateTime::parse_from_rfc3339(key)
            .map(|dt| {
                dt.with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true)
            })
            .map_err(|e| codec(format!("invalid timestamp map key '{key}': {e}"))),
        ScalarType::Float | ScalarType::Bytes => {
            Err(codec(format!("unsupported map key type {ty:?}")))
        }
    }
}

/// Flatten an embedded value object into prefixed column/value pairs.
/// A null object writes null into every member column.
pub fn flatten_value_object(
    graph: &AnalyzedGraph,
    class_name: &str,
    prefix: &str,
    value: &JsonValue,
    dialect: Dialect,
    out: &mut Vec<(String, SqlValue)>,
) -> Result<(), StoreError> {
    let class = graph
        .class(class_name)
        .ok_or_else(|| codec(format!("undeclared class '{class_name}'")))?;
    for field in &class.fields {
        let column = format!("{prefix}_{}", field.column_name());
        let member = match value {
            JsonValue::Null => &JsonValue::Null,
            JsonValue::Object(map) => map.get(&field.name).unwrap_or(&JsonValue::Null),
            other => {
                return Err(codec(format!(
                    "expected object for value class '{class_name}', got {other}"
                )))
            }
        };
        match &field.ty {
            FieldType::Scalar(s) => out.push((column, encode(member, *s, dialect)?)),
            FieldType::Ref(target) => {
                flatten_value_object(graph, target, &column, member, dialect, out)?
            }
            other => {
                return Err(codec(format!(
                    "value class '{class_name}' field '{}' has unsupported type {other:?}",
                    field.name
                )))
            }
        }
    }
    Ok(())
}

/// Rebuild an embedded value object from its prefixed columns.
/// A group whose members are all null becomes null, not an all-null object.
pub fn unflatten_value_object(
    graph: &AnalyzedGraph,
    class_name: &str,
    prefix: &str,
    row: &Row,
) -> Result<JsonValue, StoreError> {
    let class = graph
        .class(class_name)
        .ok_or_else(|| codec(format!("undeclared class '{class_name}'")))?;
    let mut object = serde_json::Map::new();
    let mut all_null = true;
    for field in &class.fields {
        let column = format!("{prefix}_{}", field.column_name());
        let member = match &field.ty {
            FieldType::Scalar(s) => {
                decode(row.get(&column).unwrap_or(&SqlValue::Null), *s)?
            }
            FieldType::Ref(target) => unflatten_value_object(graph, target, &column, row)?,
            other => {
                return Err(codec(format!(
                    "value class '{class_name}' field '{}' has unsupported type {other:?}",
                    field.name
                )))
            }
        };
        if !member.is_null() {
            all_null = false;
        }
        object.insert(field.name.clone(), member);
    }
    if all_null {
        Ok(JsonValue::Null)
    } else {
        Ok(JsonValue::Object(object))
    }
}

fn expect_str<'a>(value: &'a JsonValue, what: &str) -> Result<&'a str, StoreError> {
    value
        .as_str()
        .ok_or_else(|| codec(format!("expected {what} string, got {value}")))
}

fn codec(message: String) -> StoreError {
    StoreError::Codec(message)
}
