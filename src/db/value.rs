use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Number, Value};
use sqlx::postgres::PgRow;
use sqlx::query::Query;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Database, Encode, Row, Type, TypeInfo, ValueRef};
use tracing::warn;

/// One result row: column name to value, in column order.
pub type DbRow = Map<String, Value>;

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v.into())
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlParam::Null)
    }
}

pub(crate) fn bind<'q, DB>(
    query: Query<'q, DB, <DB as Database>::Arguments<'q>>,
    param: &SqlParam,
) -> Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    String: Encode<'q, DB> + Type<DB>,
    Option<String>: Encode<'q, DB> + Type<DB>,
{
    match param {
        SqlParam::Null => query.bind(Option::<String>::None),
        SqlParam::Bool(v) => query.bind(*v),
        SqlParam::Int(v) => query.bind(*v),
        SqlParam::Float(v) => query.bind(*v),
        SqlParam::Text(v) => query.bind(v.clone()),
    }
}

pub(crate) fn decode_sqlite_row(row: &SqliteRow) -> DbRow {
    let mut values = Map::new();
    for column in row.columns() {
        let value = decode_sqlite_column(row, column.ordinal(), column.type_info().name());
        values.insert(column.name().to_string(), value);
    }
    values
}

// SQLite types values, not columns, so the storage class of the value decides. A
// declared BOOLEAN column still stores integers.
fn decode_sqlite_column(row: &SqliteRow, index: usize, declared: &str) -> Value {
    let storage = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return Value::Null,
    };

    let decoded = match (storage.as_str(), declared) {
        ("INTEGER", "BOOLEAN") => row.try_get_unchecked::<bool, _>(index).map(Value::Bool),
        ("INTEGER", _) => row.try_get_unchecked::<i64, _>(index).map(Value::from),
        ("REAL", _) => row.try_get_unchecked::<f64, _>(index).map(float_value),
        ("BLOB", _) => row.try_get_unchecked::<Vec<u8>, _>(index).map(bytes_value),
        _ => row.try_get_unchecked::<String, _>(index).map(Value::String),
    };
    decoded.unwrap_or_else(|e| {
        warn!("Could not decode column {}: {}", index, e);
        Value::Null
    })
}

/// How a PostgreSQL column is read, chosen by its type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PgDecode {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Numeric,
    Text,
    Uuid,
    Timestamp,
    TimestampTz,
    Date,
    Time,
    Json,
    Bytes,
    /// Raw wire bytes, kept when they are valid UTF-8
    Raw,
}

impl PgDecode {
    fn for_type(name: &str) -> Self {
        match name {
            "BOOL" => PgDecode::Bool,
            "INT2" => PgDecode::Int2,
            "INT4" => PgDecode::Int4,
            "INT8" => PgDecode::Int8,
            "FLOAT4" => PgDecode::Float4,
            "FLOAT8" => PgDecode::Float8,
            "NUMERIC" => PgDecode::Numeric,
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" | "citext" => PgDecode::Text,
            "UUID" => PgDecode::Uuid,
            "TIMESTAMP" => PgDecode::Timestamp,
            "TIMESTAMPTZ" => PgDecode::TimestampTz,
            "DATE" => PgDecode::Date,
            "TIME" => PgDecode::Time,
            "JSON" | "JSONB" => PgDecode::Json,
            "BYTEA" => PgDecode::Bytes,
            _ => PgDecode::Raw,
        }
    }
}

pub(crate) fn decode_pg_row(row: &PgRow) -> DbRow {
    let mut values = Map::new();
    for column in row.columns() {
        let type_name = column.type_info().name();
        let value = decode_pg_column(row, column.ordinal(), type_name).unwrap_or_else(|e| {
            warn!(
                "Could not decode column '{}' of type {}: {}. Reading it as null.",
                column.name(),
                type_name,
                e
            );
            Value::Null
        });
        values.insert(column.name().to_string(), value);
    }
    values
}

fn decode_pg_column(row: &PgRow, index: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match PgDecode::for_type(type_name) {
        PgDecode::Bool => Value::Bool(row.try_get(index)?),
        PgDecode::Int2 => Value::from(row.try_get::<i16, _>(index)?),
        PgDecode::Int4 => Value::from(row.try_get::<i32, _>(index)?),
        PgDecode::Int8 => Value::from(row.try_get::<i64, _>(index)?),
        PgDecode::Float4 => float_value(row.try_get::<f32, _>(index)?.into()),
        PgDecode::Float8 => float_value(row.try_get(index)?),
        PgDecode::Numeric => {
            let bytes = row.try_get_unchecked::<&[u8], _>(index)?;
            numeric_to_string(bytes)
                .map(Value::String)
                .ok_or_else(|| sqlx::Error::Decode("malformed NUMERIC value".into()))?
        }
        PgDecode::Text => Value::String(row.try_get(index)?),
        PgDecode::Uuid => Value::String(row.try_get::<uuid::Uuid, _>(index)?.to_string()),
        PgDecode::Timestamp => {
            Value::String(row.try_get::<NaiveDateTime, _>(index)?.to_string())
        }
        PgDecode::TimestampTz => {
            Value::String(row.try_get::<DateTime<Utc>, _>(index)?.to_rfc3339())
        }
        PgDecode::Date => Value::String(row.try_get::<NaiveDate, _>(index)?.to_string()),
        PgDecode::Time => Value::String(row.try_get::<NaiveTime, _>(index)?.to_string()),
        PgDecode::Json => row.try_get::<Value, _>(index)?,
        PgDecode::Bytes => bytes_value(row.try_get(index)?),
        PgDecode::Raw => {
            let bytes = row.try_get_unchecked::<&[u8], _>(index)?;
            match std::str::from_utf8(bytes) {
                Ok(text) => Value::String(text.to_string()),
                Err(_) => {
                    return Err(sqlx::Error::Decode(
                        format!("no text form for type {}", type_name).into(),
                    ));
                }
            }
        }
    };
    Ok(value)
}

/// Decimal text of a binary NUMERIC: base-10000 digit groups with a weight and a
/// display scale.
fn numeric_to_string(bytes: &[u8]) -> Option<String> {
    const NEGATIVE: u16 = 0x4000;
    const NAN: u16 = 0xC000;
    const POS_INFINITY: u16 = 0xD000;
    const NEG_INFINITY: u16 = 0xF000;

    let word = |i: usize| -> Option<u16> {
        let hi = *bytes.get(i * 2)?;
        let lo = *bytes.get(i * 2 + 1)?;
        Some(u16::from_be_bytes([hi, lo]))
    };

    let ndigits = usize::from(word(0)?);
    let weight = i64::from(word(1)? as i16);
    let sign = word(2)?;
    let scale = usize::from(word(3)?);

    match sign {
        NAN => return Some("NaN".to_string()),
        POS_INFINITY => return Some("Infinity".to_string()),
        NEG_INFINITY => return Some("-Infinity".to_string()),
        _ => {}
    }

    let digits = (0..ndigits)
        .map(|i| word(4 + i))
        .collect::<Option<Vec<u16>>>()?;
    let group = |position: i64| -> u16 {
        usize::try_from(position)
            .ok()
            .and_then(|p| digits.get(p).copied())
            .unwrap_or(0)
    };

    let mut text = String::new();
    if sign == NEGATIVE {
        text.push('-');
    }

    if weight < 0 {
        text.push('0');
    } else {
        text.push_str(&group(0).to_string());
        for position in 1..=weight {
            text.push_str(&format!("{:04}", group(position)));
        }
    }

    if scale > 0 {
        let mut fraction = String::new();
        let mut position = weight + 1;
        while fraction.len() < scale {
            fraction.push_str(&format!("{:04}", group(position)));
            position += 1;
        }
        fraction.truncate(scale);
        text.push('.');
        text.push_str(&fraction);
    }

    Some(text)
}

fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

fn bytes_value(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(text) => Value::String(text),
        Err(e) => Value::from(e.into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_conversions() {
        assert_eq!(SqlParam::from(42), SqlParam::Int(42));
        assert_eq!(SqlParam::from(7_i64), SqlParam::Int(7));
        assert_eq!(SqlParam::from("bob"), SqlParam::Text("bob".into()));
        assert_eq!(SqlParam::from(true), SqlParam::Bool(true));
        assert_eq!(SqlParam::from(None::<i64>), SqlParam::Null);
        assert_eq!(SqlParam::from(Some("x")), SqlParam::Text("x".into()));
    }

    fn numeric(weight: i16, sign: u16, scale: u16, digits: &[u16]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for word in [digits.len() as u16, weight as u16, sign, scale]
            .into_iter()
            .chain(digits.iter().copied())
        {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    #[test]
    fn test_numeric_to_string() {
        assert_eq!(
            numeric_to_string(&numeric(0, 0, 2, &[123, 4500])).as_deref(),
            Some("123.45")
        );
        assert_eq!(
            numeric_to_string(&numeric(-1, 0, 2, &[500])).as_deref(),
            Some("0.05")
        );
        assert_eq!(
            numeric_to_string(&numeric(1, 0, 0, &[1])).as_deref(),
            Some("10000")
        );
        assert_eq!(
            numeric_to_string(&numeric(1, 0x4000, 3, &[12, 3456, 7800])).as_deref(),
            Some("-123456.780")
        );
        assert_eq!(numeric_to_string(&numeric(0, 0, 0, &[])).as_deref(), Some("0"));
        assert_eq!(
            numeric_to_string(&numeric(0, 0xC000, 0, &[])).as_deref(),
            Some("NaN")
        );
        assert_eq!(numeric_to_string(&[0, 1]), None);
    }

    #[test]
    fn test_pg_types_outside_the_basic_set_are_decoded() {
        for (name, decode) in [
            ("TIMESTAMP", PgDecode::Timestamp),
            ("TIMESTAMPTZ", PgDecode::TimestampTz),
            ("DATE", PgDecode::Date),
            ("NUMERIC", PgDecode::Numeric),
            ("UUID", PgDecode::Uuid),
            ("BPCHAR", PgDecode::Text),
            ("JSONB", PgDecode::Json),
            ("INT4", PgDecode::Int4),
        ] {
            assert_eq!(PgDecode::for_type(name), decode, "{}", name);
        }
        assert_eq!(PgDecode::for_type("user_status"), PgDecode::Raw);
    }
}
