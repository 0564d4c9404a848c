//! Wire-safe encoding of attribute and fill values.
//!
//! The metadata format has no tokens for NaN/Infinity and no raw binary,
//! so non-finite floats become the literal strings `"NaN"`, `"Infinity"`
//! and `"-Infinity"`, byte strings become base64, and datetimes become
//! ISO-8601 strings. All transforms here are pure; callers never see their
//! inputs mutated.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use dataset_model::{AttrValue, DType, DTypeKind};
use serde_json::Value;

/// ISO-8601 rendering with nanosecond precision, matching the `<M8[ns]`
/// storage coding.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.9f").to_string()
}

fn encode_float(value: f64) -> Value {
    if value.is_nan() {
        Value::String("NaN".to_string())
    } else if value.is_infinite() {
        if value > 0.0 {
            Value::String("Infinity".to_string())
        } else {
            Value::String("-Infinity".to_string())
        }
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Encode one attribute value into its wire representation.
pub fn encode_attr_value(value: &AttrValue) -> Value {
    match value {
        AttrValue::Null => Value::Null,
        AttrValue::Bool(b) => Value::Bool(*b),
        AttrValue::Int(i) => Value::Number((*i).into()),
        AttrValue::Float(f) => encode_float(*f),
        AttrValue::Str(s) => Value::String(s.clone()),
        AttrValue::Bytes(b) => Value::String(BASE64.encode(b)),
        AttrValue::DateTime(dt) => Value::String(format_datetime(dt)),
        AttrValue::List(items) => Value::Array(items.iter().map(encode_attr_value).collect()),
    }
}

/// Encode a fill value for an array descriptor, dispatching on the dtype
/// kind. Values with no special rule pass through attribute encoding
/// unchanged.
pub fn encode_fill_value(value: Option<&AttrValue>, dtype: &DType) -> Value {
    let Some(value) = value else {
        return Value::Null;
    };
    if matches!(value, AttrValue::Null) {
        return Value::Null;
    }

    match dtype.kind() {
        DTypeKind::Bytes => match value {
            AttrValue::Bytes(b) => Value::String(BASE64.encode(b)),
            AttrValue::Str(s) => Value::String(BASE64.encode(s.as_bytes())),
            other => encode_attr_value(other),
        },
        DTypeKind::DateTime => match value {
            AttrValue::DateTime(dt) => Value::String(format_datetime(dt)),
            // Nanosecond timestamps are the storage form of datetimes.
            AttrValue::Int(ns) => Value::String(format_datetime(&Utc.timestamp_nanos(*ns))),
            other => encode_attr_value(other),
        },
        DTypeKind::Int | DTypeKind::UInt => match value {
            AttrValue::Int(i) => Value::Number((*i).into()),
            other => encode_attr_value(other),
        },
        DTypeKind::Float => match value {
            AttrValue::Float(f) => encode_float(*f),
            AttrValue::Int(i) => encode_float(*i as f64),
            other => encode_attr_value(other),
        },
        DTypeKind::Complex => match value {
            // Complex fill values arrive as a [real, imag] pair; each half
            // follows the real-number rule.
            AttrValue::List(parts) if parts.len() == 2 => Value::Array(
                parts
                    .iter()
                    .map(|part| encode_fill_value(Some(part), &DType::Float64))
                    .collect(),
            ),
            other => encode_attr_value(other),
        },
        DTypeKind::Bool | DTypeKind::Object => encode_attr_value(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_scalar_attrs() {
        assert_eq!(encode_attr_value(&AttrValue::Int(3)), Value::from(3));
        assert_eq!(encode_attr_value(&AttrValue::Bool(true)), Value::from(true));
        assert_eq!(
            encode_attr_value(&AttrValue::Str("degK".into())),
            Value::from("degK")
        );
        assert_eq!(encode_attr_value(&AttrValue::Null), Value::Null);
    }

    #[test]
    fn test_nonfinite_floats_become_strings() {
        assert_eq!(
            encode_attr_value(&AttrValue::Float(f64::NAN)),
            Value::from("NaN")
        );
        assert_eq!(
            encode_attr_value(&AttrValue::Float(f64::INFINITY)),
            Value::from("Infinity")
        );
        assert_eq!(
            encode_attr_value(&AttrValue::Float(f64::NEG_INFINITY)),
            Value::from("-Infinity")
        );
        assert_eq!(encode_attr_value(&AttrValue::Float(1.5)), Value::from(1.5));
    }

    #[test]
    fn test_bytes_base64() {
        assert_eq!(
            encode_attr_value(&AttrValue::Bytes(b"abc".to_vec())),
            Value::from("YWJj")
        );
    }

    #[test]
    fn test_datetime_iso() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(
            encode_attr_value(&AttrValue::DateTime(dt)),
            Value::from("2024-01-15T12:00:00.000000000")
        );
    }

    #[test]
    fn test_list_attrs_encode_elementwise() {
        let list = AttrValue::List(vec![AttrValue::Float(f64::NAN), AttrValue::Int(1)]);
        assert_eq!(
            encode_attr_value(&list),
            serde_json::json!(["NaN", 1])
        );
    }

    #[test]
    fn test_fill_value_none_is_null() {
        assert_eq!(encode_fill_value(None, &DType::Float64), Value::Null);
        assert_eq!(
            encode_fill_value(Some(&AttrValue::Null), &DType::Float64),
            Value::Null
        );
    }

    #[test]
    fn test_fill_value_float_rules() {
        assert_eq!(
            encode_fill_value(Some(&AttrValue::Float(f64::NAN)), &DType::Float32),
            Value::from("NaN")
        );
        assert_eq!(
            encode_fill_value(Some(&AttrValue::Float(-9999.0)), &DType::Float64),
            Value::from(-9999.0)
        );
        assert_eq!(
            encode_fill_value(Some(&AttrValue::Int(0)), &DType::Float64),
            Value::from(0.0)
        );
    }

    #[test]
    fn test_fill_value_integral() {
        assert_eq!(
            encode_fill_value(Some(&AttrValue::Int(-1)), &DType::Int16),
            Value::from(-1)
        );
    }

    #[test]
    fn test_fill_value_bytes_base64() {
        assert_eq!(
            encode_fill_value(Some(&AttrValue::Bytes(vec![0, 0])), &DType::Bytes(2)),
            Value::from("AAA=")
        );
    }

    #[test]
    fn test_fill_value_datetime() {
        let dt = Utc.timestamp_nanos(0);
        assert_eq!(
            encode_fill_value(Some(&AttrValue::DateTime(dt)), &DType::DateTime64),
            Value::from("1970-01-01T00:00:00.000000000")
        );
        assert_eq!(
            encode_fill_value(Some(&AttrValue::Int(0)), &DType::DateTime64),
            Value::from("1970-01-01T00:00:00.000000000")
        );
    }

    #[test]
    fn test_fill_value_complex_pair() {
        let fill = AttrValue::List(vec![AttrValue::Float(1.0), AttrValue::Float(f64::NAN)]);
        assert_eq!(
            encode_fill_value(Some(&fill), &DType::Complex128),
            serde_json::json!([1.0, "NaN"])
        );
    }
}
