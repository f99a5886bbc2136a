//! Field deserializers for stored documents written by other clients
//!
//! Stored records may carry explicit `null`s or counters written as floats.
//! These helpers decode such fields to their defaults instead of rejecting
//! the whole document.

use serde::de::Error;
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// Treats an explicit `null` like a missing field
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Non-negative whole number; `null` is zero and integral floats such as `2.0` are accepted
pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_count(deserializer)?.unwrap_or(0))
}

pub fn optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => number_to_count(&n)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid count: {}", n))),
        Some(other) => Err(D::Error::custom(format!("expected a count, found {}", other))),
    }
}

fn number_to_count(n: &Number) -> Option<u64> {
    n.as_u64().or_else(|| {
        n.as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Record {
        #[serde(default, deserialize_with = "null_as_default")]
        label: String,
        #[serde(default, deserialize_with = "null_as_default")]
        flag: bool,
        #[serde(default, deserialize_with = "count")]
        total: u64,
        #[serde(default, deserialize_with = "optional_count")]
        maybe: Option<u64>,
    }

    #[test]
    fn test_nulls_decode_to_defaults() {
        let r: Record =
            serde_json::from_str(r#"{"label":null,"flag":null,"total":null,"maybe":null}"#)
                .unwrap();
        assert_eq!(r.label, "");
        assert!(!r.flag);
        assert_eq!(r.total, 0);
        assert_eq!(r.maybe, None);
    }

    #[test]
    fn test_missing_fields_decode_to_defaults() {
        let r: Record = serde_json::from_str("{}").unwrap();
        assert_eq!(r.total, 0);
        assert_eq!(r.maybe, None);
    }

    #[test]
    fn test_integral_floats_are_counts() {
        let r: Record = serde_json::from_str(r#"{"total":2.0,"maybe":7}"#).unwrap();
        assert_eq!(r.total, 2);
        assert_eq!(r.maybe, Some(7));
    }

    #[test]
    fn test_fractional_negative_and_text_counts_are_rejected() {
        assert!(serde_json::from_str::<Record>(r#"{"total":2.5}"#).is_err());
        assert!(serde_json::from_str::<Record>(r#"{"total":-1}"#).is_err());
        assert!(serde_json::from_str::<Record>(r#"{"total":"3"}"#).is_err());
    }
}
