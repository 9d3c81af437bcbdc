//! Cell values.
//!
//! Every cell is one variant of the closed [`CellValue`] union. Scalar cells
//! map onto a hashable [`CellKey`]; composite cells (JSON arrays and objects)
//! have no exact key and must be compared through their canonical text.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Nested array or object, kept as parsed.
    Composite(serde_json::Value),
}

/// Hashable identity of a scalar cell.
///
/// Integral floats collapse onto the integer key so `1` and `1.0` count as
/// the same value, and all NaNs share a single key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKey {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(u64),
    Text(String),
}

const CANONICAL_NAN_BITS: u64 = 0x7ff8_0000_0000_0000;
// 2^63 as f64; integral floats strictly inside (-2^63, 2^63) fit an i64.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer or float. Booleans are never numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Exact hash key, or `None` for composite values.
    pub fn hash_key(&self) -> Option<CellKey> {
        match self {
            Self::Null => Some(CellKey::Null),
            Self::Boolean(b) => Some(CellKey::Boolean(*b)),
            Self::Integer(i) => Some(CellKey::Integer(*i)),
            Self::Float(f) => Some(float_key(*f)),
            Self::Text(s) => Some(CellKey::Text(s.clone())),
            Self::Composite(_) => None,
        }
    }

    /// Canonical text form used when exact comparison is impossible.
    ///
    /// # Errors
    ///
    /// Returns an error if a composite value cannot be rendered as JSON.
    pub fn canonical_text(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Null => Ok("null".to_owned()),
            Self::Boolean(b) => Ok(b.to_string()),
            Self::Integer(i) => Ok(i.to_string()),
            Self::Float(f) => Ok(format_float(*f)),
            Self::Text(s) => Ok(s.clone()),
            Self::Composite(v) => serde_json::to_string(v),
        }
    }

    /// Builds a cell from a parsed JSON value.
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Value::String(s) => Self::Text(s),
            composite @ (Value::Array(_) | Value::Object(_)) => Self::Composite(composite),
        }
    }
}

fn float_key(f: f64) -> CellKey {
    if f.is_nan() {
        return CellKey::Float(CANONICAL_NAN_BITS);
    }
    if f.fract() == 0.0 && f > -I64_BOUND && f < I64_BOUND {
        return CellKey::Integer(f as i64);
    }
    CellKey::Float(f.to_bits())
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{}", format_float(*x)),
            Self::Text(s) => write!(f, "{s}"),
            Self::Composite(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Composite(v) => v.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_booleans_are_not_numeric() {
        assert!(!CellValue::Boolean(true).is_numeric());
        assert!(CellValue::Integer(1).is_numeric());
        assert!(CellValue::Float(0.5).is_numeric());
    }

    #[test]
    fn test_integral_float_shares_integer_key() {
        assert_eq!(
            CellValue::Float(1.0).hash_key(),
            CellValue::Integer(1).hash_key()
        );
        assert_ne!(
            CellValue::Float(1.5).hash_key(),
            CellValue::Integer(1).hash_key()
        );
        assert_eq!(
            CellValue::Float(f64::NAN).hash_key(),
            CellValue::Float(-f64::NAN).hash_key()
        );
    }

    #[test]
    fn test_composite_has_no_exact_key() -> anyhow::Result<()> {
        let cell = CellValue::from_json(json!({"b": [1, 2]}));
        assert!(cell.hash_key().is_none());
        assert_eq!(cell.canonical_text()?, r#"{"b":[1,2]}"#);
        Ok(())
    }

    #[test]
    fn test_from_json_number_forms() {
        assert_eq!(CellValue::from_json(json!(3)), CellValue::Integer(3));
        assert_eq!(CellValue::from_json(json!(2.5)), CellValue::Float(2.5));
        assert_eq!(CellValue::from_json(json!(null)), CellValue::Null);
    }

    #[test]
    fn test_serialize_preserves_number_form() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&CellValue::Integer(9))?, "9");
        assert_eq!(serde_json::to_string(&CellValue::Float(5.0))?, "5.0");
        Ok(())
    }
}
