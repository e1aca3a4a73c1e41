//! Scalar parameter values.
//!
//! [`Value`] is the element type of a [`FieldMap`](crate::FieldMap) and of every
//! [`SqlFragment`](crate::SqlFragment) parameter list. It binds to whatever column type the
//! statement expects, as long as the conversion is lossless.

use crate::error::{JoblyError, JoblyResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A caller-supplied scalar: string, number, boolean or null.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Decimal(Decimal),
}

impl Value {
    /// Convert a JSON scalar. Arrays and objects are rejected, naming `field`.
    pub fn from_json(field: &str, json: &serde_json::Value) -> JoblyResult<Self> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Ok(Value::Int(i)),
                (None, Some(f)) => Ok(Value::Float(f)),
                (None, None) => Err(JoblyError::invalid_input(format!(
                    "{field}: number out of range"
                ))),
            },
            Json::String(s) => Ok(Value::Text(s.clone())),
            Json::Array(_) | Json::Object(_) => Err(JoblyError::invalid_input(format!(
                "{field}: expected a scalar value"
            ))),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interpret the value as an integer.
    ///
    /// Text is accepted when it parses (query strings arrive as text); floats only when
    /// they carry no fractional part and fit in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Some(*f as i64)
            }
            Value::Text(s) => s.trim().parse().ok(),
            Value::Decimal(d) if d.fract().is_zero() => i64::try_from(*d).ok(),
            _ => None,
        }
    }

    /// Interpret the value as a decimal number.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int(i) => Some(Decimal::from(*i)),
            Value::Float(f) => Decimal::try_from(*f).ok(),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Decimal(d) => write!(f, "{d}"),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql_checked(ty, out),
            Value::Int(i) => {
                if *ty == Type::INT2 {
                    i16::try_from(*i)?.to_sql_checked(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*i)?.to_sql_checked(ty, out)
                } else if *ty == Type::NUMERIC {
                    Decimal::from(*i).to_sql_checked(ty, out)
                } else if *ty == Type::FLOAT8 {
                    (*i as f64).to_sql_checked(ty, out)
                } else {
                    i.to_sql_checked(ty, out)
                }
            }
            Value::Float(x) => {
                if *ty == Type::FLOAT4 {
                    (*x as f32).to_sql_checked(ty, out)
                } else if *ty == Type::NUMERIC {
                    Decimal::try_from(*x)?.to_sql_checked(ty, out)
                } else {
                    x.to_sql_checked(ty, out)
                }
            }
            Value::Text(s) => {
                if *ty == Type::NUMERIC {
                    s.trim().parse::<Decimal>()?.to_sql_checked(ty, out)
                } else {
                    s.as_str().to_sql_checked(ty, out)
                }
            }
            Value::Decimal(d) => d.to_sql_checked(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <bool as ToSql>::accepts(ty)
            || <i16 as ToSql>::accepts(ty)
            || <i32 as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <f32 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
            || <&str as ToSql>::accepts(ty)
            || <Decimal as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_scalars_convert() {
        assert_eq!(Value::from_json("a", &json!(null)).unwrap(), Value::Null);
        assert_eq!(Value::from_json("a", &json!(true)).unwrap(), Value::Bool(true));
        assert_eq!(Value::from_json("a", &json!(32)).unwrap(), Value::Int(32));
        assert_eq!(Value::from_json("a", &json!(0.5)).unwrap(), Value::Float(0.5));
        assert_eq!(
            Value::from_json("a", &json!("Aliya")).unwrap(),
            Value::Text("Aliya".into())
        );
    }

    #[test]
    fn json_containers_are_rejected() {
        let err = Value::from_json("tags", &json!(["a"])).unwrap_err();
        assert!(matches!(err, JoblyError::InvalidInput(ref m) if m.contains("tags")));
        assert!(Value::from_json("meta", &json!({"a": 1})).is_err());
    }

    #[test]
    fn as_i64_accepts_numeric_text() {
        assert_eq!(Value::from("12").as_i64(), Some(12));
        assert_eq!(Value::from(" 7 ").as_i64(), Some(7));
        assert_eq!(Value::Float(3.0).as_i64(), Some(3));
        assert_eq!(Value::Float(3.5).as_i64(), None);
        assert_eq!(Value::Float(1e30).as_i64(), None);
        assert_eq!(Value::Float(-1e30).as_i64(), None);
        assert_eq!(Value::Float(f64::INFINITY).as_i64(), None);
        assert_eq!(Value::from("many").as_i64(), None);
        assert_eq!(Value::Bool(true).as_i64(), None);
    }

    #[test]
    fn as_decimal_parses_text() {
        assert_eq!(Value::from("0.25").as_decimal(), Some(Decimal::new(25, 2)));
        assert_eq!(Value::Null.as_decimal(), None);
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn binds_int_to_narrower_columns() {
        let mut buf = BytesMut::new();
        assert!(Value::Int(5).to_sql_checked(&Type::INT4, &mut buf).is_ok());
        assert_eq!(buf.len(), 4);

        let mut buf = BytesMut::new();
        assert!(Value::Int(i64::MAX).to_sql_checked(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn binds_text_to_numeric() {
        let mut buf = BytesMut::new();
        assert!(Value::from("0.01").to_sql_checked(&Type::NUMERIC, &mut buf).is_ok());

        let mut buf = BytesMut::new();
        assert!(Value::from("lots").to_sql_checked(&Type::NUMERIC, &mut buf).is_err());
    }

    #[test]
    fn rejects_mismatched_types() {
        let mut buf = BytesMut::new();
        assert!(Value::Bool(true).to_sql_checked(&Type::INT4, &mut buf).is_err());

        let mut buf = BytesMut::new();
        assert!(matches!(
            Value::Null.to_sql_checked(&Type::INT4, &mut buf),
            Ok(IsNull::Yes)
        ));
    }
}
