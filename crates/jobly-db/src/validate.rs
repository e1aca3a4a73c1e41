//! Domain validation helpers shared by the repositories.

use crate::error::{JoblyError, JoblyResult};
use crate::value::Value;
use rust_decimal::Decimal;

pub fn is_url(s: &str) -> bool {
    url::Url::parse(s).is_ok()
}

/// Require a non-blank string.
pub fn non_empty(field: &str, value: &str) -> JoblyResult<()> {
    if value.trim().is_empty() {
        return Err(JoblyError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require `value >= 0`.
pub fn non_negative(field: &str, value: i64) -> JoblyResult<()> {
    if value < 0 {
        return Err(JoblyError::validation(format!("{field} must be >= 0")));
    }
    Ok(())
}

/// Require `0 <= value <= 1`.
pub fn fraction(field: &str, value: Decimal) -> JoblyResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(JoblyError::validation(format!(
            "{field} must be between 0 and 1"
        )));
    }
    Ok(())
}

/// Require a parseable absolute URL.
pub fn url(field: &str, value: &str) -> JoblyResult<()> {
    if !is_url(value) {
        return Err(JoblyError::validation(format!("{field} must be a URL")));
    }
    Ok(())
}

/// Type checks for values arriving through a [`FieldMap`](crate::FieldMap).
pub(crate) fn text<'a>(field: &str, value: &'a Value) -> JoblyResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| JoblyError::validation(format!("{field} must be a string")))
}

/// An `INTEGER` column value: a number (not text) within the 32-bit range.
pub(crate) fn integer(field: &str, value: &Value) -> JoblyResult<i32> {
    let parsed = match value {
        Value::Text(_) => None,
        other => other.as_i64(),
    };
    let n = parsed.ok_or_else(|| JoblyError::validation(format!("{field} must be an integer")))?;
    i32::try_from(n).map_err(|_| JoblyError::validation(format!("{field} is out of range")))
}

pub(crate) fn decimal(field: &str, value: &Value) -> JoblyResult<Decimal> {
    value
        .as_decimal()
        .ok_or_else(|| JoblyError::validation(format!("{field} must be a decimal number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_check() {
        assert!(is_url("http://c1.img"));
        assert!(!is_url("not a url"));
        assert!(url("logoUrl", "nope").is_err());
    }

    #[test]
    fn range_checks() {
        assert!(non_negative("salary", 0).is_ok());
        assert!(matches!(
            non_negative("salary", -1000),
            Err(JoblyError::Validation(ref m)) if m == "salary must be >= 0"
        ));
        assert!(fraction("equity", Decimal::new(99, 2)).is_ok());
        assert!(fraction("equity", Decimal::ONE).is_ok());
        assert!(fraction("equity", Decimal::new(11, 1)).is_err());
        assert!(fraction("equity", Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn value_type_checks() {
        assert_eq!(integer("salary", &Value::Int(5)).unwrap(), 5);
        assert!(integer("salary", &Value::from("5")).is_err());
        assert!(matches!(
            integer("salary", &Value::Int(3_000_000_000)),
            Err(JoblyError::Validation(ref m)) if m == "salary is out of range"
        ));
        assert_eq!(integer("salary", &Value::Int(i64::from(i32::MAX))).unwrap(), i32::MAX);
        assert_eq!(decimal("equity", &Value::from("0.5")).unwrap(), Decimal::new(5, 1));
        assert!(text("title", &Value::Int(1)).is_err());
        assert!(non_empty("title", "  ").is_err());
    }
}
