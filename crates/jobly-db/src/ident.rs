//! SQL identifier quoting.
//!
//! Column names cannot be sent as parameters, so the builders write them inline. Every
//! caller-reachable identifier goes through [`write_quoted`]: it is wrapped in double quotes
//! with embedded `"` escaped as `""`, which keeps mixed-case and reserved-word names working
//! and leaves no way to break out of the identifier.

use crate::error::{JoblyError, JoblyResult};

/// Check that `name` can be used as a quoted identifier.
pub fn validate(name: &str) -> JoblyResult<()> {
    if name.is_empty() {
        return Err(JoblyError::invalid_input("field name cannot be empty"));
    }
    if name.contains('\0') {
        return Err(JoblyError::invalid_input(
            "field name cannot contain NUL character",
        ));
    }
    Ok(())
}

/// Append `name` to `out` as a double-quoted identifier.
pub fn write_quoted(out: &mut String, name: &str) -> JoblyResult<()> {
    validate(name)?;
    out.reserve(name.len() + 2);
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    Ok(())
}

/// Render `name` as a double-quoted identifier.
pub fn quoted(name: &str) -> JoblyResult<String> {
    let mut out = String::new();
    write_quoted(&mut out, name)?;
    Ok(out)
}
