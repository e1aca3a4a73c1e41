//! Partial-update SET clause builder.

use crate::error::{JoblyError, JoblyResult};
use crate::fields::{FieldMap, NameMapping};
use crate::ident;
use crate::value::Value;
use std::fmt::Write;
use tokio_postgres::types::ToSql;

/// A rendered SQL fragment and the parameters its `$N` placeholders refer to.
///
/// `values[i]` binds to placeholder `$(i + 1)` (or `$(offset + i + 1)` for fragments built
/// with an offset).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    pub sql: String,
    pub values: Vec<Value>,
}

impl SqlFragment {
    /// Check if the fragment renders no SQL.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Index of the placeholder that follows this fragment's parameters.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    /// Get parameter references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }
}

/// Build the SET clause of a partial update.
///
/// Each field becomes `"<column>"=$i` in iteration order, where the column is taken from
/// `mapping` (or is the field name itself). Values are never written into the SQL text.
///
/// # Example
/// ```ignore
/// let fields = FieldMap::new().with("firstName", "Aliya").with("age", 32);
/// let set = build_set_clause(&fields, &NameMapping::new(&[("firstName", "first_name")]))?;
/// assert_eq!(set.sql, r#""first_name"=$1, "age"=$2"#);
/// ```
///
/// Fails with [`JoblyError::EmptyUpdate`] when `fields` is empty.
pub fn build_set_clause(fields: &FieldMap, mapping: &NameMapping) -> JoblyResult<SqlFragment> {
    if fields.is_empty() {
        return Err(JoblyError::EmptyUpdate);
    }

    let mut sql = String::with_capacity(fields.len() * 16);
    let mut values = Vec::with_capacity(fields.len());

    for (idx, (field, value)) in fields.iter().enumerate() {
        if idx > 0 {
            sql.push_str(", ");
        }
        ident::write_quoted(&mut sql, mapping.column(field))?;
        // Writing into a String cannot fail.
        let _ = write!(sql, "=${}", idx + 1);
        values.push(value.clone());
    }

    Ok(SqlFragment { sql, values })
}
