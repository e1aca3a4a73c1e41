//! Substring / range filter builder.
//!
//! Filters come in one fixed family: a case-insensitive "contains" on a text column and an
//! inclusive minimum / maximum on a numeric column. A [`FilterSchema`] names the external keys
//! and the columns for one entity; [`FilterSpec`] holds the parsed criteria.

use crate::error::{JoblyError, JoblyResult};
use crate::fields::FieldMap;
use crate::update::SqlFragment;
use crate::value::Value;

/// The recognized filter predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    /// Case-insensitive substring match.
    Contains,
    /// Inclusive lower bound.
    Min,
    /// Inclusive upper bound.
    Max,
}

impl FilterKey {
    /// All keys, in the order their predicates are emitted.
    pub const ALL: [FilterKey; 3] = [FilterKey::Contains, FilterKey::Min, FilterKey::Max];
}

/// External key names and columns of one entity's filters.
#[derive(Debug, Clone, Copy)]
pub struct FilterSchema {
    /// External name of the substring key (e.g. `nameLike`).
    pub contains_key: &'static str,
    /// Column searched by the substring key.
    pub contains_column: &'static str,
    /// External name of the lower bound (e.g. `minEmployees`).
    pub min_key: &'static str,
    /// External name of the upper bound (e.g. `maxEmployees`).
    pub max_key: &'static str,
    /// Column both bounds apply to.
    pub bound_column: &'static str,
}

impl FilterSchema {
    /// Resolve an external key name.
    pub fn key(&self, name: &str) -> Option<FilterKey> {
        FilterKey::ALL.into_iter().find(|k| self.name(*k) == name)
    }

    /// External name of `key`.
    pub fn name(&self, key: FilterKey) -> &'static str {
        match key {
            FilterKey::Contains => self.contains_key,
            FilterKey::Min => self.min_key,
            FilterKey::Max => self.max_key,
        }
    }

    /// The allow-list, in emission order.
    pub fn allowed(&self) -> Vec<&'static str> {
        FilterKey::ALL.into_iter().map(|k| self.name(k)).collect()
    }

    /// Parse `criteria` and render the WHERE clause (without the `WHERE` keyword).
    pub fn build(&self, criteria: &FieldMap) -> JoblyResult<SqlFragment> {
        let spec = FilterSpec::parse(criteria, self)?;
        build_filter_clause(&spec, self)
    }
}

/// Parsed filter criteria. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub contains: Option<String>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl FilterSpec {
    /// Parse caller criteria against `schema`.
    ///
    /// - a key outside the allow-list fails with [`JoblyError::UnsupportedFilter`]
    /// - bounds must be integers (numeric text is accepted)
    /// - `null` and the empty pattern count as absent
    pub fn parse(criteria: &FieldMap, schema: &FilterSchema) -> JoblyResult<Self> {
        let mut spec = Self::default();

        for (name, value) in criteria.iter() {
            let Some(key) = schema.key(name) else {
                return Err(JoblyError::UnsupportedFilter {
                    key: name.to_string(),
                    allowed: schema.allowed(),
                });
            };
            if value.is_null() {
                continue;
            }

            match key {
                FilterKey::Contains => spec.contains = pattern(name, value)?,
                FilterKey::Min => spec.min = Some(bound(name, value)?),
                FilterKey::Max => spec.max = Some(bound(name, value)?),
            }
        }

        Ok(spec)
    }

    pub fn is_empty(&self) -> bool {
        self.contains.is_none() && self.min.is_none() && self.max.is_none()
    }
}

fn pattern(name: &str, value: &Value) -> JoblyResult<Option<String>> {
    match value {
        Value::Text(s) if s.is_empty() => Ok(None),
        Value::Text(s) => Ok(Some(s.clone())),
        Value::Int(_) | Value::Float(_) | Value::Decimal(_) => Ok(Some(value.to_string())),
        _ => Err(JoblyError::invalid_input(format!("{name} must be a string"))),
    }
}

/// Bounds compare against `INTEGER` columns, so they must fit in 32 bits.
fn bound(name: &str, value: &Value) -> JoblyResult<i64> {
    let n = value
        .as_i64()
        .ok_or_else(|| JoblyError::invalid_input(format!("{name} must be an integer")))?;
    i32::try_from(n)
        .map(i64::from)
        .map_err(|_| JoblyError::invalid_input(format!("{name} is out of range")))
}

/// Escape `LIKE` wildcards so the pattern matches literally (`\` is the default escape).
fn escape_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Render the filter predicates of `spec` with placeholders starting at `$1`.
///
/// Predicates are emitted in a fixed order (substring, minimum, maximum) regardless of
/// the order criteria were supplied in, and joined with ` AND `. An empty spec yields an
/// empty fragment.
pub fn build_filter_clause(spec: &FilterSpec, schema: &FilterSchema) -> JoblyResult<SqlFragment> {
    build_filter_clause_from(spec, schema, 0)
}

/// Like [`build_filter_clause`], numbering placeholders after `offset`.
///
/// For example, an offset of 2 makes the first predicate bind to `$3`.
pub fn build_filter_clause_from(
    spec: &FilterSpec,
    schema: &FilterSchema,
    offset: usize,
) -> JoblyResult<SqlFragment> {
    if let (Some(min), Some(max)) = (spec.min, spec.max)
        && min > max
    {
        return Err(JoblyError::Range {
            min_key: schema.min_key,
            max_key: schema.max_key,
            min,
            max,
        });
    }

    let mut conditions: Vec<String> = Vec::with_capacity(3);
    let mut values = Vec::with_capacity(3);
    let mut param_count = offset;

    let mut add_condition = |column: &str, template: &str, value: Value| {
        param_count += 1;
        let placeholder = format!("${param_count}");
        conditions.push(format!("{column}{}", template.replacen('$', &placeholder, 1)));
        values.push(value);
    };

    if let Some(contains) = &spec.contains {
        add_condition(
            schema.contains_column,
            " ILIKE '%' || $ || '%'",
            Value::Text(escape_like(contains)),
        );
    }
    if let Some(min) = spec.min {
        add_condition(schema.bound_column, " >= $", Value::Int(min));
    }
    if let Some(max) = spec.max {
        add_condition(schema.bound_column, " <= $", Value::Int(max));
    }

    Ok(SqlFragment {
        sql: conditions.join(" AND "),
        values,
    })
}
