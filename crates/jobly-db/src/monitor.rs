//! `tracing`-based SQL logging.
//!
//! Wrap any executor in [`TracingClient`] to emit the SQL each repository call runs, tagged
//! with the operation (`companies.update`, `jobs.filter`, ...).
//!
//! ```ignore
//! let companies = CompanyRepository::new(TracingClient::new(&client));
//! ```

use crate::client::GenericClient;
use crate::error::JoblyResult;
use std::time::Instant;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// Truncate `sql` to at most `max_bytes`, respecting UTF-8 boundaries.
fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Collapse the indentation of multi-line SQL templates onto one line.
fn squash_whitespace(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// An executor wrapper that logs every statement through `tracing`.
///
/// Events are emitted on target `jobly_db.sql` **before** the query runs, and a second event
/// with the elapsed time and row count (or the error) after it completes.
#[derive(Debug, Clone)]
pub struct TracingClient<C> {
    inner: C,
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl<C: GenericClient> TracingClient<C> {
    /// Wrap `inner`, logging at DEBUG and truncating SQL to 200 bytes.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Get a reference to the wrapped executor.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn display_sql(&self, sql: &str) -> String {
        let sql = squash_whitespace(sql);
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(&sql, max)),
            _ => sql,
        }
    }
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN  => tracing::warn!($($field)*),
            Level::INFO  => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = JoblyResult<Vec<Row>>> + Send {
        self.query_tagged("-", sql, params)
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        let shown = self.display_sql(sql);
        emit_at_level!(
            self.level,
            target: "jobly_db.sql",
            tag,
            param_count = params.len(),
            sql = %shown,
        );

        let start = Instant::now();
        let result = self.inner.query_tagged(tag, sql, params).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(rows) => emit_at_level!(
                self.level,
                target: "jobly_db.sql",
                tag,
                rows = rows.len(),
                elapsed_ms,
                "query completed"
            ),
            Err(err) => tracing::warn!(
                target: "jobly_db.sql",
                tag,
                elapsed_ms,
                error = %err,
                "query failed"
            ),
        }
        result
    }
}
