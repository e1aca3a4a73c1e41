//! A recording executor for repository tests that never touch a database.

use crate::client::GenericClient;
use crate::error::JoblyResult;
use std::sync::Mutex;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// One executed statement.
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub tag: String,
    pub sql: String,
    pub param_count: usize,
}

/// Answers every query with zero rows and remembers what was asked.
#[derive(Default)]
pub(crate) struct RecordingClient {
    calls: Mutex<Vec<Call>>,
}

impl RecordingClient {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn last(&self) -> Call {
        self.calls().pop().expect("no query was executed")
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.query_tagged("-", sql, params).await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> JoblyResult<Vec<Row>> {
        self.calls.lock().expect("calls lock poisoned").push(Call {
            tag: tag.to_string(),
            sql: sql.to_string(),
            param_count: params.len(),
        });
        Ok(vec![])
    }
}
