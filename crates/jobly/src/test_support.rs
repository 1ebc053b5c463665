use crate::client::GenericClient;
use crate::error::JoblyResult;
use std::sync::Mutex;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub sql: String,
    pub params: Vec<String>,
}

/// Records every statement and answers with no rows.
#[derive(Default)]
pub(crate) struct RecordingClient {
    calls: Mutex<Vec<Call>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params: params.iter().map(|p| format!("{p:?}")).collect(),
        });
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.record(sql, params);
        Ok(vec![])
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        self.record(sql, params);
        Ok(0)
    }
}
