//! SQL logging wrapper.

use crate::client::GenericClient;
use crate::config::JoblyConfig;
use crate::error::JoblyResult;
use std::time::Instant;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// A [`GenericClient`] that emits every statement as a `tracing` event.
///
/// Events go to target `jobly.sql` at `level` (default `DEBUG`) before execution,
/// with the parameter count. Failures are reported at `WARN` with the elapsed time.
/// Parameter values are never logged.
///
/// ```ignore
/// let client = TracingClient::new(pool.get().await?);
/// let jobs = Job::find_all(&client, None).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TracingClient<C> {
    inner: C,
    level: Level,
    max_sql_length: Option<usize>,
}

impl<C: GenericClient> TracingClient<C> {
    /// Wrap `inner` with `DEBUG` level and 200-byte truncation.
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(JoblyConfig::DEFAULT_SQL_LOG_MAX_LEN),
        }
    }

    /// Wrap `inner` using the truncation limit from `config`.
    pub fn from_config(inner: C, config: &JoblyConfig) -> Self {
        Self {
            max_sql_length: config.sql_log_max_len,
            ..Self::new(inner)
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

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    fn before(&self, sql: &str, param_count: usize) {
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

        let sql = self.truncate_sql(sql);
        emit_at_level!(self.level, target: "jobly.sql", param_count, sql = %sql);
    }

    fn after<T>(&self, result: &JoblyResult<T>, started: Instant) {
        if let Err(err) = result {
            tracing::warn!(
                target: "jobly.sql",
                elapsed_ms = started.elapsed().as_millis() as u64,
                error = %err,
                "statement failed"
            );
        }
    }
}

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

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        self.before(sql, params.len());
        let started = Instant::now();
        let result = self.inner.query(sql, params).await;
        self.after(&result, started);
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        self.before(sql, params.len());
        let started = Instant::now();
        let result = self.inner.execute(sql, params).await;
        self.after(&result, started);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Job;
    use crate::test_support::RecordingClient;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
        // 'é' is two bytes; cutting inside it backs off to the boundary.
        assert_eq!(truncate_sql_bytes("é", 1), "");
    }

    #[test]
    fn truncate_sql_appends_ellipsis() {
        let client = TracingClient::new(RecordingClient::new()).max_sql_length(6);
        assert_eq!(client.truncate_sql("SELECT 1"), "SELECT...");
        let client = client.no_truncate();
        assert_eq!(client.truncate_sql("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn from_config_takes_log_length() {
        let mut config = JoblyConfig::new("postgres://localhost/jobly");
        config.sql_log_max_len = None;
        let client = TracingClient::from_config(RecordingClient::new(), &config);
        assert_eq!(client.max_sql_length, None);
    }

    #[tokio::test]
    async fn delegates_to_inner_client() {
        let client = TracingClient::new(RecordingClient::new()).level(Level::TRACE);
        let err = Job::get(&client, 42).await.unwrap_err();
        assert!(err.is_not_found());

        let calls = client.inner().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].params, vec!["42"]);
    }
}
