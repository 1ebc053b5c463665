//! Schema migrations via [`refinery`].
//!
//! The `companies` and `jobs` tables are embedded from `migrations/` at build time.
//!
//! ```ignore
//! let pool = jobly::create_pool(&database_url)?;
//! jobly::migrate::run_pool(&pool).await?;
//! ```

use crate::error::JoblyResult;

pub use refinery::{Report, Runner};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("./migrations");
}

/// The embedded migration runner.
pub fn runner() -> Runner {
    embedded::migrations::runner()
}

/// Apply pending migrations on a single PostgreSQL connection.
pub async fn run(client: &mut tokio_postgres::Client) -> JoblyResult<Report> {
    let report = runner().run_async(client).await?;
    tracing::info!(
        target: "jobly.migrate",
        applied = report.applied_migrations().len(),
        "migrations complete"
    );
    Ok(report)
}

/// Pool variant of [`run`].
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> JoblyResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}
