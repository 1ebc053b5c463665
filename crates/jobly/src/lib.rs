//! # jobly
//!
//! PostgreSQL data access for a job board.
//!
//! ## Layout
//!
//! - [`fragment`]: pure builders that turn a partial update or a set of list filters
//!   into a parameterized `SET` / `WHERE` clause plus bind values
//! - [`Job`]: create, list with filters, get, partial update, remove
//! - [`Company`]: the lookups `Job::create` depends on, plus filtered listing
//! - [`GenericClient`]: one trait over clients, pooled clients, and transactions
//!
//! ```ignore
//! use jobly::{Job, JobFilter, JobPatch, NewJob};
//!
//! let job = Job::create(&client, &NewJob {
//!     title: "Engineer".into(),
//!     salary: Some(80000),
//!     equity: None,
//!     company_handle: "c1".into(),
//! }).await?;
//!
//! let with_equity = Job::find_all(&client, Some(&JobFilter {
//!     has_equity: Some(true),
//!     ..Default::default()
//! })).await?;
//!
//! Job::update(&client, job.id, &JobPatch { salary: Some(None), ..Default::default() }).await?;
//! Job::remove(&client, job.id).await?;
//! ```

pub mod client;
pub mod company;
pub mod config;
pub mod error;
pub mod fragment;
pub mod job;
pub mod row;
pub mod tracing_client;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "migrate")]
pub mod migrate;

#[cfg(test)]
mod test_support;

pub use client::GenericClient;
pub use company::{Company, CompanyFilter};
pub use config::JoblyConfig;
pub use error::{JoblyError, JoblyResult};
pub use fragment::{
    ColumnMap, Criterion, FilterFragment, SqlValue, UpdateFragment, build_filter_fragment,
    build_update_fragment,
};
pub use job::{Job, JobFilter, JobPatch, NewJob};
pub use row::{FromRow, RowExt};
pub use tracing_client::TracingClient;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_config, create_pool_with_config};
