//! Job records: create, list with filters, get, partial update, remove.
//!
//! Every operation takes a [`GenericClient`], so it can run on a plain connection, a
//! pooled one, or inside a caller-managed transaction.

use crate::client::GenericClient;
use crate::company::Company;
use crate::error::{JoblyError, JoblyResult};
use crate::fragment::{
    ColumnMap, Criterion, SqlValue, build_filter_fragment, build_update_fragment,
    contains_pattern, params_ref,
};
use crate::row::{FromRow, RowExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tokio_postgres::Row;

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

const FILTER_COLUMNS: ColumnMap<'static> = ColumnMap::new(&[
    ("title", "title"),
    ("minSalary", "salary"),
    ("hasEquity", "equity"),
]);

const UPDATE_COLUMNS: ColumnMap<'static> = ColumnMap::new(&[("companyHandle", "company_handle")]);

/// A row of the `jobs` table.
///
/// `equity` serializes as a decimal string (`"0.0005"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Partial update for [`Job::update`].
///
/// `None` leaves a field untouched. For the nullable columns, `Some(None)` clears
/// the stored value; in JSON that is an explicit `null`, while a missing key is
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub equity: Option<Option<Decimal>>,
    #[serde(default)]
    pub company_handle: Option<String>,
}

// Present-but-null must become `Some(None)`, which plain `Option<Option<T>>` collapses.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl JobPatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.salary.is_none()
            && self.equity.is_none()
            && self.company_handle.is_none()
    }

    /// The set fields as `(field, value)` pairs, in declaration order.
    pub fn payload(&self) -> Vec<(&'static str, SqlValue)> {
        let mut out = Vec::with_capacity(4);
        if let Some(title) = &self.title {
            out.push(("title", SqlValue::from(title.as_str())));
        }
        if let Some(salary) = self.salary {
            out.push(("salary", SqlValue::from(salary)));
        }
        if let Some(equity) = self.equity {
            out.push(("equity", SqlValue::from(equity)));
        }
        if let Some(handle) = &self.company_handle {
            out.push(("companyHandle", SqlValue::from(handle.as_str())));
        }
        out
    }
}

/// Filters for [`Job::find_all`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFilter {
    /// Case-sensitive substring of the title.
    #[serde(default)]
    pub title: Option<String>,
    /// Inclusive lower salary bound.
    #[serde(default)]
    pub min_salary: Option<i32>,
    /// `true` keeps only jobs with equity > 0; `false` adds no constraint.
    #[serde(default)]
    pub has_equity: Option<bool>,
}

impl JobFilter {
    pub fn criteria(&self) -> Vec<Criterion> {
        let mut out = Vec::with_capacity(3);
        if let Some(title) = &self.title {
            out.push(Criterion::Title(contains_pattern(title)));
        }
        if let Some(min_salary) = self.min_salary {
            out.push(Criterion::MinSalary(min_salary));
        }
        if let Some(has_equity) = self.has_equity {
            out.push(Criterion::HasEquity(has_equity));
        }
        out
    }
}

fn select_sql(filters: &str) -> String {
    if filters.is_empty() {
        format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY id")
    } else {
        format!("SELECT {JOB_COLUMNS} FROM jobs {filters} ORDER BY id")
    }
}

fn not_found(id: i32) -> JoblyError {
    JoblyError::not_found(format!("No job with id: {id}"))
}

impl Job {
    /// Insert a job after checking that its company exists.
    ///
    /// Returns [`JoblyError::NotFound`] if `company_handle` names no company. The check
    /// and the insert are separate statements; pass a transaction to make them atomic.
    pub async fn create(conn: &impl GenericClient, new_job: &NewJob) -> JoblyResult<Job> {
        if !Company::exists(conn, &new_job.company_handle).await? {
            return Err(JoblyError::not_found(format!(
                "Company does not exist: {}",
                new_job.company_handle
            )));
        }

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {JOB_COLUMNS}"
        );
        let row = conn
            .query_one(
                &sql,
                &[
                    &new_job.title,
                    &new_job.salary,
                    &new_job.equity,
                    &new_job.company_handle,
                ],
            )
            .await?;
        let job = Job::from_row(&row)?;

        tracing::debug!(target: "jobly.job", id = job.id, company = %job.company_handle, "created job");
        Ok(job)
    }

    /// List jobs in insertion order, optionally filtered.
    ///
    /// A filter with no field set is an [`JoblyError::InvalidRequest`].
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: Option<&JobFilter>,
    ) -> JoblyResult<Vec<Job>> {
        let rows = match filter {
            None => conn.query(&select_sql(""), &[]).await?,
            Some(filter) => {
                let frag = build_filter_fragment(&filter.criteria(), FILTER_COLUMNS)?;
                let params = params_ref(&frag.values);
                conn.query(&select_sql(&frag.set_filters), &params).await?
            }
        };

        tracing::debug!(target: "jobly.job", rows = rows.len(), filtered = filter.is_some(), "listed jobs");
        rows.iter().map(Job::from_row).collect()
    }

    /// Fetch one job by id.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        let row = conn.query_opt(&sql, &[&id]).await?.ok_or_else(|| not_found(id))?;
        Job::from_row(&row)
    }

    /// Apply a partial update and return the updated row.
    ///
    /// Only fields set in `patch` change. Returns [`JoblyError::InvalidRequest`] for
    /// an empty patch (no statement is sent) and [`JoblyError::NotFound`] when no row
    /// has `id`.
    pub async fn update(conn: &impl GenericClient, id: i32, patch: &JobPatch) -> JoblyResult<Job> {
        if patch.is_empty() {
            return Err(JoblyError::invalid_request("No data"));
        }
        let frag = build_update_fragment(&patch.payload(), UPDATE_COLUMNS)?;
        let id_idx = frag.values.len() + 1;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${id_idx} RETURNING {JOB_COLUMNS}",
            frag.set_cols
        );

        let mut params = params_ref(&frag.values);
        params.push(&id);
        let row = conn.query_opt(&sql, &params).await?.ok_or_else(|| not_found(id))?;

        tracing::debug!(target: "jobly.job", id, fields = frag.values.len(), "updated job");
        Job::from_row(&row)
    }

    /// Delete a job.
    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        conn.query_opt("DELETE FROM jobs WHERE id = $1 RETURNING id", &[&id])
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::debug!(target: "jobly.job", id, "removed job");
        Ok(())
    }
}
