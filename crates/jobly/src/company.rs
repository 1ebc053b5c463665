//! Company lookups.
//!
//! Companies own jobs: [`crate::Job::create`] refuses a handle that is not here.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::fragment::{ColumnMap, Criterion, build_filter_fragment, contains_pattern, params_ref};
use crate::row::{FromRow, RowExt};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

const COMPANY_COLUMNS: &str = "handle, name, num_employees, description, logo_url";

const FILTER_COLUMNS: ColumnMap<'static> = ColumnMap::new(&[
    ("name", "name"),
    ("minEmployees", "num_employees"),
    ("maxEmployees", "num_employees"),
]);

/// A row of the `companies` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub num_employees: Option<i32>,
    pub description: String,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            num_employees: row.try_get_column("num_employees")?,
            description: row.try_get_column("description")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// Filters for [`Company::find_all`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilter {
    /// Case-sensitive substring of the name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub min_employees: Option<i32>,
    #[serde(default)]
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn criteria(&self) -> Vec<Criterion> {
        let mut out = Vec::with_capacity(3);
        if let Some(name) = &self.name {
            out.push(Criterion::Name(contains_pattern(name)));
        }
        if let Some(min) = self.min_employees {
            out.push(Criterion::MinEmployees(min));
        }
        if let Some(max) = self.max_employees {
            out.push(Criterion::MaxEmployees(max));
        }
        out
    }
}

impl Company {
    /// Whether a company with `handle` exists.
    pub async fn exists(conn: &impl GenericClient, handle: &str) -> JoblyResult<bool> {
        let row = conn
            .query_opt("SELECT handle, name FROM companies WHERE handle = $1", &[&handle])
            .await?;
        Ok(row.is_some())
    }

    /// Fetch one company by handle.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<Company> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1");
        let row = conn
            .query_opt(&sql, &[&handle])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        Company::from_row(&row)
    }

    /// List companies ordered by name, optionally filtered.
    ///
    /// Returns [`JoblyError::InvalidRequest`] for a filter with no field set or with
    /// `min_employees > max_employees`.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: Option<&CompanyFilter>,
    ) -> JoblyResult<Vec<Company>> {
        let rows = match filter {
            None => {
                let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies ORDER BY name");
                conn.query(&sql, &[]).await?
            }
            Some(filter) => {
                let frag = build_filter_fragment(&filter.criteria(), FILTER_COLUMNS)?;
                let sql = format!(
                    "SELECT {COMPANY_COLUMNS} FROM companies {} ORDER BY name",
                    frag.set_filters
                );
                conn.query(&sql, &params_ref(&frag.values)).await?
            }
        };

        tracing::debug!(target: "jobly.company", rows = rows.len(), "listed companies");
        rows.iter().map(Company::from_row).collect()
    }
}
