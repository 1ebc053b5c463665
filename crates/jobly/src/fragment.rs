//! SQL fragment builders.
//!
//! These turn a typed partial-update payload or a list of filter criteria into a
//! parameterized clause plus the values to bind, in placeholder order:
//!
//! ```ignore
//! use jobly::fragment::{build_update_fragment, ColumnMap, SqlValue};
//!
//! let columns = ColumnMap::new(&[("companyHandle", "company_handle")]);
//! let frag = build_update_fragment(
//!     &[("title", SqlValue::from("New Job")), ("companyHandle", SqlValue::from("c1"))],
//!     columns,
//! )?;
//! assert_eq!(frag.set_cols, r#""title"=$1, "company_handle"=$2"#);
//! ```
//!
//! Nothing here performs I/O; the accessors in [`crate::job`] and [`crate::company`]
//! splice the output into their statement templates.

use crate::error::{JoblyError, JoblyResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::Write;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// Maps application field names to storage column names.
///
/// The mapping is total: a field without an explicit entry maps to its own name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMap<'a> {
    entries: &'a [(&'a str, &'a str)],
}

impl<'a> ColumnMap<'a> {
    /// Build a map from `(field, column)` pairs. Later duplicates are ignored.
    pub const fn new(entries: &'a [(&'a str, &'a str)]) -> Self {
        Self { entries }
    }

    /// A map with no overrides: every field is its own column.
    pub const fn identity() -> Self {
        Self { entries: &[] }
    }

    /// Resolve the column for `field`, defaulting to `field` itself.
    pub fn column<'f>(&self, field: &'f str) -> &'f str
    where
        'a: 'f,
    {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, column)| *column)
            .unwrap_or(field)
    }
}

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`, accepted for any column type.
    Null,
    Text(String),
    Int(i32),
    Decimal(Decimal),
    Bool(bool),
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Text(v) => v.to_sql(ty, out),
            SqlValue::Int(v) => v.to_sql(ty, out),
            SqlValue::Decimal(v) => v.to_sql(ty, out),
            SqlValue::Bool(v) => v.to_sql(ty, out),
        }
    }

    // The variant decides; type checking happens in `to_sql_checked`. Only bind a
    // `SqlValue` directly: container encodings such as `Vec<SqlValue>` call
    // `accepts` and then the unchecked `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Text(v) => v.to_sql_checked(ty, out),
            SqlValue::Int(v) => v.to_sql_checked(ty, out),
            SqlValue::Decimal(v) => v.to_sql_checked(ty, out),
            SqlValue::Bool(v) => v.to_sql_checked(ty, out),
        }
    }
}

/// Parameter refs compatible with `tokio-postgres`.
pub fn params_ref(values: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// A recognized list filter.
///
/// `Name`/`MinEmployees`/`MaxEmployees` serve company listings, the rest serve job
/// listings; the builder treats them uniformly.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// `LIKE` match on the name column
    Name(String),
    /// `LIKE` match on the title column
    Title(String),
    /// Inclusive lower bound on employee count
    MinEmployees(i32),
    /// Inclusive upper bound on employee count
    MaxEmployees(i32),
    /// Inclusive lower bound on salary
    MinSalary(i32),
    /// `true` requires equity > 0; `false` adds no constraint
    HasEquity(bool),
}

impl Criterion {
    /// Application field name, used as the [`ColumnMap`] key.
    pub fn field(&self) -> &'static str {
        match self {
            Criterion::Name(_) => "name",
            Criterion::Title(_) => "title",
            Criterion::MinEmployees(_) => "minEmployees",
            Criterion::MaxEmployees(_) => "maxEmployees",
            Criterion::MinSalary(_) => "minSalary",
            Criterion::HasEquity(_) => "hasEquity",
        }
    }
}

/// Output of [`build_update_fragment`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateFragment {
    /// `"col_a"=$1, "col_b"=$2, ...`
    pub set_cols: String,
    /// Values for `$1..$n`, in order.
    pub values: Vec<SqlValue>,
}

/// Output of [`build_filter_fragment`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterFragment {
    /// Either empty or `WHERE <cond> AND <cond> ...`
    pub set_filters: String,
    /// Values for `$1..$n`, in order.
    pub values: Vec<SqlValue>,
}

fn quote_ident(column: &str) -> String {
    format!("\"{}\"", column.replace('"', "\"\""))
}

/// Build the `SET` list for a partial update.
///
/// Emits one `"<column>"=$i` per payload entry, in payload order. `SqlValue::Null`
/// entries clear the column rather than being skipped.
///
/// Returns [`JoblyError::InvalidRequest`] if `payload` is empty.
pub fn build_update_fragment(
    payload: &[(&str, SqlValue)],
    columns: ColumnMap<'_>,
) -> JoblyResult<UpdateFragment> {
    if payload.is_empty() {
        return Err(JoblyError::invalid_request("No data"));
    }

    let mut set_cols = String::new();
    let mut values = Vec::with_capacity(payload.len());
    for (idx, (field, value)) in payload.iter().enumerate() {
        if idx > 0 {
            set_cols.push_str(", ");
        }
        let _ = write!(set_cols, "{}=${}", quote_ident(columns.column(field)), idx + 1);
        values.push(value.clone());
    }

    Ok(UpdateFragment { set_cols, values })
}

/// Build a `WHERE` clause from filter criteria.
///
/// Placeholders are numbered by the criteria that actually bind a value, so the
/// output never skips a position. `HasEquity` never binds. If nothing produces a
/// condition (only `HasEquity(false)`), `set_filters` is empty.
///
/// Returns [`JoblyError::InvalidRequest`] if `criteria` is empty, or if both
/// `MinEmployees` and `MaxEmployees` are given with min > max. When a bound is
/// repeated, the largest minimum is checked against the smallest maximum.
pub fn build_filter_fragment(
    criteria: &[Criterion],
    columns: ColumnMap<'_>,
) -> JoblyResult<FilterFragment> {
    if criteria.is_empty() {
        return Err(JoblyError::invalid_request("No data"));
    }

    // Repeated bounds all apply, so compare the tightest of each.
    let min_employees = criteria
        .iter()
        .filter_map(|c| match c {
            Criterion::MinEmployees(n) => Some(*n),
            _ => None,
        })
        .max();
    let max_employees = criteria
        .iter()
        .filter_map(|c| match c {
            Criterion::MaxEmployees(n) => Some(*n),
            _ => None,
        })
        .min();
    if let (Some(min), Some(max)) = (min_employees, max_employees) {
        if min > max {
            return Err(JoblyError::invalid_request(
                "Minimum number of employees cannot be greater than maximum number of employees",
            ));
        }
    }

    let mut conditions: Vec<String> = Vec::with_capacity(criteria.len());
    let mut values = Vec::new();
    for criterion in criteria {
        let column = quote_ident(columns.column(criterion.field()));
        let (op, value) = match criterion {
            Criterion::Name(v) | Criterion::Title(v) => ("LIKE", SqlValue::Text(v.clone())),
            Criterion::MinEmployees(n) | Criterion::MinSalary(n) => (">=", SqlValue::Int(*n)),
            Criterion::MaxEmployees(n) => ("<=", SqlValue::Int(*n)),
            Criterion::HasEquity(true) => {
                conditions.push(format!("{column} > 0"));
                continue;
            }
            Criterion::HasEquity(false) => continue,
        };
        values.push(value);
        conditions.push(format!("{column} {op} ${}", values.len()));
    }

    let set_filters = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    Ok(FilterFragment {
        set_filters,
        values,
    })
}

/// Turn a search term into a `LIKE` pattern matching it anywhere.
///
/// `%`, `_` and `\` in the term are escaped so they match literally.
pub fn contains_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}
