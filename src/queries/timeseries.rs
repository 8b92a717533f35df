//! Timeseries chart queries against the `covid19` table.

use chrono::NaiveDate;
use duckdb::Connection as DuckDbConnection;

use crate::config::{TIMESERIES_TABLE, TOP_LOCATIONS};
use crate::error::{CoviscopeError, Result};
use crate::models::{Aggregation, ChartParams, ChartVariant, Matrix, TimeseriesPoint};
use crate::sql_builder::SqlBuilder;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Bucket key rendered as text so row mapping does not depend on the
/// driver's temporal types.
const DAY_COLUMN: &str = "strftime(date, '%Y-%m-%d') AS day";
const COUNTRY_COLUMN: &str = "location_key AS country";

// ---------------------------------------------------------------------------
// QueryPlan
// ---------------------------------------------------------------------------

/// A chart statement and its positional arguments, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub sql: String,
    pub params: Vec<String>,
    pub variant: ChartVariant,
}

impl QueryPlan {
    /// Build the statement for a validated request.
    ///
    /// Dates and country codes only ever appear in `params`. The aggregate
    /// function and metric column come from [`Aggregation::as_sql`] and
    /// [`Matrix::column`].
    pub fn build(req: &ChartParams) -> Self {
        let start = req.start_date.format(DATE_FORMAT).to_string();
        let end = req.end_date.format(DATE_FORMAT).to_string();
        let value = value_column(req.aggregation, req.matrix);

        let mut qb = SqlBuilder::new(TIMESERIES_TABLE);
        match req.variant {
            ChartVariant::Aggregated => qb.select(&[DAY_COLUMN, value.as_str()]),
            ChartVariant::PerCountry => qb.select(&[DAY_COLUMN, COUNTRY_COLUMN, value.as_str()]),
        };
        qb.where_date_between("date", &start, &end);

        if !req.countries.is_empty() {
            let countries: Vec<&str> = req.countries.iter().map(String::as_str).collect();
            qb.where_in("location_key", &countries);
        } else if req.variant == ChartVariant::PerCountry {
            qb.where_in_subquery("location_key", &top_locations(req.matrix, &start, &end));
        }

        match req.variant {
            ChartVariant::Aggregated => {
                qb.group_by(&["date"]).order_by(&["date ASC"]);
            }
            ChartVariant::PerCountry => {
                qb.group_by(&["date", "location_key"])
                    .order_by(&["date ASC", "location_key ASC"]);
            }
        }

        let (sql, params) = qb.build();
        Self {
            sql,
            params,
            variant: req.variant,
        }
    }
}

/// `CAST(COALESCE(sum(new_confirmed), 0) AS BIGINT) AS value`
///
/// A bucket whose metric is NULL on every row reports 0.
fn value_column(aggregation: Aggregation, matrix: Matrix) -> String {
    format!(
        "CAST(COALESCE({}({}), 0) AS BIGINT) AS value",
        aggregation.as_sql(),
        matrix.column()
    )
}

/// Location keys with the largest total for `matrix` over the range.
/// Equal totals are ordered by key so the selection is stable.
fn top_locations(matrix: Matrix, start: &str, end: &str) -> SqlBuilder {
    let rank = format!("sum({}) DESC NULLS LAST", matrix.column());
    let mut qb = SqlBuilder::new(TIMESERIES_TABLE);
    qb.select(&["location_key"])
        .where_date_between("date", start, end)
        .group_by(&["location_key"])
        .order_by(&[rank.as_str(), "location_key ASC"])
        .limit(TOP_LOCATIONS);
    qb
}

// ---------------------------------------------------------------------------
// TimeseriesQuery
// ---------------------------------------------------------------------------

/// Runs chart plans on a single request's connection.
pub struct TimeseriesQuery<'a> {
    conn: &'a DuckDbConnection,
}

impl<'a> TimeseriesQuery<'a> {
    /// Create a new `TimeseriesQuery` bound to the given connection.
    pub fn new(conn: &'a DuckDbConnection) -> Self {
        Self { conn }
    }

    /// Build and run the plan for a validated request.
    pub fn chart(&self, req: &ChartParams) -> Result<Vec<TimeseriesPoint>> {
        self.fetch(&QueryPlan::build(req))
    }

    /// Execute a plan and map every row, in the order the engine returns them.
    ///
    /// Engine failures (prepare, bind, or mid-stream) are
    /// [`CoviscopeError::QueryExecution`]; rows of the wrong shape are
    /// [`CoviscopeError::RowMapping`]. The statement and its cursor are
    /// dropped on every return path.
    pub fn fetch(&self, plan: &QueryPlan) -> Result<Vec<TimeseriesPoint>> {
        tracing::debug!(sql = %plan.sql, params = ?plan.params, "executing chart query");

        let mut stmt = self
            .conn
            .prepare(&plan.sql)
            .map_err(CoviscopeError::QueryExecution)?;

        let param_values: Vec<&dyn duckdb::ToSql> = plan
            .params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt
            .query(param_values.as_slice())
            .map_err(CoviscopeError::QueryExecution)?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(CoviscopeError::QueryExecution)? {
            out.push(map_row(row, plan.variant)?);
        }

        tracing::debug!(points = out.len(), "chart query complete");
        Ok(out)
    }
}

fn map_row(row: &duckdb::Row<'_>, variant: ChartVariant) -> Result<TimeseriesPoint> {
    let day: String = row.get(0).map_err(mapping_error)?;
    let date = NaiveDate::parse_from_str(&day, DATE_FORMAT)
        .map_err(|e| CoviscopeError::RowMapping(format!("bucket date '{day}': {e}")))?;

    let (country, value_idx) = match variant {
        ChartVariant::Aggregated => (None, 1),
        ChartVariant::PerCountry => (Some(row.get::<_, String>(1).map_err(mapping_error)?), 2),
    };
    let value: i64 = row.get(value_idx).map_err(mapping_error)?;

    Ok(TimeseriesPoint {
        country,
        date,
        value,
    })
}

fn mapping_error(e: duckdb::Error) -> CoviscopeError {
    CoviscopeError::RowMapping(e.to_string())
}
