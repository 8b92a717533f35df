//! Aggregated COVID-19 timeseries over HTTP.
//!
//! Requests are validated into typed parameters, turned into a parameterized
//! DuckDB statement, and executed on a per-request connection.
//!
//! # Quick start
//!
//! ```no_run
//! use coviscope::models::{ChartRequest, ChartVariant};
//! use coviscope::queries::TimeseriesQuery;
//! use coviscope::{validate, ConnectionProvider, Store};
//!
//! let store = Store::open("coviscope.duckdb").unwrap();
//! let req = ChartRequest {
//!     start_date: Some("2021-01-01".into()),
//!     end_date: Some("2021-01-31".into()),
//!     aggregation_func: Some("sum".into()),
//!     matrix: Some("new_confirmed".into()),
//!     countries: Some(vec!["US".into(), "IN".into()]),
//! };
//! let params = validate(&req, ChartVariant::Aggregated).unwrap();
//! let conn = store.acquire().unwrap();
//! let points = TimeseriesQuery::new(&conn).chart(&params).unwrap();
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod queries;
pub mod server;
pub mod sql_builder;
pub mod store;
pub mod validate;

pub use cache::DatasetCache;
pub use config::ServerConfig;
pub use error::{CoviscopeError, Result};
pub use queries::QueryPlan;
pub use sql_builder::SqlBuilder;
pub use store::{ConnectionProvider, Store};
pub use validate::validate;

/// Load the cached dataset into `store` if its table is empty.
///
/// Downloads the dataset first unless `cache` is offline. Returns the number
/// of rows imported, or 0 when the store was already populated.
pub fn bootstrap(store: &Store, cache: &mut DatasetCache) -> Result<usize> {
    store.ensure_schema()?;
    if store.row_count()? > 0 {
        return Ok(0);
    }
    let path = cache.ensure_dataset()?;
    store.load_csv(path)
}
