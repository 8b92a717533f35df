//! Query modules.
//!
//! Each module provides a query struct that borrows a DuckDB connection and
//! exposes methods returning `Result<T>` with typed rows.

pub mod timeseries;

pub use timeseries::{QueryPlan, TimeseriesQuery};
