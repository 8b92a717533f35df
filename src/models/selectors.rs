//! Closed sets of SQL identifiers a request may select.
//!
//! Each variant maps to a `&'static str` fragment, so the only identifier text
//! that ever reaches a statement is a literal compiled into this module.

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Reducer applied to the selected metric within each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    Sum,
    Avg,
    Max,
    Min,
}

impl Aggregation {
    pub const ALL: [Aggregation; 4] = [
        Aggregation::Sum,
        Aggregation::Avg,
        Aggregation::Max,
        Aggregation::Min,
    ];

    /// DuckDB aggregate function name.
    pub fn as_sql(self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
        }
    }
}

impl FromStr for Aggregation {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aggregation::ALL
            .into_iter()
            .find(|a| a.as_sql() == s)
            .ok_or(())
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

/// Metric column of the timeseries table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Matrix {
    NewConfirmed,
    NewDeceased,
    CumulativeConfirmed,
}

impl Matrix {
    pub const ALL: [Matrix; 3] = [
        Matrix::NewConfirmed,
        Matrix::NewDeceased,
        Matrix::CumulativeConfirmed,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Matrix::NewConfirmed => "new_confirmed",
            Matrix::NewDeceased => "new_deceased",
            Matrix::CumulativeConfirmed => "cumulative_confirmed",
        }
    }
}

impl FromStr for Matrix {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Matrix::ALL.into_iter().find(|m| m.column() == s).ok_or(())
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// ChartVariant
// ---------------------------------------------------------------------------

/// Which chart a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartVariant {
    /// One series over all selected locations; the caller picks the reducer.
    Aggregated,
    /// One series per location, always summed. Without explicit countries
    /// the top locations by total are charted.
    PerCountry,
}

impl ChartVariant {
    pub fn accepts_aggregation(self) -> bool {
        matches!(self, ChartVariant::Aggregated)
    }
}
