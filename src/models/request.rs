use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::selectors::{Aggregation, ChartVariant, Matrix};

// ---------------------------------------------------------------------------
// ChartRequest — Raw request body as sent by the client
// ---------------------------------------------------------------------------

/// Undecoded chart request. Every field is optional here so that presence is
/// reported by validation rather than by the JSON decoder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub aggregation_func: Option<String>,
    pub matrix: Option<String>,
    pub countries: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// ChartParams — Validated, typed request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartParams {
    pub variant: ChartVariant,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub aggregation: Aggregation,
    pub matrix: Matrix,
    /// Location keys in request order. Empty means "no explicit filter".
    pub countries: Vec<String>,
}
