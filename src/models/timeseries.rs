use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TimeseriesPoint — One aggregated bucket (query result)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    /// Location key; only set for per-country charts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub date: NaiveDate,
    pub value: i64,
}

// ---------------------------------------------------------------------------
// ChartResponse — Success envelope for the chart endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub data: Vec<TimeseriesPoint>,
}
