use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;

use crate::error::CoviscopeError;
use crate::models::{ChartRequest, ChartResponse, ChartVariant};
use crate::queries::{QueryPlan, TimeseriesQuery};
use crate::validate::validate;

use super::error::AppError;
use super::state::AppState;

/// POST /chart
///
/// One series over the requested countries (or all of them), reduced with
/// the caller's `aggregationFunc`.
pub async fn chart(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChartRequest>, JsonRejection>,
) -> Result<Json<ChartResponse>, AppError> {
    serve_chart(state, body, ChartVariant::Aggregated).await
}

/// POST /chart/countries
///
/// One summed series per country. Without `countries`, the ten countries
/// with the largest total over the range are charted.
pub async fn chart_by_country(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChartRequest>, JsonRejection>,
) -> Result<Json<ChartResponse>, AppError> {
    serve_chart(state, body, ChartVariant::PerCountry).await
}

async fn serve_chart(
    state: Arc<AppState>,
    body: Result<Json<ChartRequest>, JsonRejection>,
    variant: ChartVariant,
) -> Result<Json<ChartResponse>, AppError> {
    let Json(req) = body.map_err(|e| CoviscopeError::MalformedRequest(e.body_text()))?;
    let params = validate(&req, variant)?;
    let plan = QueryPlan::build(&params);

    // The connection is opened, used and dropped on the blocking pool.
    let provider = state.provider.clone();
    let data = tokio::task::spawn_blocking(move || {
        let conn = provider.acquire()?;
        TimeseriesQuery::new(&conn).fetch(&plan)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "chart task failed");
        AppError::internal("Error fetching data")
    })??;

    Ok(Json(ChartResponse { data }))
}
