//! HTTP surface: `POST /chart` and `POST /chart/countries`.

mod error;
mod routes;
mod state;

pub use error::AppError;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;

use crate::error::Result;
use crate::store::ConnectionProvider;

/// Build the application router around a connection provider.
pub fn router(provider: Arc<dyn ConnectionProvider>) -> Router {
    let state = Arc::new(AppState { provider });

    Router::new()
        .route("/chart", post(routes::chart))
        .route("/chart/countries", post(routes::chart_by_country))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
