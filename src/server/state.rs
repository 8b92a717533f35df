use std::sync::Arc;

use crate::store::ConnectionProvider;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Hands each request its own database connection.
    pub provider: Arc<dyn ConnectionProvider>,
}
