pub(crate) mod flow;
pub(crate) mod health;

use crate::state::AppState;
use axum::Router;

/// Combines all routes into a single router
pub(super) fn router() -> Router<AppState> {
    Router::new().merge(health::router()).merge(flow::router())
}
