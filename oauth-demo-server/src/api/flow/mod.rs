//! Browser-facing routes of the authorization code demo
//!
//! | Method | Path | Trigger |
//! |---|---|---|
//! | GET | `/` | render settings |
//! | POST | `/` | start flow |
//! | GET | `/callback` | complete authorization |
//! | GET | `/refresh-access-token` | refresh |
//! | POST | `/call-api` | ad-hoc authenticated GET |

pub mod handlers;
pub mod views;

use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

/// Creates the flow routes
pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index).post(handlers::start))
        .route("/callback", get(handlers::callback))
        .route("/refresh-access-token", get(handlers::refresh))
        .route("/call-api", post(handlers::call_api))
}
