//! HTTP endpoint handlers.

pub mod execute;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes the command routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().merge(execute::routes())
}
