use axum::{routing::get, Router};

use crate::state::AppState;

pub mod handlers;
pub mod views;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home))
        .route("/dashboard", get(handlers::dashboard))
        .route("/admin", get(handlers::admin))
}
