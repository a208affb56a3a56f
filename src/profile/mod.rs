use axum::{extract::DefaultBodyLimit, routing::post, Router};

use crate::state::AppState;

pub mod handlers;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-profile-image", post(handlers::upload_profile_image))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB
}
