use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Redirect,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::extract::CurrentUser,
    profile::service::{object_key, validate_image, UploadError},
    state::AppState,
    users::User,
};

/// Field name the upload form posts the image under.
const FILE_FIELD: &str = "profile_image";

#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Redirect, (StatusCode, String)> {
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        // Validate before the body is read; a rejected file never reaches
        // storage.
        let ext = validate_image(field.file_name(), field.content_type())
            .map_err(refused)?;

        let data = field.bytes().await.map_err(bad_request)?;
        if data.is_empty() {
            return Err(refused(UploadError::MissingFile));
        }

        let key = object_key(OffsetDateTime::now_utc(), &ext);
        state.storage.put_object(&key, data).await.map_err(internal)?;

        let url = state.storage.public_url(&key);
        User::set_profile_image(&state.db, user.id, &url)
            .await
            .map_err(|e| internal(e.into()))?;

        info!(user_id = %user.id, key = %key, "profile image updated");
        return Ok(Redirect::to("/dashboard"));
    }

    warn!(user_id = %user.id, "upload without a file field");
    Err(refused(UploadError::MissingFile))
}

fn refused(e: UploadError) -> (StatusCode, String) {
    (e.status(), e.to_string())
}

fn bad_request<E: std::error::Error>(e: E) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
}
