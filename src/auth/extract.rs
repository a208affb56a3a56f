use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{error, warn};

use crate::auth::session;
use crate::state::AppState;
use crate::users::User;

/// Why a guard refused the request. Auth failures become redirects, a role
/// mismatch is a hard 403, and everything else is a 500.
#[derive(Debug)]
pub enum AuthRejection {
    /// No valid identity on a route that needs one.
    SignInRequired,
    /// A signed-in user hit a guests-only route.
    AlreadySignedIn,
    /// Signed in, but the role does not allow this route.
    Forbidden,
    Internal(String),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::SignInRequired => Redirect::to("/login").into_response(),
            AuthRejection::AlreadySignedIn => Redirect::to("/").into_response(),
            AuthRejection::Forbidden => {
                (StatusCode::FORBIDDEN, "Forbidden").into_response()
            }
            AuthRejection::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}

/// Restore the identity carried by the request's session, if any. A session
/// pointing at a user that no longer exists is cleared and treated as
/// anonymous rather than failing the request.
async fn restore_identity(
    parts: &mut Parts,
    state: &AppState,
) -> Result<Option<User>, AuthRejection> {
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| {
            error!(error = msg, "session layer missing or unreadable");
            AuthRejection::Internal("session unavailable".into())
        })?;

    let user_id = session::user_id(&session).await.map_err(|e| {
        error!(error = %e, "session read failed");
        AuthRejection::Internal("session unavailable".into())
    })?;
    let Some(user_id) = user_id else {
        return Ok(None);
    };

    match User::find_by_id(&state.db, user_id).await {
        Ok(Some(user)) => Ok(Some(user)),
        Ok(None) => {
            // Stale token: the user behind it is gone. Drop it quietly.
            warn!(%user_id, "session referenced a missing user");
            if let Err(e) = session::clear_user_id(&session).await {
                warn!(error = %e, "failed to clear stale session identity");
            }
            Ok(None)
        }
        Err(e) => {
            error!(error = %e, %user_id, "identity lookup failed");
            Err(AuthRejection::Internal("store unavailable".into()))
        }
    }
}

/// Guard: request must carry a valid session identity.
pub struct CurrentUser(pub User);

/// Identity if present; never rejects.
pub struct OptionalUser(pub Option<User>);

/// Guard: request must NOT carry a session identity.
pub struct Guest;

/// Guard: identity present and role == admin.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match restore_identity(parts, state).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => Err(AuthRejection::SignInRequired),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(restore_identity(parts, state).await?))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Guest {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match restore_identity(parts, state).await? {
            Some(_) => Err(AuthRejection::AlreadySignedIn),
            None => Ok(Guest),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match restore_identity(parts, state).await? {
            Some(user) if user.role.is_admin() => Ok(AdminUser(user)),
            Some(user) => {
                warn!(user_id = %user.id, role = %user.role, "admin route refused");
                Err(AuthRejection::Forbidden)
            }
            None => Err(AuthRejection::SignInRequired),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn sign_in_required_redirects_to_login() {
        let res = AuthRejection::SignInRequired.into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/login");
    }

    #[test]
    fn already_signed_in_redirects_home() {
        let res = AuthRejection::AlreadySignedIn.into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(LOCATION).unwrap(), "/");
    }

    #[test]
    fn wrong_role_is_forbidden_not_redirect() {
        let res = AuthRejection::Forbidden.into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(res.headers().get(LOCATION).is_none());
    }

    #[test]
    fn internal_maps_to_500() {
        let res = AuthRejection::Internal("store unavailable".into()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
