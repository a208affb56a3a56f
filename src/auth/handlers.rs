use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tower_sessions::Session;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm, ValidationError},
        extract::Guest,
        password::hash_password,
        service,
        session,
    },
    pages::views,
    state::AppState,
    users::{CreateUserError, NewUser, User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", get(logout))
}

#[instrument(skip(_guest, session))]
pub async fn login_page(_guest: Guest, session: Session) -> Result<Html<String>, (StatusCode, String)> {
    let flash = session::take_flash(&session).await.map_err(internal)?;
    Ok(Html(views::login_page(flash.as_deref())))
}

pub async fn register_page(_guest: Guest) -> Html<String> {
    Html(views::register_page(None))
}

#[instrument(skip(state, _guest, session, form))]
pub async fn login(
    State(state): State<AppState>,
    _guest: Guest,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, (StatusCode, String)> {
    let email = form.normalized_email();

    match service::authenticate(&state.db, &email, &form.password).await {
        Ok(user) => {
            session::sign_in(&session, user.id).await.map_err(internal)?;
            info!(user_id = %user.id, email = %user.email, "user logged in");
            Ok(Redirect::to("/"))
        }
        Err(e) if e.is_credential_failure() => {
            // authenticate() already logged which half failed; the client
            // gets the merged message either way.
            session::set_flash(&session, e.client_message())
                .await
                .map_err(internal)?;
            Ok(Redirect::to("/login"))
        }
        Err(e) => {
            error!(error = %e, "login failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "login failed".into()))
        }
    }
}

#[instrument(skip(state, _guest, form))]
pub async fn register(
    State(state): State<AppState>,
    _guest: Guest,
    Form(form): Form<RegisterForm>,
) -> Result<Response, (StatusCode, String)> {
    let valid = match form.validate() {
        Ok(v) => v,
        Err(e) => {
            warn!(field = e.field, "registration input rejected");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(views::register_page(Some(&e))),
            )
                .into_response());
        }
    };

    let password_hash = hash_password(&valid.password).map_err(internal)?;
    let new_user = NewUser {
        first_name: valid.first_name,
        last_name: valid.last_name,
        email: valid.email,
        password_hash,
        role: valid.role,
    };

    match User::create(&state.db, &new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
            Ok(Redirect::to("/login").into_response())
        }
        Err(CreateUserError::DuplicateEmail) => {
            warn!(email = %new_user.email, "email already registered");
            let err = ValidationError {
                field: "email",
                message: "Email already registered",
            };
            Ok((StatusCode::CONFLICT, Html(views::register_page(Some(&err)))).into_response())
        }
        Err(CreateUserError::Db(e)) => {
            error!(error = %e, "create user failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "registration failed".into()))
        }
    }
}

/// Best-effort: a failed session destroy is logged, the redirect happens
/// regardless.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = session::sign_out(&session).await {
        warn!(error = %e, "session destroy failed");
    }
    Redirect::to("/login")
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
}
