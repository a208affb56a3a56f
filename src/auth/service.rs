use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::warn;

use crate::auth::password::verify_password;
use crate::users::User;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Why a login attempt failed. `UnknownEmail` and `WrongPassword` are kept
/// apart for logging; clients only ever see [`LoginError::client_message`].
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("no user with that email")]
    UnknownEmail,
    #[error("password mismatch")]
    WrongPassword,
    #[error(transparent)]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    Hasher(anyhow::Error),
}

impl LoginError {
    /// Single message for both credential failures, so responses do not
    /// reveal whether an email is registered.
    pub fn client_message(&self) -> &'static str {
        "Invalid email or password"
    }

    pub fn is_credential_failure(&self) -> bool {
        matches!(self, LoginError::UnknownEmail | LoginError::WrongPassword)
    }
}

/// Look up a user by email and check the password. Returns the full user
/// record on success.
pub async fn authenticate(db: &PgPool, email: &str, password: &str) -> Result<User, LoginError> {
    let Some(user) = User::find_by_email(db, email).await? else {
        // Burn a hash so an unknown email costs the same as a bad password.
        let _ = crate::auth::password::hash_password(password);
        warn!(%email, "login unknown email");
        return Err(LoginError::UnknownEmail);
    };

    let ok = verify_password(password, &user.password_hash).map_err(LoginError::Hasher)?;
    if !ok {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(LoginError::WrongPassword);
    }

    Ok(user)
}
