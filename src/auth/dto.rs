use serde::Deserialize;

use crate::auth::service::is_valid_email;
use crate::users::UserRole;

/// A registration field the caller got wrong, with a message fit to render
/// next to it.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Body of `POST /register`.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration input that passed validation. The password is still
/// plaintext here; it is hashed on the way into the store.
#[derive(Debug)]
pub struct ValidRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl RegisterForm {
    pub fn validate(self) -> Result<ValidRegistration, ValidationError> {
        let first_name = self.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(ValidationError {
                field: "first_name",
                message: "First name is required",
            });
        }

        let last_name = self.last_name.trim().to_string();
        if last_name.is_empty() {
            return Err(ValidationError {
                field: "last_name",
                message: "Last name is required",
            });
        }

        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ValidationError {
                field: "email",
                message: "Enter a valid email address",
            });
        }

        if self.password.len() < 8 {
            return Err(ValidationError {
                field: "password",
                message: "Password must be at least 8 characters",
            });
        }

        let role = match self.role.as_deref() {
            None | Some("") => UserRole::default(),
            Some(raw) => raw.parse().map_err(|_| ValidationError {
                field: "role",
                message: "Role must be user or admin",
            })?,
        };

        Ok(ValidRegistration {
            first_name,
            last_name,
            email,
            password: self.password,
            role,
        })
    }
}

impl LoginForm {
    /// Same normalization as registration so lookups match what was stored.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}
