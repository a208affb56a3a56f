use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::{NewUser, User};

/// Failure modes of [`User::create`].
#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Db(sqlx::Error),
}

impl From<sqlx::Error> for CreateUserError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CreateUserError::DuplicateEmail
            }
            _ => CreateUserError::Db(e),
        }
    }
}

impl User {
    /// Find a user by exact (normalized) email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, role,
                   profile_image, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Find a user by id. Used to restore the session identity per request.
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, role,
                   profile_image, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user. The unique index on email turns concurrent
    /// duplicates into `DuplicateEmail` regardless of any prior check.
    pub async fn create(db: &PgPool, new_user: &NewUser) -> Result<User, CreateUserError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, email, password_hash, role,
                      profile_image, created_at, updated_at
            "#,
        )
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Point the user's profile image at a newly stored object.
    pub async fn set_profile_image(
        db: &PgPool,
        id: Uuid,
        profile_image: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET profile_image = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, first_name, last_name, email, password_hash, role,
                      profile_image, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(profile_image)
        .fetch_one(db)
        .await
    }
}
