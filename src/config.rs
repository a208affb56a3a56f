use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Signs the session cookie; must be at least 64 bytes.
    pub secret: String,
    /// Send the cookie only over HTTPS. Off by default for local runs.
    pub cookie_secure: bool,
    /// Sessions expire after this many days of inactivity.
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory profile images are written to and served from.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub session: SessionConfig,
    pub upload: UploadConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;

        let secret = std::env::var("SESSION_SECRET")?;
        anyhow::ensure!(
            secret.len() >= 64,
            "SESSION_SECRET must be at least 64 bytes"
        );
        let session = SessionConfig {
            secret,
            cookie_secure: std::env::var("SESSION_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            ttl_days: std::env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };

        let upload = UploadConfig {
            dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".into())
                .into(),
        };

        Ok(Self {
            database_url,
            session,
            upload,
        })
    }
}
