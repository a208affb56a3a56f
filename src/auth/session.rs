use tower_sessions::Session;
use uuid::Uuid;

/// Key the authenticated user's id is stored under.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Key for the one-shot message shown on the next login page render.
const FLASH_KEY: &str = "flash";

/// Establish the session identity. The session id is rotated first so a
/// pre-login cookie can never be replayed as an authenticated one.
pub async fn sign_in(session: &Session, user_id: Uuid) -> anyhow::Result<()> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id).await?;
    Ok(())
}

/// Destroy the session record and clear the cookie.
pub async fn sign_out(session: &Session) -> anyhow::Result<()> {
    session.flush().await?;
    Ok(())
}

/// Read the user id back out of the session, if any.
pub async fn user_id(session: &Session) -> anyhow::Result<Option<Uuid>> {
    Ok(session.get::<Uuid>(SESSION_USER_ID_KEY).await?)
}

/// Drop a stale identity without touching the rest of the session.
pub async fn clear_user_id(session: &Session) -> anyhow::Result<()> {
    session.remove::<Uuid>(SESSION_USER_ID_KEY).await?;
    Ok(())
}

pub async fn set_flash(session: &Session, message: &str) -> anyhow::Result<()> {
    session.insert(FLASH_KEY, message.to_string()).await?;
    Ok(())
}

/// Take the flash message, removing it so it renders exactly once.
pub async fn take_flash(session: &Session) -> anyhow::Result<Option<String>> {
    Ok(session.remove::<String>(FLASH_KEY).await?)
}
