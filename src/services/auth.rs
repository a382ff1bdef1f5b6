use crate::{
    error::Result,
    models::{
        session::{AUTH_USER_ID_KEY, CURRENT_USER_KEY, FLASH_KEY},
        user::User,
    },
    services::session::Session,
};

/// Marks the session as belonging to `user`.
///
/// The token is rotated first; if that fails nothing is written.
pub async fn log_in(session: &Session, user: &User) -> Result<()> {
    session.renew_token().await?;
    session.put(AUTH_USER_ID_KEY, user.id.to_string()).await;
    session.put(CURRENT_USER_KEY, user.name.clone()).await;
    session.put(FLASH_KEY, format!("Welcome {}", user.name)).await;
    tracing::info!("✅ User logged in: {}", user.id);
    Ok(())
}

/// Drops the authenticated identity from the session after rotating it.
pub async fn log_out(session: &Session) -> Result<()> {
    session.renew_token().await?;
    session.remove(AUTH_USER_ID_KEY).await;
    session.remove(CURRENT_USER_KEY).await;
    session
        .put(FLASH_KEY, "You've been logged out successfully!")
        .await;
    tracing::info!("👋 User logged out");
    Ok(())
}

/// The user id written by [`log_in`], if any.
pub async fn authenticated_user_id(session: &Session) -> Option<i64> {
    session
        .get(AUTH_USER_ID_KEY)
        .await
        .and_then(|id| id.parse().ok())
}
