//! Server-side session persistence. The cookie carries only the session id;
//! everything else lives in this table.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Create a session for a user, valid for `ttl_hours`. Returns the session id.
pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    ttl_hours: i64,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    let expires_at: DateTime<Utc> = Utc::now() + Duration::hours(ttl_hours);
    sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;
    Ok(id)
}

/// Resolve a session id to its user id. Expired sessions resolve to None.
pub async fn get_session_user(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Option<Uuid>, sqlx::Error> {
    let row: Option<(Uuid,)> =
        sqlx::query_as("SELECT user_id FROM sessions WHERE id = $1 AND expires_at > now()")
            .bind(session_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(user_id,)| user_id))
}

/// Delete a session (logout). Deleting an unknown id is not an error.
pub async fn delete_session(pool: &PgPool, session_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Drop expired sessions. Called opportunistically on login.
pub async fn sweep_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
