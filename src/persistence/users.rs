//! User persistence: lookup, insert, balance reads.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::types::user::User;

/// Row returned from DB (username is stored lowercase).
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub wallet_balance: f64,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            wallet_balance: self.wallet_balance,
            created_at: self.created_at,
        }
    }
}

/// Get a user by id (for GET /api/user and valuation reads).
pub async fn get_user(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, wallet_balance, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Get a user by username (lowercase). For login and duplicate checks.
pub async fn get_user_by_username(
    pool: &PgPool,
    username_lowercase: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, wallet_balance, created_at \
         FROM users WHERE username = $1",
    )
    .bind(username_lowercase)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Insert a user with the configured starting balance. Username must already be
/// lowercase. Returns the stored row.
pub async fn insert_user(
    pool: &PgPool,
    id: Uuid,
    username: &str,
    password_hash: &str,
    starting_balance: f64,
) -> Result<UserRow, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (id, username, password_hash, wallet_balance) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, username, password_hash, wallet_balance, created_at",
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .bind(starting_balance)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Load and row-lock a user inside the caller's transaction. All ledger
/// mutations for one user serialize behind this lock.
pub async fn lock_user(conn: &mut PgConnection, id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, wallet_balance, created_at \
         FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

/// Set a user's cash balance inside the caller's transaction.
pub async fn set_wallet_balance(
    conn: &mut PgConnection,
    id: Uuid,
    balance: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET wallet_balance = $2 WHERE id = $1")
        .bind(id)
        .bind(balance)
        .execute(conn)
        .await?;
    Ok(())
}
