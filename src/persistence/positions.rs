//! Position persistence: holdings reads plus the row-level operations the trade
//! executor runs inside its transaction.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::types::instrument::Instrument;
use crate::types::position::Position;

/// Position joined with its instrument, one flat row per holding.
#[derive(Debug, sqlx::FromRow)]
pub struct HoldingRow {
    pub user_id: Uuid,
    pub instrument_id: Uuid,
    pub quantity: i64,
    pub average_cost: f64,
    pub position_updated_at: DateTime<Utc>,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub instrument_updated_at: DateTime<Utc>,
}

impl HoldingRow {
    pub fn instrument(&self) -> Instrument {
        Instrument {
            id: self.instrument_id,
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            current_price: self.current_price,
            previous_close: self.previous_close,
            updated_at: self.instrument_updated_at,
        }
    }
}

/// List a user's positions with their instruments resolved (for the portfolio
/// endpoints). The join omits positions whose instrument cannot be resolved.
pub async fn list_holdings(pool: &PgPool, user_id: Uuid) -> Result<Vec<HoldingRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, HoldingRow>(
        "SELECT p.user_id, p.instrument_id, p.quantity, p.average_cost, \
                p.updated_at AS position_updated_at, \
                i.symbol, i.name, i.current_price, i.previous_close, \
                i.updated_at AS instrument_updated_at \
         FROM positions p \
         JOIN instruments i ON i.id = p.instrument_id \
         WHERE p.user_id = $1 \
         ORDER BY i.symbol",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Load and row-lock a position inside the caller's transaction. Concurrent
/// trades against the same (user, instrument) pair queue behind this lock.
pub async fn lock_position(
    conn: &mut PgConnection,
    user_id: Uuid,
    instrument_id: Uuid,
) -> Result<Option<Position>, sqlx::Error> {
    let row = sqlx::query_as::<_, Position>(
        "SELECT user_id, instrument_id, quantity, average_cost, updated_at \
         FROM positions WHERE user_id = $1 AND instrument_id = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(instrument_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

/// Upsert a position (insert or update on conflict).
pub async fn upsert_position(
    conn: &mut PgConnection,
    user_id: Uuid,
    instrument_id: Uuid,
    quantity: i64,
    average_cost: f64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO positions (user_id, instrument_id, quantity, average_cost) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id, instrument_id) \
         DO UPDATE SET quantity = $3, average_cost = $4, updated_at = now()",
    )
    .bind(user_id)
    .bind(instrument_id)
    .bind(quantity)
    .bind(average_cost)
    .execute(conn)
    .await?;
    Ok(())
}

/// Delete a position (quantity reached zero).
pub async fn delete_position(
    conn: &mut PgConnection,
    user_id: Uuid,
    instrument_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM positions WHERE user_id = $1 AND instrument_id = $2")
        .bind(user_id)
        .bind(instrument_id)
        .execute(conn)
        .await?;
    Ok(())
}
