//! Transaction audit trail: write-once insert, list for API.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::types::instrument::Instrument;
use crate::types::transaction::{TradeSide, Transaction, TransactionStatus};

/// Insert one transaction record. Works on the pool or inside a transaction.
pub async fn insert_transaction<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    t: &Transaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transactions (id, user_id, instrument_id, side, quantity, price, total, status, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(t.id)
    .bind(t.user_id)
    .bind(t.instrument_id)
    .bind(t.side.as_str())
    .bind(t.quantity)
    .bind(t.price)
    .bind(t.total)
    .bind(t.status.as_str())
    .bind(t.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Transaction joined with its instrument, one flat row.
#[derive(Debug, FromRow)]
pub struct TransactionWithInstrumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub instrument_id: Uuid,
    pub side: String,
    pub quantity: i64,
    pub price: f64,
    pub total: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub instrument_updated_at: DateTime<Utc>,
}

impl TransactionWithInstrumentRow {
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

    pub fn transaction(&self) -> Option<Transaction> {
        let side = TradeSide::from_str(&self.side)?;
        let status = TransactionStatus::from_str(&self.status)?;
        Some(Transaction {
            id: self.id,
            user_id: self.user_id,
            instrument_id: self.instrument_id,
            side,
            quantity: self.quantity,
            price: self.price,
            total: self.total,
            status,
            created_at: self.created_at,
        })
    }
}

/// List a user's transactions with instruments resolved, newest first
/// (for GET /api/transactions).
pub async fn list_transactions_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<TransactionWithInstrumentRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionWithInstrumentRow>(
        "SELECT t.id, t.user_id, t.instrument_id, t.side, t.quantity, t.price, t.total, \
                t.status, t.created_at, \
                i.symbol, i.name, i.current_price, i.previous_close, \
                i.updated_at AS instrument_updated_at \
         FROM transactions t \
         JOIN instruments i ON i.id = t.instrument_id \
         WHERE t.user_id = $1 ORDER BY t.created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
