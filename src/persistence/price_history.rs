//! Append-only price history log.

use sqlx::PgPool;
use uuid::Uuid;

use crate::types::instrument::PricePoint;

/// Append one price sample for an instrument.
pub async fn append_price(pool: &PgPool, instrument_id: Uuid, price: f64) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO price_history (instrument_id, price) VALUES ($1, $2)")
        .bind(instrument_id)
        .bind(price)
        .execute(pool)
        .await?;
    Ok(())
}

/// Recent price samples, newest first (for GET /api/stocks/{id}/history).
pub async fn list_price_history(
    pool: &PgPool,
    instrument_id: Uuid,
    limit: i64,
) -> Result<Vec<PricePoint>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PricePoint>(
        "SELECT id, instrument_id, price, recorded_at \
         FROM price_history WHERE instrument_id = $1 ORDER BY recorded_at DESC LIMIT $2",
    )
    .bind(instrument_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
