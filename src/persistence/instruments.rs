//! Instrument persistence: catalog reads, seeding, and the price update applied
//! by the simulator each tick.

use sqlx::PgPool;
use uuid::Uuid;

use crate::types::instrument::Instrument;

/// List the full catalog, stable order by symbol.
pub async fn list_instruments(pool: &PgPool) -> Result<Vec<Instrument>, sqlx::Error> {
    let rows = sqlx::query_as::<_, Instrument>(
        "SELECT id, symbol, name, current_price, previous_close, updated_at \
         FROM instruments ORDER BY symbol",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Get a single instrument by id.
pub async fn get_instrument(pool: &PgPool, id: Uuid) -> Result<Option<Instrument>, sqlx::Error> {
    let row = sqlx::query_as::<_, Instrument>(
        "SELECT id, symbol, name, current_price, previous_close, updated_at \
         FROM instruments WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Number of instruments in the catalog. Used to decide whether to seed.
pub async fn count_instruments(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM instruments")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Insert a catalog instrument with previous_close = current_price. Returns
/// false when the symbol already exists (a concurrent seeder won the insert).
pub async fn insert_instrument(
    pool: &PgPool,
    id: Uuid,
    symbol: &str,
    name: &str,
    price: f64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO instruments (id, symbol, name, current_price, previous_close) \
         VALUES ($1, $2, $3, $4, $4) \
         ON CONFLICT (symbol) DO NOTHING",
    )
    .bind(id)
    .bind(symbol)
    .bind(name)
    .bind(price)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Apply one simulator step: previous_close takes the old current price and
/// current_price the new one, in a single statement so the pair stays consistent.
pub async fn apply_price(pool: &PgPool, id: Uuid, new_price: f64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE instruments \
         SET previous_close = current_price, current_price = $2, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(new_price)
    .execute(pool)
    .await?;
    Ok(())
}
