//! Leaderboard: one SQL aggregate over users, positions, and current prices.

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// One leaderboard row: net worth = cash + mark-to-market holdings.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub username: String,
    pub portfolio_value: f64,
}

/// Rank users by total net worth, descending. Users without positions rank by
/// cash alone via the LEFT JOIN + COALESCE.
pub async fn get_leaderboard(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LeaderboardEntry>(
        "SELECT u.id AS user_id, u.username, \
                COALESCE(SUM(p.quantity * i.current_price), 0) + u.wallet_balance \
                    AS portfolio_value \
         FROM users u \
         LEFT JOIN positions p ON p.user_id = u.id \
         LEFT JOIN instruments i ON i.id = p.instrument_id \
         GROUP BY u.id, u.username, u.wallet_balance \
         ORDER BY portfolio_value DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
