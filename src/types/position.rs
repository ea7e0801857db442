use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Holding per (user, instrument). Exists only while quantity > 0; closing a
/// position deletes the row.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub user_id: Uuid,
    pub instrument_id: Uuid,
    pub quantity: i64,
    pub average_cost: f64,
    pub updated_at: DateTime<Utc>,
}
