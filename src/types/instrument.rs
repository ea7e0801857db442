use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A tradable simulated stock. Invariant: prices stay positive.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: Uuid,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub previous_close: f64,
    pub updated_at: DateTime<Utc>,
}

/// One append-only price sample.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub id: i64,
    pub instrument_id: Uuid,
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}
