//! Portfolio valuation: pure projections over holdings, current prices, and
//! cash. No storage access here; handlers feed in rows and serialize the
//! results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::types::instrument::Instrument;

/// One enriched holding as served by GET /api/portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub stock: Instrument,
    pub quantity: i64,
    pub average_cost: f64,
    pub updated_at: DateTime<Utc>,
    pub current_value: f64,
    pub profit_loss: f64,
    pub profit_loss_percentage: f64,
}

impl Holding {
    /// Mark a position to market. Percentage is 0 when the average cost is 0,
    /// never a division by zero.
    pub fn from_parts(
        stock: Instrument,
        quantity: i64,
        average_cost: f64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let current_value = quantity as f64 * stock.current_price;
        let profit_loss = (stock.current_price - average_cost) * quantity as f64;
        let profit_loss_percentage = if average_cost > 0.0 {
            (stock.current_price - average_cost) / average_cost * 100.0
        } else {
            0.0
        };
        Holding {
            stock,
            quantity,
            average_cost,
            updated_at,
            current_value,
            profit_loss,
            profit_loss_percentage,
        }
    }
}

/// One slice of the allocation breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlice {
    pub stock_id: Uuid,
    pub symbol: String,
    pub name: String,
    pub value: f64,
    pub percentage: f64,
}

/// Aggregate snapshot served by GET /api/portfolio/summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_invested_value: f64,
    pub total_current_value: f64,
    pub total_value: f64,
    pub wallet_balance: f64,
    pub profit_loss: f64,
    pub profit_loss_percentage: f64,
    pub asset_allocation: Vec<AllocationSlice>,
}

/// Aggregate a set of holdings plus cash into the summary snapshot.
/// total_value = total_current_value + wallet_balance always holds; both
/// percentage denominators are guarded against zero.
pub fn summarize(holdings: &[Holding], wallet_balance: f64) -> PortfolioSummary {
    let total_invested_value: f64 = holdings
        .iter()
        .map(|h| h.average_cost * h.quantity as f64)
        .sum();
    let total_current_value: f64 = holdings.iter().map(|h| h.current_value).sum();
    let total_value = total_current_value + wallet_balance;

    let profit_loss = total_current_value - total_invested_value;
    let profit_loss_percentage = if total_invested_value > 0.0 {
        profit_loss / total_invested_value * 100.0
    } else {
        0.0
    };

    let asset_allocation = holdings
        .iter()
        .map(|h| AllocationSlice {
            stock_id: h.stock.id,
            symbol: h.stock.symbol.clone(),
            name: h.stock.name.clone(),
            value: h.current_value,
            percentage: if total_current_value > 0.0 {
                h.current_value / total_current_value * 100.0
            } else {
                0.0
            },
        })
        .collect();

    PortfolioSummary {
        total_invested_value,
        total_current_value,
        total_value,
        wallet_balance,
        profit_loss,
        profit_loss_percentage,
        asset_allocation,
    }
}
