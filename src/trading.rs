//! Trade settlement: validate and atomically settle one order.
//!
//! The arithmetic lives in pure functions so it is testable without a database.
//! `execute_trade` wraps them in a single Postgres transaction: the user row is
//! locked first, so all ledger mutations for one user serialize, and balance +
//! position + transaction record commit as one unit or not at all.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::persistence;
use crate::types::transaction::{TradeSide, Transaction, TransactionStatus};

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("Insufficient wallet balance")]
    InsufficientFunds,
    #[error("Insufficient shares to sell")]
    InsufficientShares,
    #[error("Invalid trade type")]
    InvalidTradeType,
    #[error("User not found")]
    UserNotFound,
    #[error("Stock not found")]
    InstrumentNotFound,
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Result of settling a BUY against current cash and an optional position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuySettlement {
    pub new_cash: f64,
    pub new_quantity: i64,
    pub new_average_cost: f64,
}

/// Weighted-average-cost BUY. `held` is (quantity, average cost) when a
/// position already exists.
pub fn settle_buy(
    cash: f64,
    held: Option<(i64, f64)>,
    quantity: i64,
    price: f64,
) -> Result<BuySettlement, TradeError> {
    let total = quantity as f64 * price;
    if cash < total {
        return Err(TradeError::InsufficientFunds);
    }
    let (old_quantity, old_average) = held.unwrap_or((0, 0.0));
    let new_quantity = old_quantity + quantity;
    let new_average_cost = (old_quantity as f64 * old_average + total) / new_quantity as f64;
    Ok(BuySettlement {
        new_cash: cash - total,
        new_quantity,
        new_average_cost,
    })
}

/// Result of settling a SELL. Average cost never changes on a sell; the
/// position is deleted when `remaining_quantity` is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SellSettlement {
    pub new_cash: f64,
    pub remaining_quantity: i64,
}

pub fn settle_sell(
    cash: f64,
    held: Option<(i64, f64)>,
    quantity: i64,
    price: f64,
) -> Result<SellSettlement, TradeError> {
    let held_quantity = held.map(|(q, _)| q).unwrap_or(0);
    if held_quantity < quantity {
        return Err(TradeError::InsufficientShares);
    }
    let total = quantity as f64 * price;
    Ok(SellSettlement {
        new_cash: cash + total,
        remaining_quantity: held_quantity - quantity,
    })
}

/// Execute one order end to end. On a settlement failure a FAILED transaction
/// row is recorded with the attempted parameters before the error is surfaced.
/// Unknown user/instrument ids fail before settlement and leave no record.
pub async fn execute_trade(
    pool: &PgPool,
    user_id: Uuid,
    instrument_id: Uuid,
    side: TradeSide,
    quantity: i64,
    price: f64,
) -> Result<Transaction, TradeError> {
    persistence::get_user(pool, user_id)
        .await?
        .ok_or(TradeError::UserNotFound)?;
    persistence::get_instrument(pool, instrument_id)
        .await?
        .ok_or(TradeError::InstrumentNotFound)?;

    match settle(pool, user_id, instrument_id, side, quantity, price).await {
        Ok(transaction) => {
            info!(
                user_id = %user_id,
                instrument_id = %instrument_id,
                side = side.as_str(),
                quantity,
                price,
                "trade settled"
            );
            Ok(transaction)
        }
        Err(err) => {
            warn!(
                user_id = %user_id,
                instrument_id = %instrument_id,
                side = side.as_str(),
                quantity,
                price,
                %err,
                "trade failed"
            );
            let failed = build_transaction(
                user_id,
                instrument_id,
                side,
                quantity,
                price,
                TransactionStatus::Failed,
            );
            if let Err(record_err) = persistence::insert_transaction(pool, &failed).await {
                error!(%record_err, "could not record failed transaction");
            }
            Err(err)
        }
    }
}

async fn settle(
    pool: &PgPool,
    user_id: Uuid,
    instrument_id: Uuid,
    side: TradeSide,
    quantity: i64,
    price: f64,
) -> Result<Transaction, TradeError> {
    let mut tx = pool.begin().await?;

    let user = persistence::lock_user(&mut *tx, user_id)
        .await?
        .ok_or(TradeError::UserNotFound)?;
    let position = persistence::lock_position(&mut *tx, user_id, instrument_id).await?;
    let held = position.as_ref().map(|p| (p.quantity, p.average_cost));

    match side {
        TradeSide::Buy => {
            let outcome = settle_buy(user.wallet_balance, held, quantity, price)?;
            persistence::set_wallet_balance(&mut *tx, user_id, outcome.new_cash).await?;
            persistence::upsert_position(
                &mut *tx,
                user_id,
                instrument_id,
                outcome.new_quantity,
                outcome.new_average_cost,
            )
            .await?;
        }
        TradeSide::Sell => {
            let outcome = settle_sell(user.wallet_balance, held, quantity, price)?;
            persistence::set_wallet_balance(&mut *tx, user_id, outcome.new_cash).await?;
            if outcome.remaining_quantity > 0 {
                // held is Some here: settle_sell rejects sells without a position
                let (_, average_cost) = held.unwrap_or((0, 0.0));
                persistence::upsert_position(
                    &mut *tx,
                    user_id,
                    instrument_id,
                    outcome.remaining_quantity,
                    average_cost,
                )
                .await?;
            } else {
                persistence::delete_position(&mut *tx, user_id, instrument_id).await?;
            }
        }
    }

    let transaction = build_transaction(
        user_id,
        instrument_id,
        side,
        quantity,
        price,
        TransactionStatus::Completed,
    );
    persistence::insert_transaction(&mut *tx, &transaction).await?;
    tx.commit().await?;
    Ok(transaction)
}

fn build_transaction(
    user_id: Uuid,
    instrument_id: Uuid,
    side: TradeSide,
    quantity: i64,
    price: f64,
    status: TransactionStatus,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        user_id,
        instrument_id,
        side,
        quantity,
        price,
        total: quantity as f64 * price,
        status,
        created_at: Utc::now(),
    }
}
