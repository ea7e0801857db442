//! Database layer: pool, migrations, and access for users, sessions,
//! instruments, price history, positions, and transactions.

mod instruments;
mod leaderboard;
mod pool;
mod positions;
mod price_history;
mod sessions;
mod transactions;
mod users;

pub use instruments::{
    apply_price, count_instruments, get_instrument, insert_instrument, list_instruments,
};
pub use leaderboard::{LeaderboardEntry, get_leaderboard};
pub use pool::{create_pool_and_migrate, run_migrations};
pub use positions::{HoldingRow, delete_position, list_holdings, lock_position, upsert_position};
pub use price_history::{append_price, list_price_history};
pub use sessions::{create_session, delete_session, get_session_user, sweep_expired};
pub use sqlx::PgPool;
pub use transactions::{
    TransactionWithInstrumentRow, insert_transaction, list_transactions_for_user,
};
pub use users::{UserRow, get_user, get_user_by_username, insert_user, lock_user, set_wallet_balance};
