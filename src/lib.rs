//! papertrade: a simulated stock-trading service.
//!
//! Users register, receive virtual cash, trade simulated instruments at a
//! client-supplied price, and rank on a leaderboard. A background task walks
//! instrument prices on a fixed interval and appends a price history log.

pub mod api;
pub mod config;
pub mod persistence;
pub mod portfolio;
pub mod simulator;
pub mod trading;
pub mod types;
