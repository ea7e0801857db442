//! Periodic random-walk price simulator and instrument catalog seeding.
//!
//! The simulator holds no instrument state of its own: every tick re-reads the
//! catalog and writes back through the persistence layer. One task runs ticks
//! sequentially, so two ticks can never overlap.

use std::time::Duration;

use rand::Rng;
use sqlx::PgPool;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::persistence;

/// Prices never drop below one cent.
pub const PRICE_FLOOR: f64 = 0.01;

/// Per-tick drift is uniform in [-3%, +3%].
pub const MAX_DRIFT: f64 = 0.03;

/// Fixed catalog used when the instrument table is empty on startup.
const SEED_CATALOG: &[(&str, &str, f64)] = &[
    ("RELIANCE", "Reliance Industries Ltd.", 2540.75),
    ("TCS", "Tata Consultancy Services Ltd.", 3421.30),
    ("HDFCBANK", "HDFC Bank Ltd.", 1678.20),
    ("INFY", "Infosys Ltd.", 1452.85),
    ("TATASTEEL", "Tata Steel Ltd.", 126.40),
    ("BHARTIARTL", "Bharti Airtel Ltd.", 875.60),
    ("ITC", "ITC Ltd.", 435.25),
    ("WIPRO", "Wipro Ltd.", 425.50),
    ("SBIN", "State Bank of India", 625.75),
    ("MARUTI", "Maruti Suzuki India Ltd.", 10245.60),
    ("SUNPHARMA", "Sun Pharmaceutical Industries Ltd.", 1120.35),
    ("ICICIBANK", "ICICI Bank Ltd.", 963.45),
    ("AXISBANK", "Axis Bank Ltd.", 1023.70),
    ("KOTAKBANK", "Kotak Mahindra Bank Ltd.", 1745.20),
    ("POWERGRID", "Power Grid Corporation of India Ltd.", 245.80),
    ("ASIANPAINT", "Asian Paints Ltd.", 3145.65),
    ("ADANIPORTS", "Adani Ports and Special Economic Zone Ltd.", 875.40),
    ("TECHM", "Tech Mahindra Ltd.", 1256.90),
    ("TITAN", "Titan Company Ltd.", 3256.75),
    ("HCLTECH", "HCL Technologies Ltd.", 1175.50),
];

/// Round to cents.
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// One random-walk step: apply the drift factor, floor, round to cents.
pub fn drift_price(current: f64, factor: f64) -> f64 {
    round_price((current * (1.0 + factor)).max(PRICE_FLOOR))
}

/// Draw a drift factor in [-MAX_DRIFT, +MAX_DRIFT].
pub fn random_factor<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(-MAX_DRIFT..=MAX_DRIFT)
}

/// Seed the catalog if the instrument table is empty, including one initial
/// history entry per instrument. Returns the number of instruments created.
pub async fn seed_if_empty(pool: &PgPool) -> Result<usize, sqlx::Error> {
    if persistence::count_instruments(pool).await? > 0 {
        return Ok(0);
    }
    info!("no instruments found, seeding catalog");
    let mut seeded = 0;
    for (symbol, name, price) in SEED_CATALOG {
        let id = Uuid::new_v4();
        if persistence::insert_instrument(pool, id, symbol, name, *price).await? {
            persistence::append_price(pool, id, *price).await?;
            seeded += 1;
        }
    }
    Ok(seeded)
}

/// Apply one tick to every instrument. A failing instrument is logged and
/// skipped; the rest of the batch still runs.
pub async fn tick(pool: &PgPool) -> Result<(), sqlx::Error> {
    let instruments = persistence::list_instruments(pool).await?;
    for instrument in instruments {
        let factor = random_factor(&mut rand::thread_rng());
        let new_price = drift_price(instrument.current_price, factor);
        match step_instrument(pool, instrument.id, new_price).await {
            Ok(()) => {
                debug!(symbol = %instrument.symbol, price = new_price, "price updated");
            }
            Err(err) => {
                error!(symbol = %instrument.symbol, %err, "price update failed");
            }
        }
    }
    Ok(())
}

async fn step_instrument(pool: &PgPool, id: Uuid, new_price: f64) -> Result<(), sqlx::Error> {
    persistence::apply_price(pool, id, new_price).await?;
    persistence::append_price(pool, id, new_price).await?;
    Ok(())
}

/// Run the simulator until the process exits. The first tick fires
/// immediately, then once per period; a tick that overruns delays the next
/// one rather than running concurrently with it.
pub async fn run(pool: PgPool, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    info!(period_secs = period.as_secs(), "price simulator started");
    loop {
        interval.tick().await;
        if let Err(err) = tick(&pool).await {
            error!(%err, "price tick failed");
        }
    }
}
