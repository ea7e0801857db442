//! Environment-driven configuration.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Seconds between simulator ticks.
    pub sim_tick_secs: u64,
    /// Server-side session lifetime.
    pub session_ttl_hours: i64,
    /// Virtual cash granted on registration.
    pub starting_balance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost:5432/papertrade".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            sim_tick_secs: 60,
            session_ttl_hours: 24,
            starting_balance: 100_000.0,
        }
    }
}

impl Config {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port),
            sim_tick_secs: parse_var("SIM_TICK_SECS", defaults.sim_tick_secs),
            session_ttl_hours: parse_var("SESSION_TTL_HOURS", defaults.session_ttl_hours),
            starting_balance: parse_var("STARTING_BALANCE", defaults.starting_balance),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
