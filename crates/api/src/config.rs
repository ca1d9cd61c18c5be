use scope3_core::claim::{DEFAULT_CLAIM_VALIDITY_DAYS, DEFAULT_EXPIRY_WARNING_DAYS};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Ledger-specific knobs (claim validity, sweep intervals).
    pub ledger: LedgerConfig,
}

/// Ledger tuning knobs.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Claim validity period in days (default: `730`, i.e. 2 years).
    pub claim_validity_days: i64,
    /// Expiry warning horizon in days (default: `30`).
    pub expiry_warning_days: i64,
    /// Interval between expire-pass runs, in seconds (default: daily).
    pub expire_sweep_interval_secs: u64,
    /// Interval between warn-pass runs, in seconds (default: daily).
    pub warn_sweep_interval_secs: u64,
    /// Interval between statement-render retry runs, in seconds (default: `300`).
    pub statement_retry_interval_secs: u64,
}

/// One day, in seconds.
const DAILY_SECS: u64 = 86_400;

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default   |
    /// |--------------------------------|-----------|
    /// | `HOST`                         | `0.0.0.0` |
    /// | `PORT`                         | `3000`    |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`      |
    /// | `CLAIM_VALIDITY_DAYS`          | `730`     |
    /// | `EXPIRY_WARNING_DAYS`          | `30`      |
    /// | `EXPIRE_SWEEP_INTERVAL_SECS`   | `86400`   |
    /// | `WARN_SWEEP_INTERVAL_SECS`     | `86400`   |
    /// | `STATEMENT_RETRY_INTERVAL_SECS`| `300`     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            ledger: LedgerConfig::from_env(),
        }
    }
}

impl LedgerConfig {
    /// Load ledger knobs from environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            claim_validity_days: env_i64("CLAIM_VALIDITY_DAYS", DEFAULT_CLAIM_VALIDITY_DAYS),
            expiry_warning_days: env_i64("EXPIRY_WARNING_DAYS", DEFAULT_EXPIRY_WARNING_DAYS),
            expire_sweep_interval_secs: env_u64("EXPIRE_SWEEP_INTERVAL_SECS", DAILY_SECS),
            warn_sweep_interval_secs: env_u64("WARN_SWEEP_INTERVAL_SECS", DAILY_SECS),
            statement_retry_interval_secs: env_u64("STATEMENT_RETRY_INTERVAL_SECS", 300),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            claim_validity_days: DEFAULT_CLAIM_VALIDITY_DAYS,
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
            expire_sweep_interval_secs: DAILY_SECS,
            warn_sweep_interval_secs: DAILY_SECS,
            statement_retry_interval_secs: 300,
        }
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
