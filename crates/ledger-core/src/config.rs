//! Ledger configuration.

use std::str::FromStr;
use std::time::Duration;

use crate::transaction::DEFAULT_STARTING_BALANCE;

/// Default timeout applied to each storage call, in milliseconds.
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 5_000;

/// Ledger configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Balance assumed for a user with no balance record (default: 100).
    pub default_balance: i64,

    /// Upper bound on every storage call (default: 5s).
    pub storage_timeout: Duration,

    /// Path to the `RocksDB` data directory (default: "/data/ledger").
    pub data_dir: String,
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `LEDGER_DEFAULT_BALANCE`, `LEDGER_STORAGE_TIMEOUT_MS` and
    /// `LEDGER_DATA_DIR`. Missing or unparseable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let default_balance = parse_env("LEDGER_DEFAULT_BALANCE")
            .map_or(defaults.default_balance, |value| {
                non_negative_or(value, defaults.default_balance)
            });

        Self {
            default_balance,
            storage_timeout: parse_env("LEDGER_STORAGE_TIMEOUT_MS")
                .map_or(defaults.storage_timeout, Duration::from_millis),
            data_dir: std::env::var("LEDGER_DATA_DIR").unwrap_or(defaults.data_dir),
        }
    }

    /// Set the balance assumed for users with no record.
    ///
    /// Negative values are ignored and the current value is kept.
    #[must_use]
    pub fn with_default_balance(mut self, default_balance: i64) -> Self {
        self.default_balance = non_negative_or(default_balance, self.default_balance);
        self
    }

    /// Set the per-call storage timeout.
    #[must_use]
    pub const fn with_storage_timeout(mut self, storage_timeout: Duration) -> Self {
        self.storage_timeout = storage_timeout;
        self
    }

    /// Set the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<String>) -> Self {
        self.data_dir = data_dir.into();
        self
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_balance: DEFAULT_STARTING_BALANCE,
            storage_timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
            data_dir: "/data/ledger".into(),
        }
    }
}

/// `value` if it is a valid starting balance, otherwise `fallback`.
fn non_negative_or(value: i64, fallback: i64) -> i64 {
    if value < 0 {
        tracing::warn!(
            default_balance = value,
            fallback,
            "Negative default balance ignored"
        );
        fallback
    } else {
        value
    }
}

/// Read and parse an environment variable, logging values that don't parse.
fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = %name, value = %raw, "Ignoring unparseable environment variable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.default_balance, 100);
        assert_eq!(config.storage_timeout, Duration::from_secs(5));
        assert_eq!(config.data_dir, "/data/ledger");
    }

    #[test]
    fn builders_override_fields() {
        let config = LedgerConfig::default()
            .with_default_balance(0)
            .with_storage_timeout(Duration::from_millis(20))
            .with_data_dir("/tmp/ledger");
        assert_eq!(config.default_balance, 0);
        assert_eq!(config.storage_timeout, Duration::from_millis(20));
        assert_eq!(config.data_dir, "/tmp/ledger");
    }

    #[test]
    fn negative_default_balance_is_ignored() {
        let config = LedgerConfig::default().with_default_balance(-50);
        assert_eq!(config.default_balance, 100);

        let config = LedgerConfig::default()
            .with_default_balance(0)
            .with_default_balance(-1);
        assert_eq!(config.default_balance, 0);
    }

    #[test]
    fn parse_env_ignores_missing_variables() {
        assert_eq!(parse_env::<i64>("LEDGER_TEST_VARIABLE_THAT_IS_NEVER_SET"), None);
    }

    // The environment is process-wide, so every case that sets LEDGER_*
    // variables lives in this one test.
    #[test]
    fn from_env_reads_and_sanitizes_variables() {
        const VARS: [&str; 3] = [
            "LEDGER_DEFAULT_BALANCE",
            "LEDGER_STORAGE_TIMEOUT_MS",
            "LEDGER_DATA_DIR",
        ];
        let clear = || VARS.iter().for_each(|var| std::env::remove_var(var));

        clear();
        assert_eq!(LedgerConfig::from_env(), LedgerConfig::default());

        std::env::set_var("LEDGER_DEFAULT_BALANCE", " 0 ");
        std::env::set_var("LEDGER_STORAGE_TIMEOUT_MS", "250");
        std::env::set_var("LEDGER_DATA_DIR", "/var/lib/ledger");
        let config = LedgerConfig::from_env();
        assert_eq!(config.default_balance, 0);
        assert_eq!(config.storage_timeout, Duration::from_millis(250));
        assert_eq!(config.data_dir, "/var/lib/ledger");

        // Negative and unparseable values fall back to defaults
        std::env::set_var("LEDGER_DEFAULT_BALANCE", "-5");
        std::env::set_var("LEDGER_STORAGE_TIMEOUT_MS", "abc");
        let config = LedgerConfig::from_env();
        assert_eq!(config.default_balance, 100);
        assert_eq!(config.storage_timeout, Duration::from_secs(5));
        assert_eq!(config.data_dir, "/var/lib/ledger");

        std::env::set_var("LEDGER_DEFAULT_BALANCE", "lots");
        assert_eq!(LedgerConfig::from_env().default_balance, 100);

        clear();
    }
}
