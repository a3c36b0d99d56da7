//! Process configuration loaded via OrthoConfig.
//!
//! Values layer CLI flags over `LOYALTY_*` environment variables over an
//! optional config file. Every field is optional at load time; the accessors
//! apply defaults and reject unusable values.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::AccrualPollerConfig;

const DEFAULT_RUN_ADDRESS: &str = "localhost:8080";
const DEFAULT_ACCRUAL_ADDRESS: &str = "http://localhost:8081";
const DEFAULT_ACCRUAL_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RATE_LIMIT_FALLBACK_SECS: u64 = 60;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors raised when a configured value cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("database URI is required (set LOYALTY_DATABASE_URI)")]
    MissingDatabaseUri,
    #[error("accrual system address {value} is not a valid URL: {message}")]
    InvalidAccrualAddress { value: String, message: String },
    #[error("{field} must be at least {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: u64,
        value: u64,
    },
}

/// Loyalty backend settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LOYALTY")]
pub struct LoyaltySettings {
    /// Address the HTTP server binds to.
    pub run_address: Option<String>,
    /// PostgreSQL connection URI.
    pub database_uri: Option<String>,
    /// Base URL of the accrual authority.
    pub accrual_system_address: Option<String>,
    /// Shared deadline for one reconciliation pass, in seconds.
    pub accrual_timeout_secs: Option<u64>,
    /// Upper bound on concurrent accrual lookups.
    pub max_concurrent_lookups: Option<usize>,
    /// Throttle used when a rate-limit response has no usable `Retry-After`.
    pub rate_limit_fallback_secs: Option<u64>,
    /// Log filter applied when `RUST_LOG` is unset.
    pub log_level: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<PathBuf>,
    /// Drop the `Secure` flag from session cookies (local HTTP only).
    #[ortho_config(default = false)]
    pub insecure_cookies: bool,
}

impl LoyaltySettings {
    pub fn run_address(&self) -> &str {
        self.run_address.as_deref().unwrap_or(DEFAULT_RUN_ADDRESS)
    }

    pub fn database_uri(&self) -> Result<&str, SettingsError> {
        self.database_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .ok_or(SettingsError::MissingDatabaseUri)
    }

    pub fn accrual_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .accrual_system_address
            .as_deref()
            .unwrap_or(DEFAULT_ACCRUAL_ADDRESS);
        Url::parse(raw).map_err(|err| SettingsError::InvalidAccrualAddress {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn accrual_timeout(&self) -> Result<Duration, SettingsError> {
        let secs = self
            .accrual_timeout_secs
            .unwrap_or(DEFAULT_ACCRUAL_TIMEOUT_SECS);
        if secs < 1 {
            return Err(SettingsError::TooSmall {
                field: "accrual_timeout_secs",
                min: 1,
                value: secs,
            });
        }
        Ok(Duration::from_secs(secs))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Poller configuration derived from the accrual settings.
    pub fn poller_config(&self) -> Result<AccrualPollerConfig, SettingsError> {
        let defaults = AccrualPollerConfig::default();
        let max_concurrent_lookups = self
            .max_concurrent_lookups
            .unwrap_or(defaults.max_concurrent_lookups);
        if max_concurrent_lookups == 0 {
            return Err(SettingsError::TooSmall {
                field: "max_concurrent_lookups",
                min: 1,
                value: 0,
            });
        }
        Ok(AccrualPollerConfig {
            lookup_timeout: self.accrual_timeout()?,
            max_concurrent_lookups,
            rate_limit_fallback: Duration::from_secs(
                self.rate_limit_fallback_secs
                    .unwrap_or(DEFAULT_RATE_LIMIT_FALLBACK_SECS),
            ),
            ..defaults
        })
    }
}
