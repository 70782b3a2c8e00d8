use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::signal_service::IndicatorParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Lookback window and bar size requested from the data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchWindow {
    pub range: String,
    pub interval: String,
}

impl Default for FetchWindow {
    fn default() -> Self {
        Self {
            range: "5d".to_string(),
            interval: "15m".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub data_url: String,
    pub fetch_window: FetchWindow,
    pub indicators: IndicatorParams,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_url: "https://query1.finance.yahoo.com".to_string(),
            fetch_window: FetchWindow::default(),
            indicators: IndicatorParams::default(),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Reads `SIGNAL_*` variables from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let rsi_period = parse_var(&lookup, "SIGNAL_RSI_PERIOD", defaults.indicators.rsi_period)?;
        let ema_span = parse_var(&lookup, "SIGNAL_EMA_SPAN", defaults.indicators.ema_span)?;
        require_positive("SIGNAL_RSI_PERIOD", rsi_period)?;
        require_positive("SIGNAL_EMA_SPAN", ema_span)?;

        let timeout_secs = parse_var(
            &lookup,
            "SIGNAL_HTTP_TIMEOUT_SECS",
            defaults.http_timeout.as_secs(),
        )?;

        Ok(Self {
            bind_addr: parse_var(&lookup, "SIGNAL_BIND_ADDR", defaults.bind_addr)?,
            data_url: lookup("SIGNAL_DATA_URL").unwrap_or(defaults.data_url),
            fetch_window: FetchWindow {
                range: lookup("SIGNAL_RANGE").unwrap_or(defaults.fetch_window.range),
                interval: lookup("SIGNAL_INTERVAL").unwrap_or(defaults.fetch_window.interval),
            },
            indicators: IndicatorParams {
                rsi_period,
                ema_span,
            },
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

fn require_positive(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
