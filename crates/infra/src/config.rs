//! Configuration loading and representation.
//!
//! Every knob has a default; `from_env` overrides them from `FORGEPOS_*`
//! variables. Unparseable values are errors rather than silent defaults.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Tunables of the analytics service and reorder monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub forecast_horizon_days: u32,
    pub forecast_history_days: u32,
    pub insight_window_days: u32,
    pub insight_limit: usize,
    pub reorder_lookback_days: u32,
    pub default_lead_time_days: u32,
    /// Treasury balance seeding cash-flow projections.
    pub opening_cash_balance: f64,
    pub cache_ttl_secs: u64,
    pub monitor_interval_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            forecast_horizon_days: 30,
            forecast_history_days: 90,
            insight_window_days: 30,
            insight_limit: 10,
            reorder_lookback_days: 90,
            default_lead_time_days: 7,
            opening_cash_balance: 0.0,
            cache_ttl_secs: 300,
            monitor_interval_secs: 3600,
        }
    }
}

impl AnalyticsConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup (tests, layered sources).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            forecast_horizon_days: parse_var(
                &lookup,
                "FORGEPOS_FORECAST_HORIZON_DAYS",
                defaults.forecast_horizon_days,
            )?,
            forecast_history_days: parse_var(
                &lookup,
                "FORGEPOS_FORECAST_HISTORY_DAYS",
                defaults.forecast_history_days,
            )?,
            insight_window_days: parse_var(
                &lookup,
                "FORGEPOS_INSIGHT_WINDOW_DAYS",
                defaults.insight_window_days,
            )?,
            insight_limit: parse_var(&lookup, "FORGEPOS_INSIGHT_LIMIT", defaults.insight_limit)?,
            reorder_lookback_days: parse_var(
                &lookup,
                "FORGEPOS_REORDER_LOOKBACK_DAYS",
                defaults.reorder_lookback_days,
            )?,
            default_lead_time_days: parse_var(
                &lookup,
                "FORGEPOS_DEFAULT_LEAD_TIME_DAYS",
                defaults.default_lead_time_days,
            )?,
            opening_cash_balance: parse_var(
                &lookup,
                "FORGEPOS_OPENING_CASH",
                defaults.opening_cash_balance,
            )?,
            cache_ttl_secs: parse_var(&lookup, "FORGEPOS_CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            monitor_interval_secs: parse_var(
                &lookup,
                "FORGEPOS_MONITOR_INTERVAL_SECS",
                defaults.monitor_interval_secs,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_lead_time_days == 0 {
            return Err(ConfigError::Zero("default_lead_time_days"));
        }
        if self.insight_window_days == 0 {
            return Err(ConfigError::Zero("insight_window_days"));
        }
        if self.reorder_lookback_days == 0 {
            return Err(ConfigError::Zero("reorder_lookback_days"));
        }
        if self.monitor_interval_secs == 0 {
            return Err(ConfigError::Zero("monitor_interval_secs"));
        }
        if !self.opening_cash_balance.is_finite() {
            return Err(ConfigError::Invalid {
                key: "opening_cash_balance",
                value: self.opening_cash_balance.to_string(),
                reason: "must be finite".to_string(),
            });
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = AnalyticsConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AnalyticsConfig::default());
        assert_eq!(config.default_lead_time_days, 7);
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn variables_override_defaults() {
        let config = AnalyticsConfig::from_lookup(lookup(&[
            ("FORGEPOS_FORECAST_HORIZON_DAYS", "14"),
            ("FORGEPOS_OPENING_CASH", " 2500.50 "),
            ("FORGEPOS_INSIGHT_LIMIT", "3"),
        ]))
        .unwrap();
        assert_eq!(config.forecast_horizon_days, 14);
        assert_eq!(config.opening_cash_balance, 2500.5);
        assert_eq!(config.insight_limit, 3);
    }

    #[test]
    fn unparseable_value_is_an_error() {
        let err = AnalyticsConfig::from_lookup(lookup(&[("FORGEPOS_INSIGHT_LIMIT", "ten")])).unwrap_err();
        match err {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, "FORGEPOS_INSIGHT_LIMIT");
                assert_eq!(value, "ten");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn zero_lead_time_is_rejected() {
        let err = AnalyticsConfig::from_lookup(lookup(&[("FORGEPOS_DEFAULT_LEAD_TIME_DAYS", "0")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Zero("default_lead_time_days"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AnalyticsConfig = serde_json::from_str(r#"{"insight_limit": 5}"#).unwrap();
        assert_eq!(config.insight_limit, 5);
        assert_eq!(config.forecast_history_days, 90);
    }

    proptest! {
        #[test]
        fn any_positive_window_is_accepted(days in 1u32..10_000) {
            let raw = days.to_string();
            let config = AnalyticsConfig::from_lookup(lookup(&[
                ("FORGEPOS_REORDER_LOOKBACK_DAYS", raw.as_str()),
                ("FORGEPOS_INSIGHT_WINDOW_DAYS", raw.as_str()),
            ]))
            .unwrap();
            prop_assert_eq!(config.reorder_lookback_days, days);
            prop_assert_eq!(config.insight_window_days, days);
        }
    }
}
