//! Engine configuration (window length, capacity), loaded from the environment.

use tracing::warn;

use billable_core::{DomainError, DomainResult};

use crate::time_tracking::DEFAULT_WEEKLY_CAPACITY_HOURS;
use crate::window::MonthWindow;

pub const ENV_WINDOW_MONTHS: &str = "BILLABLE_WINDOW_MONTHS";
pub const ENV_WEEKLY_CAPACITY_HOURS: &str = "BILLABLE_WEEKLY_CAPACITY_HOURS";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// Trailing window length for bucketed series.
    pub window_months: u32,
    /// Capacity per week used for utilization.
    pub weekly_capacity_hours: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_months: MonthWindow::DEFAULT_MONTHS,
            weekly_capacity_hours: DEFAULT_WEEKLY_CAPACITY_HOURS,
        }
    }
}

impl AnalyticsConfig {
    /// Read overrides from process environment variables.
    ///
    /// Unparseable values fall back to defaults with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let window_months = match lookup(ENV_WINDOW_MONTHS) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "{ENV_WINDOW_MONTHS} is not a month count; using default");
                defaults.window_months
            }),
            None => defaults.window_months,
        };

        let weekly_capacity_hours = match lookup(ENV_WEEKLY_CAPACITY_HOURS) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "{ENV_WEEKLY_CAPACITY_HOURS} is not a number; using default");
                defaults.weekly_capacity_hours
            }),
            None => defaults.weekly_capacity_hours,
        };

        Self {
            window_months,
            weekly_capacity_hours,
        }
    }

    pub fn with_window_months(mut self, months: u32) -> Self {
        self.window_months = months;
        self
    }

    pub fn with_weekly_capacity_hours(mut self, hours: f64) -> Self {
        self.weekly_capacity_hours = hours;
        self
    }

    /// Capacity must be positive so utilization never divides by zero.
    pub fn validate(&self) -> DomainResult<()> {
        if self.window_months == 0 {
            return Err(DomainError::validation("window_months must be at least 1"));
        }
        if !(self.weekly_capacity_hours.is_finite() && self.weekly_capacity_hours > 0.0) {
            return Err(DomainError::validation(
                "weekly_capacity_hours must be a finite positive number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = AnalyticsConfig::from_lookup(lookup_from(&[]));
        assert_eq!(cfg, AnalyticsConfig::default());
        assert_eq!(cfg.window_months, 6);
        assert_eq!(cfg.weekly_capacity_hours, 40.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = AnalyticsConfig::from_lookup(lookup_from(&[
            (ENV_WINDOW_MONTHS, " 12 "),
            (ENV_WEEKLY_CAPACITY_HOURS, "32.5"),
        ]));
        assert_eq!(cfg.window_months, 12);
        assert_eq!(cfg.weekly_capacity_hours, 32.5);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let cfg = AnalyticsConfig::from_lookup(lookup_from(&[
            (ENV_WINDOW_MONTHS, "six"),
            (ENV_WEEKLY_CAPACITY_HOURS, ""),
        ]));
        assert_eq!(cfg, AnalyticsConfig::default());
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        assert!(AnalyticsConfig::default().with_window_months(0).validate().is_err());
        assert!(AnalyticsConfig::default().with_weekly_capacity_hours(0.0).validate().is_err());
        assert!(
            AnalyticsConfig::default()
                .with_weekly_capacity_hours(f64::NAN)
                .validate()
                .is_err()
        );
    }
}
