//! Configuration management for the dashboard
//!
//! Values come from a [`ConfigSource`]. In the browser that is the set of
//! `<meta name="dashboard:KEY" content="...">` tags rendered by the server;
//! every key falls back to its default when missing or unparseable.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{DashboardError, Result};

/// Where configuration values are read from
pub trait ConfigSource {
    fn var(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment (production, staging, development)
    pub environment: String,

    /// Log filter directive (`info`, `affiliate_dashboard=debug`, ...)
    pub log_level: String,

    /// Base URL prepended to every API path; empty means same origin
    pub api_base: String,

    /// Periodic tasks
    pub clock_interval: Duration,
    pub refresh_interval: Duration,
    pub engagement_interval: Duration,
    pub post_status_interval: Duration,
    pub connection_check_delay: Duration,

    /// Toast lifetime when the caller gives none
    pub notification_duration: Duration,

    /// Debounce windows, one per action type
    pub toggle_debounce: Duration,
    pub post_debounce: Duration,

    /// Days requested from `/api/analytics` on refresh
    pub analytics_days: u32,

    /// Optional feed endpoints (skipped when unset)
    pub engagement_endpoint: Option<String>,
    pub post_status_endpoint: Option<String>,
    pub health_endpoint: Option<String>,

    /// Service worker script; `None` disables registration
    pub service_worker: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            log_level: "info".to_string(),
            api_base: String::new(),
            clock_interval: Duration::from_millis(1_000),
            refresh_interval: Duration::from_millis(300_000),
            engagement_interval: Duration::from_millis(30_000),
            post_status_interval: Duration::from_millis(60_000),
            connection_check_delay: Duration::from_millis(1_000),
            notification_duration: Duration::from_millis(4_000),
            toggle_debounce: Duration::from_millis(300),
            post_debounce: Duration::from_millis(500),
            analytics_days: 7,
            engagement_endpoint: None,
            post_status_endpoint: None,
            health_endpoint: None,
            service_worker: Some("/static/js/sw.js".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from any key/value source
    pub fn from_source(source: &impl ConfigSource) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, fallback: Duration| {
            source
                .var(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map_or(fallback, Duration::from_millis)
        };
        let endpoint = |key: &str| {
            source
                .var(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            environment: source.var("ENVIRONMENT").unwrap_or(defaults.environment),
            log_level: source.var("LOG_LEVEL").unwrap_or(defaults.log_level),
            api_base: source
                .var("API_BASE")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            clock_interval: millis("CLOCK_INTERVAL_MS", defaults.clock_interval),
            refresh_interval: millis("REFRESH_INTERVAL_MS", defaults.refresh_interval),
            engagement_interval: millis("ENGAGEMENT_INTERVAL_MS", defaults.engagement_interval),
            post_status_interval: millis("POST_STATUS_INTERVAL_MS", defaults.post_status_interval),
            connection_check_delay: millis(
                "CONNECTION_CHECK_DELAY_MS",
                defaults.connection_check_delay,
            ),
            notification_duration: millis(
                "NOTIFICATION_DURATION_MS",
                defaults.notification_duration,
            ),
            toggle_debounce: millis("TOGGLE_DEBOUNCE_MS", defaults.toggle_debounce),
            post_debounce: millis("POST_DEBOUNCE_MS", defaults.post_debounce),
            analytics_days: source
                .var("ANALYTICS_DAYS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.analytics_days),
            engagement_endpoint: endpoint("ENGAGEMENT_ENDPOINT"),
            post_status_endpoint: endpoint("POST_STATUS_ENDPOINT"),
            health_endpoint: endpoint("HEALTH_ENDPOINT"),
            // Present-but-empty switches registration off
            service_worker: match source.var("SERVICE_WORKER") {
                Some(v) if v.trim().is_empty() => None,
                Some(v) => Some(v.trim().to_string()),
                None => defaults.service_worker,
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let periodic = [
            ("CLOCK_INTERVAL_MS", self.clock_interval),
            ("REFRESH_INTERVAL_MS", self.refresh_interval),
            ("ENGAGEMENT_INTERVAL_MS", self.engagement_interval),
            ("POST_STATUS_INTERVAL_MS", self.post_status_interval),
        ];
        for (key, interval) in periodic {
            if interval.is_zero() {
                return Err(DashboardError::Config(format!("{key} must be positive")));
            }
        }
        if self.notification_duration.is_zero() {
            return Err(DashboardError::Config(
                "NOTIFICATION_DURATION_MS must be positive".into(),
            ));
        }
        if self.analytics_days == 0 {
            return Err(DashboardError::Config("ANALYTICS_DAYS must be at least 1".into()));
        }
        for endpoint in [
            &self.engagement_endpoint,
            &self.post_status_endpoint,
            &self.health_endpoint,
        ]
        .into_iter()
        .flatten()
        {
            if !endpoint.starts_with('/') {
                return Err(DashboardError::Config(format!(
                    "feed endpoint {endpoint} must be an absolute path"
                )));
            }
        }
        Ok(())
    }
}
