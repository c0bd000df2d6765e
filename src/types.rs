//! Common types for the dashboard
//!
//! Wire payloads exchanged with the backend and the value types shared
//! across modules.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Toast severity, rendered as the `alert-{suffix}` class.
///
/// Unknown names are not rejected: they pass through as a free-form suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
    Other(String),
}

impl Severity {
    /// Parse a severity name; never fails
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "info" => Severity::Info,
            "success" => Severity::Success,
            "warning" => Severity::Warning,
            "danger" => Severity::Danger,
            other => Severity::Other(other.to_string()),
        }
    }

    /// Style suffix appended to `alert-`
    pub fn css_suffix(&self) -> &str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
            Severity::Other(s) => s,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_suffix())
    }
}

/// Identifier of a live toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

impl NotificationId {
    /// DOM id of the rendered banner
    pub fn element_id(self) -> String {
        format!("toast-{}", self.0)
    }
}

/// A transient toast message
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub duration: Duration,
    pub created_at: DateTime<Utc>,
}

/// `/api/toggle_product/{id}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub success: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `/api/post_now/{id}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Aggregate totals attached to an analytics report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryStats {
    pub total_posts: u64,
    pub total_likes: u64,
    pub total_shares: u64,
    pub total_comments: u64,
    pub total_clicks: u64,
    pub total_revenue: f64,
    pub engagement_rate: f64,
}

/// `/api/analytics?days=n` response, one entry per day in `dates`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsReport {
    pub dates: Vec<String>,
    pub posts_data: Vec<u64>,
    pub engagement_data: Vec<u64>,
    pub revenue_data: Vec<f64>,
    pub clicks_data: Vec<u64>,
    /// Engagement per platform (instagram, facebook, twitter, ...)
    pub platform_data: BTreeMap<String, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryStats>,
    /// Fields this client does not know about yet
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Fresh counter value for one `[data-engagement="<key>"]` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementSample {
    pub key: String,
    pub count: u64,
}

/// Publication state of a scheduled post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Scheduled,
    Posted,
    Failed,
}

impl PostStatus {
    /// Badge label and contextual class
    pub fn badge(self) -> (&'static str, &'static str) {
        match self {
            PostStatus::Scheduled => ("Scheduled", "badge bg-warning"),
            PostStatus::Posted => ("Posted", "badge bg-success"),
            PostStatus::Failed => ("Failed", "badge bg-danger"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Scheduled => "scheduled",
            PostStatus::Posted => "posted",
            PostStatus::Failed => "failed",
        }
    }
}

/// Status change for a post rendered as `.badge[data-post-id]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatusUpdate {
    pub post_id: String,
    pub status: PostStatus,
}

/// Health of a backend service shown by `[data-service]` indicators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub service: String,
    pub connected: bool,
}
