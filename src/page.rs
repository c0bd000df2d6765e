//! The slice of the host document the controller touches
//!
//! Every method is a best-effort DOM write: when the expected elements are
//! missing the call does nothing. Absent markup is a normal page variant,
//! not an error.

use futures::future::LocalBoxFuture;

use crate::error::Result;
use crate::types::PostStatus;
use crate::utils::FormField;

pub trait Page {
    /// `#current-time`
    fn set_clock(&self, text: &str);

    /// `.loading-overlay` visibility; while busy every button that is not a
    /// dismiss control is disabled
    fn set_loading(&self, busy: bool);

    /// `[data-service="<service>"]` indicators
    fn set_service_status(&self, service: &str, connected: bool);

    /// `[data-engagement]` counters: key and current displayed value
    fn engagement_counters(&self) -> Vec<(String, u64)>;
    fn set_engagement(&self, key: &str, count: u64, highlight: bool);
    fn clear_engagement_highlight(&self, key: &str);

    /// Post ids of `.badge[data-status="scheduled"]`
    fn scheduled_posts(&self) -> Vec<String>;
    fn set_post_status(&self, post_id: &str, status: PostStatus);

    /// Stat card pulse shown after a refresh
    fn pulse_stat_cards(&self, on: bool);

    /// Blocking yes/no prompt
    fn confirm(&self, message: &str) -> bool;

    /// Required-field state of a form; `None` when the form does not exist
    fn form_fields(&self, form_id: &str) -> Option<Vec<FormField>>;
    fn mark_invalid(&self, form_id: &str, field: &str, invalid: bool);

    fn write_clipboard(&self, text: &str) -> LocalBoxFuture<'static, Result<()>>;
}
