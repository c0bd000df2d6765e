//! Affiliate Dashboard - browser controller for the affiliate admin panel
//!
//! Runs in the page as WebAssembly and drives the interactive parts of the
//! server-rendered dashboard.
//!
//! # Architecture
//! - `app` owns the periodic tasks, the chart registry and the start flag
//! - `handlers` turns button clicks and form submits into API calls
//! - `client` talks JSON to the panel backend and reports failures as toasts
//! - `feedback` renders toasts, the loading overlay and busy buttons
//! - `web` (wasm32 only) binds all of the above to the DOM, timers and Chart.js
//!
//! Everything outside `web` is written against small traits (`Page`,
//! `Timers`, `Transport`, ...) so it runs and is tested natively.
//!
//! # Features
//! - Debounced product toggle and "post now" actions
//! - Toast notifications with per-toast expiry
//! - Analytics charts refreshed every five minutes and on tab return
//! - Engagement, post status and service health polling

// Clippy configuration for UI code patterns
#![allow(clippy::cast_precision_loss)] // Float casts OK for display
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::doc_markdown)] // Doc style flexibility
#![allow(clippy::needless_pass_by_value)] // wasm-bindgen takes arguments by value
#![allow(clippy::if_not_else)] // Readability preference
#![allow(clippy::map_unwrap_or)] // Explicit error handling preference

mod app;
mod charts;
mod client;
mod config;
mod error;
mod feed;
mod feedback;
mod handlers;
mod logging;
mod page;
mod timing;
mod types;
mod utils;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
mod web;

pub use app::{Dashboard, Platform};
pub use charts::{ChartBackend, ChartConfig, ChartInstance, ChartRegistry};
pub use client::{ApiClient, ApiRequest, HttpTransport, Method, RawResponse, RequestOptions, Transport};
pub use config::{Config, ConfigSource};
pub use error::{DashboardError, Result};
pub use feed::{DataFeed, HttpFeed};
pub use feedback::{
    ActionButton, ActionTracker, AsyncActionState, LoadingIndicator, Notifier, ToastSurface,
};
pub use handlers::Handlers;
pub use logging::init as init_logging;
pub use page::Page;
pub use timing::{Debounced, Spawner, Throttled, TimerId, Timers};
pub use types::*;
pub use utils::{FormField, format_clock, format_currency, format_date, format_number, missing_required};

#[cfg(target_arch = "wasm32")]
pub use web::{DashboardHandle, boot};
