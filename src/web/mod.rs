//! Browser entry point
//!
//! `boot()` is called once by the page after the wasm module loads. It wires
//! the DOM, the timers and Chart.js into a [`Dashboard`] and hands JS a
//! handle for the inline `onclick` attributes the templates still use.
//! The pt-BR formatters are exported as free functions.

// wasm-bindgen expansions
#![allow(unsafe_code)]

mod chartjs;
mod console;
mod dom;
mod events;
mod format;
mod timers;

use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, future_to_promise};
use web_sys::{Document, HtmlElement, Window};

use crate::app::{Dashboard, Platform};
use crate::client::HttpTransport;
use crate::config::{Config, ConfigSource};
use crate::error::{DashboardError, Result};
use crate::types::Severity;

use chartjs::ChartJs;
use dom::{DomButton, DomPage, DomToasts};
use timers::{BrowserSpawner, GlooTimers};

const META_PREFIX: &str = "dashboard:";

pub(crate) fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| DashboardError::Dom("no window".into()))
}

pub(crate) fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| DashboardError::Dom("no document".into()))
}

/// Best-effort text for a thrown JS value
pub(crate) fn js_error_message(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return error.message().into();
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// `<meta name="dashboard:KEY" content="...">` tags
struct MetaConfig {
    document: Document,
}

impl ConfigSource for MetaConfig {
    fn var(&self, key: &str) -> Option<String> {
        let selector = format!(r#"meta[name="{META_PREFIX}{key}"]"#);
        self.document
            .query_selector(&selector)
            .ok()
            .flatten()
            .and_then(|meta| meta.get_attribute("content"))
    }
}

/// Start the dashboard on the current page
#[wasm_bindgen]
pub fn boot() -> std::result::Result<DashboardHandle, JsValue> {
    console_error_panic_hook::set_once();

    let window = window()?;
    let document = document()?;

    let mut config = Config::from_source(&MetaConfig {
        document: document.clone(),
    });
    if let Err(err) = crate::logging::init(&config.log_level, console::ConsoleWriter) {
        web_sys::console::warn_1(&err.to_string().into());
    }
    // reqwest needs absolute URLs
    if config.api_base.is_empty() {
        config.api_base = window.location().origin()?;
    }

    let platform = Platform {
        timers: Rc::new(GlooTimers::new(window.clone())),
        spawner: Rc::new(BrowserSpawner),
        page: Rc::new(DomPage::new(window.clone(), document.clone())),
        toasts: Rc::new(DomToasts::new(document.clone())),
        charts: Rc::new(ChartJs::new(document.clone())),
        transport: Rc::new(HttpTransport::new()),
        feed: None,
    };
    let service_worker = config.service_worker.clone();
    let dashboard = Dashboard::new(config, platform)?;

    dashboard.start();
    events::wire(&window, &document, &dashboard)?;
    if let Some(script) = service_worker {
        register_service_worker(&window, script);
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dashboard booted");
    Ok(DashboardHandle { dashboard })
}

fn register_service_worker(window: &Window, script: String) {
    let container = window.navigator().service_worker();
    wasm_bindgen_futures::spawn_local(async move {
        match JsFuture::from(container.register(&script)).await {
            Ok(_) => tracing::info!(script = %script, "service worker registered"),
            Err(err) => tracing::warn!(
                script = %script,
                error = %js_error_message(&err),
                "service worker registration failed"
            ),
        }
    });
}

/// What JS gets back from `boot()`
#[wasm_bindgen]
pub struct DashboardHandle {
    dashboard: Dashboard,
}

#[wasm_bindgen]
impl DashboardHandle {
    #[wasm_bindgen(js_name = toggleProduct)]
    pub fn toggle_product(&self, product_id: u32, button: HtmlElement) {
        self.dashboard
            .handlers()
            .toggle_product(u64::from(product_id), Rc::new(DomButton::new(button)));
    }

    #[wasm_bindgen(js_name = postNow)]
    pub fn post_now(&self, product_id: u32, button: HtmlElement) {
        self.dashboard
            .handlers()
            .post_now(u64::from(product_id), Rc::new(DomButton::new(button)));
    }

    /// Show a toast; returns its id
    pub fn notify(&self, message: String, severity: Option<String>, duration_ms: Option<u32>) -> f64 {
        let severity = severity.as_deref().map_or(Severity::Info, Severity::parse);
        let notifier = self.dashboard.notifier();
        let id = match duration_ms {
            Some(ms) => notifier.notify_for(message, severity, Duration::from_millis(u64::from(ms))),
            None => notifier.notify(message, severity),
        };
        id.0 as f64
    }

    #[wasm_bindgen(js_name = copyToClipboard)]
    pub fn copy_to_clipboard(&self, text: String) {
        self.dashboard.handlers().spawn_copy(text);
    }

    /// Refresh analytics now; the promise rejects with the API error
    pub fn refresh(&self) -> js_sys::Promise {
        let dashboard = self.dashboard.clone();
        future_to_promise(async move {
            dashboard.refresh().await?;
            Ok(JsValue::UNDEFINED)
        })
    }
}
