//! DOM implementations of the page, button and toast seams

use std::cell::Cell;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlElement, Window};

use super::js_error_message;
use crate::error::{DashboardError, Result};
use crate::feedback::{ActionButton, ToastSurface};
use crate::page::Page;
use crate::types::{Notification, NotificationId, PostStatus};
use crate::utils::{FormField, field_key};

const STAT_CARDS: &str = ".card.bg-primary, .card.bg-success, .card.bg-info, .card.bg-warning";
const HIGHLIGHT_COLOR: &str = "var(--bs-success)";
/// Marks buttons disabled by the loading overlay so only those are re-enabled
const LOADING_MARK: &str = "data-loading-disabled";

/// Every element matching `selector`, in document order
fn select_all(root: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Named controls of a form, keyed the way validation reports them
fn form_controls(form: &Element) -> Vec<(String, Element)> {
    let Ok(nodes) = form.query_selector_all("input, select, textarea") else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .filter_map(|el| Some((field_key(el.get_attribute("name"), &el.id())?, el)))
        .collect()
}

fn set_style(element: &Element, property: &str, value: &str) {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property(property, value);
    }
}

fn digits(text: &str) -> u64 {
    text.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

pub(crate) struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub(crate) fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }
}

impl Page for DomPage {
    fn set_clock(&self, text: &str) {
        if let Some(clock) = self.document.get_element_by_id("current-time") {
            clock.set_text_content(Some(text));
        }
    }

    fn set_loading(&self, busy: bool) {
        for overlay in select_all(&self.document, ".loading-overlay") {
            set_style(&overlay, "display", if busy { "flex" } else { "none" });
        }

        if busy {
            for button in select_all(&self.document, "button:not([data-bs-dismiss]):not(.btn-close):not([disabled])") {
                let _ = button.set_attribute("disabled", "");
                let _ = button.set_attribute(LOADING_MARK, "");
            }
        } else {
            for button in select_all(&self.document, &format!("button[{LOADING_MARK}]")) {
                let _ = button.remove_attribute("disabled");
                let _ = button.remove_attribute(LOADING_MARK);
            }
        }
    }

    fn set_service_status(&self, service: &str, connected: bool) {
        let selector = format!(r#"[data-service="{service}"]"#);
        for indicator in select_all(&self.document, &selector) {
            if connected {
                indicator.set_class_name("status-indicator status-active");
                let _ = indicator.set_attribute("title", &format!("{service} ativo"));
            } else {
                indicator.set_class_name("status-indicator status-error");
                let _ = indicator.set_attribute("title", &format!("{service} com problemas"));
            }
        }
    }

    fn engagement_counters(&self) -> Vec<(String, u64)> {
        select_all(&self.document, "[data-engagement]")
            .into_iter()
            .filter_map(|el| {
                let key = el.get_attribute("data-engagement")?;
                let count = digits(&el.text_content().unwrap_or_default());
                Some((key, count))
            })
            .collect()
    }

    fn set_engagement(&self, key: &str, count: u64, highlight: bool) {
        let selector = format!(r#"[data-engagement="{key}"]"#);
        for el in select_all(&self.document, &selector) {
            el.set_text_content(Some(&count.to_string()));
            if highlight {
                set_style(&el, "color", HIGHLIGHT_COLOR);
            }
        }
    }

    fn clear_engagement_highlight(&self, key: &str) {
        let selector = format!(r#"[data-engagement="{key}"]"#);
        for el in select_all(&self.document, &selector) {
            set_style(&el, "color", "");
        }
    }

    fn scheduled_posts(&self) -> Vec<String> {
        select_all(&self.document, r#".badge[data-status="scheduled"][data-post-id]"#)
            .into_iter()
            .filter_map(|badge| badge.get_attribute("data-post-id"))
            .collect()
    }

    fn set_post_status(&self, post_id: &str, status: PostStatus) {
        let selector = format!(r#".badge[data-post-id="{post_id}"]"#);
        let (label, class) = status.badge();
        for badge in select_all(&self.document, &selector) {
            badge.set_text_content(Some(label));
            badge.set_class_name(class);
            let _ = badge.set_attribute("data-status", status.as_str());
        }
    }

    fn pulse_stat_cards(&self, on: bool) {
        let scale = if on { "scale(1.02)" } else { "scale(1)" };
        for card in select_all(&self.document, STAT_CARDS) {
            set_style(&card, "transform", scale);
        }
    }

    fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }

    fn form_fields(&self, form_id: &str) -> Option<Vec<FormField>> {
        let form = self.document.get_element_by_id(form_id)?;
        let fields = form_controls(&form)
            .into_iter()
            .map(|(name, el)| {
                let value = js_sys::Reflect::get(&el, &JsValue::from_str("value"))
                    .ok()
                    .and_then(|v| v.as_string())
                    .unwrap_or_default();
                FormField {
                    name,
                    value,
                    required: el.has_attribute("required"),
                }
            })
            .collect();
        Some(fields)
    }

    fn mark_invalid(&self, form_id: &str, field: &str, invalid: bool) {
        let Some(form) = self.document.get_element_by_id(form_id) else {
            return;
        };
        // Matched by key, not by selector: names like `tags[]` are not valid CSS
        for (_, control) in form_controls(&form).into_iter().filter(|(name, _)| name == field) {
            let classes = control.class_list();
            let _ = if invalid {
                classes.add_1("is-invalid")
            } else {
                classes.remove_1("is-invalid")
            };
        }
    }

    fn write_clipboard(&self, text: &str) -> LocalBoxFuture<'static, Result<()>> {
        let promise = self.window.navigator().clipboard().write_text(text);
        async move {
            JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|err| DashboardError::Clipboard(js_error_message(&err)))
        }
        .boxed_local()
    }
}

thread_local! {
    static NEXT_BUTTON_KEY: Cell<u32> = const { Cell::new(1) };
}

/// A clicked `<button>` (or any element acting as one)
pub(crate) struct DomButton {
    element: HtmlElement,
}

impl DomButton {
    pub(crate) fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl ActionButton for DomButton {
    fn target_id(&self) -> String {
        let id = self.element.id();
        if !id.is_empty() {
            return id;
        }
        if let Some(key) = self.element.get_attribute("data-action-key") {
            return key;
        }
        let key = NEXT_BUTTON_KEY.with(|next| {
            let n = next.get();
            next.set(n + 1);
            format!("action-{n}")
        });
        let _ = self.element.set_attribute("data-action-key", &key);
        key
    }

    fn label(&self) -> String {
        self.element.inner_html()
    }

    fn set_label(&self, html: &str) {
        self.element.set_inner_html(html);
    }

    fn set_disabled(&self, disabled: bool) {
        let _ = if disabled {
            self.element.set_attribute("disabled", "")
        } else {
            self.element.remove_attribute("disabled")
        };
    }

    fn set_icon(&self, class: &str) {
        if let Ok(Some(icon)) = self.element.query_selector("i") {
            icon.set_class_name(class);
        }
    }

    fn replace_class(&self, from: &str, to: &str) {
        let classes = self.element.class_list();
        if classes.contains(from) {
            let _ = classes.remove_1(from);
            let _ = classes.add_1(to);
        }
    }
}

/// Bootstrap alerts pinned to the top right corner
pub(crate) struct DomToasts {
    document: Document,
}

impl DomToasts {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }

    fn render(&self, toast: &Notification, on_close: Box<dyn FnOnce()>) -> std::result::Result<(), JsValue> {
        let alert = self.document.create_element("div")?;
        alert.set_id(&toast.id.element_id());
        alert.set_class_name(&format!(
            "alert alert-{} alert-dismissible fade show position-fixed",
            toast.severity.css_suffix()
        ));
        alert.set_attribute("role", "alert")?;
        alert.set_attribute(
            "style",
            "top: 20px; right: 20px; z-index: 9999; min-width: 300px;",
        )?;
        alert.append_child(&self.document.create_text_node(&toast.message))?;

        let close = self.document.create_element("button")?;
        close.set_attribute("type", "button")?;
        close.set_class_name("btn-close");
        close.set_attribute("aria-label", "Close")?;
        // Also keeps the loading overlay from disabling it
        close.set_attribute("data-bs-dismiss", "alert")?;
        let mut on_close = Some(on_close);
        let listener = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event: web_sys::Event| {
            if let Some(close) = on_close.take() {
                close();
            }
        }));
        close.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
        listener.forget();
        alert.append_child(&close)?;

        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?;
        body.append_child(&alert)?;
        Ok(())
    }
}

impl ToastSurface for DomToasts {
    fn mount(&self, toast: &Notification, on_close: Box<dyn FnOnce()>) {
        if let Err(err) = self.render(toast, on_close) {
            tracing::warn!(error = %js_error_message(&err), "toast not rendered");
        }
    }

    fn unmount(&self, id: NotificationId) {
        if let Some(alert) = self.document.get_element_by_id(&id.element_id()) {
            alert.remove();
        }
    }
}
