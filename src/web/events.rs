//! Document-level listeners: delegated action clicks, page visibility,
//! connectivity and form validation

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, Window};

use super::dom::DomButton;
use crate::app::Dashboard;
use crate::error::Result;
use crate::feedback::ActionButton;

const ACTION_SELECTOR: &str =
    r#"button[data-action="toggle-product"][data-product-id], button[data-action="post-now"][data-product-id]"#;

fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<()> {
    let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(handler));
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page
    closure.forget();
    Ok(())
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

pub(crate) fn wire(window: &Window, document: &Document, dashboard: &Dashboard) -> Result<()> {
    let dash = dashboard.clone();
    listen(document, "click", move |event| {
        let Some(button) = event_element(&event).and_then(|el| el.closest(ACTION_SELECTOR).ok().flatten()) else {
            return;
        };
        let Some(product_id) = button
            .get_attribute("data-product-id")
            .and_then(|id| id.parse::<u64>().ok())
        else {
            return;
        };
        let action = button.get_attribute("data-action").unwrap_or_default();
        let Ok(button) = button.dyn_into::<HtmlElement>() else {
            return;
        };
        event.prevent_default();

        let button: Rc<dyn ActionButton> = Rc::new(DomButton::new(button));
        match action.as_str() {
            "toggle-product" => dash.handlers().toggle_product(product_id, button),
            "post-now" => dash.handlers().post_now(product_id, button),
            _ => {}
        }
    })?;

    let dash = dashboard.clone();
    let doc = document.clone();
    listen(document, "visibilitychange", move |_| {
        dash.on_visibility_change(!doc.hidden());
    })?;

    let dash = dashboard.clone();
    listen(window, "online", move |_| dash.on_online())?;
    let dash = dashboard.clone();
    listen(window, "offline", move |_| dash.on_offline())?;

    let dash = dashboard.clone();
    let next_form = Cell::new(1_u32);
    listen(document, "submit", move |event| {
        let Some(form) = event_element(&event) else {
            return;
        };
        if !form.has_attribute("data-validate") {
            return;
        }
        if form.id().is_empty() {
            form.set_id(&format!("dashboard-form-{}", next_form.get()));
            next_form.set(next_form.get() + 1);
        }
        if !dash.handlers().check_form(&form.id()) {
            event.prevent_default();
        }
    })?;

    tracing::debug!("page listeners attached");
    Ok(())
}
