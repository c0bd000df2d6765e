//! pt-BR formatters for page scripts (`formatCurrency`, `formatNumber`,
//! `formatDate`)

use chrono::Local;
use wasm_bindgen::prelude::*;

use crate::utils;

#[wasm_bindgen(js_name = formatCurrency)]
pub fn currency(value: f64) -> String {
    utils::format_currency(value)
}

#[wasm_bindgen(js_name = formatNumber)]
pub fn number(value: f64) -> String {
    utils::format_number(value)
}

/// Throws when the timestamp cannot be parsed
#[wasm_bindgen(js_name = formatDate)]
pub fn date(raw: String) -> Result<String, JsValue> {
    Ok(utils::format_date(&raw, &Local)?)
}
