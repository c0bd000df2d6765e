//! Chart.js binding (the page loads `Chart` as a global)

use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement};

use super::js_error_message;
use crate::charts::{ChartBackend, ChartConfig, ChartInstance};
use crate::error::{DashboardError, Result};

#[wasm_bindgen]
extern "C" {
    type Chart;

    #[wasm_bindgen(constructor, catch)]
    fn new(canvas: &HtmlCanvasElement, config: &JsValue) -> std::result::Result<Chart, JsValue>;

    #[wasm_bindgen(method)]
    fn update(this: &Chart, mode: &str);

    #[wasm_bindgen(method)]
    fn destroy(this: &Chart);

    #[wasm_bindgen(method, setter)]
    fn set_data(this: &Chart, data: &JsValue);
}

/// Plain objects, not `Map`s, so Chart.js can read them
fn to_js(value: &impl Serialize) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| DashboardError::Dom(format!("chart config: {e}")))
}

struct JsChart {
    chart: Chart,
}

impl ChartInstance for JsChart {
    fn set_data(&mut self, data: &Value) {
        match to_js(data) {
            Ok(data) => self.chart.set_data(&data),
            Err(err) => tracing::warn!(error = %err, "chart data dropped"),
        }
    }

    fn redraw(&mut self, mode: &str) {
        self.chart.update(mode);
    }

    fn destroy(&mut self) {
        self.chart.destroy();
    }
}

pub(crate) struct ChartJs {
    document: Document,
}

impl ChartJs {
    pub(crate) fn new(document: Document) -> Self {
        Self { document }
    }

    fn canvas(&self, canvas_id: &str) -> Option<HtmlCanvasElement> {
        self.document
            .get_element_by_id(canvas_id)?
            .dyn_into::<HtmlCanvasElement>()
            .ok()
    }
}

impl ChartBackend for ChartJs {
    fn canvas_exists(&self, canvas_id: &str) -> bool {
        self.canvas(canvas_id).is_some()
    }

    fn create(&self, canvas_id: &str, config: &ChartConfig) -> Result<Box<dyn ChartInstance>> {
        let canvas = self
            .canvas(canvas_id)
            .ok_or_else(|| DashboardError::Dom(format!("canvas #{canvas_id} not found")))?;
        let chart = Chart::new(&canvas, &to_js(config)?)
            .map_err(|err| DashboardError::Dom(format!("Chart.js: {}", js_error_message(&err))))?;
        Ok(Box::new(JsChart { chart }))
    }
}
