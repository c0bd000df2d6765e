//! Chart registry
//!
//! At most one live chart per canvas: recreating a chart destroys the old
//! instance before the new one is registered. The backend draws the charts
//! (Chart.js in the browser); this module only owns their lifecycle and the
//! configuration handed over.

use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::types::AnalyticsReport;

/// Redraw mode used for live updates
pub const UPDATE_MODE: &str = "active";

/// Canvases rendered from the analytics payload
pub const POSTS_CHART: &str = "postsChart";
pub const ENGAGEMENT_CHART: &str = "engagementChart";
pub const REVENUE_CHART: &str = "revenueChart";
pub const CLICKS_CHART: &str = "clicksChart";
pub const PLATFORM_CHART: &str = "platformChart";

/// What the backend receives, Chart.js-shaped
#[derive(Debug, Clone, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
    pub options: Value,
}

/// A drawn chart
pub trait ChartInstance {
    fn set_data(&mut self, data: &Value);
    fn redraw(&mut self, mode: &str);
    fn destroy(&mut self);
}

/// Creates charts on canvases
pub trait ChartBackend {
    fn canvas_exists(&self, canvas_id: &str) -> bool;
    fn create(&self, canvas_id: &str, config: &ChartConfig) -> Result<Box<dyn ChartInstance>>;
}

/// Registry entry
pub struct ChartHandle {
    pub canvas_id: String,
    instance: Box<dyn ChartInstance>,
}

/// Options every chart starts from
pub fn default_options() -> Value {
    json!({
        "responsive": true,
        "maintainAspectRatio": false,
        "plugins": {
            "legend": {
                "display": true,
                "position": "bottom"
            }
        },
        "scales": {
            "y": {
                "beginAtZero": true
            }
        }
    })
}

/// Caller keys replace default keys wholesale (top level only)
fn merge_options(options: &Value) -> Value {
    let mut merged = default_options();
    if let (Some(base), Some(extra)) = (merged.as_object_mut(), options.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    merged
}

pub struct ChartRegistry {
    backend: Rc<dyn ChartBackend>,
    charts: HashMap<String, ChartHandle>,
}

impl ChartRegistry {
    pub fn new(backend: Rc<dyn ChartBackend>) -> Self {
        Self {
            backend,
            charts: HashMap::new(),
        }
    }

    /// Create (or recreate) the chart on `canvas_id`.
    ///
    /// Returns `Ok(false)` without touching the registry when the canvas is
    /// not in the page.
    pub fn create_chart(
        &mut self,
        canvas_id: &str,
        kind: &str,
        data: Value,
        options: &Value,
    ) -> Result<bool> {
        if !self.backend.canvas_exists(canvas_id) {
            tracing::debug!(canvas_id, "canvas missing, chart skipped");
            return Ok(false);
        }

        if let Some(mut old) = self.charts.remove(canvas_id) {
            old.instance.destroy();
        }

        let config = ChartConfig {
            kind: kind.to_string(),
            data,
            options: merge_options(options),
        };
        let instance = self.backend.create(canvas_id, &config)?;
        self.charts.insert(
            canvas_id.to_string(),
            ChartHandle {
                canvas_id: canvas_id.to_string(),
                instance,
            },
        );
        Ok(true)
    }

    /// Swap in new data and animate; false when nothing is registered
    pub fn update_chart(&mut self, canvas_id: &str, data: &Value) -> bool {
        match self.charts.get_mut(canvas_id) {
            Some(handle) => {
                handle.instance.set_data(data);
                handle.instance.redraw(UPDATE_MODE);
                true
            }
            None => false,
        }
    }

    /// Release the chart; false when nothing was registered
    pub fn destroy_chart(&mut self, canvas_id: &str) -> bool {
        match self.charts.remove(canvas_id) {
            Some(mut handle) => {
                handle.instance.destroy();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, canvas_id: &str) -> bool {
        self.charts.contains_key(canvas_id)
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Draw the analytics report on the dashboard canvases.
    ///
    /// Registered charts are updated in place; missing ones are created when
    /// their canvas exists. Returns how many charts were touched.
    pub fn render_analytics(&mut self, report: &AnalyticsReport) -> Result<usize> {
        let mut touched = 0;
        for (canvas_id, kind, data) in analytics_charts(report) {
            if self.update_chart(canvas_id, &data) {
                touched += 1;
            } else if self.create_chart(canvas_id, kind, data, &Value::Object(Map::new()))? {
                touched += 1;
            }
        }
        Ok(touched)
    }
}

fn series(label: &str, values: Value, color: &str) -> Value {
    json!({
        "label": label,
        "data": values,
        "borderColor": color,
        "backgroundColor": color,
        "tension": 0.3
    })
}

/// Canvas id, chart type and data for each analytics chart
pub fn analytics_charts(report: &AnalyticsReport) -> Vec<(&'static str, &'static str, Value)> {
    let labels = json!(report.dates);
    let platforms: Vec<&String> = report.platform_data.keys().collect();
    let platform_values: Vec<u64> = report.platform_data.values().copied().collect();

    vec![
        (
            POSTS_CHART,
            "line",
            json!({
                "labels": labels,
                "datasets": [series("Posts", json!(report.posts_data), "#0d6efd")]
            }),
        ),
        (
            ENGAGEMENT_CHART,
            "line",
            json!({
                "labels": labels,
                "datasets": [series("Engajamento", json!(report.engagement_data), "#198754")]
            }),
        ),
        (
            REVENUE_CHART,
            "bar",
            json!({
                "labels": labels,
                "datasets": [series("Receita (R$)", json!(report.revenue_data), "#ffc107")]
            }),
        ),
        (
            CLICKS_CHART,
            "bar",
            json!({
                "labels": labels,
                "datasets": [series("Cliques", json!(report.clicks_data), "#0dcaf0")]
            }),
        ),
        (
            PLATFORM_CHART,
            "doughnut",
            json!({
                "labels": platforms,
                "datasets": [{
                    "data": platform_values,
                    "backgroundColor": ["#E4405F", "#1877F2", "#1DA1F2", "#6c757d"]
                }]
            }),
        ),
    ]
}
