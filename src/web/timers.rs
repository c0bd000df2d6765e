//! Browser timers and task spawning

use std::time::Duration;

use futures::future::LocalBoxFuture;
use gloo_timers::callback::{Interval, Timeout};
use web_sys::Window;

use crate::timing::{Spawner, TimerId, Timers};

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// `setTimeout`/`setInterval`; ids stay valid for `clear*` after `forget`
pub(crate) struct GlooTimers {
    window: Window,
}

impl GlooTimers {
    pub(crate) fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Timers for GlooTimers {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        let id = Timeout::new(millis(delay), task).forget();
        TimerId(id.as_f64().unwrap_or_default() as i32)
    }

    fn set_interval(&self, period: Duration, mut task: Box<dyn FnMut()>) -> TimerId {
        let id = Interval::new(millis(period), move || task()).forget();
        TimerId(id.as_f64().unwrap_or_default() as i32)
    }

    fn clear(&self, id: TimerId) {
        // Timeouts and intervals share one id pool
        self.window.clear_timeout_with_handle(id.0);
    }
}

/// `wasm_bindgen_futures::spawn_local`
pub(crate) struct BrowserSpawner;

impl Spawner for BrowserSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}
