//! Deterministic stand-ins for the browser, used by the unit tests

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{self, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use serde_json::Value;

use crate::app::Platform;
use crate::charts::{ChartBackend, ChartConfig, ChartInstance};
use crate::client::{ApiClient, ApiRequest, RawResponse, Transport};
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::feed::DataFeed;
use crate::feedback::{ActionButton, Notifier, ToastSurface};
use crate::handlers::Handlers;
use crate::page::Page;
use crate::timing::{Spawner, TimerId, Timers};
use crate::types::{
    EngagementSample, Notification, NotificationId, PostStatus, PostStatusUpdate, ServiceHealth,
};
use crate::utils::FormField;

// ---------------------------------------------------------------------------
// Timers

enum Task {
    Once(Box<dyn FnOnce()>),
    Every(Duration, Box<dyn FnMut()>),
}

struct Entry {
    id: TimerId,
    due: Duration,
    task: Task,
}

/// Virtual clock: nothing fires until `advance` moves time past it
pub(crate) struct ManualTimers {
    now: Cell<Duration>,
    next_id: Cell<i32>,
    entries: RefCell<Vec<Entry>>,
    running: Cell<Option<TimerId>>,
    running_cleared: Cell<bool>,
}

impl ManualTimers {
    pub(crate) fn new() -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            next_id: Cell::new(1),
            entries: RefCell::new(Vec::new()),
            running: Cell::new(None),
            running_cleared: Cell::new(false),
        }
    }

    pub(crate) fn now(&self) -> Duration {
        self.now.get()
    }

    /// Timers still armed
    pub(crate) fn pending(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Fire everything due up to `now + by`, earliest first
    pub(crate) fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        loop {
            let next = {
                let mut entries = self.entries.borrow_mut();
                let index = entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.due <= target)
                    .min_by_key(|(_, e)| (e.due, e.id.0))
                    .map(|(i, _)| i);
                index.map(|i| entries.remove(i))
            };
            let Some(entry) = next else { break };
            self.now.set(entry.due);

            match entry.task {
                Task::Once(task) => task(),
                Task::Every(period, mut task) => {
                    self.running.set(Some(entry.id));
                    self.running_cleared.set(false);
                    task();
                    self.running.set(None);
                    if !self.running_cleared.get() {
                        self.entries.borrow_mut().push(Entry {
                            id: entry.id,
                            due: entry.due + period,
                            task: Task::Every(period, task),
                        });
                    }
                }
            }
        }
        self.now.set(target);
    }

    fn arm(&self, due: Duration, task: Task) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push(Entry { id, due, task });
        id
    }
}

impl Timers for ManualTimers {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId {
        self.arm(self.now.get() + delay, Task::Once(task))
    }

    fn set_interval(&self, period: Duration, task: Box<dyn FnMut()>) -> TimerId {
        self.arm(self.now.get() + period, Task::Every(period, task))
    }

    fn clear(&self, id: TimerId) {
        if self.running.get() == Some(id) {
            self.running_cleared.set(true);
        }
        self.entries.borrow_mut().retain(|e| e.id != id);
    }
}

// ---------------------------------------------------------------------------
// Executor

pub(crate) struct PoolSpawner(LocalSpawner);

impl Spawner for PoolSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.0.spawn_local(task).expect("local pool is alive");
    }
}

// ---------------------------------------------------------------------------
// Toasts

#[derive(Default)]
pub(crate) struct RecordingToasts {
    mounted: RefCell<Vec<Notification>>,
    unmounted: RefCell<Vec<NotificationId>>,
    closers: RefCell<HashMap<NotificationId, Box<dyn FnOnce()>>>,
}

impl RecordingToasts {
    pub(crate) fn mounted(&self) -> Vec<Notification> {
        self.mounted.borrow().clone()
    }

    pub(crate) fn unmounted(&self) -> Vec<NotificationId> {
        self.unmounted.borrow().clone()
    }

    /// Simulate the user clicking the close button
    pub(crate) fn close(&self, id: NotificationId) {
        let closer = self.closers.borrow_mut().remove(&id);
        if let Some(closer) = closer {
            closer();
        }
    }
}

impl ToastSurface for RecordingToasts {
    fn mount(&self, toast: &Notification, on_close: Box<dyn FnOnce()>) {
        self.mounted.borrow_mut().push(toast.clone());
        self.closers.borrow_mut().insert(toast.id, on_close);
    }

    fn unmount(&self, id: NotificationId) {
        self.closers.borrow_mut().remove(&id);
        self.unmounted.borrow_mut().push(id);
    }
}

// ---------------------------------------------------------------------------
// Page

#[derive(Default)]
pub(crate) struct FakePage {
    clock: RefCell<Option<String>>,
    clock_updates: Cell<usize>,
    loading: RefCell<Vec<bool>>,
    services: RefCell<HashMap<String, bool>>,
    counters: RefCell<BTreeMap<String, (u64, bool)>>,
    posts: RefCell<BTreeMap<String, PostStatus>>,
    pulses: RefCell<Vec<bool>>,
    confirm_answer: Cell<bool>,
    prompts: RefCell<Vec<String>>,
    forms: RefCell<HashMap<String, Vec<FormField>>>,
    invalid: RefCell<HashMap<String, BTreeSet<String>>>,
    clipboard: RefCell<Option<String>>,
    clipboard_fails: Cell<bool>,
}

impl FakePage {
    pub(crate) fn clock(&self) -> Option<String> {
        self.clock.borrow().clone()
    }

    pub(crate) fn clock_updates(&self) -> usize {
        self.clock_updates.get()
    }

    pub(crate) fn loading_log(&self) -> Vec<bool> {
        self.loading.borrow().clone()
    }

    pub(crate) fn service(&self, name: &str) -> Option<bool> {
        self.services.borrow().get(name).copied()
    }

    pub(crate) fn set_counter(&self, key: &str, count: u64) {
        self.counters
            .borrow_mut()
            .insert(key.to_string(), (count, false));
    }

    /// Displayed value and whether it is highlighted
    pub(crate) fn counter(&self, key: &str) -> Option<(u64, bool)> {
        self.counters.borrow().get(key).copied()
    }

    pub(crate) fn schedule_post(&self, post_id: &str) {
        self.posts
            .borrow_mut()
            .insert(post_id.to_string(), PostStatus::Scheduled);
    }

    pub(crate) fn post_status(&self, post_id: &str) -> Option<PostStatus> {
        self.posts.borrow().get(post_id).copied()
    }

    pub(crate) fn pulses(&self) -> Vec<bool> {
        self.pulses.borrow().clone()
    }

    pub(crate) fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    pub(crate) fn confirm_prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    /// Install (or replace) a form given as `(name, value, required)` fields
    pub(crate) fn add_form(&self, form_id: &str, fields: &[(&str, &str, bool)]) {
        let fields = fields
            .iter()
            .map(|(name, value, required)| FormField {
                name: (*name).to_string(),
                value: (*value).to_string(),
                required: *required,
            })
            .collect();
        self.forms.borrow_mut().insert(form_id.to_string(), fields);
    }

    pub(crate) fn invalid_fields(&self, form_id: &str) -> Vec<String> {
        self.invalid
            .borrow()
            .get(form_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub(crate) fn clipboard(&self) -> Option<String> {
        self.clipboard.borrow().clone()
    }

    pub(crate) fn fail_clipboard(&self) {
        self.clipboard_fails.set(true);
    }
}

impl Page for FakePage {
    fn set_clock(&self, text: &str) {
        *self.clock.borrow_mut() = Some(text.to_string());
        self.clock_updates.set(self.clock_updates.get() + 1);
    }

    fn set_loading(&self, busy: bool) {
        self.loading.borrow_mut().push(busy);
    }

    fn set_service_status(&self, service: &str, connected: bool) {
        self.services
            .borrow_mut()
            .insert(service.to_string(), connected);
    }

    fn engagement_counters(&self) -> Vec<(String, u64)> {
        self.counters
            .borrow()
            .iter()
            .map(|(key, (count, _))| (key.clone(), *count))
            .collect()
    }

    fn set_engagement(&self, key: &str, count: u64, highlight: bool) {
        self.counters
            .borrow_mut()
            .insert(key.to_string(), (count, highlight));
    }

    fn clear_engagement_highlight(&self, key: &str) {
        if let Some(entry) = self.counters.borrow_mut().get_mut(key) {
            entry.1 = false;
        }
    }

    fn scheduled_posts(&self) -> Vec<String> {
        self.posts
            .borrow()
            .iter()
            .filter(|(_, status)| **status == PostStatus::Scheduled)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn set_post_status(&self, post_id: &str, status: PostStatus) {
        if let Some(current) = self.posts.borrow_mut().get_mut(post_id) {
            *current = status;
        }
    }

    fn pulse_stat_cards(&self, on: bool) {
        self.pulses.borrow_mut().push(on);
    }

    fn confirm(&self, message: &str) -> bool {
        self.prompts.borrow_mut().push(message.to_string());
        self.confirm_answer.get()
    }

    fn form_fields(&self, form_id: &str) -> Option<Vec<FormField>> {
        self.forms.borrow().get(form_id).cloned()
    }

    fn mark_invalid(&self, form_id: &str, field: &str, invalid: bool) {
        let mut forms = self.invalid.borrow_mut();
        let set = forms.entry(form_id.to_string()).or_default();
        if invalid {
            set.insert(field.to_string());
        } else {
            set.remove(field);
        }
    }

    fn write_clipboard(&self, text: &str) -> LocalBoxFuture<'static, Result<()>> {
        let result = if self.clipboard_fails.get() {
            Err(DashboardError::Clipboard("permission denied".into()))
        } else {
            *self.clipboard.borrow_mut() = Some(text.to_string());
            Ok(())
        };
        future::ready(result).boxed_local()
    }
}

// ---------------------------------------------------------------------------
// Buttons

pub(crate) struct FakeButton {
    id: String,
    label: RefCell<String>,
    disabled: Cell<bool>,
    icon: RefCell<Option<String>>,
    classes: RefCell<Vec<String>>,
    labels: RefCell<Vec<String>>,
    disabled_log: RefCell<Vec<bool>>,
}

impl FakeButton {
    pub(crate) fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: RefCell::new(label.to_string()),
            disabled: Cell::new(false),
            icon: RefCell::new(None),
            classes: RefCell::new(Vec::new()),
            labels: RefCell::new(Vec::new()),
            disabled_log: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn with_class(self, class: &str) -> Self {
        *self.classes.borrow_mut() = class.split_whitespace().map(str::to_string).collect();
        self
    }

    pub(crate) fn disabled(&self) -> bool {
        self.disabled.get()
    }

    pub(crate) fn icon(&self) -> Option<String> {
        self.icon.borrow().clone()
    }

    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().iter().any(|c| c == class)
    }

    /// Every label written, oldest first
    pub(crate) fn label_history(&self) -> Vec<String> {
        self.labels.borrow().clone()
    }

    pub(crate) fn disabled_history(&self) -> Vec<bool> {
        self.disabled_log.borrow().clone()
    }
}

impl ActionButton for FakeButton {
    fn target_id(&self) -> String {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.label.borrow().clone()
    }

    fn set_label(&self, html: &str) {
        *self.label.borrow_mut() = html.to_string();
        self.labels.borrow_mut().push(html.to_string());
    }

    fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
        self.disabled_log.borrow_mut().push(disabled);
    }

    fn set_icon(&self, class: &str) {
        *self.icon.borrow_mut() = Some(class.to_string());
    }

    fn replace_class(&self, from: &str, to: &str) {
        let mut classes = self.classes.borrow_mut();
        if let Some(slot) = classes.iter_mut().find(|c| c.as_str() == from) {
            *slot = to.to_string();
        }
    }
}

// ---------------------------------------------------------------------------
// Transport

/// Replays queued responses in order; the last one keeps repeating
#[derive(Default)]
pub(crate) struct StubTransport {
    responses: RefCell<VecDeque<std::result::Result<RawResponse, String>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl StubTransport {
    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.responses.borrow_mut().push_back(Ok(RawResponse {
            status,
            body: body.to_string(),
        }));
    }

    pub(crate) fn fail(&self, reason: &str) {
        self.responses.borrow_mut().push_back(Err(reason.to_string()));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for StubTransport {
    fn send(&self, request: ApiRequest) -> LocalBoxFuture<'static, Result<RawResponse>> {
        self.requests.borrow_mut().push(request);
        let next = {
            let mut responses = self.responses.borrow_mut();
            if responses.len() > 1 {
                responses.pop_front()
            } else {
                responses.front().cloned()
            }
        };
        let result = match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(reason)) => Err(DashboardError::Http(reason)),
            None => Err(DashboardError::Http("no response queued".into())),
        };
        future::ready(result).boxed_local()
    }
}

// ---------------------------------------------------------------------------
// Charts

#[derive(Default)]
struct ChartLog {
    created: Cell<usize>,
    destroyed: RefCell<Vec<usize>>,
    configs: RefCell<Vec<ChartConfig>>,
    redraws: RefCell<Vec<(String, String)>>,
}

struct FakeChart {
    serial: usize,
    canvas_id: String,
    log: Rc<ChartLog>,
}

impl ChartInstance for FakeChart {
    fn set_data(&mut self, _data: &Value) {}

    fn redraw(&mut self, mode: &str) {
        self.log
            .redraws
            .borrow_mut()
            .push((self.canvas_id.clone(), mode.to_string()));
    }

    fn destroy(&mut self) {
        self.log.destroyed.borrow_mut().push(self.serial);
    }
}

#[derive(Default)]
pub(crate) struct FakeCharts {
    canvases: RefCell<HashSet<String>>,
    log: Rc<ChartLog>,
}

impl FakeCharts {
    pub(crate) fn with_canvases(canvases: &[&str]) -> Self {
        let charts = Self::default();
        charts.add_canvases(canvases);
        charts
    }

    pub(crate) fn add_canvases(&self, canvases: &[&str]) {
        self.canvases
            .borrow_mut()
            .extend(canvases.iter().map(|c| (*c).to_string()));
    }

    pub(crate) fn created(&self) -> usize {
        self.log.created.get()
    }

    /// Serial numbers (creation order, from 0) of destroyed charts
    pub(crate) fn destroyed_ids(&self) -> Vec<usize> {
        self.log.destroyed.borrow().clone()
    }

    pub(crate) fn live(&self) -> usize {
        self.created() - self.log.destroyed.borrow().len()
    }

    pub(crate) fn last_config(&self) -> Option<ChartConfig> {
        self.log.configs.borrow().last().cloned()
    }

    pub(crate) fn redraws(&self) -> Vec<(String, String)> {
        self.log.redraws.borrow().clone()
    }
}

impl ChartBackend for FakeCharts {
    fn canvas_exists(&self, canvas_id: &str) -> bool {
        self.canvases.borrow().contains(canvas_id)
    }

    fn create(&self, canvas_id: &str, config: &ChartConfig) -> Result<Box<dyn ChartInstance>> {
        let serial = self.log.created.get();
        self.log.created.set(serial + 1);
        self.log.configs.borrow_mut().push(config.clone());
        Ok(Box::new(FakeChart {
            serial,
            canvas_id: canvas_id.to_string(),
            log: Rc::clone(&self.log),
        }))
    }
}

// ---------------------------------------------------------------------------
// Feed

/// Serves whatever was set; unset data means "not served"
#[derive(Default)]
pub(crate) struct FakeFeed {
    engagement: RefCell<Option<Vec<EngagementSample>>>,
    post_statuses: RefCell<Option<Vec<PostStatusUpdate>>>,
    health: RefCell<Option<Vec<ServiceHealth>>>,
    requested_posts: RefCell<Vec<Vec<String>>>,
}

impl FakeFeed {
    pub(crate) fn set_engagement(&self, samples: Vec<EngagementSample>) {
        *self.engagement.borrow_mut() = Some(samples);
    }

    pub(crate) fn set_post_statuses(&self, updates: Vec<PostStatusUpdate>) {
        *self.post_statuses.borrow_mut() = Some(updates);
    }

    pub(crate) fn set_health(&self, services: Vec<ServiceHealth>) {
        *self.health.borrow_mut() = Some(services);
    }

    pub(crate) fn requested_posts(&self) -> Vec<Vec<String>> {
        self.requested_posts.borrow().clone()
    }
}

impl DataFeed for FakeFeed {
    fn engagement(&self) -> Option<LocalBoxFuture<'static, Result<Vec<EngagementSample>>>> {
        let samples = self.engagement.borrow().clone()?;
        Some(future::ready(Ok(samples)).boxed_local())
    }

    fn post_statuses(
        &self,
        post_ids: Vec<String>,
    ) -> Option<LocalBoxFuture<'static, Result<Vec<PostStatusUpdate>>>> {
        let updates = self.post_statuses.borrow().clone()?;
        self.requested_posts.borrow_mut().push(post_ids);
        Some(future::ready(Ok(updates)).boxed_local())
    }

    fn health(&self) -> Option<LocalBoxFuture<'static, Result<Vec<ServiceHealth>>>> {
        let services = self.health.borrow().clone()?;
        Some(future::ready(Ok(services)).boxed_local())
    }
}

// ---------------------------------------------------------------------------
// Harness

/// One of every fake, wired together, plus the executor driving them
pub(crate) struct Harness {
    pub(crate) config: Config,
    pub(crate) timers: Rc<ManualTimers>,
    pub(crate) toasts: Rc<RecordingToasts>,
    pub(crate) page: Rc<FakePage>,
    pub(crate) transport: Rc<StubTransport>,
    pub(crate) charts: Rc<FakeCharts>,
    pub(crate) feed: Rc<FakeFeed>,
    pool: RefCell<LocalPool>,
    spawner: Rc<PoolSpawner>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = Rc::new(PoolSpawner(pool.spawner()));
        Self {
            config: Config::default(),
            timers: Rc::new(ManualTimers::new()),
            toasts: Rc::new(RecordingToasts::default()),
            page: Rc::new(FakePage::default()),
            transport: Rc::new(StubTransport::default()),
            charts: Rc::new(FakeCharts::default()),
            feed: Rc::new(FakeFeed::default()),
            pool: RefCell::new(pool),
            spawner,
        }
    }

    pub(crate) fn notifier(&self) -> Notifier {
        Notifier::new(
            self.toasts.clone(),
            self.timers.clone(),
            self.config.notification_duration,
        )
    }

    pub(crate) fn handlers(&self) -> Handlers {
        let notifier = self.notifier();
        let api = ApiClient::new(self.config.api_base.clone(), self.transport.clone(), notifier.clone());
        Handlers::new(
            api,
            notifier,
            self.page.clone(),
            self.timers.clone(),
            self.spawner.clone(),
            &self.config,
        )
    }

    pub(crate) fn platform(&self) -> Platform {
        Platform {
            timers: self.timers.clone(),
            spawner: self.spawner.clone(),
            page: self.page.clone(),
            toasts: self.toasts.clone(),
            charts: self.charts.clone(),
            transport: self.transport.clone(),
            feed: Some(self.feed.clone() as Rc<dyn DataFeed>),
        }
    }

    /// Run spawned tasks until none can make progress
    pub(crate) fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.pool.borrow_mut().run_until(future)
    }
}
