//! Dashboard controller
//!
//! Owns everything that used to be page-global: the chart registry, the
//! periodic tasks and the start flag. The host builds a [`Platform`] once and
//! keeps the returned [`Dashboard`] alive for the lifetime of the page.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use chrono::Local;
use futures::FutureExt;

use crate::charts::{ChartBackend, ChartRegistry};
use crate::client::{ApiClient, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::feed::{DataFeed, HttpFeed};
use crate::feedback::{LoadingIndicator, Notifier, ToastSurface};
use crate::handlers::Handlers;
use crate::page::Page;
use crate::timing::{Spawner, Throttled, TimerId, Timers};
use crate::types::{PostStatus, Severity};
use crate::utils::format_clock;

const MSG_REFRESHED: &str = "Dados atualizados";
const MSG_ONLINE: &str = "Conexão restaurada";
const MSG_OFFLINE: &str = "Sem conexão com a internet";

const REFRESH_TOAST: Duration = Duration::from_millis(2_000);
const STAT_PULSE: Duration = Duration::from_millis(200);
const ENGAGEMENT_HIGHLIGHT: Duration = Duration::from_millis(1_000);
/// Quick tab flips within this window share one refresh
const VISIBILITY_REFRESH_LIMIT: Duration = Duration::from_secs(5);

/// Host capabilities the controller runs on
pub struct Platform {
    pub timers: Rc<dyn Timers>,
    pub spawner: Rc<dyn Spawner>,
    pub page: Rc<dyn Page>,
    pub toasts: Rc<dyn ToastSurface>,
    pub charts: Rc<dyn ChartBackend>,
    pub transport: Rc<dyn Transport>,
    /// Background data source; falls back to the configured HTTP endpoints
    pub feed: Option<Rc<dyn DataFeed>>,
}

struct Inner {
    config: Config,
    timers: Rc<dyn Timers>,
    spawner: Rc<dyn Spawner>,
    page: Rc<dyn Page>,
    notifier: Notifier,
    loading: LoadingIndicator,
    api: ApiClient,
    charts: RefCell<ChartRegistry>,
    handlers: Rc<Handlers>,
    feed: Option<Rc<dyn DataFeed>>,
    started: Cell<bool>,
    visibility_refresh: Throttled<()>,
    tasks: RefCell<Vec<TimerId>>,
}

#[derive(Clone)]
pub struct Dashboard {
    inner: Rc<Inner>,
}

impl Dashboard {
    pub fn new(config: Config, platform: Platform) -> Result<Self> {
        config.validate()?;

        let notifier = Notifier::new(
            platform.toasts,
            Rc::clone(&platform.timers),
            config.notification_duration,
        );
        let api = ApiClient::new(config.api_base.clone(), platform.transport, notifier.clone());
        let handlers = Rc::new(Handlers::new(
            api.clone(),
            notifier.clone(),
            Rc::clone(&platform.page),
            Rc::clone(&platform.timers),
            Rc::clone(&platform.spawner),
            &config,
        ));
        let feed = platform.feed.or_else(|| {
            let http = HttpFeed::new(api.clone(), &config);
            http.is_configured()
                .then(|| Rc::new(http) as Rc<dyn DataFeed>)
        });

        Ok(Self {
            inner: Rc::new_cyclic(|weak: &Weak<Inner>| {
                let weak = weak.clone();
                let visibility_refresh = Throttled::new(
                    Rc::clone(&platform.timers),
                    VISIBILITY_REFRESH_LIMIT,
                    move |()| {
                        if let Some(inner) = weak.upgrade() {
                            Inner::spawn_refresh(&inner);
                        }
                    },
                );
                Inner {
                    loading: LoadingIndicator::new(Rc::clone(&platform.page)),
                    charts: RefCell::new(ChartRegistry::new(platform.charts)),
                    timers: platform.timers,
                    spawner: platform.spawner,
                    page: platform.page,
                    config,
                    notifier,
                    api,
                    handlers,
                    feed,
                    started: Cell::new(false),
                    visibility_refresh,
                    tasks: RefCell::new(Vec::new()),
                }
            }),
        })
    }

    /// Start the periodic tasks; a second call is a no-op and returns false
    pub fn start(&self) -> bool {
        let inner = &self.inner;
        if inner.started.replace(true) {
            return false;
        }
        tracing::info!(
            environment = %inner.config.environment,
            feed = inner.feed.is_some(),
            "dashboard starting"
        );

        inner.tick_clock();
        let config = &inner.config;
        self.every(config.clock_interval, |inner| inner.tick_clock());
        self.every(config.refresh_interval, |inner| Inner::spawn_refresh(inner));
        self.every(config.engagement_interval, |inner| Inner::spawn_engagement(inner));
        self.every(config.post_status_interval, |inner| Inner::spawn_post_statuses(inner));

        let weak = Rc::downgrade(inner);
        let id = inner.timers.set_timeout(
            config.connection_check_delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Inner::spawn_health(&inner);
                }
            }),
        );
        inner.tasks.borrow_mut().push(id);
        true
    }

    fn every(&self, period: Duration, task: impl Fn(&Rc<Inner>) + 'static) {
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let id = self.inner.timers.set_interval(
            period,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    task(&inner);
                }
            }),
        );
        self.inner.tasks.borrow_mut().push(id);
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.get()
    }

    /// Full data refresh: analytics, charts and the "updated" toast
    pub async fn refresh(&self) -> Result<()> {
        Inner::refresh(&self.inner).await
    }

    /// Fire-and-forget refresh
    pub fn spawn_refresh(&self) {
        Inner::spawn_refresh(&self.inner);
    }

    pub async fn refresh_engagement(&self) -> Result<usize> {
        Inner::refresh_engagement(&self.inner).await
    }

    pub async fn refresh_post_statuses(&self) -> Result<usize> {
        Inner::refresh_post_statuses(&self.inner).await
    }

    pub async fn check_services(&self) -> Result<usize> {
        Inner::check_services(&self.inner).await
    }

    /// Page visibility changed; every return to the tab refreshes the data,
    /// at most once every five seconds
    pub fn on_visibility_change(&self, visible: bool) {
        if !visible {
            return;
        }
        if self.inner.visibility_refresh.trigger(()) {
            tracing::debug!("page visible, refreshing");
        } else {
            tracing::debug!("page visible, refresh already ran recently");
        }
    }

    pub fn on_online(&self) {
        tracing::info!("connection restored");
        self.inner.notifier.notify(MSG_ONLINE, Severity::Success);
    }

    pub fn on_offline(&self) {
        tracing::warn!("connection lost");
        self.inner.notifier.notify(MSG_OFFLINE, Severity::Warning);
    }

    pub fn handlers(&self) -> &Rc<Handlers> {
        &self.inner.handlers
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Registered charts
    pub fn chart_count(&self) -> usize {
        self.inner.charts.borrow().len()
    }

    /// Ids of every timer this dashboard armed
    pub fn timer_ids(&self) -> Vec<TimerId> {
        self.inner.tasks.borrow().clone()
    }
}

impl Inner {
    fn tick_clock(&self) {
        self.page.set_clock(&format_clock(&Local::now()));
    }

    fn spawn_refresh(this: &Rc<Self>) {
        let inner = Rc::clone(this);
        this.spawner.spawn(
            async move {
                let _ = Inner::refresh(&inner).await;
            }
            .boxed_local(),
        );
    }

    fn spawn_engagement(this: &Rc<Self>) {
        let inner = Rc::clone(this);
        this.spawner.spawn(
            async move {
                if let Err(err) = Inner::refresh_engagement(&inner).await {
                    tracing::debug!(error = %err, "engagement poll failed");
                }
            }
            .boxed_local(),
        );
    }

    fn spawn_post_statuses(this: &Rc<Self>) {
        let inner = Rc::clone(this);
        this.spawner.spawn(
            async move {
                if let Err(err) = Inner::refresh_post_statuses(&inner).await {
                    tracing::debug!(error = %err, "post status poll failed");
                }
            }
            .boxed_local(),
        );
    }

    fn spawn_health(this: &Rc<Self>) {
        let inner = Rc::clone(this);
        this.spawner.spawn(
            async move {
                if let Err(err) = Inner::check_services(&inner).await {
                    tracing::warn!(error = %err, "service health check failed");
                }
            }
            .boxed_local(),
        );
    }

    async fn refresh(this: &Rc<Self>) -> Result<()> {
        this.loading.begin();
        let result = Inner::load_analytics(this).await;
        this.loading.end();
        result
    }

    async fn load_analytics(this: &Rc<Self>) -> Result<()> {
        let report = this.api.get_analytics(Some(this.config.analytics_days)).await?;
        let drawn = this.charts.borrow_mut().render_analytics(&report)?;
        tracing::debug!(drawn, days = report.dates.len(), "analytics refreshed");

        this.page.pulse_stat_cards(true);
        let weak = Rc::downgrade(this);
        this.timers.set_timeout(
            STAT_PULSE,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.page.pulse_stat_cards(false);
                }
            }),
        );
        this.notifier
            .notify_for(MSG_REFRESHED, Severity::Info, REFRESH_TOAST);
        Ok(())
    }

    /// Returns how many counters went up
    async fn refresh_engagement(this: &Rc<Self>) -> Result<usize> {
        let Some(request) = this.feed.as_ref().and_then(|feed| feed.engagement()) else {
            return Ok(0);
        };
        let samples = request.await?;

        let current = this.page.engagement_counters();
        let mut raised = 0;
        for sample in samples {
            let shown = current
                .iter()
                .find(|(key, _)| *key == sample.key)
                .map(|(_, count)| *count);
            let Some(shown) = shown else { continue };
            if sample.count <= shown {
                continue;
            }

            this.page.set_engagement(&sample.key, sample.count, true);
            raised += 1;

            let weak = Rc::downgrade(this);
            let key = sample.key;
            this.timers.set_timeout(
                ENGAGEMENT_HIGHLIGHT,
                Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        inner.page.clear_engagement_highlight(&key);
                    }
                }),
            );
        }
        Ok(raised)
    }

    /// Returns how many scheduled badges changed
    async fn refresh_post_statuses(this: &Rc<Self>) -> Result<usize> {
        let scheduled = this.page.scheduled_posts();
        if scheduled.is_empty() {
            return Ok(0);
        }
        let Some(request) = this
            .feed
            .as_ref()
            .and_then(|feed| feed.post_statuses(scheduled.clone()))
        else {
            return Ok(0);
        };

        let mut changed = 0;
        for update in request.await? {
            if update.status == PostStatus::Scheduled || !scheduled.contains(&update.post_id) {
                continue;
            }
            this.page.set_post_status(&update.post_id, update.status);
            changed += 1;
        }
        Ok(changed)
    }

    /// Returns how many indicators were set
    async fn check_services(this: &Rc<Self>) -> Result<usize> {
        let Some(request) = this.feed.as_ref().and_then(|feed| feed.health()) else {
            return Ok(0);
        };
        let services = request.await?;
        for health in &services {
            this.page
                .set_service_status(&health.service, health.connected);
        }
        Ok(services.len())
    }
}
