//! Timer and task seams plus the rate-limiting primitives built on them
//!
//! Everything runs on the browser's single-threaded event loop, so shared
//! state is `Rc`/`Cell` and callbacks never need `Send`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;

/// Handle returned by the platform timer API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub i32);

/// Host timer facility (`setTimeout`/`setInterval` in the browser)
pub trait Timers {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) -> TimerId;
    fn set_interval(&self, period: Duration, task: Box<dyn FnMut()>) -> TimerId;
    /// Cancel a pending timeout or interval; unknown ids are ignored
    fn clear(&self, id: TimerId);
}

/// Runs `!Send` futures on the local event loop
pub trait Spawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Trailing-edge debounce.
///
/// Each `trigger` cancels the pending call and re-arms the window, so a burst
/// of calls spaced closer than `wait` collapses into one invocation that runs
/// `wait` after the last call, with the last call's argument.
pub struct Debounced<A: 'static> {
    timers: Rc<dyn Timers>,
    wait: Duration,
    action: Rc<dyn Fn(A)>,
    pending: Rc<Cell<Option<TimerId>>>,
}

impl<A: 'static> Debounced<A> {
    pub fn new(timers: Rc<dyn Timers>, wait: Duration, action: impl Fn(A) + 'static) -> Self {
        Self {
            timers,
            wait,
            action: Rc::new(action),
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn trigger(&self, arg: A) {
        if let Some(id) = self.pending.take() {
            self.timers.clear(id);
        }
        let action = Rc::clone(&self.action);
        let pending = Rc::clone(&self.pending);
        let id = self.timers.set_timeout(
            self.wait,
            Box::new(move || {
                pending.set(None);
                action(arg);
            }),
        );
        self.pending.set(Some(id));
    }

    /// Whether a call is waiting for its window to close
    pub fn is_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

/// Leading-edge throttle: at most one invocation per `limit`.
pub struct Throttled<A: 'static> {
    timers: Rc<dyn Timers>,
    limit: Duration,
    action: Rc<RefCell<dyn FnMut(A)>>,
    closed: Rc<Cell<bool>>,
}

impl<A: 'static> Throttled<A> {
    pub fn new(timers: Rc<dyn Timers>, limit: Duration, action: impl FnMut(A) + 'static) -> Self {
        Self {
            timers,
            limit,
            action: Rc::new(RefCell::new(action)),
            closed: Rc::new(Cell::new(false)),
        }
    }

    /// Run the action unless the gate is closed; returns whether it ran
    pub fn trigger(&self, arg: A) -> bool {
        if self.closed.get() {
            return false;
        }
        self.closed.set(true);
        (&mut *self.action.borrow_mut())(arg);
        let closed = Rc::clone(&self.closed);
        self.timers
            .set_timeout(self.limit, Box::new(move || closed.set(false)));
        true
    }
}
