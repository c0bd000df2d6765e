//! Toast notifications
//!
//! Each `notify` renders an independent banner and arms a timer that removes
//! it after its duration. The user may close it earlier; whichever removal
//! comes second finds nothing to do.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use chrono::Utc;

use crate::timing::Timers;
use crate::types::{Notification, NotificationId, Severity};

/// Renders toasts into the page
pub trait ToastSurface {
    /// Show the banner; `on_close` must run when the user dismisses it
    fn mount(&self, toast: &Notification, on_close: Box<dyn FnOnce()>);
    /// Remove the banner if it is still in the document
    fn unmount(&self, id: NotificationId);
}

struct Inner {
    surface: Rc<dyn ToastSurface>,
    timers: Rc<dyn Timers>,
    default_duration: Duration,
    live: RefCell<HashMap<NotificationId, Notification>>,
    next_id: Cell<u64>,
}

impl Inner {
    fn dismiss(&self, id: NotificationId) -> bool {
        let removed = self.live.borrow_mut().remove(&id);
        match removed {
            Some(toast) => {
                tracing::trace!(id = toast.id.0, "toast removed");
                self.surface.unmount(id);
                true
            }
            None => false,
        }
    }
}

/// Cheap-to-clone handle to the toast controller
#[derive(Clone)]
pub struct Notifier {
    inner: Rc<Inner>,
}

impl Notifier {
    pub fn new(
        surface: Rc<dyn ToastSurface>,
        timers: Rc<dyn Timers>,
        default_duration: Duration,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                surface,
                timers,
                default_duration,
                live: RefCell::new(HashMap::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Show a toast for the default duration
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        self.notify_for(message, severity, self.inner.default_duration)
    }

    /// Show a toast that removes itself after `duration`
    pub fn notify_for(
        &self,
        message: impl Into<String>,
        severity: Severity,
        duration: Duration,
    ) -> NotificationId {
        let id = NotificationId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);

        let toast = Notification {
            id,
            message: message.into(),
            severity,
            duration,
            created_at: Utc::now(),
        };
        tracing::debug!(id = id.0, severity = %toast.severity, "{}", toast.message);

        self.inner.live.borrow_mut().insert(id, toast.clone());

        let on_close: Weak<Inner> = Rc::downgrade(&self.inner);
        self.inner.surface.mount(
            &toast,
            Box::new(move || {
                if let Some(inner) = on_close.upgrade() {
                    inner.dismiss(id);
                }
            }),
        );

        let on_expire: Weak<Inner> = Rc::downgrade(&self.inner);
        self.inner.timers.set_timeout(
            duration,
            Box::new(move || {
                if let Some(inner) = on_expire.upgrade() {
                    inner.dismiss(id);
                }
            }),
        );

        id
    }

    /// Remove a toast now; false when it was already gone
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.inner.dismiss(id)
    }

    pub fn is_live(&self, id: NotificationId) -> bool {
        self.inner.live.borrow().contains_key(&id)
    }

    /// Live toasts, oldest first
    pub fn live(&self) -> Vec<Notification> {
        let mut toasts: Vec<_> = self.inner.live.borrow().values().cloned().collect();
        toasts.sort_by_key(|t| t.id);
        toasts
    }
}
