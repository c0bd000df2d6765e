//! User-triggered actions
//!
//! Glue between buttons/forms and the API plus feedback layers. The element
//! an action came from is always passed in explicitly.

use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::feedback::{ActionButton, ActionTracker, Notifier};
use crate::page::Page;
use crate::timing::{Debounced, Spawner, Timers};
use crate::types::{PostOutcome, Severity, ToggleOutcome};
use crate::utils::missing_required;

pub const TOGGLE_BUSY_LABEL: &str = r#"<i class="fas fa-spinner fa-spin"></i>"#;
pub const POST_BUSY_LABEL: &str = r#"<i class="fas fa-spinner fa-spin me-1"></i>Postando..."#;

const ICON_ACTIVE: &str = "fas fa-eye";
const ICON_HIDDEN: &str = "fas fa-eye-slash";

const MSG_TOGGLE_OK: &str = "Status do produto atualizado";
const MSG_TOGGLE_FAILED: &str = "Erro ao atualizar produto";
const MSG_POST_CONFIRM: &str = "Deseja criar posts para este produto em todas as redes sociais ativas?";
const MSG_POST_FAILED: &str = "Erro ao criar posts";
const MSG_FORM_INCOMPLETE: &str = "Por favor, preencha todos os campos obrigatórios";
const MSG_COPIED: &str = "Copiado para a área de transferência";
const MSG_COPY_FAILED: &str = "Erro ao copiar";
const CLIPBOARD_TOAST: Duration = Duration::from_millis(2_000);

type ActionCall = (u64, Rc<dyn ActionButton>);

struct Shared {
    api: ApiClient,
    notifier: Notifier,
    page: Rc<dyn Page>,
    spawner: Rc<dyn Spawner>,
    actions: ActionTracker,
}

impl Shared {
    async fn toggle(&self, product_id: u64, button: &dyn ActionButton) -> Result<ToggleOutcome> {
        self.actions.begin(button, TOGGLE_BUSY_LABEL);

        let result = match self.api.toggle_product(product_id).await {
            Ok(outcome) if outcome.success => Ok(outcome),
            Ok(outcome) => Err(DashboardError::api(None, outcome.message.as_deref())),
            Err(err) => Err(err),
        };

        let last = self.actions.settle(button);
        match &result {
            Ok(outcome) => {
                if last {
                    if outcome.is_active {
                        button.set_icon(ICON_ACTIVE);
                        button.replace_class("btn-secondary", "btn-success");
                    } else {
                        button.set_icon(ICON_HIDDEN);
                        button.replace_class("btn-success", "btn-secondary");
                    }
                }
                tracing::info!(product_id, is_active = outcome.is_active, "product toggled");
                self.notifier.notify(MSG_TOGGLE_OK, Severity::Success);
            }
            Err(err) => {
                tracing::warn!(product_id, error = %err, "product toggle failed");
                self.notifier.notify(MSG_TOGGLE_FAILED, Severity::Danger);
            }
        }
        result
    }

    async fn post(&self, product_id: u64, button: &dyn ActionButton) -> Result<Option<PostOutcome>> {
        if !self.page.confirm(MSG_POST_CONFIRM) {
            return Ok(None);
        }
        self.actions.begin(button, POST_BUSY_LABEL);

        let result = match self.api.post_now(product_id).await {
            Ok(outcome) if outcome.success => Ok(outcome),
            Ok(outcome) => Err(DashboardError::api(None, Some(&outcome.message))),
            Err(err) => Err(err),
        };

        self.actions.settle(button);
        match result {
            Ok(outcome) => {
                tracing::info!(product_id, "{}", outcome.message);
                self.notifier.notify(outcome.message.clone(), Severity::Success);
                Ok(Some(outcome))
            }
            Err(err) => {
                tracing::warn!(product_id, error = %err, "immediate post failed");
                self.notifier.notify(MSG_POST_FAILED, Severity::Danger);
                Err(err)
            }
        }
    }
}

pub struct Handlers {
    shared: Rc<Shared>,
    toggle: Debounced<ActionCall>,
    post: Debounced<ActionCall>,
}

impl Handlers {
    pub fn new(
        api: ApiClient,
        notifier: Notifier,
        page: Rc<dyn Page>,
        timers: Rc<dyn Timers>,
        spawner: Rc<dyn Spawner>,
        config: &Config,
    ) -> Self {
        let shared = Rc::new(Shared {
            api,
            notifier,
            page,
            spawner,
            actions: ActionTracker::new(),
        });

        let toggle = {
            let shared = Rc::clone(&shared);
            Debounced::new(Rc::clone(&timers), config.toggle_debounce, move |(id, button): ActionCall| {
                let task = Rc::clone(&shared);
                shared.spawner.spawn(
                    async move {
                        let _ = task.toggle(id, button.as_ref()).await;
                    }
                    .boxed_local(),
                );
            })
        };

        let post = {
            let shared = Rc::clone(&shared);
            Debounced::new(timers, config.post_debounce, move |(id, button): ActionCall| {
                let task = Rc::clone(&shared);
                shared.spawner.spawn(
                    async move {
                        let _ = task.post(id, button.as_ref()).await;
                    }
                    .boxed_local(),
                );
            })
        };

        Self { shared, toggle, post }
    }

    /// Debounced product toggle
    pub fn toggle_product(&self, product_id: u64, button: Rc<dyn ActionButton>) {
        self.toggle.trigger((product_id, button));
    }

    /// Debounced "post now", confirmed by the user when the window closes
    pub fn post_now(&self, product_id: u64, button: Rc<dyn ActionButton>) {
        self.post.trigger((product_id, button));
    }

    /// Run a toggle immediately, bypassing the debounce window
    pub async fn run_toggle(&self, product_id: u64, button: &dyn ActionButton) -> Result<ToggleOutcome> {
        self.shared.toggle(product_id, button).await
    }

    /// Run a post immediately; `Ok(None)` when the user declined
    pub async fn run_post(&self, product_id: u64, button: &dyn ActionButton) -> Result<Option<PostOutcome>> {
        self.shared.post(product_id, button).await
    }

    /// Validate a form's required fields before submission.
    ///
    /// Blank fields are flagged `is-invalid` and a warning is shown. A form
    /// that is not in the page never submits.
    pub fn check_form(&self, form_id: &str) -> bool {
        let Some(fields) = self.shared.page.form_fields(form_id) else {
            return false;
        };
        let missing = missing_required(&fields);
        for field in fields.iter().filter(|f| f.required) {
            self.shared
                .page
                .mark_invalid(form_id, &field.name, missing.contains(&field.name));
        }
        if missing.is_empty() {
            true
        } else {
            tracing::debug!(form_id, ?missing, "form blocked");
            self.shared
                .notifier
                .notify(MSG_FORM_INCOMPLETE, Severity::Warning);
            false
        }
    }

    /// Copy text and report the outcome with a short toast
    pub async fn copy_to_clipboard(&self, text: &str) -> bool {
        let copied = self.shared.page.write_clipboard(text).await;
        match copied {
            Ok(()) => {
                self.shared
                    .notifier
                    .notify_for(MSG_COPIED, Severity::Success, CLIPBOARD_TOAST);
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "clipboard write failed");
                self.shared
                    .notifier
                    .notify_for(MSG_COPY_FAILED, Severity::Danger, CLIPBOARD_TOAST);
                false
            }
        }
    }

    /// Fire-and-forget variant of [`Handlers::copy_to_clipboard`]
    pub fn spawn_copy(self: &Rc<Self>, text: String) {
        let this = Rc::clone(self);
        self.shared.spawner.spawn(
            async move {
                this.copy_to_clipboard(&text).await;
            }
            .boxed_local(),
        );
    }
}
