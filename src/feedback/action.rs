//! Busy state of action buttons
//!
//! A button that starts a request is disabled and shows a spinner until the
//! request settles. The label restored afterwards is always the one captured
//! when the first overlapping request began, never a spinner left behind by
//! a later one.

use std::cell::RefCell;
use std::collections::HashMap;

/// The element a user action was triggered from
pub trait ActionButton {
    /// Stable key for the element (its DOM id, or one assigned on first use)
    fn target_id(&self) -> String;
    /// Current inner markup
    fn label(&self) -> String;
    fn set_label(&self, html: &str);
    fn set_disabled(&self, disabled: bool);
    /// Class of the first `<i>` icon inside the button
    fn set_icon(&self, class: &str);
    /// Replace one class with another; no-op when `from` is absent
    fn replace_class(&self, from: &str, to: &str);
}

/// Busy record for one button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncActionState {
    pub target_id: String,
    pub pending: bool,
    pub original_label: String,
    /// Requests started from this button that have not settled yet
    pub in_flight: usize,
}

#[derive(Default)]
pub struct ActionTracker {
    states: RefCell<HashMap<String, AsyncActionState>>,
}

impl ActionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable the button and swap in `busy_label`
    pub fn begin(&self, button: &dyn ActionButton, busy_label: &str) {
        let target_id = button.target_id();
        {
            let mut states = self.states.borrow_mut();
            let state = states
                .entry(target_id.clone())
                .or_insert_with(|| AsyncActionState {
                    target_id,
                    pending: true,
                    original_label: button.label(),
                    in_flight: 0,
                });
            state.in_flight += 1;
        }
        button.set_disabled(true);
        button.set_label(busy_label);
    }

    /// Mark one request as settled.
    ///
    /// Returns true when it was the last one in flight for this button: the
    /// button is then re-enabled with its original label and the caller may
    /// apply its success mutation on top.
    pub fn settle(&self, button: &dyn ActionButton) -> bool {
        let target_id = button.target_id();
        let finished = {
            let mut states = self.states.borrow_mut();
            let Some(state) = states.get_mut(&target_id) else {
                return false;
            };
            if state.in_flight > 1 {
                state.in_flight -= 1;
                None
            } else {
                states.remove(&target_id)
            }
        };
        match finished {
            Some(state) => {
                button.set_label(&state.original_label);
                button.set_disabled(false);
                true
            }
            None => false,
        }
    }

    pub fn state(&self, target_id: &str) -> Option<AsyncActionState> {
        self.states.borrow().get(target_id).cloned()
    }
}
