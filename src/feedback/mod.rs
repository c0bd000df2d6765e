//! Transient UI feedback
//!
//! Everything the user sees while the dashboard talks to the backend:
//! - `toast.rs`: auto-dismissing notification banners
//! - `loading.rs`: the global loading overlay, nested across requests
//! - `action.rs`: busy state of the button that started a request

mod action;
mod loading;
mod toast;

pub use action::{ActionButton, ActionTracker, AsyncActionState};
pub use loading::LoadingIndicator;
pub use toast::{Notifier, ToastSurface};
