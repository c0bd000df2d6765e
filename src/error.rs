//! Error types for the dashboard controller
//!
//! Uses thiserror for ergonomic error definitions.
//! Every failure is recoverable: none of these ever tears down the page.

use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Message used when a failed response carries no `message` of its own
pub const DEFAULT_API_FAILURE: &str = "API request failed";

/// Dashboard errors
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Backend answered with a non-2xx status, a non-JSON body, or `success: false`.
    /// Displays as the bare message so it can be shown to the user verbatim.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    /// Transport-level failures (DNS, connection reset, CORS, ...)
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// DOM manipulation failed in the host page
    #[error("DOM error: {0}")]
    Dom(String),

    /// Timestamp could not be parsed for display
    #[error("Invalid date: {0}")]
    Date(String),

    /// Clipboard write rejected by the browser
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl DashboardError {
    /// Build an API failure from an optional server-provided message
    pub fn api(status: Option<u16>, message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_API_FAILURE);
        DashboardError::Api {
            status,
            message: message.to_string(),
        }
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Http(err.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for DashboardError {
    fn from(err: wasm_bindgen::JsValue) -> Self {
        DashboardError::Dom(crate::web::js_error_message(&err))
    }
}

#[cfg(target_arch = "wasm32")]
impl From<DashboardError> for wasm_bindgen::JsValue {
    fn from(err: DashboardError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_displays_server_message() {
        let err = DashboardError::api(Some(404), Some("not found"));
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn test_api_error_falls_back_to_generic_message() {
        let err = DashboardError::api(Some(500), None);
        assert_eq!(err.to_string(), DEFAULT_API_FAILURE);

        let blank = DashboardError::api(Some(500), Some("   "));
        assert_eq!(blank.to_string(), DEFAULT_API_FAILURE);
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: DashboardError = json_err.into();
        assert!(matches!(err, DashboardError::Json(_)));
    }
}
