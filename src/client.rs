//! Dashboard API client
//!
//! Same-origin JSON calls to the panel backend:
//! - `/api/toggle_product/{id}`
//! - `/api/post_now/{id}`
//! - `/api/analytics?days={n}`
//!
//! Failures are shown to the user here, once, and still returned so the
//! caller can put its own UI back in order.

use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;

use crate::error::{DashboardError, Result};
use crate::feedback::Notifier;
use crate::types::{AnalyticsReport, PostOutcome, Severity, ToggleOutcome};

/// Days requested by `get_analytics` when the caller gives none
pub const DEFAULT_ANALYTICS_DAYS: u32 = 7;

const DEFAULT_CONTENT_TYPE: (&str, &str) = ("Content-Type", "application/json");

/// HTTP method subset used by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Caller-supplied request options; headers override the defaults by name
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

/// Fully resolved request handed to the transport
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body as received
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Moves requests over the wire
pub trait Transport {
    fn send(&self, request: ApiRequest) -> LocalBoxFuture<'static, Result<RawResponse>>;
}

/// reqwest-backed transport (browser fetch on wasm32)
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> LocalBoxFuture<'static, Result<RawResponse>> {
        let client = self.client.clone();
        async move {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
            };
            let mut builder = client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(RawResponse { status, body })
        }
        .boxed_local()
    }
}

/// API client bound to one origin
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn Transport>,
    notifier: Notifier,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: Rc<dyn Transport>, notifier: Notifier) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            notifier,
        }
    }

    /// Toggle product active status
    pub async fn toggle_product(&self, product_id: u64) -> Result<ToggleOutcome> {
        self.request(&format!("/api/toggle_product/{product_id}"), RequestOptions::default())
            .await
    }

    /// Create posts for a product on every active network
    pub async fn post_now(&self, product_id: u64) -> Result<PostOutcome> {
        self.request(&format!("/api/post_now/{product_id}"), RequestOptions::default())
            .await
    }

    /// Analytics for the last `days` days (7 when `None`)
    pub async fn get_analytics(&self, days: Option<u32>) -> Result<AnalyticsReport> {
        let days = days.unwrap_or(DEFAULT_ANALYTICS_DAYS);
        self.request(&format!("/api/analytics?days={days}"), RequestOptions::default())
            .await
    }

    /// Perform a request, notifying the user on any failure
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        match self.fetch_quiet(endpoint, options).await {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(endpoint, error = %err, "API request failed");
                self.notifier
                    .notify(format!("Erro na API: {err}"), Severity::Danger);
                Err(err)
            }
        }
    }

    /// Perform a request without user-facing feedback (background polling)
    pub async fn fetch_quiet<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let request = self.build_request(endpoint, options)?;
        tracing::debug!(
            method = ?request.method,
            url = %request.url,
            request_id = request.header("X-Request-Id").unwrap_or_default(),
            "API request"
        );

        let response = self.transport.send(request).await?;
        Self::handle_response(response)
    }

    fn build_request(&self, endpoint: &str, options: RequestOptions) -> Result<ApiRequest> {
        let mut headers = vec![(
            DEFAULT_CONTENT_TYPE.0.to_string(),
            DEFAULT_CONTENT_TYPE.1.to_string(),
        )];
        for (name, value) in options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }
        headers.push(("X-Request-Id".to_string(), uuid::Uuid::new_v4().to_string()));

        let body = options.body.as_ref().map(serde_json::to_string).transpose()?;

        Ok(ApiRequest {
            method: options.method.unwrap_or(Method::Get),
            url: format!("{}{endpoint}", self.base_url),
            headers,
            body,
        })
    }

    /// Check status and decode the body
    fn handle_response<T: DeserializeOwned>(response: RawResponse) -> Result<T> {
        let status = response.status;
        let Ok(body) = serde_json::from_str::<serde_json::Value>(&response.body) else {
            return Err(DashboardError::api(Some(status), None));
        };
        let message = || body.get("message").and_then(serde_json::Value::as_str);

        if !(200..300).contains(&status) {
            return Err(DashboardError::api(Some(status), message()));
        }

        // A 2xx body of the wrong shape is reported like an error body
        T::deserialize(&body).map_err(|err| {
            tracing::debug!(status, error = %err, "unexpected response shape");
            DashboardError::api(Some(status), message())
        })
    }
}
