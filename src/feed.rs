//! Background data feed
//!
//! Engagement counters, post statuses and service health come from here. A
//! feed may serve only some of them; `None` means "not available" and the
//! matching periodic task does nothing.

use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::client::{ApiClient, RequestOptions};
use crate::config::Config;
use crate::error::Result;
use crate::types::{EngagementSample, PostStatusUpdate, ServiceHealth};

pub trait DataFeed {
    fn engagement(&self) -> Option<LocalBoxFuture<'static, Result<Vec<EngagementSample>>>>;
    fn post_statuses(
        &self,
        post_ids: Vec<String>,
    ) -> Option<LocalBoxFuture<'static, Result<Vec<PostStatusUpdate>>>>;
    fn health(&self) -> Option<LocalBoxFuture<'static, Result<Vec<ServiceHealth>>>>;
}

/// Feed backed by configured JSON endpoints on the panel backend.
///
/// Uses quiet requests: a failed poll is logged, not shown as a toast.
pub struct HttpFeed {
    api: ApiClient,
    engagement_endpoint: Option<String>,
    post_status_endpoint: Option<String>,
    health_endpoint: Option<String>,
}

impl HttpFeed {
    pub fn new(api: ApiClient, config: &Config) -> Self {
        Self {
            api,
            engagement_endpoint: config.engagement_endpoint.clone(),
            post_status_endpoint: config.post_status_endpoint.clone(),
            health_endpoint: config.health_endpoint.clone(),
        }
    }

    /// Whether any endpoint is configured at all
    pub fn is_configured(&self) -> bool {
        self.engagement_endpoint.is_some()
            || self.post_status_endpoint.is_some()
            || self.health_endpoint.is_some()
    }
}

impl DataFeed for HttpFeed {
    fn engagement(&self) -> Option<LocalBoxFuture<'static, Result<Vec<EngagementSample>>>> {
        let endpoint = self.engagement_endpoint.clone()?;
        let api = self.api.clone();
        Some(
            async move {
                api.fetch_quiet::<Vec<EngagementSample>>(&endpoint, RequestOptions::default())
                    .await
            }
            .boxed_local(),
        )
    }

    fn post_statuses(
        &self,
        post_ids: Vec<String>,
    ) -> Option<LocalBoxFuture<'static, Result<Vec<PostStatusUpdate>>>> {
        let endpoint = self.post_status_endpoint.clone()?;
        let api = self.api.clone();
        Some(
            async move {
                let separator = if endpoint.contains('?') { '&' } else { '?' };
                let url = format!("{endpoint}{separator}ids={}", post_ids.join(","));
                api.fetch_quiet::<Vec<PostStatusUpdate>>(&url, RequestOptions::default())
                    .await
            }
            .boxed_local(),
        )
    }

    fn health(&self) -> Option<LocalBoxFuture<'static, Result<Vec<ServiceHealth>>>> {
        let endpoint = self.health_endpoint.clone()?;
        let api = self.api.clone();
        Some(
            async move {
                api.fetch_quiet::<Vec<ServiceHealth>>(&endpoint, RequestOptions::default())
                    .await
            }
            .boxed_local(),
        )
    }
}
