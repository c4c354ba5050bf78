//! Authenticated HTTP client for the Glip REST API
//!
//! Wraps reqwest::Client with bearer-token injection, response
//! classification, and rate-limit telemetry handling. Token freshness is
//! the session manager's job; a client always carries a token that was
//! fresh when it was handed out.

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use super::retry::{with_backoff, RetryPolicy};
use super::GlipApi;
use crate::error::ApiError;
use crate::models::{DateRange, Page, Person, Post, Room};

/// Records requested per page, the provider maximum.
const RECORD_COUNT: u32 = 100;

/// Remaining-quota level at or below which the client pauses proactively.
const RATE_LIMIT_LOW_WATER: u64 = 1;

/// Authenticated, rate-limit-aware client for one session's credentials.
#[derive(Debug)]
pub struct GlipClient {
    http: reqwest::Client,
    base: String,
    access_token: String,
    policy: RetryPolicy,
}

impl GlipClient {
    pub fn new(server_url: &str, access_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: server_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            policy: RetryPolicy::default(),
        }
    }

    /// Issue one GET and decode the JSON body.
    ///
    /// Failures are classified into `ApiError` variants here, before any
    /// retry logic sees them. On success, if the response says the quota is
    /// nearly spent, sleeps out the remainder of the rate-limit window so a
    /// loop over many rooms pauses pre-emptively instead of tripping a 429.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base, path);
        tracing::debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = header_secs(resp.headers(), "Retry-After");
            return Err(ApiError::RateLimited(retry_after));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::AccessDenied {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                url,
                body,
            });
        }

        let pause = rate_limit_pause(resp.headers());

        let value = resp
            .json::<T>()
            .await
            .map_err(|source| ApiError::Transport { url, source })?;

        if let Some(window) = pause {
            tracing::info!(
                "rate-limit quota nearly spent, pausing {}s before continuing",
                window.as_secs()
            );
            tokio::time::sleep(window).await;
        }

        Ok(value)
    }
}

/// Remaining window to wait out when the quota headers say we are at or
/// below the low-water mark.
fn rate_limit_pause(headers: &HeaderMap) -> Option<std::time::Duration> {
    let remaining = header_secs(headers, "X-Rate-Limit-Remaining")?;
    if remaining > RATE_LIMIT_LOW_WATER {
        return None;
    }
    let window = header_secs(headers, "X-Rate-Limit-Window")?;
    Some(std::time::Duration::from_secs(window))
}

fn header_secs(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

impl GlipApi for GlipClient {
    async fn groups_page(&self, page_token: Option<String>) -> Result<Page<Room>, ApiError> {
        let mut query = vec![("recordCount".to_string(), RECORD_COUNT.to_string())];
        if let Some(token) = page_token {
            query.push(("pageToken".to_string(), token));
        }
        with_backoff(self.policy, || {
            self.get_json("/restapi/v1.0/glip/groups", &query)
        })
        .await
    }

    async fn posts_page(
        &self,
        room_id: &str,
        range: &DateRange,
        page_token: Option<String>,
    ) -> Result<Page<Post>, ApiError> {
        let path = format!("/restapi/v1.0/glip/groups/{}/posts", room_id);
        let mut query = vec![
            ("recordCount".to_string(), RECORD_COUNT.to_string()),
            ("dateFrom".to_string(), range.date_from()),
            ("dateTo".to_string(), range.date_to()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken".to_string(), token));
        }
        with_backoff(self.policy, || self.get_json(&path, &query)).await
    }

    async fn person(&self, person_id: &str) -> Result<Person, ApiError> {
        let path = format!("/restapi/v1.0/glip/persons/{}", person_id);
        with_backoff(self.policy, || self.get_json(&path, &[])).await
    }
}
