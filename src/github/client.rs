//! GitHub API client
//!
//! Minimal authenticated client for the GitHub GraphQL and REST endpoints.

use chrono::{DateTime, Utc};
use ohno::app_err;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;

const LOG_TARGET: &str = "    client";

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Result of a GitHub API call
#[derive(Debug)]
pub enum ApiResult<T> {
    /// Request succeeded and the response parsed
    Success(T),

    /// Rate limited - further requests of this kind should be suppressed
    RateLimited(Option<RateLimitInfo>),

    /// The requested resource was not found (404)
    NotFound,

    /// Request failed - the resource is skipped, not retried
    Failed(ohno::AppError),
}

impl<T> ApiResult<T> {
    /// Map the success payload, leaving other variants untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        match self {
            Self::Success(data) => ApiResult::Success(f(data)),
            Self::RateLimited(info) => ApiResult::RateLimited(info),
            Self::NotFound => ApiResult::NotFound,
            Self::Failed(e) => ApiResult::Failed(e),
        }
    }
}

/// GraphQL response envelope; `data` is absent when the query failed
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// Authenticated GitHub API client
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a new client with an optional personal access token and base URL
    pub fn new(token: Option<&str>, base_url: impl Into<String>) -> crate::Result<Self> {
        use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};

        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        }

        let client = reqwest::Client::builder().user_agent("gh-stats").default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a REST resource and parse its JSON body
    pub async fn rest<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = format!("{}{path}", self.base_url);

        match classify(self.client.get(&url).send().await) {
            ApiResult::Success(resp) => match resp.json::<T>().await {
                Ok(data) => ApiResult::Success(data),
                Err(e) => ApiResult::Failed(e.into()),
            },
            ApiResult::RateLimited(info) => ApiResult::RateLimited(info),
            ApiResult::NotFound => ApiResult::NotFound,
            ApiResult::Failed(e) => ApiResult::Failed(e),
        }
    }

    /// Execute a GraphQL query and parse the `data` portion of the envelope
    pub async fn graphql<T: DeserializeOwned>(&self, query: &str) -> ApiResult<T> {
        let url = format!("{}/graphql", self.base_url);
        let body = serde_json::json!({ "query": query });

        match classify(self.client.post(&url).json(&body).send().await) {
            ApiResult::Success(resp) => match resp.json::<Envelope<T>>().await {
                Ok(Envelope { data: Some(data) }) => ApiResult::Success(data),
                Ok(Envelope { data: None }) => ApiResult::Failed(app_err!("GraphQL response carried no data")),
                Err(e) => ApiResult::Failed(e.into()),
            },
            ApiResult::RateLimited(info) => ApiResult::RateLimited(info),
            ApiResult::NotFound => ApiResult::NotFound,
            ApiResult::Failed(e) => ApiResult::Failed(e),
        }
    }
}

/// Classify a raw HTTP response into success, rate-limited, not-found, or failed
fn classify(result: Result<reqwest::Response, reqwest::Error>) -> ApiResult<reqwest::Response> {
    let resp = match result {
        Ok(r) => r,
        Err(e) => return ApiResult::Failed(e.into()),
    };

    let rate_limit = extract_rate_limit_from_headers(resp.headers());

    let status = resp.status();
    if status == reqwest::StatusCode::ACCEPTED {
        // GitHub answers 202 while it computes statistics in the background
        return ApiResult::Failed(app_err!("statistics are still being assembled upstream"));
    }

    if status.is_success() {
        return ApiResult::Success(resp);
    }

    let status_code = status.as_u16();
    if matches!(status_code, 403 | 429) {
        if let Some(rl) = &rate_limit {
            log::debug!(target: LOG_TARGET, "rate limited: {} remaining, resets at {}", rl.remaining, rl.reset_at);
        }
        return ApiResult::RateLimited(rate_limit);
    }

    if status_code == 404 {
        return ApiResult::NotFound;
    }

    let error = resp.error_for_status().expect_err("status is not successful at this point");
    ApiResult::Failed(error.into())
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;
    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;
    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}
