use std::time::Duration;

use reqwest::Client;
use salterio_core::error::AppError;
use salterio_core::traits::{FetchResponse, Fetcher};
use url::Url;

/// HTTP fetcher using reqwest.
///
/// Sends every request with the site's User-Agent and the timeout the
/// caller passes per request. Any HTTP status is returned to the caller;
/// only transport failures are errors.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchResponse, AppError> {
        validate_scheme(url)?;
        tracing::debug!(url = %url, timeout_secs = timeout.as_secs(), "GET");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport_error(e, timeout))?;

        Ok(FetchResponse::new(status, body))
    }
}

fn map_transport_error(e: reqwest::Error, timeout: Duration) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout.as_secs())
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {e}"))
    } else {
        AppError::HttpError(e.to_string())
    }
}

/// Only `http` and `https` URLs are fetched.
fn validate_scheme(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::HttpError(format!("Invalid URL {url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AppError::HttpError(format!(
            "URL scheme '{scheme}' is not allowed (only http/https)"
        ))),
    }
}
