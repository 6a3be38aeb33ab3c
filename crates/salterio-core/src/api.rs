//! REST discovery: endpoint probing and pagination.

use std::time::Duration;

use crate::error::AppError;
use crate::models::ApiPost;
use crate::traits::Fetcher;
use crate::urls::with_query;

/// Result of probing the discovery endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// First endpoint answering 200 with a JSON body.
    Found(String),
    /// No endpoint qualified. Triggers link harvesting.
    Unavailable,
}

/// Finds the first live REST endpoint of a site.
#[derive(Clone)]
pub struct EndpointProbe<F: Fetcher> {
    fetcher: F,
    timeout: Duration,
}

impl<F: Fetcher> EndpointProbe<F> {
    pub fn new(fetcher: F, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    pub async fn probe(&self, endpoints: &[String]) -> ProbeOutcome {
        for endpoint in endpoints {
            match self.fetcher.fetch(endpoint, self.timeout).await {
                Ok(resp) if resp.status == 200 => {
                    if serde_json::from_str::<serde_json::Value>(&resp.body).is_ok() {
                        tracing::info!(endpoint = %endpoint, "Discovery endpoint available");
                        return ProbeOutcome::Found(endpoint.clone());
                    }
                    tracing::debug!(endpoint = %endpoint, "Endpoint answered 200 without JSON");
                }
                Ok(resp) => {
                    tracing::debug!(endpoint = %endpoint, status = resp.status, "Endpoint rejected");
                }
                Err(e) => {
                    tracing::debug!(endpoint = %endpoint, error = %e, "Endpoint unreachable");
                }
            }
        }
        tracing::info!("No discovery endpoint available");
        ProbeOutcome::Unavailable
    }
}

/// URL of one page of published posts.
pub fn page_url(endpoint: &str, page: u32, per_page: u32) -> Result<String, AppError> {
    with_query(
        endpoint,
        &[
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("status", "publish".to_string()),
        ],
    )
    .ok_or_else(|| AppError::ConfigError(format!("Invalid endpoint URL: {endpoint}")))
}

/// Walks a REST endpoint page by page.
#[derive(Clone)]
pub struct PaginatedFetcher<F: Fetcher> {
    fetcher: F,
    per_page: u32,
    max_pages: u32,
    timeout: Duration,
}

impl<F: Fetcher> PaginatedFetcher<F> {
    pub fn new(fetcher: F, per_page: u32, max_pages: u32, timeout: Duration) -> Self {
        Self {
            fetcher,
            per_page,
            max_pages,
            timeout,
        }
    }

    /// Collect up to `max_posts` posts.
    ///
    /// Stops on 404, on an empty page, on the page cap, or at the first
    /// failed page. Posts gathered before a failure are kept.
    pub async fn fetch_all(&self, endpoint: &str, max_posts: usize) -> Vec<ApiPost> {
        let mut posts: Vec<ApiPost> = Vec::new();

        for page in 1..=self.max_pages {
            if posts.len() >= max_posts {
                break;
            }

            let url = match page_url(endpoint, page, self.per_page) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot paginate endpoint");
                    break;
                }
            };

            let resp = match self.fetcher.fetch(&url, self.timeout).await {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!(page, error = %e, "Page request failed, keeping collected posts");
                    break;
                }
            };

            if resp.status == 404 {
                tracing::debug!(page, "No more pages");
                break;
            }

            let body = match resp.into_success_body() {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(page, error = %e, "Page request failed, keeping collected posts");
                    break;
                }
            };

            if body.trim().is_empty() {
                break;
            }

            let page_posts: Vec<ApiPost> = match serde_json::from_str(&body) {
                Ok(page_posts) => page_posts,
                Err(e) => {
                    tracing::warn!(page, error = %e, "Malformed page payload, keeping collected posts");
                    break;
                }
            };

            if page_posts.is_empty() {
                tracing::debug!(page, "Empty page");
                break;
            }

            tracing::info!(page, count = page_posts.len(), "Fetched API page");
            posts.extend(page_posts);
        }

        posts.truncate(max_posts);
        posts
    }
}
