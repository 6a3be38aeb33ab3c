use std::future::Future;
use std::time::Duration;

use crate::error::AppError;

/// Status and body of a completed HTTP exchange.
///
/// Any status is a completed exchange; only transport failures
/// (timeout, connection, malformed response) are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body for a 2xx response, `HttpStatus` otherwise.
    pub fn into_success_body(self) -> Result<String, AppError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(AppError::HttpStatus(self.status))
        }
    }
}

/// Issues a GET with a per-request timeout.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<FetchResponse, AppError>> + Send;
}

/// Reduces a rendered HTML fragment to plain text.
pub trait Cleaner: Send + Sync + Clone {
    fn clean(&self, html: &str) -> Result<String, AppError>;
}

/// Fields recovered from a full post page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// First hit of the title selector chain.
    pub title: Option<String>,
    /// Text of the first matching content container.
    pub body_text: Option<String>,
    /// Visible text of the whole page, used for citation search.
    pub full_text: String,
}

/// Heuristic DOM selection over a full post page.
pub trait PageParser: Send + Sync + Clone {
    fn parse(&self, html: &str) -> Result<ParsedPage, AppError>;
}
