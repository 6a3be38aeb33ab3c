//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit and integration
//! tests. All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AppError;
use crate::events::{HarvestEvent, HarvestReporter};
use crate::traits::{Cleaner, FetchResponse, Fetcher, PageParser, ParsedPage};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Reply {
    Response(FetchResponse),
    Timeout(u64),
    Network(String),
    Http(String),
}

/// Mock fetcher answering per URL. Unknown URLs get a 404.
///
/// Clones share their routes and call log.
#[derive(Clone, Default)]
pub struct MockFetcher {
    routes: Arc<Mutex<HashMap<String, Reply>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, url: &str, response: FetchResponse) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Reply::Response(response));
        self
    }

    /// Answer `url` with a transport error. Only `Timeout`, `NetworkError`
    /// and `HttpError` are meaningful here; anything else becomes `HttpError`.
    pub fn with_failure(self, url: &str, error: AppError) -> Self {
        let reply = match error {
            AppError::Timeout(secs) => Reply::Timeout(secs),
            AppError::NetworkError(msg) => Reply::Network(msg),
            other => Reply::Http(other.to_string()),
        };
        self.routes.lock().unwrap().insert(url.to_string(), reply);
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<FetchResponse, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        let reply = self.routes.lock().unwrap().get(url).cloned();
        match reply {
            Some(Reply::Response(resp)) => Ok(resp),
            Some(Reply::Timeout(secs)) => Err(AppError::Timeout(secs)),
            Some(Reply::Network(msg)) => Err(AppError::NetworkError(msg)),
            Some(Reply::Http(msg)) => Err(AppError::HttpError(msg)),
            None => Ok(FetchResponse::new(404, "")),
        }
    }
}

// ---------------------------------------------------------------------------
// MockCleaner
// ---------------------------------------------------------------------------

/// Replaces every `<...>` tag with a space.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockCleaner;

impl Cleaner for MockCleaner {
    fn clean(&self, html: &str) -> Result<String, AppError> {
        let mut out = String::with_capacity(html.len());
        let mut in_tag = false;
        for ch in html.chars() {
            match ch {
                '<' => in_tag = true,
                '>' if in_tag => {
                    in_tag = false;
                    out.push(' ');
                }
                _ if !in_tag => out.push(ch),
                _ => {}
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// MockPageParser
// ---------------------------------------------------------------------------

/// First line is the title, the remaining lines the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPageParser;

impl PageParser for MockPageParser {
    fn parse(&self, html: &str) -> Result<ParsedPage, AppError> {
        let (first, rest) = html.split_once('\n').unwrap_or((html, ""));
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Ok(ParsedPage {
            title: non_empty(first),
            body_text: non_empty(rest),
            full_text: html.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Keeps failed URLs and progress snapshots for assertions.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    failed: Arc<Mutex<Vec<String>>>,
    progress: Arc<Mutex<Vec<(usize, usize, usize, usize)>>>,
}

impl RecordingReporter {
    pub fn failed(&self) -> Vec<String> {
        self.failed.lock().unwrap().clone()
    }

    /// `(processed, total, succeeded, failed)` per progress event.
    pub fn progress(&self) -> Vec<(usize, usize, usize, usize)> {
        self.progress.lock().unwrap().clone()
    }
}

impl HarvestReporter for RecordingReporter {
    fn report(&self, event: HarvestEvent<'_>) {
        match event {
            HarvestEvent::PostFailed { url, .. } => {
                self.failed.lock().unwrap().push(url.to_string());
            }
            HarvestEvent::Progress {
                processed,
                total,
                succeeded,
                failed,
            } => {
                self.progress
                    .lock()
                    .unwrap()
                    .push((processed, total, succeeded, failed));
            }
            _ => {}
        }
    }
}
