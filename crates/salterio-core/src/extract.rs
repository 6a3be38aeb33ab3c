use std::time::Duration;

use crate::models::{ContentFormat, RawPost, derive_source_id};
use crate::text::{AnchorMode, extract_page_citations, summarize};
use crate::traits::{Fetcher, PageParser};
use crate::urls::{normalize_url, post_date_slug};

/// Title used when no heading or `<title>` is found.
pub const UNTITLED: &str = "Sin título";

/// Result of extracting one post page. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    Extracted(RawPost),
    Failed { url: String, reason: String },
}

/// Fetches a single post page and recovers its fields.
#[derive(Clone)]
pub struct PostExtractor<F: Fetcher, P: PageParser> {
    fetcher: F,
    parser: P,
    timeout: Duration,
    anchors: &'static [&'static str],
    anchor_mode: AnchorMode,
}

impl<F: Fetcher, P: PageParser> PostExtractor<F, P> {
    pub fn new(
        fetcher: F,
        parser: P,
        timeout: Duration,
        anchors: &'static [&'static str],
        anchor_mode: AnchorMode,
    ) -> Self {
        Self {
            fetcher,
            parser,
            timeout,
            anchors,
            anchor_mode,
        }
    }

    pub async fn extract(&self, url: &str) -> PostOutcome {
        let failed = |reason: String| PostOutcome::Failed {
            url: url.to_string(),
            reason,
        };

        let html = match self.fetcher.fetch(url, self.timeout).await {
            Ok(resp) => match resp.into_success_body() {
                Ok(body) => body,
                Err(e) => return failed(e.to_string()),
            },
            Err(e) => return failed(e.to_string()),
        };

        let page = match self.parser.parse(&html) {
            Ok(page) => page,
            Err(e) => return failed(e.to_string()),
        };

        let body = match page.body_text {
            Some(body) if !body.trim().is_empty() => body,
            _ => return failed("no content container".to_string()),
        };

        let title = page
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        let citations = extract_page_citations(&page.full_text);
        let reading_reference_hint = (!citations.is_empty()).then(|| citations.join("; "));

        tracing::debug!(url = %url, title = %title, citations = citations.len(), "Post extracted");

        PostOutcome::Extracted(RawPost {
            source_id: source_id_for(url),
            url: url.to_string(),
            raw_title: title,
            excerpt: Some(summarize(&body, self.anchors, self.anchor_mode)),
            raw_content_html: body,
            format: ContentFormat::Text,
            reading_reference_hint,
        })
    }
}

/// Id of a scraped post, stable across runs for the same URL.
pub fn source_id_for(url: &str) -> u64 {
    match post_date_slug(url) {
        Some((date, slug)) => derive_source_id(&date, &slug),
        None => derive_source_id("", &normalize_url(url)),
    }
}
