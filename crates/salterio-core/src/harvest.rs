//! Fallback discovery by scanning index, archive and sitemap pages.

use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;

use crate::config::SiteConfig;
use crate::error::AppError;
use crate::models::PostCandidate;
use crate::traits::Fetcher;
use crate::urls::normalize_url;

/// Result of one harvesting pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Deduplicated candidates, most recent first.
    pub candidates: Vec<PostCandidate>,
    pub pages_scanned: usize,
    /// Pages that failed with a transport error.
    pub pages_unreachable: usize,
    /// Pages skipped for any reason.
    pub pages_failed: usize,
}

impl HarvestReport {
    /// True when every page failed at the transport level.
    pub fn all_unreachable(&self) -> bool {
        self.pages_scanned > 0 && self.pages_unreachable == self.pages_scanned
    }
}

/// Scans the configured pages of one site for dated post URLs.
#[derive(Clone)]
pub struct LinkHarvester<F: Fetcher> {
    fetcher: F,
    timeout: Duration,
    sitemap_loc: Regex,
    html_patterns: Vec<Regex>,
    /// Shape of a normalized post permalink.
    permalink: Regex,
}

impl<F: Fetcher> LinkHarvester<F> {
    pub fn new(fetcher: F, base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base = regex::escape(base_url.trim_end_matches('/'));
        let post = format!(r"{base}/\d{{4}}/\d{{2}}/\d{{2}}/");

        let compile = |pattern: String| {
            Regex::new(&pattern)
                .map_err(|e| AppError::ConfigError(format!("Invalid harvest pattern: {e}")))
        };

        let sitemap_loc = compile(format!(r"^{post}[^<\s]+$"))?;
        // Ordered: bare URL, anchor href, quoted URL, anchor with other attributes.
        let html_patterns = vec![
            compile(format!(r#"{post}[^/\s"'<>]+/?"#))?,
            compile(format!(r#"href="({post}[^/"]+/?)""#))?,
            compile(format!(r#""({post}[^/"]+/?)""#))?,
            compile(format!(r#"<a[^>]+href="({post}[^/"]+/?)""#))?,
        ];
        let permalink = compile(format!(r"^{post}[^/]+$"))?;

        Ok(Self {
            fetcher,
            timeout,
            sitemap_loc,
            html_patterns,
            permalink,
        })
    }

    /// Scan every page of `site`; a failing page is logged and skipped.
    pub async fn harvest(&self, site: &SiteConfig) -> HarvestReport {
        let mut seen: HashSet<PostCandidate> = HashSet::new();
        let mut report = HarvestReport::default();

        for url in site.harvest_urls() {
            report.pages_scanned += 1;

            let resp = match self.fetcher.fetch(url, self.timeout).await {
                Ok(resp) => resp,
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Scan page failed");
                    report.pages_failed += 1;
                    if e.is_transport() {
                        report.pages_unreachable += 1;
                    }
                    continue;
                }
            };

            let body = match resp.into_success_body() {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Scan page skipped");
                    report.pages_failed += 1;
                    if e.is_transport() {
                        report.pages_unreachable += 1;
                    }
                    continue;
                }
            };

            let found = if is_sitemap(url, &body) {
                match self.sitemap_urls(&body) {
                    Ok(found) => found,
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "Unreadable sitemap");
                        report.pages_failed += 1;
                        continue;
                    }
                }
            } else {
                self.html_urls(&body)
            };

            let before = seen.len();
            seen.extend(found.iter().map(|u| PostCandidate::new(u)));
            tracing::info!(
                url = %url,
                matched = found.len(),
                new = seen.len() - before,
                "Scanned page"
            );
        }

        report.candidates = sort_recent_first(seen);
        tracing::info!(count = report.candidates.len(), "Harvested candidate URLs");
        report
    }

    /// `<loc>` entries of a sitemap that look like dated posts.
    pub fn sitemap_urls(&self, xml: &str) -> Result<Vec<String>, AppError> {
        Ok(parse_locs(xml)?
            .into_iter()
            .map(|loc| loc.trim().to_string())
            .filter(|loc| self.sitemap_loc.is_match(loc))
            .collect())
    }

    /// Union of every pattern's matches, in pattern order. Matches that do
    /// not normalize to a single-segment post permalink are dropped.
    pub fn html_urls(&self, html: &str) -> Vec<String> {
        let mut urls = Vec::new();
        for pattern in &self.html_patterns {
            for caps in pattern.captures_iter(html) {
                let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                if self.permalink.is_match(&normalize_url(m.as_str())) {
                    urls.push(m.as_str().to_string());
                }
            }
        }
        urls
    }
}

fn is_sitemap(url: &str, body: &str) -> bool {
    let head: String = body.chars().take(100).collect();
    url.ends_with(".xml") && head.to_lowercase().contains("xml")
}

/// Every `<loc>` text of a urlset or sitemap index.
fn parse_locs(xml: &str) -> Result<Vec<String>, AppError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    let mut locs = Vec::new();
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) if e.name().as_ref() == b"loc" => {
                in_loc = true;
            }
            Ok(quick_xml::events::Event::Text(e)) if in_loc => {
                let text = e
                    .unescape()
                    .map_err(|e| AppError::ParseError(format!("sitemap: {e}")))?;
                locs.push(text.to_string());
            }
            Ok(quick_xml::events::Event::End(e)) if e.name().as_ref() == b"loc" => {
                in_loc = false;
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(AppError::ParseError(format!("sitemap: {e}"))),
            _ => {}
        }
        buf.clear();
    }
    Ok(locs)
}

/// By embedded date descending, then URL descending.
fn sort_recent_first(candidates: HashSet<PostCandidate>) -> Vec<PostCandidate> {
    let mut sorted: Vec<PostCandidate> = candidates.into_iter().collect();
    sorted.sort_by(|a, b| {
        b.date_key()
            .cmp(&a.date_key())
            .then_with(|| b.normalized_url.cmp(&a.normalized_url))
    });
    sorted
}
