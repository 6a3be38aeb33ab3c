use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, Utc};

use crate::error::AppError;

/// Discovery surface of one WordPress site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub base_url: String,
    pub user_agent: String,
    /// REST endpoints, probed in order.
    pub discovery_endpoints: Vec<String>,
    /// Home, paginated index and yearly archive pages scanned by the harvester.
    pub scan_pages: Vec<String>,
    pub sitemaps: Vec<String>,
}

impl SiteConfig {
    /// Standard WordPress layout with yearly archives for the current year
    /// and the `archive_years - 1` years before it.
    pub fn wordpress(base_url: &str, user_agent: &str, archive_years: u32) -> Self {
        Self::wordpress_until(base_url, user_agent, Utc::now().year(), archive_years)
    }

    /// Same as [`SiteConfig::wordpress`] with an explicit most recent year.
    pub fn wordpress_until(
        base_url: &str,
        user_agent: &str,
        latest_year: i32,
        archive_years: u32,
    ) -> Self {
        let base = base_url.trim_end_matches('/').to_string();

        let discovery_endpoints = vec![
            format!("{base}/wp-json/wp/v2/posts"),
            format!("{base}/?rest_route=/wp/v2/posts"),
            format!("{base}/index.php?rest_route=/wp/v2/posts"),
        ];

        let mut scan_pages = vec![base.clone()];
        scan_pages.extend((2..=5).map(|n| format!("{base}/page/{n}/")));
        scan_pages.extend(
            (0..archive_years as i32).map(|back| format!("{base}/{}/", latest_year - back)),
        );

        let sitemaps = vec![
            format!("{base}/sitemap.xml"),
            format!("{base}/wp-sitemap.xml"),
        ];

        Self {
            base_url: base,
            user_agent: user_agent.to_string(),
            discovery_endpoints,
            scan_pages,
            sitemaps,
        }
    }

    /// Scan pages followed by sitemaps, the order the harvester visits them.
    pub fn harvest_urls(&self) -> impl Iterator<Item = &str> {
        self.scan_pages
            .iter()
            .chain(self.sitemaps.iter())
            .map(String::as_str)
    }
}

/// Per-request timeouts of each network stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub probe: Duration,
    pub api_page: Duration,
    pub scan: Duration,
    pub post: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(15),
            api_page: Duration::from_secs(15),
            scan: Duration::from_secs(30),
            post: Duration::from_secs(20),
        }
    }
}

/// Limits, pacing and output locations of one harvest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub per_page: u32,
    pub max_posts: usize,
    /// Hard cap on API pages regardless of `max_posts`.
    pub max_pages: u32,
    /// Delay between successive individual post fetches.
    pub request_delay: Duration,
    pub timeouts: Timeouts,
    pub corpus_path: PathBuf,
    pub ledger_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new(corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            per_page: 50,
            max_posts: 1000,
            max_pages: 100,
            request_delay: Duration::from_millis(1500),
            timeouts: Timeouts::default(),
            corpus_path: corpus_path.into(),
            ledger_dir: PathBuf::from("."),
        }
    }

    pub fn with_ledger_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ledger_dir = dir.into();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_max_posts(mut self, max_posts: usize) -> Self {
        self.max_posts = max_posts;
        self
    }

    /// Read overrides from the environment.
    ///
    /// - `SALTERIO_MAX_POSTS` (default 1000)
    /// - `SALTERIO_PER_PAGE` (default 50)
    /// - `SALTERIO_MAX_PAGES` (default 100)
    /// - `SALTERIO_REQUEST_DELAY_MS` (default 1500, zero allowed)
    /// - `SALTERIO_OUTPUT_DIR` (directory of corpus and ledger files)
    pub fn from_env(corpus_file: &str) -> Result<Self, AppError> {
        Self::from_lookup(corpus_file, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<L>(corpus_file: &str, lookup: L) -> Result<Self, AppError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let output_dir = lookup("SALTERIO_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = Self::new(output_dir.join(corpus_file)).with_ledger_dir(output_dir);

        if let Some(raw) = lookup("SALTERIO_MAX_POSTS") {
            config.max_posts = parse_positive("SALTERIO_MAX_POSTS", &raw)?;
        }
        if let Some(raw) = lookup("SALTERIO_PER_PAGE") {
            config.per_page = parse_positive("SALTERIO_PER_PAGE", &raw)?;
        }
        if let Some(raw) = lookup("SALTERIO_MAX_PAGES") {
            config.max_pages = parse_positive("SALTERIO_MAX_PAGES", &raw)?;
        }
        if let Some(raw) = lookup("SALTERIO_REQUEST_DELAY_MS") {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                AppError::ConfigError(format!(
                    "Invalid SALTERIO_REQUEST_DELAY_MS '{raw}': must be a non-negative integer"
                ))
            })?;
            config.request_delay = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let parsed: T = raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!("Invalid {key} '{raw}': must be a positive integer"))
    })?;
    if parsed == T::default() {
        return Err(AppError::ConfigError(format!("{key} must be at least 1")));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_wordpress_layout() {
        let site = SiteConfig::wordpress_until("https://blog.example/", "UA/1.0", 2024, 5);
        assert_eq!(site.base_url, "https://blog.example");
        assert_eq!(
            site.discovery_endpoints,
            vec![
                "https://blog.example/wp-json/wp/v2/posts",
                "https://blog.example/?rest_route=/wp/v2/posts",
                "https://blog.example/index.php?rest_route=/wp/v2/posts",
            ]
        );
        assert_eq!(site.scan_pages.len(), 1 + 4 + 5);
        assert_eq!(site.scan_pages[0], "https://blog.example");
        assert_eq!(site.scan_pages[4], "https://blog.example/page/5/");
        assert_eq!(site.scan_pages[5], "https://blog.example/2024/");
        assert_eq!(site.scan_pages[9], "https://blog.example/2020/");
        assert_eq!(site.harvest_urls().last(), Some("https://blog.example/wp-sitemap.xml"));
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::from_lookup("c.json", lookup_from(&[])).unwrap();
        assert_eq!(config.per_page, 50);
        assert_eq!(config.max_posts, 1000);
        assert_eq!(config.max_pages, 100);
        assert_eq!(config.request_delay, Duration::from_millis(1500));
        assert_eq!(config.corpus_path, PathBuf::from("./c.json"));
        assert_eq!(config.timeouts.scan, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::from_lookup(
            "c.json",
            lookup_from(&[
                ("SALTERIO_MAX_POSTS", "20"),
                ("SALTERIO_PER_PAGE", "10"),
                ("SALTERIO_REQUEST_DELAY_MS", "0"),
                ("SALTERIO_OUTPUT_DIR", "/data"),
            ]),
        )
        .unwrap();
        assert_eq!(config.max_posts, 20);
        assert_eq!(config.per_page, 10);
        assert_eq!(config.request_delay, Duration::ZERO);
        assert_eq!(config.corpus_path, PathBuf::from("/data/c.json"));
        assert_eq!(config.ledger_dir, PathBuf::from("/data"));
    }

    #[test]
    fn test_rejects_zero_and_garbage() {
        let err = PipelineConfig::from_lookup("c.json", lookup_from(&[("SALTERIO_PER_PAGE", "0")]))
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let err =
            PipelineConfig::from_lookup("c.json", lookup_from(&[("SALTERIO_MAX_POSTS", "many")]))
                .unwrap_err();
        assert!(err.to_string().contains("SALTERIO_MAX_POSTS"));
    }
}
