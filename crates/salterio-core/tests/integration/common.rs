use std::path::Path;
use std::time::Duration;

use salterio_core::testutil::{MockCleaner, MockFetcher, MockPageParser};
use salterio_core::{ContentDomain, HarvestPipeline, PipelineConfig, SiteConfig};

pub const BASE: &str = "https://diegojavier.example";

pub fn site() -> SiteConfig {
    SiteConfig::wordpress_until(BASE, "salterio-tests/1.0", 2024, 2)
}

pub fn contemplations(
    fetcher: MockFetcher,
    dir: &Path,
) -> HarvestPipeline<MockFetcher, MockCleaner, MockPageParser> {
    let profile = ContentDomain::Contemplations.profile();
    let config = PipelineConfig::new(dir.join(profile.corpus_file))
        .with_ledger_dir(dir)
        .with_request_delay(Duration::ZERO);
    HarvestPipeline::new(fetcher, MockCleaner, MockPageParser, site(), profile, config)
}

/// Post page in the shape `MockPageParser` reads: title line, then body.
pub fn post_page(title: &str, body: &str) -> String {
    format!("{title}\n{body}")
}

pub fn api_post(id: u64, slug: &str, title: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": {"rendered": title},
        "content": {"rendered": content},
        "excerpt": {"rendered": ""},
        "link": format!("{BASE}/2024/03/{:02}/{slug}/", id % 28 + 1),
        "guid": {"rendered": format!("{BASE}/?p={id}")}
    })
}

/// Files in `dir` whose name starts with `prefix`.
pub fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort();
    names
}
