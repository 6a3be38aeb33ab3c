use std::collections::HashSet;

use crate::models::{ApiPost, ContentRecord, PostCandidate};
use crate::urls::normalize_url;

/// Normalized links already present in a persisted corpus.
///
/// A URL seen by any earlier run is never fetched or added again, which is
/// what makes an interrupted run safe to repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateMerger {
    seen: HashSet<String>,
}

impl StateMerger {
    pub fn from_records(records: &[ContentRecord]) -> Self {
        let seen = records
            .iter()
            .filter(|r| !r.link.is_empty())
            .map(|r| normalize_url(&r.link))
            .collect();
        Self { seen }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(&normalize_url(url))
    }

    /// Candidates not yet in the corpus, order preserved.
    pub fn new_candidates(&self, candidates: Vec<PostCandidate>) -> Vec<PostCandidate> {
        candidates
            .into_iter()
            .filter(|c| !self.seen.contains(&c.normalized_url))
            .collect()
    }

    /// API posts whose permalink is not yet in the corpus, order preserved.
    pub fn new_posts(&self, posts: Vec<ApiPost>) -> Vec<ApiPost> {
        posts
            .into_iter()
            .filter(|p| !self.contains(p.permalink()))
            .collect()
    }

    /// Record a link accepted during the current run.
    pub fn mark(&mut self, url: &str) -> bool {
        self.seen.insert(normalize_url(url))
    }
}
