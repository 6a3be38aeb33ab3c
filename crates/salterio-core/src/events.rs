use std::path::Path;

/// Progress notifications emitted by a harvest run.
#[derive(Debug)]
pub enum HarvestEvent<'a> {
    ApiDiscovered {
        endpoint: &'a str,
        posts: usize,
    },
    LinksHarvested {
        candidates: usize,
        pages_scanned: usize,
    },
    NewCandidates {
        new: usize,
        already_known: usize,
    },
    PostStarted {
        index: usize,
        total: usize,
        url: &'a str,
    },
    PostFailed {
        url: &'a str,
        reason: &'a str,
    },
    /// Emitted every [`PROGRESS_EVERY`] processed posts.
    Progress {
        processed: usize,
        total: usize,
        succeeded: usize,
        failed: usize,
    },
    CorpusSaved {
        path: &'a Path,
        added: usize,
        total: usize,
    },
}

pub const PROGRESS_EVERY: usize = 25;

/// Receives [`HarvestEvent`]s. The default implementation ignores them.
pub trait HarvestReporter: Send + Sync {
    fn report(&self, event: HarvestEvent<'_>) {
        let _ = event;
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHarvestReporter;

impl HarvestReporter for TracingHarvestReporter {
    fn report(&self, event: HarvestEvent<'_>) {
        match event {
            HarvestEvent::ApiDiscovered { endpoint, posts } => {
                tracing::info!(%endpoint, posts, "Posts fetched from API");
            }
            HarvestEvent::LinksHarvested {
                candidates,
                pages_scanned,
            } => {
                tracing::info!(candidates, pages_scanned, "Links harvested");
            }
            HarvestEvent::NewCandidates { new, already_known } => {
                tracing::info!(new, already_known, "Filtered against existing corpus");
            }
            HarvestEvent::PostStarted { index, total, url } => {
                tracing::debug!(index, total, %url, "Processing post");
            }
            HarvestEvent::PostFailed { url, reason } => {
                tracing::warn!(%url, %reason, "Post extraction failed");
            }
            HarvestEvent::Progress {
                processed,
                total,
                succeeded,
                failed,
            } => {
                tracing::info!(processed, total, succeeded, failed, "Progress");
            }
            HarvestEvent::CorpusSaved { path, added, total } => {
                tracing::info!(path = %path.display(), added, total, "Corpus saved");
            }
        }
    }
}
