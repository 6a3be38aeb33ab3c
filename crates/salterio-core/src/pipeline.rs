//! Orchestration of a harvest run: discover, filter, extract, classify, persist.

use std::collections::HashSet;

use crate::api::{EndpointProbe, PaginatedFetcher, ProbeOutcome};
use crate::config::{PipelineConfig, SiteConfig};
use crate::corpus::CorpusStore;
use crate::domain::DomainProfile;
use crate::error::AppError;
use crate::events::{HarvestEvent, HarvestReporter, PROGRESS_EVERY, TracingHarvestReporter};
use crate::extract::{PostExtractor, PostOutcome};
use crate::harvest::LinkHarvester;
use crate::ledger::{FailureLedger, LedgerOutcome};
use crate::models::{ApiPost, ContentFormat, ContentRecord, PostCandidate, RawPost};
use crate::pacing::Pacer;
use crate::state::StateMerger;
use crate::text::{SUMMARY_MAX_CHARS, collapse_whitespace, extract_readings, summarize, truncate_chars};
use crate::traits::{Cleaner, Fetcher, PageParser};

/// How the posts of a run were obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    Api { endpoint: String, posts: usize },
    Harvested { candidates: usize, pages_scanned: usize },
    /// URLs supplied by a previous failure ledger.
    Retry { urls: usize },
}

/// Outcome of a run that reached the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub discovery: Discovery,
    /// Discovered items not yet in the corpus.
    pub new_candidates: usize,
    pub added: usize,
    pub failed: usize,
    /// Records in the corpus after the run.
    pub total: usize,
    pub ledger: LedgerOutcome,
}

/// One site, one content domain, one corpus file.
pub struct HarvestPipeline<F, C, P, R = TracingHarvestReporter>
where
    F: Fetcher,
    C: Cleaner,
    P: PageParser,
    R: HarvestReporter,
{
    fetcher: F,
    cleaner: C,
    parser: P,
    site: SiteConfig,
    profile: DomainProfile,
    config: PipelineConfig,
    reporter: R,
}

impl<F, C, P> HarvestPipeline<F, C, P, TracingHarvestReporter>
where
    F: Fetcher,
    C: Cleaner,
    P: PageParser,
{
    pub fn new(
        fetcher: F,
        cleaner: C,
        parser: P,
        site: SiteConfig,
        profile: DomainProfile,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            cleaner,
            parser,
            site,
            profile,
            config,
            reporter: TracingHarvestReporter,
        }
    }
}

impl<F, C, P, R> HarvestPipeline<F, C, P, R>
where
    F: Fetcher,
    C: Cleaner,
    P: PageParser,
    R: HarvestReporter,
{
    pub fn with_reporter<R2: HarvestReporter>(self, reporter: R2) -> HarvestPipeline<F, C, P, R2> {
        HarvestPipeline {
            fetcher: self.fetcher,
            cleaner: self.cleaner,
            parser: self.parser,
            site: self.site,
            profile: self.profile,
            config: self.config,
            reporter,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Full run: REST discovery when an endpoint answers, link harvesting
    /// otherwise.
    ///
    /// Returns `SiteUnreachable` only when every harvest page failed to
    /// fetch or answered an error status after the probe found no endpoint. Zero new posts is
    /// a successful run.
    pub async fn run(&self) -> Result<RunReport, AppError> {
        let store = CorpusStore::new(&self.config.corpus_path);
        let existing = store.load_or_empty();
        let merger = StateMerger::from_records(&existing);
        let mut ledger = FailureLedger::new(&self.config.ledger_dir, self.profile.ledger_prefix);

        let probe = EndpointProbe::new(self.fetcher.clone(), self.config.timeouts.probe);
        let (discovery, fresh, records) = match probe.probe(&self.site.discovery_endpoints).await {
            ProbeOutcome::Found(endpoint) => {
                let pager = PaginatedFetcher::new(
                    self.fetcher.clone(),
                    self.config.per_page,
                    self.config.max_pages,
                    self.config.timeouts.api_page,
                );
                let posts = pager.fetch_all(&endpoint, self.config.max_posts).await;
                self.reporter.report(HarvestEvent::ApiDiscovered {
                    endpoint: &endpoint,
                    posts: posts.len(),
                });

                let discovered = posts.len();
                let posts = merger.new_posts(posts);
                self.report_filtered(posts.len(), discovered);

                let fresh = posts.len();
                let raws: Vec<RawPost> = posts.into_iter().map(ApiPost::into_raw_post).collect();
                let records = self.classify_all(raws, &mut ledger);
                (
                    Discovery::Api {
                        endpoint,
                        posts: discovered,
                    },
                    fresh,
                    records,
                )
            }
            ProbeOutcome::Unavailable => {
                let harvester = LinkHarvester::new(
                    self.fetcher.clone(),
                    &self.site.base_url,
                    self.config.timeouts.scan,
                )?;
                let harvest = harvester.harvest(&self.site).await;
                if harvest.all_unreachable() {
                    return Err(AppError::SiteUnreachable(self.site.base_url.clone()));
                }
                self.reporter.report(HarvestEvent::LinksHarvested {
                    candidates: harvest.candidates.len(),
                    pages_scanned: harvest.pages_scanned,
                });

                let discovered = harvest.candidates.len();
                let mut candidates = merger.new_candidates(harvest.candidates);
                self.report_filtered(candidates.len(), discovered);
                candidates.truncate(self.config.max_posts);

                let fresh = candidates.len();
                let raws = self.extract_all(&candidates, &mut ledger).await;
                let records = self.classify_all(raws, &mut ledger);
                (
                    Discovery::Harvested {
                        candidates: discovered,
                        pages_scanned: harvest.pages_scanned,
                    },
                    fresh,
                    records,
                )
            }
        };

        self.finish(&store, existing, merger, records, ledger, discovery, fresh)
    }

    /// Push URLs from an earlier failure ledger through extraction again.
    /// URLs already in the corpus are skipped.
    pub async fn retry(&self, urls: &[String]) -> Result<RunReport, AppError> {
        let store = CorpusStore::new(&self.config.corpus_path);
        let existing = store.load_or_empty();
        let merger = StateMerger::from_records(&existing);
        let mut ledger = FailureLedger::new(&self.config.ledger_dir, self.profile.ledger_prefix);

        let mut unique = HashSet::new();
        let candidates: Vec<PostCandidate> = urls
            .iter()
            .map(|u| PostCandidate::new(u))
            .filter(|c| unique.insert(c.normalized_url.clone()))
            .collect();
        let discovered = candidates.len();
        let candidates = merger.new_candidates(candidates);
        self.report_filtered(candidates.len(), discovered);

        let fresh = candidates.len();
        let raws = self.extract_all(&candidates, &mut ledger).await;
        let records = self.classify_all(raws, &mut ledger);

        self.finish(
            &store,
            existing,
            merger,
            records,
            ledger,
            Discovery::Retry { urls: urls.len() },
            fresh,
        )
    }

    /// Turn an extracted or API post into a classified record.
    pub fn build_record(&self, raw: &RawPost) -> Result<ContentRecord, AppError> {
        let (title, body) = match raw.format {
            ContentFormat::Html => (
                self.cleaner.clean(&raw.raw_title)?,
                self.cleaner.clean(&raw.raw_content_html)?,
            ),
            ContentFormat::Text => (raw.raw_title.clone(), raw.raw_content_html.clone()),
        };
        let title = collapse_whitespace(&title);
        let body = collapse_whitespace(&body);

        let readings = raw
            .reading_reference_hint
            .clone()
            .filter(|hint| !hint.is_empty())
            .unwrap_or_else(|| extract_readings(&body));

        let classification = self.profile.classifier.classify(&title, &body, &readings);

        let summary = raw
            .excerpt
            .as_deref()
            .map(str::trim)
            .filter(|excerpt| !excerpt.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| summarize(&body, self.profile.summary_anchors, self.profile.anchor_mode));

        Ok(ContentRecord {
            id: raw.source_id,
            classification,
            title,
            readings,
            summary: truncate_chars(&summary, SUMMARY_MAX_CHARS),
            link: raw.url.clone(),
        })
    }

    async fn extract_all(&self, candidates: &[PostCandidate], ledger: &mut FailureLedger) -> Vec<RawPost> {
        let extractor = PostExtractor::new(
            self.fetcher.clone(),
            self.parser.clone(),
            self.config.timeouts.post,
            self.profile.summary_anchors,
            self.profile.anchor_mode,
        );
        let mut pacer = Pacer::new(self.config.request_delay);
        let total = candidates.len();
        let mut posts = Vec::with_capacity(total);

        for (i, candidate) in candidates.iter().enumerate() {
            let processed = i + 1;
            pacer.wait().await;
            self.reporter.report(HarvestEvent::PostStarted {
                index: processed,
                total,
                url: &candidate.normalized_url,
            });

            match extractor.extract(&candidate.normalized_url).await {
                PostOutcome::Extracted(post) => posts.push(post),
                PostOutcome::Failed { url, reason } => {
                    self.reporter.report(HarvestEvent::PostFailed {
                        url: &url,
                        reason: &reason,
                    });
                    ledger.record(&url);
                }
            }

            if processed % PROGRESS_EVERY == 0 {
                self.reporter.report(HarvestEvent::Progress {
                    processed,
                    total,
                    succeeded: posts.len(),
                    failed: ledger.len(),
                });
            }
        }
        posts
    }

    fn classify_all(&self, raws: Vec<RawPost>, ledger: &mut FailureLedger) -> Vec<ContentRecord> {
        let mut records = Vec::with_capacity(raws.len());
        for raw in raws {
            match self.build_record(&raw) {
                Ok(record) => records.push(record),
                Err(e) => {
                    let reason = e.to_string();
                    self.reporter.report(HarvestEvent::PostFailed {
                        url: &raw.url,
                        reason: &reason,
                    });
                    ledger.record(&raw.url);
                }
            }
        }
        records
    }

    fn report_filtered(&self, new: usize, discovered: usize) {
        self.reporter.report(HarvestEvent::NewCandidates {
            new,
            already_known: discovered - new,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        store: &CorpusStore,
        existing: Vec<ContentRecord>,
        mut merger: StateMerger,
        records: Vec<ContentRecord>,
        ledger: FailureLedger,
        discovery: Discovery,
        new_candidates: usize,
    ) -> Result<RunReport, AppError> {
        let failed = ledger.len();
        let ledger = ledger.finalize();

        let mut merged = existing;
        let mut added = 0;
        for record in records {
            if record.link.is_empty() || merger.mark(&record.link) {
                merged.push(record);
                added += 1;
            }
        }

        if added > 0 {
            store.replace(&merged)?;
            self.reporter.report(HarvestEvent::CorpusSaved {
                path: store.path(),
                added,
                total: merged.len(),
            });
        }

        Ok(RunReport {
            discovery,
            new_candidates,
            added,
            failed,
            total: merged.len(),
            ledger,
        })
    }
}
