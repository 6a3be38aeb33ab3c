//! Link reconciliation of a corpus against a reference index.
//!
//! Every record with a title is matched against the reference entries of
//! the same domain; an accepted match whose link differs overwrites the
//! record's link. The corpus file is backed up before anything else
//! happens and rewritten only when at least one link changed.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::corpus::CorpusStore;
use crate::error::AppError;
use crate::models::{ContentRecord, MatchCandidate, ReferenceEntry};
use crate::similarity::similarity;

/// How a record title is matched to reference titles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchStrategy {
    /// Identical titles only. Last reference entry with a link wins.
    Exact,
    /// Highest composite similarity, accepted at or above `threshold`.
    Fuzzy { threshold: f64 },
}

/// Confidence band of an accepted match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MatchQuality {
    Partial,
    Good,
    Perfect,
}

impl MatchQuality {
    pub fn of(score: f64) -> Self {
        if score >= 0.9 {
            MatchQuality::Perfect
        } else if score >= 0.6 {
            MatchQuality::Good
        } else {
            MatchQuality::Partial
        }
    }
}

/// Match decision for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMatch {
    /// Position of the record in the corpus.
    pub index: usize,
    pub title: String,
    pub current_link: String,
    /// Best accepted reference, if any cleared the strategy.
    pub candidate: Option<MatchCandidate>,
}

impl PlannedMatch {
    /// New link to write, when the match changes the record.
    pub fn new_link(&self) -> Option<&str> {
        self.candidate
            .as_ref()
            .map(|c| c.reference_link.as_str())
            .filter(|link| !link.is_empty() && *link != self.current_link)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub records: usize,
    pub updates: usize,
    /// Records with an accepted match, changed or not.
    pub matched: usize,
    pub unmatched: usize,
    pub backup: Option<PathBuf>,
    pub by_quality: HashMap<MatchQuality, usize>,
}

#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    reference_tag: String,
    strategy: MatchStrategy,
}

impl ReconciliationEngine {
    pub fn new(reference_tag: impl Into<String>, strategy: MatchStrategy) -> Self {
        Self {
            reference_tag: reference_tag.into(),
            strategy,
        }
    }

    /// Reference entries tagged with this engine's domain.
    pub fn filter_references<'a>(&self, references: &'a [ReferenceEntry]) -> Vec<&'a ReferenceEntry> {
        references
            .iter()
            .filter(|r| r.file.starts_with(&self.reference_tag))
            .collect()
    }

    /// Match decision for every titled record, without touching anything.
    pub fn plan(
        &self,
        records: &[ContentRecord],
        references: &[ReferenceEntry],
    ) -> Vec<PlannedMatch> {
        let filtered = self.filter_references(references);
        let exact_index = match self.strategy {
            MatchStrategy::Exact => Some(exact_index(&filtered)),
            MatchStrategy::Fuzzy { .. } => None,
        };

        records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.title.is_empty())
            .map(|(index, record)| {
                let candidate = match (self.strategy, &exact_index) {
                    (MatchStrategy::Exact, Some(titles)) => {
                        titles.get(record.title.as_str()).map(|entry| MatchCandidate {
                            reference_title: entry.title.clone(),
                            reference_link: entry.link.clone(),
                            score: 1.0,
                        })
                    }
                    (MatchStrategy::Fuzzy { threshold }, _) => {
                        best_match(&record.title, &filtered).filter(|c| c.score >= threshold)
                    }
                    (MatchStrategy::Exact, None) => None,
                };
                PlannedMatch {
                    index,
                    title: record.title.clone(),
                    current_link: record.link.clone(),
                    candidate,
                }
            })
            .collect()
    }

    /// Apply the plan in memory. Returns the report without `backup`.
    pub fn apply(
        &self,
        records: &mut [ContentRecord],
        references: &[ReferenceEntry],
    ) -> ReconcileReport {
        let plan = self.plan(records, references);
        let mut report = ReconcileReport {
            records: records.len(),
            ..Default::default()
        };

        for planned in &plan {
            let Some(candidate) = &planned.candidate else {
                report.unmatched += 1;
                tracing::debug!(title = %planned.title, "No match");
                continue;
            };
            report.matched += 1;

            if let Some(link) = planned.new_link() {
                records[planned.index].link = link.to_string();
                report.updates += 1;
                *report
                    .by_quality
                    .entry(MatchQuality::of(candidate.score))
                    .or_default() += 1;
                tracing::debug!(
                    title = %planned.title,
                    reference = %candidate.reference_title,
                    score = candidate.score,
                    "Link updated"
                );
            }
        }
        report
    }

    /// Back up the corpus, reconcile it, and rewrite it only if a link changed.
    pub fn reconcile(
        &self,
        store: &CorpusStore,
        references: &[ReferenceEntry],
    ) -> Result<ReconcileReport, AppError> {
        let mut records = store.load()?;
        let backup = store.backup()?;

        let mut report = self.apply(&mut records, references);
        report.backup = backup;

        if report.updates > 0 {
            store.save(&records)?;
            tracing::info!(updates = report.updates, path = %store.path().display(), "Corpus updated");
        } else {
            tracing::info!("No link changes, corpus left untouched");
        }
        Ok(report)
    }
}

/// Highest-scoring reference for `title`; the first of equal scores wins.
pub fn best_match(title: &str, references: &[&ReferenceEntry]) -> Option<MatchCandidate> {
    let mut best: Option<(f64, &ReferenceEntry)> = None;
    for &entry in references {
        let score = similarity(title, &entry.title);
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, entry));
        }
    }
    best.map(|(score, entry)| MatchCandidate {
        reference_title: entry.title.clone(),
        reference_link: entry.link.clone(),
        score,
    })
}

fn exact_index<'a>(references: &[&'a ReferenceEntry]) -> HashMap<&'a str, &'a ReferenceEntry> {
    let mut index = HashMap::new();
    for &entry in references {
        if !entry.title.is_empty() && !entry.link.is_empty() {
            index.insert(entry.title.as_str(), entry);
        }
    }
    index
}
