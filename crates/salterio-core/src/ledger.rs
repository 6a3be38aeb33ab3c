//! Per-run record of post URLs that could not be extracted.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::FailureRecord;
use crate::persist::write_atomic;

/// What became of the ledger at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// Nothing failed, no file written.
    Empty,
    Written { path: PathBuf, count: usize },
    /// The file could not be written; the URLs went to the log instead.
    Reported { count: usize, error: String },
}

#[derive(Debug, Clone)]
pub struct FailureLedger {
    dir: PathBuf,
    prefix: String,
    failures: Vec<FailureRecord>,
}

impl FailureLedger {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, url: &str) {
        self.failures.push(FailureRecord {
            url: url.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[FailureRecord] {
        &self.failures
    }

    /// Write `<prefix>_<yyyymmdd_HHMMSS>.log`, or log every URL if that fails.
    pub fn finalize(self) -> LedgerOutcome {
        self.finalize_at(Utc::now())
    }

    pub fn finalize_at(self, now: DateTime<Utc>) -> LedgerOutcome {
        let count = self.failures.len();
        if count == 0 {
            tracing::info!("All URLs processed successfully");
            return LedgerOutcome::Empty;
        }

        let path = self
            .dir
            .join(format!("{}_{}.log", self.prefix, now.format("%Y%m%d_%H%M%S")));

        match write_atomic(&path, &render(&self.failures, now)) {
            Ok(()) => {
                tracing::info!(path = %path.display(), count, "Failure ledger written");
                LedgerOutcome::Written { path, count }
            }
            Err(e) => {
                tracing::warn!(error = %e, count, "Could not write failure ledger");
                for (i, failure) in self.failures.iter().enumerate() {
                    tracing::warn!(n = i + 1, url = %failure.url, "Failed URL");
                }
                LedgerOutcome::Reported {
                    count,
                    error: e.to_string(),
                }
            }
        }
    }
}

fn render(failures: &[FailureRecord], now: DateTime<Utc>) -> String {
    let mut out = format!(
        "# Failed URLs - {}\n# Total failed URLs: {}\n\n",
        now.format("%Y-%m-%d %H:%M:%S"),
        failures.len()
    );
    for (i, failure) in failures.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, failure.url));
    }
    out
}

/// URLs listed in a ledger file, in file order.
///
/// Blank and `#` lines are skipped; an `N. ` prefix is optional.
pub fn load_retry_list(path: &Path) -> Result<Vec<String>, AppError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        AppError::PersistenceError(format!("cannot read {}: {e}", path.display()))
    })?;
    Ok(parse_retry_list(&raw))
}

pub fn parse_retry_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            if line.starts_with("http") {
                return Some(line.to_string());
            }
            let (ordinal, rest) = line.split_once(". ")?;
            let rest = rest.trim();
            (ordinal.chars().all(|c| c.is_ascii_digit()) && rest.starts_with("http"))
                .then(|| rest.to_string())
        })
        .collect()
}
