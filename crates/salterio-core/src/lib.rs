pub mod api;
pub mod classify;
pub mod config;
pub mod corpus;
pub mod domain;
pub mod error;
pub mod events;
pub mod extract;
pub mod harvest;
pub mod ledger;
pub mod models;
pub mod pacing;
pub mod persist;
pub mod pipeline;
pub mod reconcile;
pub mod similarity;
pub mod state;
pub mod stats;
pub mod text;
pub mod traits;
pub mod urls;

#[doc(hidden)]
pub mod testutil;

pub use config::{PipelineConfig, SiteConfig, Timeouts};
pub use corpus::{CorpusStore, load_references};
pub use domain::{ContentDomain, DomainProfile};
pub use error::AppError;
pub use ledger::{FailureLedger, LedgerOutcome, load_retry_list};
pub use models::{ContentRecord, PostCandidate, RawPost, ReferenceEntry};
pub use pipeline::{Discovery, HarvestPipeline, RunReport};
pub use reconcile::{MatchStrategy, ReconcileReport, ReconciliationEngine};
pub use similarity::similarity;
pub use stats::CorpusStats;
pub use traits::{Cleaner, FetchResponse, Fetcher, PageParser, ParsedPage};
