use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use salterio_client::{HtmlCleaner, HtmlPageParser, ReqwestFetcher};
use salterio_core::reconcile::MatchQuality;
use salterio_core::{
    ContentDomain, CorpusStats, CorpusStore, Discovery, DomainProfile, HarvestPipeline,
    LedgerOutcome, MatchStrategy, PipelineConfig, ReconciliationEngine, RunReport, SiteConfig,
    load_references, load_retry_list,
};

#[derive(Parser)]
#[command(name = "salterio", version, about = "Incremental harvester for liturgical blogs")]
struct Cli {
    /// Content domain: contemplaciones or ejercicios
    #[arg(
        short,
        long,
        global = true,
        env = "SALTERIO_DOMAIN",
        default_value = "contemplaciones"
    )]
    domain: ContentDomain,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover new posts and append them to the corpus
    Harvest {
        /// Blog base URL (defaults to the domain's site)
        #[arg(long, env = "SALTERIO_SITE_URL")]
        site_url: Option<String>,

        /// Yearly archive pages to scan when falling back to link harvesting
        #[arg(long, default_value_t = 5)]
        archive_years: u32,

        /// Maximum posts per run (overrides SALTERIO_MAX_POSTS)
        #[arg(long)]
        max_posts: Option<usize>,

        /// Delay between post fetches in milliseconds (overrides SALTERIO_REQUEST_DELAY_MS)
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Re-extract the URLs listed in a failure ledger
    Retry {
        /// Ledger file written by a previous run
        ledger: PathBuf,

        /// Delay between post fetches in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Patch corpus links from a reference corpus (writes a backup first)
    Reconcile {
        #[command(flatten)]
        matching: MatchArgs,
    },

    /// Show the reconciliation plan without writing anything
    Compare {
        #[command(flatten)]
        matching: MatchArgs,
    },

    /// Record counts per classification label
    Stats {
        /// Corpus file (defaults to the domain's corpus in SALTERIO_OUTPUT_DIR)
        #[arg(short, long)]
        corpus: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct MatchArgs {
    /// Reference corpus (JSON array of {title, file, link})
    #[arg(short, long)]
    references: PathBuf,

    /// Target corpus (defaults to the domain's corpus in SALTERIO_OUTPUT_DIR)
    #[arg(short, long)]
    corpus: Option<PathBuf>,

    /// Minimum similarity score for a fuzzy match
    #[arg(short, long, default_value_t = 0.2)]
    threshold: f64,

    /// Match identical titles only
    #[arg(long, default_value_t = false, conflicts_with = "threshold")]
    exact: bool,
}

impl MatchArgs {
    fn strategy(&self) -> Result<MatchStrategy> {
        if self.exact {
            return Ok(MatchStrategy::Exact);
        }
        ensure!(
            (0.0..=1.0).contains(&self.threshold),
            "threshold must be between 0 and 1, got {}",
            self.threshold
        );
        Ok(MatchStrategy::Fuzzy {
            threshold: self.threshold,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("salterio=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.domain.profile();

    match cli.command {
        Commands::Harvest {
            site_url,
            archive_years,
            max_posts,
            delay_ms,
        } => {
            let mut config = pipeline_config(&profile, delay_ms)?;
            if let Some(max_posts) = max_posts {
                ensure!(max_posts > 0, "--max-posts must be at least 1");
                config = config.with_max_posts(max_posts);
            }
            let base_url = site_url.as_deref().unwrap_or(profile.site_url);
            let site = SiteConfig::wordpress(base_url, profile.user_agent, archive_years);
            cmd_harvest(site, profile, config).await?;
        }
        Commands::Retry { ledger, delay_ms } => {
            let config = pipeline_config(&profile, delay_ms)?;
            let site = SiteConfig::wordpress(profile.site_url, profile.user_agent, 0);
            cmd_retry(&ledger, site, profile, config).await?;
        }
        Commands::Reconcile { matching } => {
            let corpus = corpus_path(&profile, matching.corpus.clone())?;
            cmd_reconcile(&corpus, &matching, &profile)?;
        }
        Commands::Compare { matching } => {
            let corpus = corpus_path(&profile, matching.corpus.clone())?;
            cmd_compare(&corpus, &matching, &profile)?;
        }
        Commands::Stats { corpus } => {
            let corpus = corpus_path(&profile, corpus)?;
            cmd_stats(&corpus)?;
        }
    }

    Ok(())
}

/// Environment configuration with CLI overrides applied.
fn pipeline_config(profile: &DomainProfile, delay_ms: Option<u64>) -> Result<PipelineConfig> {
    let mut config =
        PipelineConfig::from_env(profile.corpus_file).context("Invalid SALTERIO_* configuration")?;
    if let Some(ms) = delay_ms {
        config = config.with_request_delay(Duration::from_millis(ms));
    }
    Ok(config)
}

fn corpus_path(profile: &DomainProfile, explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(pipeline_config(profile, None)?.corpus_path),
    }
}

fn build_pipeline(
    site: SiteConfig,
    profile: DomainProfile,
    config: PipelineConfig,
) -> Result<HarvestPipeline<ReqwestFetcher, HtmlCleaner, HtmlPageParser>> {
    let fetcher = ReqwestFetcher::new(&site.user_agent).context("Failed to create HTTP client")?;
    let parser = HtmlPageParser::new().context("Failed to build page parser")?;
    Ok(HarvestPipeline::new(
        fetcher,
        HtmlCleaner::new(),
        parser,
        site,
        profile,
        config,
    ))
}

async fn cmd_harvest(site: SiteConfig, profile: DomainProfile, config: PipelineConfig) -> Result<()> {
    tracing::info!(
        site = %site.base_url,
        corpus = %config.corpus_path.display(),
        max_posts = config.max_posts,
        "Starting harvest"
    );
    let base_url = site.base_url.clone();
    let report = build_pipeline(site, profile, config)?
        .run()
        .await
        .with_context(|| format!("Harvest of {base_url} failed"))?;
    print_run_report(&report);
    Ok(())
}

async fn cmd_retry(
    ledger: &Path,
    site: SiteConfig,
    profile: DomainProfile,
    config: PipelineConfig,
) -> Result<()> {
    let urls = load_retry_list(ledger)
        .with_context(|| format!("Failed to read ledger: {}", ledger.display()))?;
    if urls.is_empty() {
        println!("No URLs to retry in {}", ledger.display());
        return Ok(());
    }

    tracing::info!(ledger = %ledger.display(), urls = urls.len(), "Retrying failed URLs");
    let report = build_pipeline(site, profile, config)?
        .retry(&urls)
        .await
        .context("Retry failed")?;
    print_run_report(&report);
    Ok(())
}

fn print_run_report(report: &RunReport) {
    match &report.discovery {
        Discovery::Api { endpoint, posts } => {
            println!("Discovery: REST API {endpoint} ({posts} posts)");
        }
        Discovery::Harvested {
            candidates,
            pages_scanned,
        } => {
            println!("Discovery: link harvesting ({candidates} URLs from {pages_scanned} pages)");
        }
        Discovery::Retry { urls } => println!("Discovery: retry list ({urls} URLs)"),
    }

    println!("New:    {}", report.new_candidates);
    println!("Added:  {}", report.added);
    println!("Failed: {}", report.failed);
    println!("Total:  {}", report.total);

    match &report.ledger {
        LedgerOutcome::Empty => {}
        LedgerOutcome::Written { path, count } => {
            println!("\n{count} failed URLs written to {}", path.display());
        }
        LedgerOutcome::Reported { count, error } => {
            println!("\n{count} failed URLs could not be saved ({error}); see the log");
        }
    }
}

fn cmd_reconcile(corpus: &Path, matching: &MatchArgs, profile: &DomainProfile) -> Result<()> {
    let references = load_references(&matching.references).with_context(|| {
        format!("Failed to read reference corpus: {}", matching.references.display())
    })?;
    let engine = ReconciliationEngine::new(profile.reference_tag, matching.strategy()?);
    let store = CorpusStore::new(corpus);

    let report = engine
        .reconcile(&store, &references)
        .with_context(|| format!("Failed to reconcile {}", corpus.display()))?;

    if let Some(backup) = &report.backup {
        println!("Backup: {}", backup.display());
    }
    println!("Records:   {}", report.records);
    println!("Matched:   {}", report.matched);
    println!("Unmatched: {}", report.unmatched);
    println!("Updated:   {}", report.updates);
    for quality in [MatchQuality::Perfect, MatchQuality::Good, MatchQuality::Partial] {
        if let Some(count) = report.by_quality.get(&quality) {
            println!("  {quality:?}: {count}");
        }
    }
    Ok(())
}

fn cmd_compare(corpus: &Path, matching: &MatchArgs, profile: &DomainProfile) -> Result<()> {
    let references = load_references(&matching.references).with_context(|| {
        format!("Failed to read reference corpus: {}", matching.references.display())
    })?;
    let records = CorpusStore::new(corpus)
        .load()
        .with_context(|| format!("Failed to read corpus: {}", corpus.display()))?;
    let engine = ReconciliationEngine::new(profile.reference_tag, matching.strategy()?);

    println!(
        "{} records, {} reference entries tagged '{}'\n",
        records.len(),
        engine.filter_references(&references).len(),
        profile.reference_tag
    );

    let plan = engine.plan(&records, &references);
    let mut matched = 0;
    for planned in &plan {
        match &planned.candidate {
            Some(candidate) => {
                matched += 1;
                println!("[{:5.1}%] {}", candidate.score * 100.0, planned.title);
                println!("         -> {}", candidate.reference_title);
                println!("         Link: {}", candidate.reference_link);
            }
            None => println!("[  0.0%] NO MATCH: {}", planned.title),
        }
    }

    let unmatched = plan.len() - matched;
    let rate = if plan.is_empty() {
        0.0
    } else {
        matched as f64 * 100.0 / plan.len() as f64
    };
    println!("\nMatched: {matched}  Unmatched: {unmatched}  ({rate:.1}%)");
    Ok(())
}

fn cmd_stats(corpus: &Path) -> Result<()> {
    let records = CorpusStore::new(corpus)
        .load()
        .with_context(|| format!("Failed to read corpus: {}", corpus.display()))?;
    let stats = CorpusStats::from_records(&records);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
