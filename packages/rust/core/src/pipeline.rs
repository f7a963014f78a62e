//! End-to-end run: expand → select → generate → index → unify.
//!
//! Every stage is either idempotent or re-derived from what is on disk, so
//! an interrupted run can simply be started again. A failing stage aborts
//! the run with its name attached; earlier stages are not rolled back.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use pagesmith_bank::{
    DEFAULT_SEEDS, ExpandOptions, ExpansionReport, Seed, Selection, TopicBank, expand, select_next,
};
use pagesmith_discovery::SuggestionSource;
use pagesmith_shared::{
    AppConfig, ArticleRecord, PagesmithError, Result, RunId, TopicEntry, UnifyConfig,
    require_site_base,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::artifacts::write_artifacts;
use crate::corpus::build_corpus;
use crate::generation::{Generator, generate_page};
use crate::site::SiteLayout;
use crate::unify::{UnifyOptions, unify_all};

/// Everything one invocation needs, resolved up front.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub site: SiteLayout,
    /// Normalized base address; required by [`run`].
    pub site_base: Option<String>,
    /// Date used for footers, sitemap entries and uniqueness seeds.
    pub today: NaiveDate,
    pub seeds: Vec<Seed>,
    pub expansion: ExpandOptions,
    pub unify: UnifyConfig,
}

impl RunConfig {
    /// Resolve a run config for the site at `root`.
    ///
    /// A configured base address is validated here; an absent one is only
    /// an error for [`run`].
    pub fn new(root: impl Into<PathBuf>, config: &AppConfig, today: NaiveDate) -> Result<Self> {
        let site_base = match config.site.base_url {
            Some(_) => Some(require_site_base(config)?),
            None => None,
        };

        Ok(Self {
            site: SiteLayout::new(root, &config.site),
            site_base,
            today,
            seeds: DEFAULT_SEEDS.to_vec(),
            expansion: ExpandOptions::from(&config.expansion),
            unify: config.unify.clone(),
        })
    }

    pub fn unify_options(&self) -> UnifyOptions {
        UnifyOptions::new(&self.unify, self.site_base.clone(), self.today)
    }
}

/// What the selection step led to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// One new page was generated.
    Produced { filename: String },
    /// Every bank topic already has a page; nothing was generated.
    Exhausted,
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub expansion: ExpansionReport,
    pub outcome: RunOutcome,
    pub pages_unified: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each page is unified.
    fn page_unified(&self, filename: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_unified(&self, _filename: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &RunReport) {}
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Grow the bank from suggestions and save it.
#[instrument(skip_all, fields(bank = %config.site.bank_path().display()))]
pub async fn expand_bank<S: SuggestionSource>(
    config: &RunConfig,
    source: &S,
) -> Result<ExpansionReport> {
    let path = config.site.bank_path();
    let mut bank = TopicBank::load(path)?;
    let report = expand(&mut bank, &config.seeds, source, &config.expansion).await;
    bank.save(path)?;
    Ok(report)
}

/// The topic the next run would generate, if any.
pub fn next_topic(config: &RunConfig) -> Result<Option<TopicEntry>> {
    let bank = TopicBank::load(config.site.bank_path())?;
    let produced = config.site.produced_pages()?;
    Ok(select_next(&bank, &produced).entry().cloned())
}

/// Rebuild the corpus from every page and write the derived artifacts.
#[instrument(skip_all, fields(root = %config.site.root().display()))]
pub fn rebuild_index(config: &RunConfig) -> Result<Vec<ArticleRecord>> {
    let bank = TopicBank::load(config.site.bank_path())?;
    let corpus = build_corpus(&config.site, &bank)?;
    write_artifacts(&config.site, &corpus, config.site_base.as_deref(), config.today)?;
    Ok(corpus)
}

fn unify_with_corpus(
    config: &RunConfig,
    corpus: &[ArticleRecord],
    progress: &dyn ProgressReporter,
) -> Result<usize> {
    unify_all(&config.site, corpus, &config.unify_options(), |name, i, total| {
        progress.page_unified(name, i, total)
    })
}

/// Rebuild the corpus and unify every page with it.
pub fn unify_site(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<usize> {
    let bank = TopicBank::load(config.site.bank_path())?;
    let corpus = build_corpus(&config.site, &bank)?;
    unify_with_corpus(config, &corpus, progress)
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run the whole pipeline once.
///
/// 1. Expand the bank from suggestions
/// 2. Select the next unproduced topic
/// 3. Generate its page (skipped when exhausted)
/// 4. Rebuild the corpus and artifacts
/// 5. Unify every page
#[instrument(skip_all, fields(root = %config.site.root().display()))]
pub async fn run<S: SuggestionSource, G: Generator>(
    config: &RunConfig,
    source: &S,
    generator: &G,
    progress: &dyn ProgressReporter,
) -> Result<RunReport> {
    let start = Instant::now();
    let run_id = RunId::new();

    if config.site_base.is_none() {
        return Err(PagesmithError::config(
            "site base address not set. Pass --site-base or set the SITE_BASE environment variable.",
        )
        .in_stage("config"));
    }
    info!(%run_id, "starting run");

    progress.phase("Expanding topic bank");
    let expansion = expand_bank(config, source)
        .await
        .map_err(|e| e.in_stage("expand"))?;

    progress.phase("Selecting next topic");
    let bank = TopicBank::load(config.site.bank_path()).map_err(|e| e.in_stage("select"))?;
    let produced = config
        .site
        .produced_pages()
        .map_err(|e| e.in_stage("select"))?;

    let outcome = match select_next(&bank, &produced) {
        Selection::Next(entry) => {
            progress.phase("Generating page");
            generate_page(generator, entry, &config.site, config.today)
                .await
                .map_err(|e| e.in_stage("generate"))?;
            RunOutcome::Produced {
                filename: entry.filename.clone(),
            }
        }
        Selection::Exhausted => {
            info!("every topic already has a page, skipping generation");
            RunOutcome::Exhausted
        }
    };

    progress.phase("Rebuilding article index");
    let corpus = rebuild_index(config).map_err(|e| e.in_stage("index"))?;

    progress.phase("Unifying pages");
    let pages_unified =
        unify_with_corpus(config, &corpus, progress).map_err(|e| e.in_stage("unify"))?;

    let report = RunReport {
        run_id,
        expansion,
        outcome,
        pages_unified,
        elapsed: start.elapsed(),
    };

    info!(
        outcome = ?report.outcome,
        added = report.expansion.added,
        pages = report.pages_unified,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "run complete"
    );
    progress.done(&report);
    Ok(report)
}
