//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use pagesmith_core::{
    ChatCompletionsClient, ProgressReporter, RunConfig, RunOutcome, RunReport,
};
use pagesmith_discovery::{SuggestClient, SuggestOptions};
use pagesmith_shared::{AppConfig, init_config, load_config, require_site_base};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Pagesmith: grow a worked-example site one page per run.
#[derive(Parser)]
#[command(
    name = "pagesmith",
    version,
    about = "Grow a topic bank, generate one page per run, and keep every page in the site shell.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Site root holding the pages and the topic bank.
    #[arg(long, default_value = ".", global = true)]
    pub site_root: PathBuf,

    /// Public base address of the site (overrides `site.base_url`).
    #[arg(long, env = "SITE_BASE", global = true)]
    pub site_base: Option<String>,

    /// Generation model identifier (overrides `generation.model`).
    #[arg(long, env = "MODEL", global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Expand the bank, generate the next page, rebuild the index and unify all pages.
    Run {
        /// Print the run report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Grow the topic bank from search suggestions.
    Expand,

    /// Show the topic the next run would generate.
    Next,

    /// Rebuild articles.json, sitemap.xml and faq.json from the pages on disk.
    Index,

    /// Re-wrap every page in the site shell.
    Unify,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "pagesmith=info",
        1 => "pagesmith=debug",
        _ => "pagesmith=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Config resolution
// ---------------------------------------------------------------------------

/// Load the config for the site root and apply CLI overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = load_config(&cli.site_root)?;

    if let Some(base) = cli.site_base.as_deref().filter(|b| !b.trim().is_empty()) {
        config.site.base_url = Some(base.trim().to_string());
    }
    if let Some(model) = cli.model.as_deref().filter(|m| !m.trim().is_empty()) {
        config.generation.model = model.trim().to_string();
    }

    Ok(config)
}

fn run_config(site_root: &Path, config: &AppConfig) -> Result<RunConfig> {
    let today = chrono::Utc::now().date_naive();
    Ok(RunConfig::new(site_root, config, today)?)
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Run { json } => cmd_run(&cli, *json).await,
        Command::Expand => cmd_expand(&cli).await,
        Command::Next => cmd_next(&cli),
        Command::Index => cmd_index(&cli),
        Command::Unify => cmd_unify(&cli),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&cli),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(cli: &Cli, json: bool) -> Result<()> {
    let config = resolve_config(cli)?;

    // Everything that can be checked up front is checked before the bank is touched.
    require_site_base(&config)?;
    let generator = ChatCompletionsClient::from_env(&config.generation)?;
    let source = SuggestClient::new(&SuggestOptions::from(&config.expansion))?;
    let run_config = run_config(&cli.site_root, &config)?;

    info!(
        root = %cli.site_root.display(),
        model = generator.model(),
        "starting pagesmith run"
    );

    let reporter = CliProgress::new();
    let result = pagesmith_core::run(&run_config, &source, &generator, &reporter).await;
    reporter.spinner.finish_and_clear();
    let report = result.wrap_err("run aborted")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    match &report.outcome {
        RunOutcome::Produced { filename } => println!("  Generated: {filename}"),
        RunOutcome::Exhausted => println!("  No new topics: every bank entry already has a page."),
    }
    println!("  Run:       {}", report.run_id);
    println!(
        "  Bank:      +{} new ({} seeds, {} failed)",
        report.expansion.added, report.expansion.seeds_queried, report.expansion.seeds_failed
    );
    println!("  Unified:   {} pages", report.pages_unified);
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_expand(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let run_config = run_config(&cli.site_root, &config)?;
    let source = SuggestClient::new(&SuggestOptions::from(&config.expansion))?;

    let report = pagesmith_core::expand_bank(&run_config, &source)
        .await
        .wrap_err("expansion failed")?;

    println!(
        "Added {} topics ({} rejected, {} duplicates, {} truncated; {}/{} seeds failed)",
        report.added,
        report.rejected,
        report.duplicates,
        report.truncated,
        report.seeds_failed,
        report.seeds_queried
    );
    Ok(())
}

fn cmd_next(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let run_config = run_config(&cli.site_root, &config)?;

    match pagesmith_core::next_topic(&run_config)? {
        Some(entry) => {
            println!("{}", entry.filename);
            println!("  category: {}", entry.category);
            println!("  rank:     {}", entry.rank);
            if !entry.title_hint.is_empty() {
                println!("  title:    {}", entry.title_hint);
            }
        }
        None => println!("No new topics: every bank entry already has a page."),
    }
    Ok(())
}

fn cmd_index(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let run_config = run_config(&cli.site_root, &config)?;

    let corpus = pagesmith_core::rebuild_index(&run_config).wrap_err("index rebuild failed")?;
    if run_config.site_base.is_none() {
        println!("Note: no site base set, sitemap.xml was not written.");
    }
    println!("Indexed {} pages.", corpus.len());
    Ok(())
}

fn cmd_unify(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let run_config = run_config(&cli.site_root, &config)?;

    let reporter = CliProgress::new();
    reporter.phase("Unifying pages");
    let result = pagesmith_core::unify_site(&run_config, &reporter);
    reporter.spinner.finish_and_clear();

    let count = result.wrap_err("unify failed")?;
    println!("Unified {count} pages.");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_unified(&self, filename: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Unifying [{current}/{total}] {filename}"));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}
