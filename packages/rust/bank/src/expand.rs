//! Topic bank expansion from search suggestions.
//!
//! Each seed query is sent to a [`SuggestionSource`]; suggestions that pass
//! [`screen`](crate::classify::screen) and are not duplicates become new
//! bank entries. A seed that fails or times out contributes nothing and the
//! pass moves on to the next seed.

use std::collections::HashSet;
use std::time::Duration;

use pagesmith_discovery::SuggestionSource;
use pagesmith_shared::{ExpansionConfig, TopicEntry, file_key};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::classify::{infer_category, screen};
use crate::prompt::build_prompt;
use crate::seeds::Seed;
use crate::slug::{filename_for, normalize_title};
use crate::store::TopicBank;

/// Rank given to entries discovered from suggestions.
pub const SUGGESTED_RANK: i64 = 90;

/// Provenance label for entries discovered from suggestions.
pub const SUGGEST_SOURCE: &str = "google_suggest";

/// Limits and pacing for one expansion pass.
#[derive(Debug, Clone)]
pub struct ExpandOptions {
    /// The bank never grows beyond this many entries.
    pub max_bank_size: usize,
    /// At most this many entries are added per pass.
    pub per_run_limit: usize,
    /// Pause between consecutive seed queries.
    pub request_delay: Duration,
    /// Upper bound on a single seed query.
    pub seed_timeout: Duration,
}

impl From<&ExpansionConfig> for ExpandOptions {
    fn from(config: &ExpansionConfig) -> Self {
        Self {
            max_bank_size: config.max_bank_size,
            per_run_limit: config.per_run_limit,
            request_delay: Duration::from_millis(config.request_delay_ms),
            seed_timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl ExpandOptions {
    fn is_full(&self, bank_len: usize, added: usize) -> bool {
        bank_len >= self.max_bank_size || added >= self.per_run_limit
    }
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self::from(&ExpansionConfig::default())
    }
}

/// Counters describing one expansion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionReport {
    /// New entries merged into the bank.
    pub added: usize,
    pub seeds_queried: usize,
    /// Seeds whose lookup failed or timed out.
    pub seeds_failed: usize,
    /// Suggestions dropped by screening.
    pub rejected: usize,
    /// Suggestions already present by filename or normalized title.
    pub duplicates: usize,
    /// Entries dropped by the final capacity truncation.
    pub truncated: usize,
}

// ---------------------------------------------------------------------------
// Dedup index
// ---------------------------------------------------------------------------

/// Filename keys and normalized titles already in the bank.
struct DedupIndex {
    filenames: HashSet<String>,
    titles: HashSet<String>,
}

impl DedupIndex {
    fn build(bank: &TopicBank) -> Self {
        let mut index = Self {
            filenames: HashSet::new(),
            titles: HashSet::new(),
        };
        for entry in bank.entries() {
            index.filenames.insert(entry.key());
            let title = normalize_title(&entry.title_hint);
            if !title.is_empty() {
                index.titles.insert(title);
            }
        }
        index
    }

    fn contains(&self, filename: &str, title: &str) -> bool {
        self.filenames.contains(&file_key(filename)) || self.titles.contains(title)
    }

    fn insert(&mut self, filename: &str, title: String) {
        self.filenames.insert(file_key(filename));
        self.titles.insert(title);
    }
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// Build the bank entry for an accepted suggestion.
pub fn entry_for_suggestion(suggestion: &str, seed: &Seed) -> TopicEntry {
    let title = suggestion.trim();
    let category = infer_category(title, seed.category);

    TopicEntry {
        filename: filename_for(title, category),
        category,
        rank: SUGGESTED_RANK,
        title_hint: title.to_string(),
        tags: vec![title.to_string()],
        featured: false,
        prompt: build_prompt(category, title),
        source: Some(SUGGEST_SOURCE.to_string()),
        seed: Some(seed.query.to_string()),
        extra: serde_json::Map::new(),
    }
}

async fn fetch_seed<S: SuggestionSource>(
    source: &S,
    seed: &Seed,
    timeout: Duration,
) -> Option<Vec<String>> {
    match tokio::time::timeout(timeout, source.suggest(seed.query)).await {
        Ok(Ok(suggestions)) => Some(suggestions),
        Ok(Err(e)) => {
            warn!(seed = seed.query, error = %e, "suggestion lookup failed, skipping seed");
            None
        }
        Err(_) => {
            warn!(seed = seed.query, ?timeout, "suggestion lookup timed out, skipping seed");
            None
        }
    }
}

/// Grow `bank` from suggestions for `seeds`, then sort and cap it.
///
/// Never fails: lookup errors only show up in the report's `seeds_failed`.
#[instrument(skip_all, fields(seeds = seeds.len(), bank = bank.len()))]
pub async fn expand<S: SuggestionSource>(
    bank: &mut TopicBank,
    seeds: &[Seed],
    source: &S,
    opts: &ExpandOptions,
) -> ExpansionReport {
    let mut report = ExpansionReport::default();
    let mut index = DedupIndex::build(bank);

    for (i, seed) in seeds.iter().enumerate() {
        if opts.is_full(bank.len(), report.added) {
            debug!("capacity reached, skipping remaining seeds");
            break;
        }
        if i > 0 && !opts.request_delay.is_zero() {
            tokio::time::sleep(opts.request_delay).await;
        }

        report.seeds_queried += 1;
        let Some(suggestions) = fetch_seed(source, seed, opts.seed_timeout).await else {
            report.seeds_failed += 1;
            continue;
        };

        for suggestion in suggestions {
            if opts.is_full(bank.len(), report.added) {
                break;
            }

            if let Err(reason) = screen(&suggestion) {
                debug!(%suggestion, %reason, "suggestion rejected");
                report.rejected += 1;
                continue;
            }

            let entry = entry_for_suggestion(&suggestion, seed);
            let title = normalize_title(&entry.title_hint);
            if index.contains(&entry.filename, &title) {
                report.duplicates += 1;
                continue;
            }

            debug!(filename = %entry.filename, category = %entry.category, "adding topic");
            index.insert(&entry.filename, title);
            bank.push(entry);
            report.added += 1;
        }
    }

    report.truncated = bank.sort_and_truncate(opts.max_bank_size);

    info!(
        added = report.added,
        failed = report.seeds_failed,
        rejected = report.rejected,
        duplicates = report.duplicates,
        total = bank.len(),
        "expansion finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pagesmith_shared::{Category, PagesmithError, Result};

    use super::*;
    use crate::seeds::DEFAULT_SEEDS;

    /// Canned suggestions per query; unknown queries fail like a network error.
    struct MockSource {
        answers: HashMap<&'static str, Vec<&'static str>>,
    }

    impl SuggestionSource for MockSource {
        async fn suggest(&self, query: &str) -> Result<Vec<String>> {
            self.answers
                .get(query)
                .map(|list| list.iter().map(|s| s.to_string()).collect())
                .ok_or_else(|| PagesmithError::Network(format!("{query}: connection refused")))
        }
    }

    /// Never answers within any reasonable timeout.
    struct StalledSource;

    impl SuggestionSource for StalledSource {
        async fn suggest(&self, _query: &str) -> Result<Vec<String>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec!["lru page replacement example slow".into()])
        }
    }

    fn fast_opts() -> ExpandOptions {
        ExpandOptions {
            max_bank_size: 260,
            per_run_limit: 50,
            request_delay: Duration::ZERO,
            seed_timeout: Duration::from_millis(200),
        }
    }

    fn seeds() -> Vec<Seed> {
        vec![
            Seed {
                category: Category::PageReplacement,
                query: "lru page replacement example",
            },
            Seed {
                category: Category::Deadlock,
                query: "banker's algorithm example",
            },
            Seed {
                category: Category::Parsing,
                query: "first follow example",
            },
        ]
    }

    fn source() -> MockSource {
        MockSource {
            answers: HashMap::from([
                (
                    "lru page replacement example",
                    vec![
                        "lru page replacement example",
                        "lru page replacement example with frames",
                        "lru page replacement example pdf",
                        "lru",
                        "LRU  Page Replacement Example",
                    ],
                ),
                (
                    "banker's algorithm example",
                    vec![
                        "banker's algorithm example",
                        "banker's algorithm safe sequence problem",
                    ],
                ),
            ]),
        }
    }

    #[test]
    fn entry_fields_for_suggestion() {
        let seed = Seed {
            category: Category::Deadlock,
            query: "banker's algorithm example",
        };
        let entry = entry_for_suggestion("  banker's algorithm example ", &seed);

        assert_eq!(entry.filename, "bankers-algorithm-example-deadlock.html");
        assert_eq!(entry.category, Category::Deadlock);
        assert_eq!(entry.rank, SUGGESTED_RANK);
        assert_eq!(entry.title_hint, "banker's algorithm example");
        assert_eq!(entry.tags, vec!["banker's algorithm example".to_string()]);
        assert!(!entry.featured);
        assert_eq!(entry.source.as_deref(), Some(SUGGEST_SOURCE));
        assert_eq!(entry.seed.as_deref(), Some("banker's algorithm example"));
        assert!(entry.prompt.contains("Need matrix"));
    }

    #[test]
    fn suggestion_category_overrides_seed() {
        let seed = Seed {
            category: Category::Scheduling,
            query: "round robin scheduling example",
        };
        let entry = entry_for_suggestion("fifo page replacement example", &seed);
        assert_eq!(entry.category, Category::PageReplacement);
        assert_eq!(entry.filename, "fifo-page-replacement-example.html");
    }

    #[tokio::test]
    async fn expand_filters_and_degrades() {
        let mut bank = TopicBank::new();
        let report = expand(&mut bank, &seeds(), &source(), &fast_opts()).await;

        // "first follow example" has no canned answer and fails.
        assert_eq!(report.seeds_queried, 3);
        assert_eq!(report.seeds_failed, 1);
        assert_eq!(report.added, 4);
        assert_eq!(report.rejected, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(bank.len(), 4);
        assert!(bank.contains_filename("lru-page-replacement-example.html"));
        assert!(bank.contains_filename("bankers-algorithm-safe-sequence-problem-deadlock.html"));
    }

    #[tokio::test]
    async fn second_pass_adds_nothing() {
        let mut bank = TopicBank::new();
        expand(&mut bank, &seeds(), &source(), &fast_opts()).await;
        let after_first = bank.clone();

        let report = expand(&mut bank, &seeds(), &source(), &fast_opts()).await;
        assert_eq!(report.added, 0);
        assert_eq!(bank, after_first);
    }

    #[tokio::test]
    async fn existing_titles_block_new_slugs() {
        let mut bank = TopicBank::from_entries(vec![TopicEntry {
            filename: "lru-worked-example.html".into(),
            title_hint: "LRU page replacement example".into(),
            ..entry_for_suggestion("placeholder example title", &seeds()[0])
        }]);

        let report = expand(&mut bank, &seeds()[..1], &source(), &fast_opts()).await;
        assert_eq!(report.added, 1);
        assert!(!bank.contains_filename("lru-page-replacement-example.html"));
    }

    #[tokio::test]
    async fn per_run_limit_caps_additions() {
        let mut bank = TopicBank::new();
        let opts = ExpandOptions {
            per_run_limit: 2,
            ..fast_opts()
        };

        let report = expand(&mut bank, &seeds(), &source(), &opts).await;
        assert_eq!(report.added, 2);
        assert_eq!(bank.len(), 2);
        // The cap was hit inside the first seed, so the others were never queried.
        assert_eq!(report.seeds_queried, 1);
    }

    #[tokio::test]
    async fn bank_size_cap_is_respected() {
        let mut bank = TopicBank::from_entries(vec![
            entry_for_suggestion("round robin scheduling example", &DEFAULT_SEEDS[0]),
            entry_for_suggestion("mlfq scheduling example", &DEFAULT_SEEDS[2]),
        ]);
        let opts = ExpandOptions {
            max_bank_size: 3,
            ..fast_opts()
        };

        let report = expand(&mut bank, &seeds(), &source(), &opts).await;
        assert_eq!(report.added, 1);
        assert_eq!(bank.len(), 3);
    }

    #[tokio::test]
    async fn oversized_bank_is_truncated() {
        let mut bank = TopicBank::from_entries(
            DEFAULT_SEEDS
                .iter()
                .map(|seed| entry_for_suggestion(seed.query, seed)),
        );
        let opts = ExpandOptions {
            max_bank_size: 5,
            ..fast_opts()
        };

        let report = expand(&mut bank, &seeds(), &source(), &opts).await;
        assert_eq!(report.added, 0);
        assert_eq!(report.seeds_queried, 0);
        assert_eq!(report.truncated, DEFAULT_SEEDS.len() - 5);
        assert_eq!(bank.len(), 5);
        // Equal ranks: the earliest categories survive.
        assert!(bank.entries().iter().all(|e| e.category <= Category::PageReplacement));
    }

    #[tokio::test]
    async fn slow_seed_times_out() {
        let mut bank = TopicBank::new();
        let opts = ExpandOptions {
            seed_timeout: Duration::from_millis(50),
            ..fast_opts()
        };

        let report = expand(&mut bank, &seeds()[..1], &StalledSource, &opts).await;
        assert_eq!(report.seeds_failed, 1);
        assert!(bank.is_empty());
    }
}
