//! Seed queries the expander asks the suggestion source about.

use pagesmith_shared::Category;

/// One (category, query) pair fed to the suggestion source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub category: Category,
    pub query: &'static str,
}

const fn seed(category: Category, query: &'static str) -> Seed {
    Seed { category, query }
}

/// Built-in seeds, queried in this order.
pub const DEFAULT_SEEDS: &[Seed] = &[
    seed(Category::Scheduling, "round robin scheduling example"),
    seed(Category::Scheduling, "preemptive priority scheduling example"),
    seed(Category::Scheduling, "mlfq scheduling example"),
    seed(Category::PageReplacement, "fifo page replacement example"),
    seed(Category::PageReplacement, "lru page replacement example"),
    seed(Category::PageReplacement, "optimal page replacement example"),
    seed(Category::PageReplacement, "belady anomaly example"),
    seed(Category::Deadlock, "banker's algorithm example"),
    seed(Category::Deadlock, "deadlock detection algorithm example"),
    seed(Category::Deadlock, "resource allocation graph deadlock example"),
    seed(Category::Parsing, "shift reduce parsing example"),
    seed(Category::Parsing, "first follow example"),
    seed(Category::Parsing, "left recursion elimination example"),
];
