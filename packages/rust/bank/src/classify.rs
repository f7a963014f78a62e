//! Suggestion screening and keyword-based category inference.

use pagesmith_shared::Category;

use crate::slug::normalize_title;

/// Suggestions shorter than this (in characters, after trimming) are dropped.
pub const MIN_SUGGESTION_LEN: usize = 12;

/// Promotional, download and discussion-site markers.
const BANNED_MARKERS: &[&str] = &[
    "pdf",
    "ppt",
    "slides",
    "download",
    "solution manual",
    "github",
    "youtube",
    "quizlet",
    "chegg",
    "coursehero",
    "reddit",
    "quora",
    "stackoverflow",
    "brainly",
];

/// At least one of these must appear for a suggestion to read as an exam question.
const INTENT_MARKERS: &[&str] = &[
    "example",
    "algorithm",
    "problem",
    "solved",
    "numerical",
    "calculate",
    "step by step",
    "practice",
    "exercise",
    "question",
    "solution",
    "table",
    "gantt",
    "sets",
    "grammar",
    "matrix",
];

const SCHEDULING_TERMS: &[&str] = &[
    "scheduling",
    "round robin",
    "fcfs",
    "sjf",
    "srtf",
    "mlfq",
    "multilevel",
    "priority",
    "gantt",
    "turnaround",
    "waiting time",
    "time quantum",
];

const PAGE_REPLACEMENT_TERMS: &[&str] = &[
    "page replacement",
    "page fault",
    "lru",
    "fifo",
    "optimal page",
    "belady",
    "reference string",
    "second chance",
    "clock algorithm",
    "frames",
];

const DEADLOCK_TERMS: &[&str] = &[
    "deadlock",
    "banker",
    "safe sequence",
    "safe state",
    "resource allocation",
    "wait for graph",
    "need matrix",
];

const PARSING_TERMS: &[&str] = &[
    "parsing",
    "parser",
    "first follow",
    "first and follow",
    "ll(1)",
    "ll1",
    "lr(0)",
    "slr",
    "lalr",
    "clr",
    "shift reduce",
    "left recursion",
    "left factoring",
    "grammar",
];

/// Why a suggestion was not turned into a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    TooShort,
    Banned(&'static str),
    NoExamIntent,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooShort => f.write_str("too short"),
            Self::Banned(marker) => write!(f, "contains banned marker '{marker}'"),
            Self::NoExamIntent => f.write_str("no exam-intent marker"),
        }
    }
}

/// Decide whether a raw suggestion is worth a page.
pub fn screen(suggestion: &str) -> Result<(), Rejection> {
    let text = normalize_title(suggestion);

    if text.chars().count() < MIN_SUGGESTION_LEN {
        return Err(Rejection::TooShort);
    }
    if let Some(marker) = BANNED_MARKERS.iter().find(|m| text.contains(*m)) {
        return Err(Rejection::Banned(*marker));
    }
    if !INTENT_MARKERS.iter().any(|m| text.contains(m)) {
        return Err(Rejection::NoExamIntent);
    }
    Ok(())
}

fn vocabulary(category: Category) -> &'static [&'static str] {
    match category {
        Category::Scheduling => SCHEDULING_TERMS,
        Category::PageReplacement => PAGE_REPLACEMENT_TERMS,
        Category::Deadlock => DEADLOCK_TERMS,
        Category::Parsing => PARSING_TERMS,
        Category::Other => &[],
    }
}

/// Infer a category from free text, falling back when nothing matches.
///
/// The category with the most vocabulary hits wins; ties go to the earlier
/// declared category.
pub fn infer_category(text: &str, fallback: Category) -> Category {
    let text = normalize_title(text).replace(['-', '_'], " ");

    let mut best: Option<(Category, usize)> = None;
    for category in Category::ALL {
        let hits = vocabulary(category)
            .iter()
            .filter(|term| text.contains(*term))
            .count();
        if hits > 0 && best.is_none_or(|(_, top)| hits > top) {
            best = Some((category, hits));
        }
    }

    best.map_or(fallback, |(category, _)| category)
}
