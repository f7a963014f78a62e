//! Category-balanced selection of the next topic to produce.
//!
//! Categories that have produced the fewest pages go first, ties broken by
//! declared category order. Within a category the lowest rank wins, ties
//! broken by filename. Nothing here is random: the same bank and produced
//! set always give the same answer.

use std::collections::{BTreeMap, BTreeSet};

use pagesmith_shared::{Category, TopicEntry, file_key};
use tracing::{debug, instrument, warn};

use crate::store::TopicBank;

/// Filenames of pages that already exist, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducedPages {
    keys: BTreeSet<String>,
}

impl ProducedPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: &str) -> bool {
        self.keys.insert(file_key(filename))
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.keys.contains(&file_key(filename))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for ProducedPages {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut produced = Self::new();
        for name in iter {
            produced.insert(name.as_ref());
        }
        produced
    }
}

/// Outcome of a selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    /// Produce this entry next.
    Next(&'a TopicEntry),
    /// Every bank entry already has a page.
    Exhausted,
}

impl<'a> Selection<'a> {
    pub fn entry(&self) -> Option<&'a TopicEntry> {
        match *self {
            Self::Next(entry) => Some(entry),
            Self::Exhausted => None,
        }
    }
}

/// Produced pages per category; pages unknown to the bank count as `Other`.
pub fn produced_counts(bank: &TopicBank, produced: &ProducedPages) -> BTreeMap<Category, usize> {
    let mut counts: BTreeMap<Category, usize> = Category::ALL.iter().map(|c| (*c, 0)).collect();
    for name in produced.iter() {
        let category = bank.get(name).map_or(Category::Other, |e| e.category);
        *counts.entry(category).or_default() += 1;
    }
    counts
}

fn lowest<'a>(candidates: impl Iterator<Item = &'a TopicEntry>) -> Option<&'a TopicEntry> {
    candidates.min_by_key(|e| (e.rank, e.key()))
}

/// Entries without a page yet. Names that could never be written or found on
/// disk are skipped so they cannot win every selection.
fn unproduced<'a>(bank: &'a TopicBank, produced: &ProducedPages) -> Vec<&'a TopicEntry> {
    bank.entries()
        .iter()
        .filter(|e| {
            if !e.has_page_filename() {
                warn!(filename = %e.filename, "bank entry has no usable page filename, skipping");
                return false;
            }
            !produced.contains(&e.filename)
        })
        .collect()
}

/// Pick the next topic to produce.
#[instrument(skip_all, fields(bank = bank.len(), produced = produced.len()))]
pub fn select_next<'a>(bank: &'a TopicBank, produced: &ProducedPages) -> Selection<'a> {
    let counts = produced_counts(bank, produced);
    let candidates = unproduced(bank, produced);

    let mut order: Vec<Category> = Category::ALL.to_vec();
    order.sort_by_key(|c| (counts.get(c).copied().unwrap_or(0), c.order()));

    for category in order {
        let in_category = candidates.iter().copied().filter(|e| e.category == category);
        if let Some(entry) = lowest(in_category) {
            debug!(%category, filename = %entry.filename, "selected topic");
            return Selection::Next(entry);
        }
    }

    match lowest(candidates.into_iter()) {
        Some(entry) => Selection::Next(entry),
        None => {
            debug!("every bank entry has been produced");
            Selection::Exhausted
        }
    }
}
