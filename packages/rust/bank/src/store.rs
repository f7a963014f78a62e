//! The persisted topic bank: a JSON array of [`TopicEntry`] records.
//!
//! Loading is forgiving: a missing file is an empty bank, a malformed file is
//! logged and treated as empty, and items that are not objects or have no
//! filename are skipped. Bad field values fall back to defaults rather than
//! losing the entry. Saving always writes the whole array atomically.

use std::collections::HashSet;
use std::path::Path;

use pagesmith_shared::fs::{read_lossy, write_atomic};
use pagesmith_shared::{PagesmithError, Result, TopicEntry, file_key};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Ordered collection of topic entries with unique (case-insensitive) filenames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicBank {
    entries: Vec<TopicEntry>,
}

impl TopicBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bank from raw entries, keeping the first occurrence of each filename.
    pub fn from_entries(entries: impl IntoIterator<Item = TopicEntry>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for entry in entries {
            if entry.filename.trim().is_empty() {
                warn!("dropping bank entry without a filename");
                continue;
            }
            if !seen.insert(entry.key()) {
                warn!(filename = %entry.filename, "dropping duplicate bank entry");
                continue;
            }
            kept.push(entry);
        }

        Self { entries: kept }
    }

    /// Load the bank from `path`.
    ///
    /// Only an unreadable existing file is an error.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no bank file yet, starting empty");
            return Ok(Self::new());
        }

        let text = read_lossy(path)?;
        let items = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!("bank file is not a JSON array, treating as empty");
                return Ok(Self::new());
            }
            Err(e) => {
                warn!(error = %e, "bank file is malformed, treating as empty");
                return Ok(Self::new());
            }
        };

        let total = items.len();
        let entries: Vec<TopicEntry> = items
            .into_iter()
            .filter_map(|item| {
                if !item.is_object() {
                    warn!("skipping non-object bank item");
                    return None;
                }
                match serde_json::from_value::<TopicEntry>(item) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(error = %e, "skipping unreadable bank entry");
                        None
                    }
                }
            })
            .collect();

        let bank = Self::from_entries(entries);
        debug!(total, loaded = bank.len(), "bank loaded");
        Ok(bank)
    }

    /// Write the whole bank to `path` as pretty-printed JSON.
    #[instrument(skip_all, fields(path = %path.display(), entries = self.entries.len()))]
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| PagesmithError::Bank(format!("failed to serialize bank: {e}")))?;
        json.push('\n');
        write_atomic(path, &json)
    }

    pub fn entries(&self) -> &[TopicEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by filename, ignoring ASCII case.
    pub fn get(&self, filename: &str) -> Option<&TopicEntry> {
        let key = file_key(filename);
        self.entries.iter().find(|e| e.key() == key)
    }

    pub fn contains_filename(&self, filename: &str) -> bool {
        self.get(filename).is_some()
    }

    /// Append an entry whose filename the caller has already checked is new.
    pub(crate) fn push(&mut self, entry: TopicEntry) {
        debug_assert!(!self.contains_filename(&entry.filename));
        self.entries.push(entry);
    }

    /// Sort by (rank, category, filename) and keep at most `max` entries.
    ///
    /// Returns how many entries were dropped.
    pub fn sort_and_truncate(&mut self, max: usize) -> usize {
        self.entries.sort_by_cached_key(|e| (e.rank, e.category, e.key()));

        let dropped = self.entries.len().saturating_sub(max);
        if dropped > 0 {
            self.entries.truncate(max);
            warn!(dropped, max, "bank over capacity, dropped highest-rank entries");
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use pagesmith_shared::{Category, DEFAULT_RANK};

    use super::*;

    fn temp_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ps-bank-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn entry(filename: &str, category: Category, rank: i64) -> TopicEntry {
        serde_json::from_value(serde_json::json!({
            "filename": filename,
            "category": category,
            "rank": rank,
        }))
        .unwrap()
    }

    #[test]
    fn load_fixture_bank() {
        let bank = TopicBank::load(Path::new("../../../fixtures/json/topic-bank.fixture.json"))
            .unwrap();

        assert_eq!(bank.len(), 4);
        let deadlock = bank.get("BANKERS-ALGORITHM-EXAMPLE-DEADLOCK.HTML").unwrap();
        assert_eq!(deadlock.category, Category::Deadlock);
        assert_eq!(deadlock.rank, 5);
    }

    #[test]
    fn missing_file_is_empty_bank() {
        let dir = temp_dir();
        let bank = TopicBank::load(&dir.join("topic_bank_auto.json")).unwrap();
        assert!(bank.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_is_empty_bank() {
        let dir = temp_dir();
        let path = dir.join("topic_bank_auto.json");

        std::fs::write(&path, "[{\"filename\": \"a.html\",").unwrap();
        assert!(TopicBank::load(&path).unwrap().is_empty());

        std::fs::write(&path, "{\"filename\": \"a.html\"}").unwrap();
        assert!(TopicBank::load(&path).unwrap().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_skips_bad_items_and_duplicates() {
        let dir = temp_dir();
        let path = dir.join("topic_bank_auto.json");
        std::fs::write(
            &path,
            r#"[
                {"filename": "a.html", "category": "scheduling", "rank": 1},
                "not an object",
                {"category": "parsing"},
                {"filename": "", "rank": 2},
                {"filename": "A.HTML", "rank": 3},
                {"filename": "b.html", "rank": null}
            ]"#,
        )
        .unwrap();

        let bank = TopicBank::load(&path).unwrap();
        let names: Vec<&str> = bank.entries().iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["a.html", "b.html"]);
        assert_eq!(bank.get("b.html").unwrap().rank, DEFAULT_RANK);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_keeps_entries_with_null_fields() {
        let dir = temp_dir();
        let path = dir.join("topic_bank_auto.json");
        std::fs::write(
            &path,
            r#"[
                {"filename": "keep.html", "title_hint": null, "category": null},
                {"filename": "other.html", "category": "parsing", "prompt": null, "source": 5}
            ]"#,
        )
        .unwrap();

        let bank = TopicBank::load(&path).unwrap();
        assert_eq!(bank.len(), 2);
        let keep = bank.get("keep.html").unwrap();
        assert_eq!(keep.category, Category::Other);
        assert!(keep.title_hint.is_empty());
        let other = bank.get("other.html").unwrap();
        assert_eq!(other.category, Category::Parsing);
        assert_eq!(other.source, None);

        bank.save(&path).unwrap();
        assert_eq!(TopicBank::load(&path).unwrap(), bank);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_then_load_preserves_unknown_fields() {
        let dir = temp_dir();
        let path = dir.join("bank").join("topic_bank_auto.json");

        let mut first = entry("fifo-page-replacement-example.html", Category::PageReplacement, 4);
        first
            .extra
            .insert("notes".into(), serde_json::json!("hand-curated, résumé"));
        let bank = TopicBank::from_entries(vec![first]);
        bank.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("]\n"));
        assert!(text.contains("résumé"));

        let reloaded = TopicBank::load(&path).unwrap();
        assert_eq!(reloaded, bank);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sort_and_truncate_keeps_lowest_ranks() {
        let mut bank = TopicBank::from_entries(vec![
            entry("z.html", Category::Parsing, 90),
            entry("b.html", Category::Deadlock, 1),
            entry("a.html", Category::Deadlock, 1),
            entry("c.html", Category::Scheduling, 1),
            entry("d.html", Category::Other, 9999),
        ]);

        let dropped = bank.sort_and_truncate(3);
        assert_eq!(dropped, 2);

        let names: Vec<&str> = bank.entries().iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, vec!["c.html", "a.html", "b.html"]);
    }

    #[test]
    fn sort_without_overflow_drops_nothing() {
        let mut bank = TopicBank::from_entries(vec![
            entry("b.html", Category::Other, 2),
            entry("a.html", Category::Other, 1),
        ]);
        assert_eq!(bank.sort_and_truncate(10), 0);
        assert_eq!(bank.entries()[0].filename, "a.html");
    }
}
