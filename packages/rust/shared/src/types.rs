//! Core domain types for the topic bank and the article corpus.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Rank assigned when an entry carries no usable rank (lower = higher priority).
pub const DEFAULT_RANK: i64 = 9999;

/// Case-insensitive identity key for a page filename.
///
/// Every comparison between bank filenames, produced pages, and corpus URLs
/// goes through this so that `Foo.html` and `foo.html` are the same page.
pub fn file_key(filename: &str) -> String {
    filename.trim().to_ascii_lowercase()
}

/// A bare `.html` filename that stays inside the site root.
pub fn is_page_filename(filename: &str) -> bool {
    let name = filename.trim();
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && name.to_ascii_lowercase().ends_with(".html")
}

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 identifier for one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Subject area used to balance content production.
///
/// Declaration order is significant: it is the tie-break order for selection
/// and the secondary sort key of the bank.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Scheduling,
    PageReplacement,
    Deadlock,
    Parsing,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    /// All categories in declared order.
    pub const ALL: [Category; 5] = [
        Category::Scheduling,
        Category::PageReplacement,
        Category::Deadlock,
        Category::Parsing,
        Category::Other,
    ];

    /// Stable wire name (matches the serialized form).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduling => "scheduling",
            Self::PageReplacement => "page-replacement",
            Self::Deadlock => "deadlock",
            Self::Parsing => "parsing",
            Self::Other => "other",
        }
    }

    /// Position in the declared order.
    pub fn order(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(Self::ALL.len())
    }

    /// Lenient parse; anything unrecognised becomes [`Category::Other`].
    pub fn from_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TopicEntry
// ---------------------------------------------------------------------------

/// One topic in the bank (`topic_bank_auto.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicEntry {
    /// Page filename, e.g. `lru-page-replacement-example.html`. Unique key.
    #[serde(default, deserialize_with = "lenient_string")]
    pub filename: String,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Category,
    /// Lower ranks are produced first.
    #[serde(default = "default_rank", deserialize_with = "lenient_rank")]
    pub rank: i64,
    /// Display title the page is generated for.
    #[serde(default, deserialize_with = "lenient_string")]
    pub title_hint: String,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub featured: bool,
    /// Generation instructions; opaque to everything but the generator.
    #[serde(default, deserialize_with = "lenient_string")]
    pub prompt: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub seed: Option<String>,
    /// Fields written by other tools, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl TopicEntry {
    /// Case-insensitive identity key of this entry.
    pub fn key(&self) -> String {
        file_key(&self.filename)
    }

    /// Whether this entry names a page that can be written and later found on disk.
    pub fn has_page_filename(&self) -> bool {
        is_page_filename(&self.filename)
    }
}

fn default_rank() -> i64 {
    DEFAULT_RANK
}

/// Accept integers, integral floats and numeric strings; anything else is the default rank.
fn lenient_rank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .unwrap_or(DEFAULT_RANK),
        Value::String(s) => s.trim().parse().unwrap_or(DEFAULT_RANK),
        _ => DEFAULT_RANK,
    })
}

/// Tags may be stored as a single string or as a list of strings.
fn lenient_tags<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Null or non-string values read as empty.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        _ => String::new(),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Category, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Category::from_name(&s),
        _ => Category::Other,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

// ---------------------------------------------------------------------------
// ArticleRecord
// ---------------------------------------------------------------------------

/// A produced page joined with its bank metadata (`articles.json`).
///
/// Rebuilt from scratch every run; never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Page address relative to the site root (the filename).
    pub url: String,
    pub title: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_rank")]
    pub rank: i64,
}

impl ArticleRecord {
    /// Case-insensitive identity key of the page this record describes.
    pub fn key(&self) -> String {
        file_key(&self.url)
    }
}

// ---------------------------------------------------------------------------
// FaqEntry
// ---------------------------------------------------------------------------

/// A single question/answer pair in `faq.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub q: String,
    pub a: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names() {
        let json = serde_json::to_string(&Category::PageReplacement).unwrap();
        assert_eq!(json, "\"page-replacement\"");

        let parsed: Category = serde_json::from_str("\"deadlock\"").unwrap();
        assert_eq!(parsed, Category::Deadlock);

        let unknown: Category = serde_json::from_str("\"misc\"").unwrap();
        assert_eq!(unknown, Category::Other);
    }

    #[test]
    fn category_declared_order() {
        assert!(Category::Scheduling < Category::PageReplacement);
        assert!(Category::Parsing < Category::Other);
        assert_eq!(Category::Deadlock.order(), 2);
        assert_eq!(Category::from_name(" Parsing "), Category::Parsing);
        assert_eq!(Category::from_name("cooking"), Category::Other);
    }

    #[test]
    fn topic_entry_tolerates_loose_fields() {
        let json = r#"{
            "filename": "fifo-page-replacement-example.html",
            "category": "page-replacement",
            "rank": "12",
            "tags": "fifo page replacement example",
            "featured": "yes",
            "title_hint": "fifo page replacement example",
            "custom": {"kept": true}
        }"#;
        let entry: TopicEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.rank, 12);
        assert_eq!(entry.tags, vec!["fifo page replacement example".to_string()]);
        assert!(!entry.featured);
        assert!(entry.prompt.is_empty());
        assert_eq!(entry.extra["custom"]["kept"], true);

        let back = serde_json::to_value(&entry).unwrap();
        assert_eq!(back["custom"]["kept"], true);
    }

    #[test]
    fn topic_entry_defaults_missing_rank_and_category() {
        let entry: TopicEntry =
            serde_json::from_str(r#"{"filename": "X.html", "rank": "high"}"#).unwrap();
        assert_eq!(entry.rank, DEFAULT_RANK);
        assert_eq!(entry.category, Category::Other);
        assert_eq!(entry.key(), "x.html");

        let entry: TopicEntry = serde_json::from_str(r#"{"filename": "y.html"}"#).unwrap();
        assert_eq!(entry.rank, DEFAULT_RANK);
    }

    #[test]
    fn topic_entry_null_fields_become_defaults() {
        let json = r#"{
            "filename": "keep.html",
            "category": null,
            "title_hint": null,
            "prompt": 42,
            "source": null,
            "seed": ["x"]
        }"#;
        let entry: TopicEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.filename, "keep.html");
        assert_eq!(entry.category, Category::Other);
        assert!(entry.title_hint.is_empty());
        assert!(entry.prompt.is_empty());
        assert_eq!(entry.source, None);
        assert_eq!(entry.seed, None);

        let entry: TopicEntry =
            serde_json::from_str(r#"{"filename": "a.html", "category": " Deadlock "}"#).unwrap();
        assert_eq!(entry.category, Category::Deadlock);

        let entry: TopicEntry = serde_json::from_str(r#"{"filename": 7}"#).unwrap();
        assert!(entry.filename.is_empty());
    }

    #[test]
    fn page_filename_rules() {
        assert!(is_page_filename("lru-page-replacement-example.html"));
        assert!(is_page_filename("Upper.HTML"));
        assert!(!is_page_filename("a.htm"));
        assert!(!is_page_filename("../evil.html"));
        assert!(!is_page_filename("dir/page.html"));
        assert!(!is_page_filename("dir\\page.html"));
        assert!(!is_page_filename(".hidden.html"));
        assert!(!is_page_filename("  "));
    }

    #[test]
    fn article_record_serialization() {
        let record = ArticleRecord {
            url: "lru-page-replacement-example.html".into(),
            title: "LRU Page Replacement Example".into(),
            category: Category::PageReplacement,
            tags: vec!["lru".into()],
            description: "Worked LRU example.".into(),
            featured: true,
            rank: 3,
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: ArticleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn topic_bank_fixture_parses() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/topic-bank.fixture.json")
            .expect("read fixture");
        let entries: Vec<TopicEntry> = serde_json::from_str(&fixture).expect("parse fixture");
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].category, Category::Scheduling);
        assert!(entries.iter().any(|e| e.featured));
    }
}
