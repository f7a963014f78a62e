//! Title normalization and page filename derivation.

use std::sync::LazyLock;

use pagesmith_shared::Category;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Maximum number of title words kept in a derived filename.
pub const MAX_SLUG_WORDS: usize = 10;

/// Used when a title has no usable characters at all.
const FALLBACK_SLUG: &str = "article";

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize a title for duplicate detection: NFKC, lower-case, collapsed whitespace.
pub fn normalize_title(text: &str) -> String {
    let folded = text.nfkc().collect::<String>().to_lowercase();
    WHITESPACE_RE
        .replace_all(folded.trim(), " ")
        .into_owned()
}

/// Word appended to a filename when the title does not already mention its category.
pub fn category_suffix(category: Category) -> &'static str {
    match category {
        Category::Scheduling => "scheduling",
        Category::PageReplacement => "page-replacement",
        Category::Deadlock => "deadlock",
        Category::Parsing => "parsing",
        Category::Other => "example",
    }
}

/// Derive the page filename for a title, e.g.
/// `"Banker's Algorithm Example"` → `bankers-algorithm-example-deadlock.html`.
pub fn filename_for(title: &str, category: Category) -> String {
    // NFKD splits accents off their base letters so `é` keeps its `e`.
    let decomposed: String = title.nfkd().collect::<String>().to_lowercase();

    let cleaned: String = decomposed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();

    let words: Vec<&str> = cleaned
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty())
        .take(MAX_SLUG_WORDS)
        .collect();

    let mut slug = if words.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        words.join("-")
    };

    let suffix = category_suffix(category);
    if !format!("-{slug}-").contains(&format!("-{suffix}-")) {
        slug.push('-');
        slug.push_str(suffix);
    }

    format!("{slug}.html")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_title_folds_case_and_space() {
        assert_eq!(
            normalize_title("  LRU   Page\tReplacement  Example "),
            "lru page replacement example"
        );
        // Full-width characters fold to ASCII under NFKC.
        assert_eq!(normalize_title("ＬＲＵ example"), "lru example");
    }

    #[test]
    fn filename_keeps_existing_category_word() {
        assert_eq!(
            filename_for("Round Robin Scheduling Example", Category::Scheduling),
            "round-robin-scheduling-example.html"
        );
        assert_eq!(
            filename_for("fifo page replacement example", Category::PageReplacement),
            "fifo-page-replacement-example.html"
        );
    }

    #[test]
    fn filename_appends_missing_suffix() {
        assert_eq!(
            filename_for("Banker's Algorithm Example", Category::Deadlock),
            "bankers-algorithm-example-deadlock.html"
        );
        assert_eq!(
            filename_for("first follow example", Category::Parsing),
            "first-follow-example-parsing.html"
        );
    }

    #[test]
    fn filename_strips_punctuation_and_accents() {
        assert_eq!(
            filename_for("LL(1) parsing — solved example!", Category::Parsing),
            "ll1-parsing-solved-example.html"
        );
        assert_eq!(
            filename_for("Algoritmo del banquero: ejemplo résuelto", Category::Other),
            "algoritmo-del-banquero-ejemplo-resuelto-example.html"
        );
    }

    #[test]
    fn filename_truncates_long_titles() {
        let title = "one two three four five six seven eight nine ten eleven twelve";
        let name = filename_for(title, Category::Other);
        assert_eq!(
            name,
            "one-two-three-four-five-six-seven-eight-nine-ten-example.html"
        );
    }

    #[test]
    fn filename_never_empty() {
        assert_eq!(filename_for("!!! ???", Category::Other), "article-example.html");
        assert_eq!(filename_for("", Category::Deadlock), "article-deadlock.html");
    }

    #[test]
    fn suffix_matches_whole_words_only() {
        // "parsings" is not the word "parsing".
        assert_eq!(
            filename_for("parsings example", Category::Parsing),
            "parsings-example-parsing.html"
        );
    }
}
