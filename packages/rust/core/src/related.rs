//! Related-page recommendations.

use std::collections::HashSet;

use pagesmith_shared::{ArticleRecord, Category, file_key};

/// Ordering for every recommendation tier: rank, then title, then address.
fn ranking_key(record: &ArticleRecord) -> (i64, &str, String) {
    (record.rank, record.title.as_str(), record.key())
}

/// Pick up to `k` related pages for `filename`.
///
/// Same-category pages come first, then featured pages, then anything else
/// to fill the remaining slots. A page never recommends itself. A page
/// missing from the corpus is treated as category `other`.
pub fn related_for<'a>(
    filename: &str,
    corpus: &'a [ArticleRecord],
    k: usize,
) -> Vec<&'a ArticleRecord> {
    let own_key = file_key(filename);
    let category = corpus
        .iter()
        .find(|r| r.key() == own_key)
        .map_or(Category::Other, |r| r.category);

    let mut others: Vec<&ArticleRecord> = corpus.iter().filter(|r| r.key() != own_key).collect();
    others.sort_by(|a, b| ranking_key(a).cmp(&ranking_key(b)));

    let mut picked: Vec<&ArticleRecord> = Vec::with_capacity(k);
    let mut seen: HashSet<String> = HashSet::new();

    let tiers: [&dyn Fn(&ArticleRecord) -> bool; 3] = [
        &|r: &ArticleRecord| r.category == category,
        &|r: &ArticleRecord| r.featured,
        &|_: &ArticleRecord| true,
    ];
    for accept in tiers {
        for record in others.iter().copied().filter(|r| accept(*r)) {
            if picked.len() >= k {
                return picked;
            }
            if seen.insert(record.key()) {
                picked.push(record);
            }
        }
    }

    picked.truncate(k);
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, category: Category, rank: i64, featured: bool) -> ArticleRecord {
        ArticleRecord {
            url: url.to_string(),
            title: url.trim_end_matches(".html").to_string(),
            category,
            tags: Vec::new(),
            description: String::new(),
            featured,
            rank,
        }
    }

    fn urls(records: &[&ArticleRecord]) -> Vec<String> {
        records.iter().map(|r| r.url.clone()).collect()
    }

    #[test]
    fn same_category_then_featured_then_rest() {
        let corpus = vec![
            record("self.html", Category::Deadlock, 1, false),
            record("d2.html", Category::Deadlock, 5, false),
            record("d1.html", Category::Deadlock, 3, false),
            record("p-feat.html", Category::Parsing, 50, true),
            record("s-low.html", Category::Scheduling, 1, false),
            record("s-high.html", Category::Scheduling, 80, false),
        ];

        let related = related_for("self.html", &corpus, 4);
        assert_eq!(urls(&related), vec!["d1.html", "d2.html", "p-feat.html", "s-low.html"]);
    }

    #[test]
    fn full_category_dominates() {
        let mut corpus: Vec<ArticleRecord> = (0..8)
            .map(|i| record(&format!("lru-{i}.html"), Category::PageReplacement, 90, false))
            .collect();
        corpus.push(record("featured.html", Category::Scheduling, 1, true));

        let related = related_for("lru-3.html", &corpus, 6);
        assert_eq!(related.len(), 6);
        assert!(related.iter().all(|r| r.category == Category::PageReplacement));
        assert!(related.iter().all(|r| r.url != "lru-3.html"));
    }

    #[test]
    fn never_recommends_itself_case_insensitive() {
        let corpus = vec![
            record("Page.html", Category::Other, 1, true),
            record("other.html", Category::Other, 2, false),
        ];
        let related = related_for("page.HTML", &corpus, 6);
        assert_eq!(urls(&related), vec!["other.html"]);
    }

    #[test]
    fn ties_break_on_title_then_url() {
        let mut a = record("a.html", Category::Parsing, 1, false);
        a.title = "Same".into();
        let mut b = record("b.html", Category::Parsing, 1, false);
        b.title = "Same".into();
        let corpus = vec![b, a, record("self.html", Category::Parsing, 1, false)];

        let related = related_for("self.html", &corpus, 6);
        assert_eq!(urls(&related), vec!["a.html", "b.html"]);
    }

    #[test]
    fn unknown_page_and_empty_corpus() {
        assert!(related_for("x.html", &[], 6).is_empty());

        let corpus = vec![
            record("misc.html", Category::Other, 9, false),
            record("sched.html", Category::Scheduling, 1, false),
        ];
        let related = related_for("new.html", &corpus, 6);
        assert_eq!(urls(&related), vec!["misc.html", "sched.html"]);
    }

    #[test]
    fn zero_slots() {
        let corpus = vec![record("a.html", Category::Other, 1, false)];
        assert!(related_for("b.html", &corpus, 0).is_empty());
    }
}
