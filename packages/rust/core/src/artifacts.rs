//! Derived site files: `articles.json`, `sitemap.xml` and `faq.json`.

use std::path::Path;

use chrono::NaiveDate;
use pagesmith_document::escape_html;
use pagesmith_shared::fs::write_atomic;
use pagesmith_shared::{ArticleRecord, FaqEntry, PagesmithError, Result};
use tracing::{debug, info, instrument};

use crate::site::SiteLayout;

pub const ARTICLES_FILE: &str = "articles.json";
pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const FAQ_FILE: &str = "faq.json";

/// Which artifacts a call actually wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactsWritten {
    pub articles: bool,
    pub sitemap: bool,
    pub faq: bool,
}

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)
        .map_err(|e| PagesmithError::parse(format!("failed to serialize: {e}")))?;
    json.push('\n');
    Ok(json)
}

/// Sitemap listing the site root, `articles.html`, then every corpus page.
pub fn sitemap_xml(site_base: &str, corpus: &[ArticleRecord], today: NaiveDate) -> String {
    let lastmod = today.format("%Y-%m-%d").to_string();
    let locations = [format!("{site_base}/"), format!("{site_base}/articles.html")]
        .into_iter()
        .chain(corpus.iter().map(|r| format!("{site_base}/{}", r.url)));

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for loc in locations {
        xml.push_str(&format!(
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{lastmod}</lastmod>\n  </url>\n",
            escape_html(&loc)
        ));
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Starter FAQ written when a site has none.
pub fn default_faq() -> Vec<FaqEntry> {
    [
        (
            "How are these examples generated?",
            "Each page is an exam-style worked example with step tables and final answers.",
        ),
        (
            "Can I request a topic?",
            "Yes. New topics are added continuously based on common search suggestions.",
        ),
        (
            "Do pages include worked calculations?",
            "Yes. Tables show each step and the final numeric results.",
        ),
    ]
    .into_iter()
    .map(|(q, a)| FaqEntry {
        q: q.into(),
        a: a.into(),
    })
    .collect()
}

/// Write `articles.json` from the corpus.
pub fn write_articles(path: &Path, corpus: &[ArticleRecord]) -> Result<()> {
    write_atomic(path, &to_pretty_json(corpus)?)
}

/// Write the default FAQ unless the file already exists. Returns whether it wrote.
pub fn ensure_faq(path: &Path) -> Result<bool> {
    if path.exists() {
        debug!(path = %path.display(), "faq exists, leaving it alone");
        return Ok(false);
    }
    write_atomic(path, &to_pretty_json(&default_faq())?)?;
    Ok(true)
}

/// Write every derived artifact. The sitemap needs a base address and is
/// skipped without one.
#[instrument(skip_all, fields(root = %site.root().display(), pages = corpus.len()))]
pub fn write_artifacts(
    site: &SiteLayout,
    corpus: &[ArticleRecord],
    site_base: Option<&str>,
    today: NaiveDate,
) -> Result<ArtifactsWritten> {
    let mut written = ArtifactsWritten::default();

    write_articles(&site.file(ARTICLES_FILE), corpus)?;
    written.articles = true;

    if let Some(base) = site_base {
        write_atomic(&site.file(SITEMAP_FILE), &sitemap_xml(base, corpus, today))?;
        written.sitemap = true;
    }

    written.faq = ensure_faq(&site.file(FAQ_FILE))?;

    info!(?written, "artifacts written");
    Ok(written)
}
