//! Article corpus builder.
//!
//! The corpus is rebuilt from scratch on every run: each produced page is read,
//! its title and description extracted, and bank metadata joined in by
//! filename. Pages the bank does not know get a keyword-inferred category.

use pagesmith_bank::{TopicBank, infer_category};
use pagesmith_document::{
    PageDocument, extract_title, first_paragraph, meta_description, title_from_filename,
    truncate_chars,
};
use pagesmith_shared::fs::read_lossy;
use pagesmith_shared::{ArticleRecord, Category, DEFAULT_RANK, Result};
use tracing::{debug, instrument};

use crate::site::SiteLayout;

/// Descriptions longer than this are cut at a word boundary.
pub const MAX_DESCRIPTION_CHARS: usize = 160;

/// Build the corpus record for one page.
pub fn record_for(filename: &str, html: &str, bank: &TopicBank) -> ArticleRecord {
    let entry = bank.get(filename);

    let fallback_title = entry
        .map(|e| e.title_hint.trim())
        .filter(|hint| !hint.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| title_from_filename(filename));
    let title = extract_title(html, &fallback_title);

    let description = meta_description(html)
        .or_else(|| first_paragraph(PageDocument::parse(html).content()))
        .map(|text| truncate_chars(&text, MAX_DESCRIPTION_CHARS))
        .unwrap_or_default();

    match entry {
        Some(entry) => ArticleRecord {
            url: filename.to_string(),
            title,
            category: entry.category,
            tags: entry.tags.clone(),
            description,
            featured: entry.featured,
            rank: entry.rank,
        },
        None => ArticleRecord {
            url: filename.to_string(),
            category: infer_category(&format!("{filename} {title}"), Category::Other),
            title,
            tags: Vec::new(),
            description,
            featured: false,
            rank: DEFAULT_RANK,
        },
    }
}

/// Rebuild the corpus for every page of `site`, in page order.
#[instrument(skip_all, fields(root = %site.root().display()))]
pub fn build_corpus(site: &SiteLayout, bank: &TopicBank) -> Result<Vec<ArticleRecord>> {
    let pages = site.list_pages()?;
    let mut records = Vec::with_capacity(pages.len());

    for filename in &pages {
        let html = read_lossy(&site.file(filename))?;
        let record = record_for(filename, &html, bank);
        debug!(url = %record.url, category = %record.category, "indexed page");
        records.push(record);
    }

    Ok(records)
}
