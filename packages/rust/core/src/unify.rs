//! Page unification: wrap every produced page in the shared site shell.
//!
//! Unifying is idempotent. A page that already carries the wrapper has its
//! original content recovered first and is then wrapped again, so running
//! the unifier on every page every run never nests wrappers or drifts.
//! Malformed pages are unified as far as their structure allows.

use chrono::NaiveDate;
use pagesmith_document::{
    CONTENT_END, CONTENT_START, PageDocument, WRAPPER_END, WRAPPER_START, escape_html,
    extract_title, insert_after_head_open, insert_before_head_close, replace_body_inner,
    title_from_filename,
};
use pagesmith_shared::fs::{read_lossy, write_atomic};
use pagesmith_shared::{ArticleRecord, Result, UnifyConfig};
use tracing::{debug, info, instrument};

use crate::related::related_for;
use crate::site::SiteLayout;

const CHARSET_META: &str = r#"<meta charset="UTF-8">"#;
const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#;

/// Shown in the related section when there is nothing to recommend.
pub const NO_RELATED_PLACEHOLDER: &str = "No related posts yet.";

/// Everything the unifier needs besides the page and the corpus.
#[derive(Debug, Clone)]
pub struct UnifyOptions {
    /// Base address for canonical links, without trailing `/`.
    pub site_base: Option<String>,
    /// Date stamped into the footer.
    pub today: NaiveDate,
    pub brand_title: String,
    pub stylesheet: String,
    /// Maximum number of related links.
    pub related_count: usize,
}

impl UnifyOptions {
    pub fn new(config: &UnifyConfig, site_base: Option<String>, today: NaiveDate) -> Self {
        Self {
            site_base,
            today,
            brand_title: config.brand_title.clone(),
            stylesheet: config.stylesheet.clone(),
            related_count: config.related_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Head edits
// ---------------------------------------------------------------------------

/// Add charset and viewport metadata right after `<head>` when missing.
fn ensure_head_meta(html: String) -> String {
    let doc = PageDocument::parse(&html);
    if !doc.has_head() {
        return html;
    }

    let has_charset = doc.head_tags().any(|t| {
        t.is_open("meta")
            && (t.attr("charset").is_some()
                || t.attr("http-equiv")
                    .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type")))
    });
    let has_viewport = doc.head_tags().any(|t| {
        t.is_open("meta")
            && t.attr("name")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("viewport"))
    });

    let mut snippet = String::new();
    if !has_charset {
        snippet.push_str("\n  ");
        snippet.push_str(CHARSET_META);
    }
    if !has_viewport {
        snippet.push_str("\n  ");
        snippet.push_str(VIEWPORT_META);
    }
    if snippet.is_empty() {
        return html;
    }

    insert_after_head_open(&html, &snippet).unwrap_or(html)
}

/// Link the shared stylesheet before `</head>` when no head link points at it.
fn ensure_stylesheet(html: String, stylesheet: &str) -> String {
    let linked = PageDocument::parse(&html).head_tags().any(|t| {
        t.is_open("link")
            && t.attr("href")
                .is_some_and(|href| href.trim().eq_ignore_ascii_case(stylesheet))
    });
    if linked {
        return html;
    }

    let snippet = format!(
        "  <link rel=\"stylesheet\" href=\"{}\">\n",
        escape_html(stylesheet)
    );
    insert_before_head_close(&html, &snippet).unwrap_or(html)
}

/// Point a canonical link at `{base}/{filename}` unless one exists.
fn ensure_canonical(html: String, site_base: &str, filename: &str) -> String {
    let present = PageDocument::parse(&html).head_tags().any(|t| {
        t.is_open("link")
            && t.attr("rel").is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|r| r.eq_ignore_ascii_case("canonical"))
            })
    });
    if present {
        return html;
    }

    let snippet = format!(
        "  <link rel=\"canonical\" href=\"{}\">\n",
        escape_html(&format!("{site_base}/{filename}"))
    );
    insert_before_head_close(&html, &snippet).unwrap_or(html)
}

// ---------------------------------------------------------------------------
// Wrapper
// ---------------------------------------------------------------------------

fn related_list(related: &[&ArticleRecord]) -> String {
    if related.is_empty() {
        return format!("      <li><span class=\"muted\">{NO_RELATED_PLACEHOLDER}</span></li>");
    }

    related
        .iter()
        .map(|r| {
            format!(
                "      <li><a href=\"{}\">{}</a></li>",
                escape_html(&r.url),
                escape_html(&r.title)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the site shell around `content`, delimited by the wrapper markers.
pub fn build_wrapper(
    title: &str,
    content: &str,
    related: &[&ArticleRecord],
    opts: &UnifyOptions,
) -> String {
    format!(
        r#"{WRAPPER_START}
<div class="site">

  <header class="header">
    <div class="brand">
      <div class="brand-title">{brand}</div>
      <div class="brand-sub">{title}</div>
    </div>

    <nav class="nav">
      <a href="index.html#top">Home</a>
      <a href="index.html#top-examples">Top Examples</a>
      <a href="articles.html">All Articles</a>
      <a href="index.html#faq">FAQ</a>
    </nav>
  </header>

  <main class="card">
{CONTENT_START}
{content}
{CONTENT_END}
  </main>

  <section class="card">
    <h2>Related Examples</h2>
    <p>More worked examples to keep practicing.</p>
    <ul class="links">
{links}
    </ul>
  </section>

  <div class="footer">
    <span class="badge">Updated • {today}</span>
  </div>

</div>
{WRAPPER_END}"#,
        brand = escape_html(&opts.brand_title),
        title = escape_html(title),
        links = related_list(related),
        today = opts.today.format("%Y-%m-%d"),
    )
}

// ---------------------------------------------------------------------------
// Unify
// ---------------------------------------------------------------------------

/// Unify one page. Never fails: edits that need a missing region are skipped.
pub fn unify_page(
    html: &str,
    filename: &str,
    corpus: &[ArticleRecord],
    opts: &UnifyOptions,
) -> String {
    let mut html = ensure_head_meta(html.to_string());
    html = ensure_stylesheet(html, &opts.stylesheet);

    let title = extract_title(&html, &title_from_filename(filename));
    let content = PageDocument::parse(&html).content().to_string();

    let related = related_for(filename, corpus, opts.related_count);
    let wrapper = build_wrapper(&title, &content, &related, opts);

    html = match replace_body_inner(&html, &format!("\n{wrapper}\n")) {
        Some(replaced) => replaced,
        None => {
            debug!(filename, "no complete <body>, leaving body untouched");
            html
        }
    };

    match &opts.site_base {
        Some(base) => ensure_canonical(html, base, filename),
        None => html,
    }
}

/// Unify every page of `site`; returns how many pages were processed.
///
/// Pages are only rewritten when unification changes them.
#[instrument(skip_all, fields(root = %site.root().display(), corpus = corpus.len()))]
pub fn unify_all(
    site: &SiteLayout,
    corpus: &[ArticleRecord],
    opts: &UnifyOptions,
    mut on_page: impl FnMut(&str, usize, usize),
) -> Result<usize> {
    let pages = site.list_pages()?;
    let total = pages.len();
    let mut rewritten = 0;

    for (i, filename) in pages.iter().enumerate() {
        let path = site.file(filename);
        let original = read_lossy(&path)?;
        let unified = unify_page(&original, filename, corpus, opts);

        if unified != original {
            write_atomic(&path, &unified)?;
            rewritten += 1;
        }
        on_page(filename, i + 1, total);
    }

    info!(pages = total, rewritten, "unified pages");
    Ok(total)
}
