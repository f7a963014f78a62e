//! Page-level view over a document: head and body regions, the site wrapper
//! markers, and the in-place edits the unifier makes.

use tracing::warn;

use crate::scan::{DocumentMap, Tag};

/// Opens the site wrapper inside `<body>`.
pub const WRAPPER_START: &str = "<!-- SITE_WRAPPER_START -->";
/// Closes the site wrapper inside `<body>`.
pub const WRAPPER_END: &str = "<!-- SITE_WRAPPER_END -->";
/// Opens the page's own content inside the wrapper.
pub const CONTENT_START: &str = "<!-- SITE_CONTENT_START -->";
/// Closes the page's own content inside the wrapper.
pub const CONTENT_END: &str = "<!-- SITE_CONTENT_END -->";

/// A document plus the map of its structure.
#[derive(Debug, Clone)]
pub struct PageDocument<'a> {
    html: &'a str,
    map: DocumentMap,
}

impl<'a> PageDocument<'a> {
    pub fn parse(html: &'a str) -> Self {
        Self {
            html,
            map: DocumentMap::build(html),
        }
    }

    pub fn html(&self) -> &'a str {
        self.html
    }

    pub fn map(&self) -> &DocumentMap {
        &self.map
    }

    pub fn has_head(&self) -> bool {
        self.map.head.is_some()
    }

    /// Tags inside the head region.
    pub fn head_tags(&self) -> impl Iterator<Item = &Tag> {
        self.map.head_tags(self.html.len())
    }

    /// The body's contents, when both `<body>` and `</body>` exist.
    pub fn body_inner(&self) -> Option<&'a str> {
        let body = self.map.body.as_ref()?;
        body.close.as_ref()?;
        Some(&self.html[body.inner(self.html.len())])
    }

    /// Whether the body carries a previously applied site wrapper.
    pub fn is_wrapped(&self) -> bool {
        self.body_or_whole().contains(WRAPPER_START)
    }

    /// The page's original content, trimmed.
    ///
    /// For a wrapped page this is the content region recovered from inside
    /// the wrapper; otherwise it is the whole body (or the whole document
    /// when there is no body). The result never contains a wrapper start marker.
    pub fn content(&self) -> &'a str {
        let mut content = self.body_or_whole();
        if !self.is_wrapped() {
            return content.trim();
        }
        while let Some(recovered) = recover_wrapped_content(content) {
            content = recovered;
        }
        content.trim()
    }

    fn body_or_whole(&self) -> &'a str {
        self.body_inner().unwrap_or(self.html)
    }
}

/// Find the content region inside a wrapped body.
///
/// Current wrappers delimit it with content markers. Older wrappers only
/// had `<main class="card">`, closed by the last `</main>` in the wrapper.
/// Failing both, the span between the wrapper markers is used as is.
/// `None` when `body` has no wrapper start marker.
fn recover_wrapped_content(body: &str) -> Option<&str> {
    let wrapper_start = body.find(WRAPPER_START)? + WRAPPER_START.len();
    let wrapper_end = body
        .rfind(WRAPPER_END)
        .filter(|end| *end >= wrapper_start)
        .unwrap_or(body.len());
    let wrapper = &body[wrapper_start..wrapper_end];

    if let Some(start) = wrapper.find(CONTENT_START) {
        let inner_start = start + CONTENT_START.len();
        if let Some(end) = wrapper.rfind(CONTENT_END).filter(|end| *end >= inner_start) {
            return Some(&wrapper[inner_start..end]);
        }
    }

    let main_open = DocumentMap::build(wrapper)
        .tags()
        .iter()
        .find(|t| t.is_open("main") && t.attr("class").is_some_and(|c| c.trim() == "card"))
        .map(|t| t.span.end);
    let main_close = main_open.and_then(|open| {
        wrapper
            .to_ascii_lowercase()
            .rfind("</main>")
            .filter(|end| *end >= open)
    });
    if let (Some(open), Some(close)) = (main_open, main_close) {
        return Some(&wrapper[open..close]);
    }

    warn!("wrapper has no content region, using the span inside the wrapper markers");
    Some(wrapper)
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

/// Insert `snippet` right after the `<head>` start tag. `None` without a head.
pub fn insert_after_head_open(html: &str, snippet: &str) -> Option<String> {
    let head = DocumentMap::build(html).head?;
    Some(splice(html, head.open.end..head.open.end, snippet))
}

/// Insert `snippet` right before `</head>`. `None` when there is no `</head>`.
pub fn insert_before_head_close(html: &str, snippet: &str) -> Option<String> {
    let close = DocumentMap::build(html).head?.close?;
    Some(splice(html, close.start..close.start, snippet))
}

/// Replace everything between `<body ...>` and `</body>`, keeping the body
/// start tag (and its attributes) as written. `None` when either tag is missing.
pub fn replace_body_inner(html: &str, inner: &str) -> Option<String> {
    let body = DocumentMap::build(html).body?;
    let close = body.close?;
    Some(splice(html, body.open.end..close.start, inner))
}

fn splice(html: &str, range: std::ops::Range<usize>, insert: &str) -> String {
    let mut out = String::with_capacity(html.len() + insert.len());
    out.push_str(&html[..range.start]);
    out.push_str(insert);
    out.push_str(&html[range.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_of_plain_page_is_body() {
        let html = "<html><head></head><body>\n  <h1>Title</h1><p>X</p>\n</body></html>";
        let doc = PageDocument::parse(html);
        assert!(!doc.is_wrapped());
        assert_eq!(doc.content(), "<h1>Title</h1><p>X</p>");
    }

    #[test]
    fn content_without_body_is_whole_document() {
        let doc = PageDocument::parse("  <h1>Loose</h1>\n");
        assert_eq!(doc.content(), "<h1>Loose</h1>");
    }

    #[test]
    fn content_recovered_from_markers() {
        let html = format!(
            "<body class=\"a\">\n{WRAPPER_START}\n<div class=\"site\"><main class=\"card\">\n{CONTENT_START}\n<h1>T</h1>\n<main>inner</main>\n{CONTENT_END}\n</main></div>\n{WRAPPER_END}\n</body>"
        );
        let doc = PageDocument::parse(&html);
        assert!(doc.is_wrapped());
        assert_eq!(doc.content(), "<h1>T</h1>\n<main>inner</main>");
    }

    #[test]
    fn content_recovered_from_legacy_wrapper() {
        let html = std::fs::read_to_string("../../../fixtures/html/legacy-wrapped.html")
            .expect("read legacy fixture");
        let doc = PageDocument::parse(&html);

        assert!(doc.is_wrapped());
        let content = doc.content();
        assert!(content.starts_with("<h1>FIFO Page Replacement Example</h1>"));
        assert!(content.ends_with("<p>Frames: 3.</p>"));
        assert!(!content.contains("SITE_WRAPPER"));
        assert!(!content.contains("Related Examples"));
    }

    #[test]
    fn content_of_unrecognised_wrapper_drops_markers() {
        let html = format!(
            "<body>{WRAPPER_START}<div class=\"site\"><section><h1>T</h1></section></div>{WRAPPER_END}</body>"
        );
        let doc = PageDocument::parse(&html);
        assert!(doc.is_wrapped());
        assert_eq!(
            doc.content(),
            "<div class=\"site\"><section><h1>T</h1></section></div>"
        );
    }

    #[test]
    fn content_of_nested_wrappers_is_innermost() {
        let html = format!(
            "<body>{WRAPPER_START}<nav>n</nav>{WRAPPER_START}<p>x</p>{WRAPPER_END}{WRAPPER_END}</body>"
        );
        let content = PageDocument::parse(&html).content();
        assert!(!content.contains(WRAPPER_START));
        assert!(content.contains("<p>x</p>"));
    }

    #[test]
    fn head_insertions() {
        let html = "<html><HEAD lang=\"en\"><title>x</title></HEAD><body></body></html>";

        let after = insert_after_head_open(html, "[a]").unwrap();
        assert_eq!(
            after,
            "<html><HEAD lang=\"en\">[a]<title>x</title></HEAD><body></body></html>"
        );

        let before = insert_before_head_close(html, "[b]").unwrap();
        assert_eq!(
            before,
            "<html><HEAD lang=\"en\"><title>x</title>[b]</HEAD><body></body></html>"
        );

        assert!(insert_after_head_open("<p>no head</p>", "[a]").is_none());
        assert!(insert_before_head_close("<head><p>open", "[b]").is_none());
    }

    #[test]
    fn body_replacement_keeps_attributes() {
        let html = "<html><body class=\"article\" data-x='1'>old</body>\n</html>";
        let out = replace_body_inner(html, "new").unwrap();
        assert_eq!(out, "<html><body class=\"article\" data-x='1'>new</body>\n</html>");

        assert!(replace_body_inner("<body>never closed", "new").is_none());
    }
}
