//! A tolerant tag scanner.
//!
//! This is not an HTML parser. It walks the text once and records every tag
//! it can recognize with its byte span, so callers can splice the original
//! text without re-serializing it. Comments, doctypes and the contents of
//! raw-text elements (`script`, `style`, `textarea`, `title`) are skipped,
//! which keeps a `"</body>"` string inside a script from being mistaken for
//! markup. Anything unrecognizable is treated as text.

use std::ops::Range;

/// Elements whose contents are never scanned for tags.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// One start or end tag found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lower-cased element name.
    pub name: String,
    /// `true` for `</name>`.
    pub closing: bool,
    /// Byte range of the whole tag, `<` through `>`.
    pub span: Range<usize>,
    attrs: Vec<(String, String)>,
}

impl Tag {
    /// Attribute value by (case-insensitive) name. Valueless attributes yield `""`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_open(&self, name: &str) -> bool {
        !self.closing && self.name == name
    }

    pub fn is_close(&self, name: &str) -> bool {
        self.closing && self.name == name
    }
}

/// Scan every recognizable tag in `html`, in document order.
pub fn scan_tags(html: &str) -> Vec<Tag> {
    let bytes = html.as_bytes();
    let lower = html.to_ascii_lowercase();
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(offset) = html[pos..].find('<') {
        let start = pos + offset;
        let rest = &bytes[start..];

        if rest.starts_with(b"<!--") {
            match lower[start + 4..].find("-->") {
                Some(end) => pos = start + 4 + end + 3,
                None => break,
            }
            continue;
        }

        if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
            match html[start..].find('>') {
                Some(end) => pos = start + end + 1,
                None => break,
            }
            continue;
        }

        let closing = rest.get(1) == Some(&b'/');
        let name_start = start + if closing { 2 } else { 1 };
        if !bytes.get(name_start).is_some_and(u8::is_ascii_alphabetic) {
            pos = start + 1;
            continue;
        }

        let name_end = name_start
            + bytes[name_start..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-' || **b == b':')
                .count();
        let name = lower[name_start..name_end].to_string();

        let Some((attrs, end)) = parse_attrs(html, name_end) else {
            // Unterminated tag: nothing after this point is markup.
            break;
        };

        let raw_text = !closing && RAW_TEXT_ELEMENTS.contains(&name.as_str());
        let self_closing = html[..end].trim_end_matches('>').ends_with('/');

        tags.push(Tag {
            name: name.clone(),
            closing,
            span: start..end,
            attrs: if closing { Vec::new() } else { attrs },
        });
        pos = end;

        if raw_text && !self_closing {
            // Jump to the matching end tag; the loop picks it up as a tag.
            match lower[end..].find(&format!("</{name}")) {
                Some(close) => pos = end + close,
                None => break,
            }
        }
    }

    tags
}

/// Parse attributes from just after the tag name up to the closing `>`.
///
/// Returns the attributes and the byte offset just past `>`, or `None` if the
/// tag never closes.
fn parse_attrs(html: &str, from: usize) -> Option<(Vec<(String, String)>, usize)> {
    let bytes = html.as_bytes();
    let mut attrs = Vec::new();
    let mut i = from;

    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        match bytes.get(i) {
            None => return None,
            Some(b'>') => return Some((attrs, i + 1)),
            _ => {}
        }

        let key_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == key_start {
            // A stray '='.
            i += 1;
            continue;
        }
        let key = html[key_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            attrs.push((key, String::new()));
            continue;
        }

        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = match bytes.get(i) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let value_start = i + 1;
                let value_end = value_start + html[value_start..].find(quote as char)?;
                i = value_end + 1;
                &html[value_start..value_end]
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                &html[value_start..i]
            }
        };
        attrs.push((key, value.to_string()));
    }
}

// ---------------------------------------------------------------------------
// DocumentMap
// ---------------------------------------------------------------------------

/// The byte spans of an element's start tag and (if found) end tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub open: Range<usize>,
    pub close: Option<Range<usize>>,
}

impl Region {
    /// Byte range between the start tag and the end tag (or `fallback_end`).
    pub fn inner(&self, fallback_end: usize) -> Range<usize> {
        let end = self.close.as_ref().map_or(fallback_end, |c| c.start);
        self.open.end..end.max(self.open.end)
    }
}

/// Where the head and body of a document are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMap {
    pub head: Option<Region>,
    pub body: Option<Region>,
    tags: Vec<Tag>,
}

impl DocumentMap {
    /// Map `html`: the first `<head>` and its first `</head>`, the first
    /// `<body>` and the last `</body>` after it.
    pub fn build(html: &str) -> Self {
        let tags = scan_tags(html);

        let head = tags.iter().position(|t| t.is_open("head")).map(|i| Region {
            open: tags[i].span.clone(),
            close: tags[i..]
                .iter()
                .find(|t| t.is_close("head"))
                .map(|t| t.span.clone()),
        });

        let body = tags.iter().position(|t| t.is_open("body")).map(|i| Region {
            open: tags[i].span.clone(),
            close: tags[i..]
                .iter()
                .rev()
                .find(|t| t.is_close("body"))
                .map(|t| t.span.clone()),
        });

        Self { head, body, tags }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Tags that start inside `range`.
    pub fn tags_in(&self, range: Range<usize>) -> impl Iterator<Item = &Tag> {
        self.tags
            .iter()
            .filter(move |t| t.span.start >= range.start && t.span.start < range.end)
    }

    /// Tags inside the head. Without `</head>`, the head runs to the body (or the end).
    pub fn head_tags(&self, doc_len: usize) -> impl Iterator<Item = &Tag> {
        let range = match &self.head {
            Some(head) => {
                let fallback = self.body.as_ref().map_or(doc_len, |b| b.open.start);
                head.inner(fallback)
            }
            None => 0..0,
        };
        self.tags_in(range)
    }
}
