//! Tolerant structure and text extraction for standalone HTML pages.
//!
//! Pages come from a text generator and from earlier runs of the unifier, so
//! nothing here assumes well-formed markup. [`scan`] locates tags by byte
//! span so edits splice the original text instead of re-serializing it;
//! [`page`] layers head/body regions and the site wrapper markers on top;
//! [`text`] extracts titles and descriptions via `scraper`.

pub mod page;
pub mod scan;
pub mod text;

pub use page::{
    CONTENT_END, CONTENT_START, PageDocument, WRAPPER_END, WRAPPER_START, insert_after_head_open,
    insert_before_head_close, replace_body_inner,
};
pub use scan::{DocumentMap, Region, Tag, scan_tags};
pub use text::{
    collapse_whitespace, escape_html, extract_title, first_paragraph, meta_description,
    title_from_filename, truncate_chars,
};
