//! Pagesmith core: everything that turns a topic bank into a site.
//!
//! - [`corpus`] rebuilds the article index from the pages on disk
//! - [`related`] ranks related pages for one article
//! - [`unify`] wraps pages in the shared site shell
//! - [`generation`] asks the generation service for new pages
//! - [`artifacts`] writes `articles.json`, `sitemap.xml` and `faq.json`
//! - [`pipeline`] runs the stages in order

pub mod artifacts;
pub mod corpus;
pub mod generation;
pub mod pipeline;
pub mod related;
pub mod site;
pub mod unify;

pub use generation::{ChatCompletionsClient, Generator};
pub use pipeline::{
    ProgressReporter, RunConfig, RunOutcome, RunReport, SilentProgress, expand_bank, next_topic,
    rebuild_index, run, unify_site,
};
pub use site::SiteLayout;
pub use unify::{UnifyOptions, unify_page};
