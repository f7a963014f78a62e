//! The topic bank: what pages exist to be written, and which one comes next.
//!
//! - [`TopicBank`] loads, dedups, sorts and saves `topic_bank_auto.json`.
//! - [`expand`] grows the bank from search suggestions for the [`DEFAULT_SEEDS`].
//! - [`select_next`] picks the next unproduced topic with category balance.

pub mod classify;
pub mod expand;
pub mod prompt;
pub mod seeds;
pub mod select;
pub mod slug;
pub mod store;

pub use classify::{Rejection, infer_category, screen};
pub use expand::{ExpandOptions, ExpansionReport, entry_for_suggestion, expand};
pub use prompt::build_prompt;
pub use seeds::{DEFAULT_SEEDS, Seed};
pub use select::{ProducedPages, Selection, produced_counts, select_next};
pub use slug::{filename_for, normalize_title};
pub use store::TopicBank;
