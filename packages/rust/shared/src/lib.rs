//! Shared types, error model, and configuration for Pagesmith.
//!
//! This crate is the foundation depended on by all other Pagesmith crates.
//! It provides:
//! - [`PagesmithError`]: the unified error type
//! - Domain types ([`TopicEntry`], [`ArticleRecord`], [`Category`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading and validation)
//! - Filesystem helpers ([`fs::write_atomic`], [`fs::read_lossy`])

pub mod config;
pub mod error;
pub mod fs;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, ExpansionConfig, GenerationConfig, SiteConfig, UnifyConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from, require_site_base,
    validate_api_key,
};
pub use error::{PagesmithError, Result};
pub use types::{
    ArticleRecord, Category, DEFAULT_RANK, FaqEntry, RunId, TopicEntry, file_key,
    is_page_filename,
};
