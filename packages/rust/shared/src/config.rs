//! Application configuration for Pagesmith.
//!
//! A site-local `pagesmith.toml` (in the site root) wins over the user config
//! at `~/.pagesmith/pagesmith.toml`, which wins over built-in defaults.
//! CLI flags override whatever was loaded.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PagesmithError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "pagesmith.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".pagesmith";

// ---------------------------------------------------------------------------
// Config structs (matching pagesmith.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site layout and addressing.
    #[serde(default)]
    pub site: SiteConfig,

    /// Generation service settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Topic bank growth limits and suggestion lookup.
    #[serde(default)]
    pub expansion: ExpansionConfig,

    /// Page shell settings.
    #[serde(default)]
    pub unify: UnifyConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public base address, e.g. `https://example.github.io/notes`.
    /// Required for `run`; usually supplied via `SITE_BASE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Topic bank file, relative to the site root.
    #[serde(default = "default_bank_file")]
    pub bank_file: String,

    /// Root pages that are never treated as articles.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            bank_file: default_bank_file(),
            exclude: default_exclude(),
        }
    }
}

fn default_bank_file() -> String {
    "topic_bank_auto.json".into()
}
fn default_exclude() -> Vec<String> {
    vec!["index.html".into(), "articles.html".into(), "404.html".into()]
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier sent to the service.
    #[serde(default = "default_model")]
    pub model: String,

    /// OpenAI-compatible chat completions endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_generation_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-5-mini".into()
}
fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}
fn default_generation_timeout() -> u64 {
    300
}

/// `[expansion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Hard cap on the number of bank entries.
    #[serde(default = "default_max_bank_size")]
    pub max_bank_size: usize,

    /// Maximum new entries a single expansion may add.
    #[serde(default = "default_per_run_limit")]
    pub per_run_limit: usize,

    /// Suggestion endpoint (Firefox-style JSON response).
    #[serde(default = "default_suggest_endpoint")]
    pub suggest_endpoint: String,

    /// Per-seed request timeout in seconds.
    #[serde(default = "default_suggest_timeout")]
    pub timeout_secs: u64,

    /// Pause between consecutive seed lookups.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            max_bank_size: default_max_bank_size(),
            per_run_limit: default_per_run_limit(),
            suggest_endpoint: default_suggest_endpoint(),
            timeout_secs: default_suggest_timeout(),
            request_delay_ms: default_request_delay(),
        }
    }
}

fn default_max_bank_size() -> usize {
    260
}
fn default_per_run_limit() -> usize {
    50
}
fn default_suggest_endpoint() -> String {
    "https://suggestqueries.google.com/complete/search".into()
}
fn default_suggest_timeout() -> u64 {
    10
}
fn default_request_delay() -> u64 {
    200
}

/// `[unify]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifyConfig {
    /// Site name shown in every page header.
    #[serde(default = "default_brand_title")]
    pub brand_title: String,

    /// Shared stylesheet every page links to.
    #[serde(default = "default_stylesheet")]
    pub stylesheet: String,

    /// Number of related links per page.
    #[serde(default = "default_related_count")]
    pub related_count: usize,
}

impl Default for UnifyConfig {
    fn default() -> Self {
        Self {
            brand_title: default_brand_title(),
            stylesheet: default_stylesheet(),
            related_count: default_related_count(),
        }
    }
}

fn default_brand_title() -> String {
    "CS Homework & Exam Solutions".into()
}
fn default_stylesheet() -> String {
    "style.css".into()
}
fn default_related_count() -> usize {
    6
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the user config directory (`~/.pagesmith/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PagesmithError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user config file (`~/.pagesmith/pagesmith.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the config for a site: site-local file, then user file, then defaults.
pub fn load_config(site_root: &Path) -> Result<AppConfig> {
    let local = site_root.join(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_from(&local);
    }

    match config_file_path() {
        Ok(path) if path.exists() => load_config_from(&path),
        Ok(path) => {
            tracing::debug!(?path, "config file not found, using defaults");
            Ok(AppConfig::default())
        }
        Err(e) => {
            tracing::debug!(error = %e, "no user config location, using defaults");
            Ok(AppConfig::default())
        }
    }
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PagesmithError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PagesmithError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the user config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PagesmithError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PagesmithError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PagesmithError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Validate and normalize the configured base address.
///
/// Returns the address without a trailing `/`, ready for `{base}/{filename}`.
pub fn require_site_base(config: &AppConfig) -> Result<String> {
    let raw = config
        .site
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            PagesmithError::config(
                "site base address not set. Pass --site-base or set the SITE_BASE environment variable.",
            )
        })?;

    let parsed = Url::parse(raw)
        .map_err(|e| PagesmithError::config(format!("invalid site base '{raw}': {e}")))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(PagesmithError::config(format!(
            "site base '{raw}' must be an http(s) address"
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Check that the generation API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.generation.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(()),
        _ => Err(PagesmithError::config(format!(
            "generation API key not found. Set the {var_name} environment variable."
        ))),
    }
}
