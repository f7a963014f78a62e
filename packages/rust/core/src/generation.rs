//! Page generation through an OpenAI-compatible chat completions endpoint.
//!
//! The service is an external collaborator: one prompt in, one full HTML
//! document out. Anything that does not look like a complete document is
//! rejected and nothing is written.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use pagesmith_bank::build_prompt;
use pagesmith_document::title_from_filename;
use pagesmith_shared::fs::write_atomic;
use pagesmith_shared::{GenerationConfig, PagesmithError, Result, TopicEntry, is_page_filename};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use url::Url;

use crate::site::SiteLayout;

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("Pagesmith/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Prompt in, full document text out.
pub trait Generator {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

// ---------------------------------------------------------------------------
// Chat completions client
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for a chat completions endpoint with bearer authentication.
pub struct ChatCompletionsClient {
    client: Client,
    endpoint: Url,
    model: String,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(config: &GenerationConfig, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            PagesmithError::config(format!(
                "invalid generation endpoint '{}': {e}",
                config.endpoint
            ))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PagesmithError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    /// Build a client with the key read from the env var named in `config`.
    pub fn from_env(config: &GenerationConfig) -> Result<Self> {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                PagesmithError::config(format!(
                    "generation API key not found. Set the {} environment variable.",
                    config.api_key_env
                ))
            })?;
        Self::new(config, key)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Generator for ChatCompletionsClient {
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint.as_str())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PagesmithError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PagesmithError::Generation(format!(
                "HTTP {status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| PagesmithError::Generation(format!("malformed response: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PagesmithError::Generation("response has no content".into()))?;

        debug!(chars = text.len(), "generation finished");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Deterministic per-page seed: the first 8 hex digits of
/// SHA-256(filename + ISO date) as an integer.
pub fn uniqueness_seed(filename: &str, date: NaiveDate) -> u32 {
    let mut hasher = Sha256::new();
    hasher.update(filename.as_bytes());
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    let digest = hasher.finalize();
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// The prompt sent for `entry`: its stored prompt (or one built from the
/// title hint and category) followed by the quality and uniqueness rules.
pub fn final_prompt(entry: &TopicEntry, date: NaiveDate) -> String {
    let base = match entry.prompt.trim() {
        "" => {
            let title = match entry.title_hint.trim() {
                "" => title_from_filename(&entry.filename),
                hint => hint.to_string(),
            };
            build_prompt(entry.category, &title)
        }
        stored => stored.to_string(),
    };
    let seed = uniqueness_seed(&entry.filename, date);

    format!(
        "{base}

IMPORTANT (quality and uniqueness rules):
- Output ONLY a valid complete HTML document. No markdown fences.
- Include <meta charset>, viewport, <title>, meta description, meta keywords.
- No external CSS/JS. Use only basic HTML tags: <h1>, <h2>, <h3>, <p>, <pre>, <table border=\"1\">, <ul>, <li>.
- Target length: 1500 to 2500+ words (dense, exam-style, but readable).
- MUST include: (1) problem setup, (2) fully worked example with real numbers, (3) step-by-step table(s), (4) final numeric answer(s), (5) Common mistakes, (6) FAQ with 3 to 5 Q&As.
- Use <table border=\"1\"> for all calculation / step tables.
- Uniqueness seed for this page: {seed}. Use it to choose ALL numeric values (reference string / burst times / arrivals / etc.) so this page is different from others.
- Do NOT reuse the same example numbers across pages. Do NOT use placeholders like 'X', 'Y', '...'.
- Vary wording and section headings naturally.
"
    )
}

// ---------------------------------------------------------------------------
// Page generation
// ---------------------------------------------------------------------------

/// Check that `text` is a whole document; returns it trimmed.
pub fn validate_document(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();
    if !lower.contains("<html") || !lower.contains("</html>") {
        return Err(PagesmithError::validation(
            "generated output is not an HTML document (missing <html> or </html>)",
        ));
    }
    Ok(trimmed)
}

fn check_filename(filename: &str) -> Result<()> {
    if !is_page_filename(filename) {
        return Err(PagesmithError::validation(format!(
            "refusing to write page with unsafe filename '{filename}'"
        )));
    }
    Ok(())
}

/// Generate the page for `entry` and write it into the site root.
#[instrument(skip_all, fields(filename = %entry.filename, category = %entry.category))]
pub async fn generate_page<G: Generator>(
    generator: &G,
    entry: &TopicEntry,
    site: &SiteLayout,
    date: NaiveDate,
) -> Result<PathBuf> {
    check_filename(&entry.filename)?;

    let prompt = final_prompt(entry, date);
    let output = generator.generate(&prompt).await?;
    let html = validate_document(&output)?;

    let path = site.file(&entry.filename);
    write_atomic(&path, html)?;

    info!(path = %path.display(), bytes = html.len(), "page written");
    Ok(path)
}
