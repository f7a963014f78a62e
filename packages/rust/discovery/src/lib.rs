//! Search-suggestion discovery for topic bank growth.
//!
//! The expander asks a [`SuggestionSource`] for completions of each seed
//! query. The production source is [`SuggestClient`], which talks to a public
//! suggest endpoint (no API key) and returns the ranked completion list.
//! Every failure is returned as an error here; callers decide whether to
//! degrade it.

mod parser;

use std::future::Future;
use std::time::Duration;

use pagesmith_shared::{ExpansionConfig, PagesmithError, Result};
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

/// Maximum number of redirects to follow when fetching suggestions.
const MAX_REDIRECTS: usize = 3;

/// Maximum response size we consider valid (1 MB).
const MAX_RESPONSE_SIZE: u64 = 1024 * 1024;

/// User-Agent string for suggestion requests.
const USER_AGENT: &str = concat!("Pagesmith/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// SuggestionSource
// ---------------------------------------------------------------------------

/// Query string in, ordered suggestion strings out.
pub trait SuggestionSource {
    /// Fetch suggestions for `query`, best first.
    fn suggest(&self, query: &str) -> impl Future<Output = Result<Vec<String>>> + Send;
}

// ---------------------------------------------------------------------------
// Suggest options
// ---------------------------------------------------------------------------

/// Configuration for the suggest client.
#[derive(Debug, Clone)]
pub struct SuggestOptions {
    /// Suggest endpoint, without query parameters.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl From<&ExpansionConfig> for SuggestOptions {
    fn from(config: &ExpansionConfig) -> Self {
        Self {
            endpoint: config.suggest_endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self::from(&ExpansionConfig::default())
    }
}

// ---------------------------------------------------------------------------
// SuggestClient
// ---------------------------------------------------------------------------

/// HTTP client for a Firefox-style suggest endpoint.
pub struct SuggestClient {
    client: Client,
    endpoint: Url,
}

impl SuggestClient {
    /// Build a client with the given options.
    pub fn new(opts: &SuggestOptions) -> Result<Self> {
        let endpoint = Url::parse(&opts.endpoint).map_err(|e| {
            PagesmithError::config(format!("invalid suggest endpoint '{}': {e}", opts.endpoint))
        })?;

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(opts.timeout)
            .build()
            .map_err(|e| PagesmithError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    fn request_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client", "firefox")
            .append_pair("q", query);
        url
    }
}

impl SuggestionSource for SuggestClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn suggest(&self, query: &str) -> Result<Vec<String>> {
        let url = self.request_url(query);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| PagesmithError::Network(format!("{query}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PagesmithError::Network(format!("{query}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(PagesmithError::validation(format!(
                    "{query}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PagesmithError::Network(format!("{query}: failed to read body: {e}")))?;

        // Some endpoints answer in a legacy charset; invalid bytes are dropped.
        let body = String::from_utf8_lossy(&bytes);
        let suggestions = parser::parse_suggest_response(&body)?;

        debug!(count = suggestions.len(), "suggestions fetched");
        Ok(suggestions)
    }
}
