//! Typed async client for the OpenAI Assistants API.
//!
//! The crate covers assistants, threads, messages, runs, run steps, files,
//! chat completions, embeddings and audio. The interesting part is the run
//! lifecycle: [`assistants::lifecycle::RunDriver`] polls a run with a bounded
//! backoff schedule and, when the run pauses on `requires_action`, dispatches
//! the pending tool calls to locally registered handlers and submits the
//! outputs to resume execution.

pub mod assistants;
pub mod audio;
pub mod chat;
pub mod client;
pub mod embeddings;
pub mod error;
pub mod files;

pub use client::{Client, Deleted, ListQuery, Order, Page};
pub use error::{ApiResult, Error, ProtocolError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Immutable connection configuration handed to [`Client::new`].
///
/// ## Examples
///
/// Use the `OPENAI_API_KEY` environment variable, optionally defined in a
/// `.env` file:
///
/// ```no_run
/// use openai_assistants::{Client, Credentials};
///
/// let client = Client::new(Credentials::from_env().unwrap()).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub base_url: String,
}

impl Credentials {
    /// Creates credentials for a given key and base URL. A missing trailing
    /// slash on the base URL is added so that routes concatenate cleanly.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            api_key: api_key.into(),
            base_url,
        }
    }

    /// Reads `OPENAI_API_KEY` and (optionally) `OPENAI_BASE_URL` from the
    /// environment, loading a `.env` file first if one exists.
    pub fn from_env() -> ApiResult<Self> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::Validation("OPENAI_API_KEY is not set".into()))?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(api_key, base_url))
    }
}

/// Token usage reported by the completion-style endpoints.
#[derive(serde::Deserialize, serde::Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    /// Absent on embeddings responses.
    #[serde(default)]
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let credentials = Credentials::new("sk-test", "http://localhost:8080/v1");
        assert_eq!(credentials.base_url, "http://localhost:8080/v1/");
        let credentials = Credentials::new("sk-test", "http://localhost:8080/v1/");
        assert_eq!(credentials.base_url, "http://localhost:8080/v1/");
    }
}
