use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can end a fetch cycle. None of these are retried; the
/// provider maps them to one of exactly two user-facing messages and keeps
/// the full detail in the activity log.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("model returned no textual payload")]
    EmptyResponse,

    #[error("model payload was not valid JSON ({detail}): {raw}")]
    MalformedResponse { detail: String, raw: String },

    #[error("model payload missing expected shape: {0}")]
    Schema(String),

    #[error("API key rejected ({0})")]
    Auth(StatusCode),

    #[error("http {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http client unavailable: {0}")]
    ClientInit(String),
}

pub const MSG_AUTH: &str = "API key invalid. Check your GEMINI_API_KEY.";
pub const MSG_GENERIC: &str = "Sync failed. Please try again in a few minutes.";

impl FetchError {
    /// Banner text. Credential problems get their own message; everything
    /// else collapses to the generic one, with detail kept out of the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Auth(_) => MSG_AUTH,
            _ => MSG_GENERIC,
        }
    }
}
