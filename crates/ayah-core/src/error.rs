use thiserror::Error;

/// Why a verse fetch produced no result.
///
/// Callers present every variant the same way; the variant is kept for logs and tests.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("API request failed with status {status}")]
    Transport { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned an unexpected format or error: {0}")]
    Malformed(String),

    #[error("Arabic text (quran-uthmani) not found in API response")]
    MissingPrimaryText,
}

impl FetchError {
    /// Stable tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport",
            FetchError::Network(_) => "network",
            FetchError::Malformed(_) => "malformed_response",
            FetchError::MissingPrimaryText => "missing_primary_text",
        }
    }
}

/// Failures raised by a media backend when asked to play.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("no media source assigned")]
    NoSource,

    #[error("media is still loading")]
    NotReady,

    #[error("playback rejected: {0}")]
    Rejected(String),
}
