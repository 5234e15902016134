use reqwest::Client;
use tracing::{debug, error};

use crate::edition::Variant;
use crate::error::FetchError;
use crate::verse::{parse_response, VerseRequest, VerseResult};

/// Public endpoint for single-verse lookups.
pub const DEFAULT_API_BASE: &str = "https://api.alquran.cloud/v1/ayah";

/// Issues one GET per call against the verse API and normalizes the answer.
#[derive(Clone)]
pub struct VerseFetcher {
    client: Client,
    base_url: String,
    variant: Variant,
}

impl VerseFetcher {
    pub fn new(base_url: &str, variant: Variant) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            variant,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Draws a verse uniformly at random and fetches it.
    pub async fn fetch_random_verse(&self) -> Result<VerseResult, FetchError> {
        let request = VerseRequest::pick(self.variant);
        self.fetch_verse(&request).await
    }

    /// Fetches a specific verse. Every failure is logged here and returned as `Err`.
    pub async fn fetch_verse(&self, request: &VerseRequest) -> Result<VerseResult, FetchError> {
        let result = self.try_fetch(request).await;
        if let Err(e) = &result {
            error!(verse = request.number(), kind = e.kind(), "Error fetching verse: {}", e);
        }
        result
    }

    async fn try_fetch(&self, request: &VerseRequest) -> Result<VerseResult, FetchError> {
        let url = format!("{}/{}", self.base_url, request.path());
        debug!(%url, "Fetching verse");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_response(request.variant(), &body)
    }
}
