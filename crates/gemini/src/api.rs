//! REST client for the Gemini `generateContent` endpoint.
//!
//! Wraps a single [`reqwest::Client`] so connections are pooled across
//! requests. No timeout is set here; callers inherit the transport defaults.

use crate::config::GeminiConfig;
use crate::messages::{GenerateContentRequest, GenerateContentResponse};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for one configured Gemini model.
pub struct GeminiApi {
    client: reqwest::Client,
    config: GeminiConfig,
}

/// Errors from the Gemini REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GeminiApiError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Gemini returned a non-2xx status code.
    #[error("Gemini API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl GeminiApi {
    /// Create a new API client with its own connection pool.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send one `generateContent` request and parse the response.
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiApiError> {
        let response = self
            .client
            .post(self.config.generate_content_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed = response.json::<GenerateContentResponse>().await?;

        tracing::debug!(
            model = %self.config.model,
            candidates = parsed.candidates.len(),
            finish_reason = parsed.finish_reason().unwrap_or("none"),
            has_image = parsed.first_inline_data().is_some(),
            "Gemini response received",
        );

        Ok(parsed)
    }

    /// Return the response unchanged on success, or a
    /// [`GeminiApiError::ApiError`] with the status and body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GeminiApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeminiApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
