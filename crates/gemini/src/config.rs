/// Default REST base URL for the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default image-capable model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Configuration for the Gemini REST client.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: String,
    /// Model name, e.g. `gemini-2.5-flash-image-preview`.
    pub model: String,
    /// Base URL without a trailing slash.
    pub base_url: String,
}

impl GeminiConfig {
    /// Load Gemini configuration from environment variables.
    ///
    /// | Env Var           | Required | Default                                     |
    /// |-------------------|----------|---------------------------------------------|
    /// | `GEMINI_API_KEY`  | **yes**  | --                                          |
    /// | `GEMINI_MODEL`    | no       | `gemini-2.5-flash-image-preview`            |
    /// | `GEMINI_BASE_URL` | no       | `https://generativelanguage.googleapis.com` |
    ///
    /// # Panics
    ///
    /// Panics if `GEMINI_API_KEY` is not set or is empty.
    pub fn from_env() -> Self {
        let api_key =
            std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY must be set in the environment");
        assert!(!api_key.is_empty(), "GEMINI_API_KEY must not be empty");

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let base_url = std::env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        Self {
            api_key,
            model,
            base_url,
        }
    }

    /// Full `generateContent` URL for the configured model.
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

// The API key must never reach logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
