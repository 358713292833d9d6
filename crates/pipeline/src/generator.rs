//! Generative-model seam for the transform pipeline.

use async_trait::async_trait;
use personafy_core::data_url::DataUrl;
use personafy_gemini::api::GeminiApi;
use personafy_gemini::messages::{GenerateContentRequest, GenerationConfig, Part};

use crate::error::GeneratorError;

/// MIME type assumed for generated images that do not report one.
pub const DEFAULT_GENERATED_MIME_TYPE: &str = "image/png";

/// Parameters of the first attempt (prompt + uploaded photo).
pub const INITIAL_GENERATION: GenerationConfig = GenerationConfig {
    max_output_tokens: 8192,
    temperature: 0.4,
    top_p: 0.95,
    top_k: 20,
};

/// Parameters of the second, text-only attempt.
pub const ENHANCED_GENERATION: GenerationConfig = GenerationConfig {
    temperature: 0.6,
    ..INITIAL_GENERATION
};

/// One model invocation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    /// Attached as inline content when present.
    pub image: Option<&'a DataUrl>,
    pub config: GenerationConfig,
}

/// What a successful model call produced. Either field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub image: Option<DataUrl>,
    /// The model's text, kept to enrich a follow-up prompt.
    pub commentary: Option<String>,
}

/// Produces stylized images from a prompt and an optional source photo.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<ModelReply, GeneratorError>;
}

/// [`ImageGenerator`] backed by the Gemini `generateContent` API.
pub struct GeminiGenerator {
    api: GeminiApi,
}

impl GeminiGenerator {
    pub fn new(api: GeminiApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ImageGenerator for GeminiGenerator {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<ModelReply, GeneratorError> {
        let mut parts = vec![Part::text(request.prompt)];
        if let Some(image) = request.image {
            parts.push(Part::inline_bytes(image.mime_type.as_str(), &image.bytes));
        }
        let body = GenerateContentRequest::single_turn(parts, request.config);

        let response = self.api.generate_content(&body).await?;

        let image = match response.first_inline_data() {
            Some(inline) => match inline.decode() {
                Ok(bytes) => Some(DataUrl {
                    mime_type: if inline.mime_type.is_empty() {
                        DEFAULT_GENERATED_MIME_TYPE.to_string()
                    } else {
                        inline.mime_type.clone()
                    },
                    bytes,
                }),
                Err(e) => {
                    tracing::warn!(
                        model = %self.api.model(),
                        error = %e,
                        "Discarding generated image with invalid base64 payload",
                    );
                    None
                }
            },
            None => None,
        };

        Ok(ModelReply {
            image,
            commentary: response.first_text().map(str::to_string),
        })
    }
}
