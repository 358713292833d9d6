//! One transformation request, end to end.
//!
//! ```text
//! validate -> resolve character -> create `processing` record -> prompt
//!   -> attempt 1 (prompt + photo)
//!        Generated          -> final image
//!        Failed             -> mark `failed`, return ModelUnavailable
//!        NoImage{commentary}-> attempt 2 (enhanced prompt, text only)
//!                                 Generated       -> final image
//!                                 NoImage/Failed  -> fallback to upload
//!   -> complete record (best effort) -> increment counter (best effort)
//! ```

use std::sync::Arc;

use chrono::Utc;
use personafy_core::data_url::DataUrl;
use personafy_core::error::CoreError;
use personafy_core::prompt::{build_enhanced_prompt, build_transformation_prompt};
use personafy_core::transformation::{
    processing_duration_ms, validate_transition, TransformationStatus,
};
use personafy_core::types::DbId;
use personafy_db::models::character::Character;
use personafy_db::models::transformation::{
    CompleteTransformation, CreateTransformation, Transformation,
};
use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, TransformError};
use crate::generator::{
    GenerationRequest, ImageGenerator, ENHANCED_GENERATION, INITIAL_GENERATION,
};
use crate::store::TransformStore;

// ---------------------------------------------------------------------------
// Request / outcome
// ---------------------------------------------------------------------------

/// Inbound request body. Fields are optional so absence is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformRequest {
    /// The uploaded photo as a `data:` URL.
    pub image: Option<String>,
    pub character_id: Option<String>,
    pub user_id: Option<String>,
}

/// Successful result of a transformation.
#[derive(Debug, Clone, Serialize)]
pub struct TransformOutcome {
    pub transformation_id: DbId,
    /// Generated image, or the original upload when `fallback` is set.
    pub transformed_image: String,
    pub character_name: String,
    pub status: TransformationStatus,
    /// `true` when the model produced no image and the upload was returned.
    pub fallback: bool,
}

/// Result of one model attempt.
#[derive(Debug)]
enum AttemptOutcome {
    Generated(DataUrl),
    NoImage { commentary: Option<String> },
    Failed(GeneratorError),
}

/// Fully validated request, produced before any side effect.
#[derive(Debug)]
struct ValidatedRequest {
    image_url: String,
    image: DataUrl,
    character_id: String,
    user_id: DbId,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Runs transformation requests against an injected store and generator.
///
/// Stateless between requests; cheap to share behind an `Arc`.
pub struct TransformPipeline {
    store: Arc<dyn TransformStore>,
    generator: Arc<dyn ImageGenerator>,
}

impl TransformPipeline {
    pub fn new(store: Arc<dyn TransformStore>, generator: Arc<dyn ImageGenerator>) -> Self {
        Self { store, generator }
    }

    /// Run one transformation request.
    ///
    /// Only malformed input, an unknown character, a failed record insert and
    /// a transport failure of the first model call are reported as errors.
    pub async fn run(&self, request: TransformRequest) -> Result<TransformOutcome, TransformError> {
        let input = validate(request)?;
        let character = self.resolve_character(&input.character_id).await?;

        let record = self
            .store
            .create_transformation(&CreateTransformation {
                user_id: input.user_id,
                character_id: character.id,
                original_image_url: input.image_url.clone(),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    character_id = %character.id,
                    "Failed to create transformation record",
                );
                TransformError::RecordCreation(e)
            })?;

        tracing::info!(
            transformation_id = %record.id,
            character = %character.name,
            "Transformation started",
        );

        let prompt = build_transformation_prompt(&character.prompt_fields());

        let first = self
            .attempt(
                record.id,
                1,
                GenerationRequest {
                    prompt: &prompt,
                    image: Some(&input.image),
                    config: INITIAL_GENERATION,
                },
            )
            .await;

        let generated = match first {
            AttemptOutcome::Generated(image) => Some(image),
            AttemptOutcome::Failed(err) => {
                self.mark_failed(&record).await;
                return Err(TransformError::ModelUnavailable {
                    details: err.details(),
                });
            }
            AttemptOutcome::NoImage { commentary } => {
                tracing::info!(
                    transformation_id = %record.id,
                    "No image generated, retrying with enhanced prompt",
                );
                let enhanced = build_enhanced_prompt(&prompt, commentary.as_deref());
                let second = self
                    .attempt(
                        record.id,
                        2,
                        GenerationRequest {
                            prompt: &enhanced,
                            image: None,
                            config: ENHANCED_GENERATION,
                        },
                    )
                    .await;
                match second {
                    AttemptOutcome::Generated(image) => Some(image),
                    AttemptOutcome::NoImage { .. } => None,
                    AttemptOutcome::Failed(err) => {
                        tracing::warn!(
                            transformation_id = %record.id,
                            error = %err,
                            "Enhanced attempt failed",
                        );
                        None
                    }
                }
            }
        };

        let fallback = generated.is_none();
        let transformed_image = match generated {
            Some(image) => image.to_data_url(),
            None => {
                tracing::warn!(
                    transformation_id = %record.id,
                    "Image generation failed, returning original photo",
                );
                input.image_url
            }
        };

        let completed_at = Utc::now();
        let processing_time_ms = processing_duration_ms(record.created_at, completed_at);

        if let Err(e) = ensure_transition(&record, TransformationStatus::Completed) {
            tracing::error!(transformation_id = %record.id, error = %e, "Refusing to complete");
        } else if let Err(e) = self
            .store
            .complete_transformation(
                record.id,
                &CompleteTransformation {
                    transformed_image_url: transformed_image.clone(),
                    is_fallback: fallback,
                    completed_at,
                    processing_time_ms,
                },
            )
            .await
        {
            tracing::error!(
                transformation_id = %record.id,
                error = %e,
                "Failed to store transformation result",
            );
        }

        if let Err(e) = self
            .store
            .increment_user_transformations(input.user_id)
            .await
        {
            tracing::warn!(
                user_id = %input.user_id,
                error = %e,
                "Failed to increment user transformation count",
            );
        }

        tracing::info!(
            transformation_id = %record.id,
            processing_time_ms,
            fallback,
            "Transformation completed",
        );

        Ok(TransformOutcome {
            transformation_id: record.id,
            transformed_image,
            character_name: character.name,
            status: TransformationStatus::Completed,
            fallback,
        })
    }

    /// Look up the character. Unparseable ids, missing rows and lookup
    /// errors all mean "not found" to the caller.
    async fn resolve_character(&self, raw_id: &str) -> Result<Character, TransformError> {
        let Ok(id) = raw_id.parse::<DbId>() else {
            tracing::debug!(character_id = %raw_id, "Character id is not a UUID");
            return Err(TransformError::CharacterNotFound);
        };

        match self.store.find_character(id).await {
            Ok(Some(character)) => Ok(character),
            Ok(None) => Err(TransformError::CharacterNotFound),
            Err(e) => {
                tracing::error!(character_id = %id, error = %e, "Character fetch error");
                Err(TransformError::CharacterNotFound)
            }
        }
    }

    async fn attempt(
        &self,
        transformation_id: DbId,
        attempt: u8,
        request: GenerationRequest<'_>,
    ) -> AttemptOutcome {
        match self.generator.generate(request).await {
            Ok(reply) => match reply.image {
                Some(image) => {
                    tracing::debug!(%transformation_id, attempt, "Model returned an image");
                    AttemptOutcome::Generated(image)
                }
                None => AttemptOutcome::NoImage {
                    commentary: reply.commentary,
                },
            },
            Err(err) => {
                tracing::error!(%transformation_id, attempt, error = %err, "Model call failed");
                AttemptOutcome::Failed(err)
            }
        }
    }

    /// Best-effort `processing -> failed`. A failure here is logged only:
    /// the caller already receives an error.
    async fn mark_failed(&self, record: &Transformation) {
        let result = match ensure_transition(record, TransformationStatus::Failed) {
            Ok(()) => self
                .store
                .fail_transformation(record.id, Utc::now())
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(error) = result {
            tracing::error!(
                transformation_id = %record.id,
                %error,
                "Failed to mark transformation as failed",
            );
        }
    }
}

/// The in-memory record must still allow `next`; the store re-checks it
/// against the persisted row.
fn ensure_transition(record: &Transformation, next: TransformationStatus) -> Result<(), CoreError> {
    validate_transition(record.status()?, next)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Presence first, then shape. Runs before any store access.
fn validate(request: TransformRequest) -> Result<ValidatedRequest, TransformError> {
    let (Some(image_url), Some(character_id), Some(user_id)) = (
        non_empty(request.image),
        non_empty(request.character_id),
        non_empty(request.user_id),
    ) else {
        return Err(TransformError::MissingParameters);
    };

    let user_id = user_id
        .trim()
        .parse::<DbId>()
        .map_err(|_| TransformError::InvalidParameter("user_id must be a UUID".into()))?;

    let image = DataUrl::parse(&image_url)
        .map_err(|e| TransformError::InvalidParameter(format!("image: {e}")))?;

    Ok(ValidatedRequest {
        image_url,
        image,
        character_id: character_id.trim().to_string(),
        user_id,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
