use personafy_core::types::DbId;

/// Errors from a [`TransformStore`](crate::store::TransformStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A terminal update found the record already out of `processing`.
    #[error("Transformation {0} is no longer processing")]
    NotProcessing(DbId),
}

/// Errors from an [`ImageGenerator`](crate::generator::ImageGenerator).
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Network, TLS or response-decoding failure.
    #[error("Model request failed: {0}")]
    Transport(String),

    /// The model API answered with a non-2xx status.
    #[error("Model API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

impl GeneratorError {
    /// Upstream detail surfaced to the caller on a failed transformation.
    pub fn details(&self) -> String {
        match self {
            Self::Transport(msg) => msg.clone(),
            Self::Http { body, .. } => body.clone(),
        }
    }
}

impl From<personafy_gemini::api::GeminiApiError> for GeneratorError {
    fn from(err: personafy_gemini::api::GeminiApiError) -> Self {
        use personafy_gemini::api::GeminiApiError;
        match err {
            GeminiApiError::Request(e) => Self::Transport(e.to_string()),
            GeminiApiError::ApiError { status, body } => Self::Http { status, body },
        }
    }
}

/// Ways a transformation request can fail from the caller's point of view.
///
/// Everything else (no image from the model, a failed second attempt, a
/// failed bookkeeping write) degrades to a successful fallback response.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// `image`, `character_id` or `user_id` was absent or empty.
    #[error("Missing required parameters")]
    MissingParameters,

    /// A present parameter could not be interpreted.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The character id does not resolve.
    #[error("Character not found")]
    CharacterNotFound,

    /// The `processing` record could not be written; the model was not called.
    #[error("Failed to create transformation record")]
    RecordCreation(#[source] StoreError),

    /// The first model call failed at the transport/HTTP level.
    #[error("AI transformation failed")]
    ModelUnavailable { details: String },
}
