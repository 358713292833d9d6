#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use personafy_api::config::ServerConfig;
use personafy_api::router::build_app_router;
use personafy_api::state::AppState;
use personafy_core::data_url::DataUrl;
use personafy_core::types::DbId;
use personafy_gemini::config::GeminiConfig;
use personafy_pipeline::error::GeneratorError;
use personafy_pipeline::generator::{GenerationRequest, ImageGenerator, ModelReply};
use personafy_pipeline::store::PgTransformStore;
use personafy_pipeline::transform::TransformPipeline;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Any CORS origin is allowed (the production default) and the Gemini
/// settings are placeholders: tests inject a scripted generator instead.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        gemini: GeminiConfig {
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        },
    }
}

/// Build the full application router against a real database pool and the
/// given generator.
pub fn build_test_app(pool: PgPool, generator: Arc<dyn ImageGenerator>) -> Router {
    build_test_app_with_config(pool, generator, test_config())
}

/// Same as [`build_test_app`] with an explicit configuration.
pub fn build_test_app_with_config(
    pool: PgPool,
    generator: Arc<dyn ImageGenerator>,
    config: ServerConfig,
) -> Router {
    let store = Arc::new(PgTransformStore::new(pool.clone()));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        pipeline: Arc::new(TransformPipeline::new(store, generator)),
    };
    build_app_router(state, &config)
}

/// App whose generator must never be called.
pub fn build_app_without_model(pool: PgPool) -> Router {
    build_test_app(pool, Arc::new(ScriptedGenerator::default()))
}

// ---------------------------------------------------------------------------
// Scripted generator
// ---------------------------------------------------------------------------

/// Replays queued replies in order and counts calls.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<ModelReply, GeneratorError>>>,
    calls: Mutex<usize>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<ModelReply, GeneratorError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ImageGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _request: GenerationRequest<'_>,
    ) -> Result<ModelReply, GeneratorError> {
        *self.calls.lock().unwrap() += 1;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("generator called more times than scripted")
    }
}

/// Sleeps before answering with an image, like a slow model call.
pub struct SlowGenerator {
    pub delay: Duration,
}

#[async_trait]
impl ImageGenerator for SlowGenerator {
    async fn generate(
        &self,
        _request: GenerationRequest<'_>,
    ) -> Result<ModelReply, GeneratorError> {
        tokio::time::sleep(self.delay).await;
        image_reply(b"slow")
    }
}

pub fn image_reply(bytes: &[u8]) -> Result<ModelReply, GeneratorError> {
    Ok(ModelReply {
        image: Some(DataUrl {
            mime_type: "image/png".to_string(),
            bytes: bytes.to_vec(),
        }),
        commentary: None,
    })
}

pub fn text_reply(text: &str) -> Result<ModelReply, GeneratorError> {
    Ok(ModelReply {
        image: None,
        commentary: Some(text.to_string()),
    })
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn seed_character(pool: &PgPool, name: &str, series: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO characters (name, anime_series, image_url, costume_description)
         VALUES ($1, $2, 'https://cdn.example.com/ref.png', 'signature outfit')
         RETURNING id",
    )
    .bind(name)
    .bind(series)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
