//! HTTP-level integration tests for the transformation endpoints.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{
    body_json, build_test_app, build_test_app_with_config, get, image_reply, post_json,
    seed_character, text_reply, ScriptedGenerator, SlowGenerator,
};
use personafy_api::config::ServerConfig;
use personafy_core::types::DbId;
use personafy_pipeline::error::GeneratorError;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

const USER: &str = "0b6f5d1e-3c2a-4f7e-9a8b-1d2c3e4f5a6b";
const UPLOAD: &str = "data:image/jpeg;base64,/9j/AAEC";
const TRANSFORM_URI: &str = "/api/v1/transformations";

fn transform_body(character_id: DbId) -> serde_json::Value {
    json!({
        "image": UPLOAD,
        "character_id": character_id.to_string(),
        "user_id": USER,
    })
}

async fn fetch_row(pool: &PgPool, id: &str) -> (String, Option<String>, bool, bool, Option<i64>) {
    let id: DbId = id.parse().unwrap();
    sqlx::query_as(
        "SELECT status, transformed_image_url, is_fallback, completed_at IS NOT NULL, processing_time_ms
         FROM transformations WHERE id = $1",
    )
    .bind(id)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn transformation_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM transformations")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_fields_return_400_without_side_effects(pool: PgPool) {
    let generator = ScriptedGenerator::new(vec![]);
    let app = build_test_app(pool.clone(), generator.clone());

    let response = post_json(app, TRANSFORM_URI, json!({ "image": UPLOAD, "user_id": USER })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing required parameters");
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(generator.calls(), 0);
    assert_eq!(transformation_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_json_returns_500_with_details(pool: PgPool) {
    let app = common::build_app_without_model(pool.clone());

    let request = Request::builder()
        .method(Method::POST)
        .uri(TRANSFORM_URI)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "An unexpected error occurred");
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert!(json["details"].is_string());
    assert_eq!(transformation_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_string_fields_return_500(pool: PgPool) {
    let app = common::build_app_without_model(pool.clone());

    let response = post_json(
        app,
        TRANSFORM_URI,
        json!({ "image": UPLOAD, "character_id": 7, "user_id": USER }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["details"].is_string());
    assert_eq!(transformation_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_data_url_image_returns_400(pool: PgPool) {
    let character = seed_character(&pool, "Rem", "Re:Zero").await;
    let app = common::build_app_without_model(pool.clone());

    let mut body = transform_body(character);
    body["image"] = json!("https://example.com/me.jpg");
    let response = post_json(app, TRANSFORM_URI, body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(transformation_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_character_returns_404(pool: PgPool) {
    let app = common::build_app_without_model(pool.clone());

    let response = post_json(app, TRANSFORM_URI, transform_body(DbId::new_v4())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Character not found");
    assert_eq!(transformation_count(&pool).await, 0);
}

// ---------------------------------------------------------------------------
// Generation outcomes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn generated_image_completes_the_record(pool: PgPool) {
    let character = seed_character(&pool, "Naruto Uzumaki", "Naruto").await;
    let generator = ScriptedGenerator::new(vec![image_reply(b"generated")]);
    let app = build_test_app(pool.clone(), generator.clone());

    let response = post_json(app, TRANSFORM_URI, transform_body(character)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["transformed_image"], "data:image/png;base64,Z2VuZXJhdGVk");
    assert_eq!(json["character_name"], "Naruto Uzumaki");
    assert_eq!(json["status"], "completed");
    assert_eq!(json["fallback"], false);
    assert_eq!(generator.calls(), 1);

    let (status, image, is_fallback, has_completed_at, duration) =
        fetch_row(&pool, json["transformation_id"].as_str().unwrap()).await;
    assert_eq!(status, "completed");
    assert_eq!(image.as_deref(), Some("data:image/png;base64,Z2VuZXJhdGVk"));
    assert!(!is_fallback);
    assert!(has_completed_at);
    assert!(duration.unwrap() >= 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn text_only_replies_fall_back_to_the_upload(pool: PgPool) {
    let character = seed_character(&pool, "Rem", "Re:Zero").await;
    let generator = ScriptedGenerator::new(vec![
        text_reply("I can describe it instead."),
        text_reply("Still only text."),
    ]);
    let app = build_test_app(pool.clone(), generator.clone());

    let response = post_json(app, TRANSFORM_URI, transform_body(character)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["transformed_image"], UPLOAD);
    assert_eq!(json["status"], "completed");
    assert_eq!(json["fallback"], true);
    assert_eq!(generator.calls(), 2);

    let (status, image, is_fallback, _, _) =
        fetch_row(&pool, json["transformation_id"].as_str().unwrap()).await;
    assert_eq!(status, "completed");
    assert_eq!(image.as_deref(), Some(UPLOAD));
    assert!(is_fallback);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn model_failure_returns_500_and_marks_record_failed(pool: PgPool) {
    let character = seed_character(&pool, "Rem", "Re:Zero").await;
    let generator = ScriptedGenerator::new(vec![Err(GeneratorError::Http {
        status: 503,
        body: "model overloaded".into(),
    })]);
    let app = build_test_app(pool.clone(), generator.clone());

    let response = post_json(app, TRANSFORM_URI, transform_body(character)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "AI transformation failed");
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert_eq!(json["details"], "model overloaded");
    assert_eq!(generator.calls(), 1);

    let (status, image, _, has_completed_at, _): (String, Option<String>, bool, bool, Option<i64>) =
        sqlx::query_as(
            "SELECT status, transformed_image_url, is_fallback, completed_at IS NOT NULL, processing_time_ms
             FROM transformations",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "failed");
    assert!(image.is_none());
    assert!(has_completed_at);
}

// ---------------------------------------------------------------------------
// Routing and bookkeeping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn functions_path_runs_the_same_pipeline(pool: PgPool) {
    let character = seed_character(&pool, "Rem", "Re:Zero").await;
    let generator = ScriptedGenerator::new(vec![image_reply(b"generated")]);
    let app = build_test_app(pool, generator);

    let response = post_json(app, "/functions/v1/transform-image", transform_body(character)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "completed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn completed_transformation_can_be_fetched(pool: PgPool) {
    let character = seed_character(&pool, "Rem", "Re:Zero").await;
    let generator = ScriptedGenerator::new(vec![image_reply(b"generated")]);
    let app = build_test_app(pool.clone(), generator);

    let created =
        body_json(post_json(app.clone(), TRANSFORM_URI, transform_body(character)).await).await;
    let id = created["transformation_id"].as_str().unwrap();

    let response = get(app, &format!("{TRANSFORM_URI}/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], id);
    assert_eq!(json["data"]["status"], "completed");
    assert_eq!(json["data"]["user_id"], USER);
    assert_eq!(json["data"]["character_id"], character.to_string());
    assert!(
        json["data"].get("original_image_url").is_none(),
        "the uploaded photo is not echoed back"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_transformation_returns_404(pool: PgPool) {
    let app = common::build_app_without_model(pool);

    let response = get(app, &format!("{TRANSFORM_URI}/{}", DbId::new_v4())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn each_request_increments_the_user_counter(pool: PgPool) {
    let character = seed_character(&pool, "Rem", "Re:Zero").await;
    let generator = ScriptedGenerator::new(vec![image_reply(b"one"), image_reply(b"two")]);
    let app = build_test_app(pool.clone(), generator.clone());

    for _ in 0..2 {
        let response = post_json(app.clone(), TRANSFORM_URI, transform_body(character)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let (total,): (i64,) =
        sqlx::query_as("SELECT total_transformations FROM user_stats WHERE user_id = $1")
            .bind(USER.parse::<DbId>().unwrap())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(total, 2);
    assert_eq!(transformation_count(&pool).await, 2);
    assert_eq!(generator.calls(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generator_is_shared_across_requests(pool: PgPool) {
    let character = seed_character(&pool, "Rem", "Re:Zero").await;
    let generator = ScriptedGenerator::new(vec![image_reply(b"a"), image_reply(b"b")]);
    let app = build_test_app(pool, generator.clone());

    let first =
        body_json(post_json(app.clone(), TRANSFORM_URI, transform_body(character)).await).await;
    let second = body_json(post_json(app, TRANSFORM_URI, transform_body(character)).await).await;

    assert_ne!(first["transformation_id"], second["transformation_id"]);
    assert_eq!(first["transformed_image"], "data:image/png;base64,YQ==");
    assert_eq!(second["transformed_image"], "data:image/png;base64,Yg==");
}

// ---------------------------------------------------------------------------
// Request lifetime
// ---------------------------------------------------------------------------

async fn wait_for_terminal_status(pool: &PgPool) -> String {
    for _ in 0..50 {
        let row: Option<(String,)> = sqlx::query_as("SELECT status FROM transformations")
            .fetch_optional(pool)
            .await
            .unwrap();
        if let Some((status,)) = row.filter(|(status,)| status != "processing") {
            return status;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("transformation stayed in processing");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn slow_model_is_not_cut_by_request_timeout(pool: PgPool) {
    let character = seed_character(&pool, "Rem", "Re:Zero").await;
    let config = ServerConfig {
        request_timeout_secs: 1,
        ..common::test_config()
    };
    let generator = Arc::new(SlowGenerator {
        delay: Duration::from_secs(2),
    });
    let app = build_test_app_with_config(pool.clone(), generator, config);

    let response = post_json(app, TRANSFORM_URI, transform_body(character)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "completed");
    assert_eq!(wait_for_terminal_status(&pool).await, "completed");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn abandoned_request_still_reaches_terminal_state(pool: PgPool) {
    let character = seed_character(&pool, "Rem", "Re:Zero").await;
    let generator = Arc::new(SlowGenerator {
        delay: Duration::from_millis(500),
    });
    let app = build_test_app(pool.clone(), generator);

    // The caller gives up while the model call is in flight.
    let pending = post_json(app, TRANSFORM_URI, transform_body(character));
    let abandoned = tokio::time::timeout(Duration::from_millis(100), pending).await;
    assert!(abandoned.is_err());

    assert_eq!(wait_for_terminal_status(&pool).await, "completed");

    let (total,): (i64,) =
        sqlx::query_as("SELECT total_transformations FROM user_stats WHERE user_id = $1")
            .bind(USER.parse::<DbId>().unwrap())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(total, 1);
}
