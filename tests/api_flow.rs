// tests/api_flow.rs
// DOCUMENTATION: End-to-end tests through the actix app with an in-memory database
// PURPOSE: Upload, search, permissions and cascade deletes over HTTP

use actix_web::{http::header, http::StatusCode, test, web, App};
use async_trait::async_trait;
use photoshare::config::{init_memory_pool, Config};
use photoshare::db::init_schema;
use photoshare::errors::PhotoError;
use photoshare::handlers;
use photoshare::services::{ImageAnalysis, ImageAnnotator, UploadStore, PLACEHOLDER_PNG};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

const BOUNDARY: &str = "photoshare-test-boundary";
const PASSWORD: &str = "correct horse battery";

struct LabelAnnotator(Vec<&'static str>);

#[async_trait]
impl ImageAnnotator for LabelAnnotator {
    async fn annotate(&self, _image: &[u8]) -> Result<ImageAnalysis, PhotoError> {
        Ok(ImageAnalysis::from_labels(&self.0))
    }
}

struct DownAnnotator;

#[async_trait]
impl ImageAnnotator for DownAnnotator {
    async fn annotate(&self, _image: &[u8]) -> Result<ImageAnalysis, PhotoError> {
        Err(PhotoError::ExternalApiError("vision API unreachable".to_string()))
    }
}

struct TestState {
    pool: SqlitePool,
    store: UploadStore,
    config: Config,
    annotator: Arc<dyn ImageAnnotator>,
    _dir: TempDir,
}

async fn state(annotator: Arc<dyn ImageAnnotator>) -> TestState {
    let pool = init_memory_pool().await.unwrap();
    init_schema(&pool).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        upload_dir: dir.path().to_path_buf(),
        max_upload_bytes: 1024,
        bcrypt_cost: 4,
        ..Config::default()
    };

    TestState {
        pool,
        store: UploadStore::new(dir.path(), config.max_upload_bytes),
        config,
        annotator,
        _dir: dir,
    }
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.pool.clone()))
                .app_data(web::Data::new($state.config.clone()))
                .app_data(web::Data::new($state.store.clone()))
                .app_data(web::Data::new($state.annotator.clone()))
                .configure(handlers::routes),
        )
        .await
    };
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

fn multipart(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File { content_type, bytes } => {
                body.extend_from_slice(
                    b"Content-Disposition: form-data; name=\"file\"; filename=\"upload.png\"\r\n",
                );
                body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(token: Option<&str>, parts: &[Part]) -> test::TestRequest {
    let mut req = test::TestRequest::post()
        .uri("/photos")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart(parts));
    if let Some(token) = token {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)));
    }
    req
}

fn png() -> Part<'static> {
    Part::File {
        content_type: "image/png",
        bytes: PLACEHOLDER_PNG,
    }
}

macro_rules! sign_up {
    ($app:expr, $name:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "username": $name,
                "email": format!("{}@example.com", $name),
                "password": PASSWORD
            }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": $name, "password": PASSWORD }))
            .to_request();
        let login: Value = test::call_and_read_body_json(&$app, req).await;
        (
            login["user"]["id"].as_str().unwrap().to_string(),
            login["token"].as_str().unwrap().to_string(),
        )
    }};
}

fn tags_of(photo: &Value) -> Vec<String> {
    photo["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn upload_is_annotated_and_searchable() {
    let state = state(Arc::new(LabelAnnotator(vec!["dog", "park"]))).await;
    let app = test_app!(state);
    let (_, token) = sign_up!(app, "alice");

    let resp = test::call_service(&app, upload_request(Some(&token), &[png()]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let photo: Value = test::read_body_json(resp).await;

    let description = photo["description"].as_str().unwrap();
    assert!(description.contains("dog"));
    assert!(description.contains("park"));
    let tags = tags_of(&photo);
    assert!(tags.contains(&"dog".to_string()));
    assert!(tags.contains(&"park".to_string()));

    // The stored file is served back
    let req = test::TestRequest::get()
        .uri(photo["file_url"].as_str().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    let bytes = test::read_body(resp).await;
    assert_eq!(&bytes[..], PLACEHOLDER_PNG);

    // A second upload whose user tags do not include "dog"
    let resp = test::call_service(
        &app,
        upload_request(
            Some(&token),
            &[png(), Part::Text("description", "Holiday"), Part::Text("tags", "beach")],
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/photos/search?q=beach").to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found["total_count"], 1);
    assert_eq!(found["data"][0]["description"], "Holiday");

    let req = test::TestRequest::get().uri("/photos/search?q=zebra").to_request();
    let none: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(none["total_count"], 0);
    assert!(none["data"].as_array().unwrap().is_empty());

    let req = test::TestRequest::get().uri("/photos/search?q=").to_request();
    let blank: Value = test::call_and_read_body_json(&app, req).await;
    assert!(blank["data"].as_array().unwrap().is_empty());

    // "dog" and "park" are shared by both photos but stored once
    let req = test::TestRequest::get().uri("/tags").to_request();
    let tags: Value = test::call_and_read_body_json(&app, req).await;
    let tags = tags.as_array().unwrap();
    assert_eq!(tags.len(), 3);
    assert_eq!(
        tags.iter().find(|t| t["name"] == "dog").unwrap()["photo_count"],
        2
    );
}

#[actix_web::test]
async fn upload_succeeds_when_vision_is_down() {
    let state = state(Arc::new(DownAnnotator)).await;
    let app = test_app!(state);
    let (_, token) = sign_up!(app, "alice");

    let resp = test::call_service(&app, upload_request(Some(&token), &[png()]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let photo: Value = test::read_body_json(resp).await;

    assert!(photo["description"].is_null());
    assert!(photo["alt_text"].is_null());
    assert!(tags_of(&photo).is_empty());

    let req = test::TestRequest::get().uri("/tags").to_request();
    let tags: Value = test::call_and_read_body_json(&app, req).await;
    assert!(tags.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn upload_rejections() {
    let state = state(Arc::new(LabelAnnotator(vec!["dog"]))).await;
    let app = test_app!(state);
    let (_, token) = sign_up!(app, "alice");

    let resp = test::call_service(&app, upload_request(None, &[png()]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, upload_request(Some("bogus"), &[png()]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let pdf = Part::File {
        content_type: "application/pdf",
        bytes: b"%PDF-1.4 not an image",
    };
    let resp = test::call_service(&app, upload_request(Some(&token), &[pdf]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");

    let big = vec![0u8; 4096];
    let oversized = Part::File {
        content_type: "image/png",
        bytes: &big,
    };
    let resp = test::call_service(&app, upload_request(Some(&token), &[oversized]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let resp = test::call_service(
        &app,
        upload_request(Some(&token), &[Part::Text("description", "no file")]).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/photos").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list["total_count"], 0);

    let req = test::TestRequest::get()
        .uri("/photos?page=9223372036854775807&limit=100")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let far: Value = test::read_body_json(resp).await;
    assert_eq!(far["has_more"], false);
}

#[actix_web::test]
async fn only_the_owner_edits_and_alt_text_is_kept() {
    let state = state(Arc::new(LabelAnnotator(vec!["cat"]))).await;
    let app = test_app!(state);
    let (_, alice) = sign_up!(app, "alice");
    let (_, bob) = sign_up!(app, "bob");

    let resp = test::call_service(&app, upload_request(Some(&alice), &[png()]).to_request()).await;
    let photo: Value = test::read_body_json(resp).await;
    let uri = format!("/photos/{}", photo["id"].as_str().unwrap());

    let edit = json!({ "description": "Whiskers", "tags": ["Whiskers", "pet"] });

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", bob)))
        .set_json(&edit)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put().uri(&uri).set_json(&edit).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", alice)))
        .set_json(&edit)
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["description"], "Whiskers");
    assert_eq!(updated["alt_text"], photo["alt_text"]);
    assert_eq!(tags_of(&updated), vec!["pet", "whiskers"]);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", bob)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get().uri("/photos/not-a-uuid").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn deleting_an_account_cascades() {
    let state = state(Arc::new(LabelAnnotator(vec!["dog"]))).await;
    let app = test_app!(state);
    let (alice_id, alice) = sign_up!(app, "alice");
    let (bob_id, bob) = sign_up!(app, "bob");

    let resp = test::call_service(&app, upload_request(Some(&alice), &[png()]).to_request()).await;
    let photo: Value = test::read_body_json(resp).await;
    let photo_id = photo["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/photos/{}/comments", photo_id))
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", bob)))
        .set_json(json!({ "body": "Good boy" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri(&format!("/photos/{}", photo_id)).to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["comments"][0]["author_username"], "bob");

    let req = test::TestRequest::delete()
        .uri("/users/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", alice)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri(&format!("/photos/{}", photo_id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri(&format!("/users/{}", alice_id)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri(&format!("/users/{}", bob_id)).to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["comment_count"], 0);

    let (comments,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
        .fetch_one(&state.pool)
        .await
        .unwrap();
    assert_eq!(comments, 0);
    assert_eq!(std::fs::read_dir(state.store.root()).unwrap().count(), 0);

    // The old token died with the account
    let req = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", alice)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
}
