//! End-to-end runs against an in-process fake of the api.video caption endpoints.

use axum::extract::{Multipart, Path as UrlPath, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use captionsync::adapters::apivideo::{ApiKeyCredentials, ApiVideoCaptions, ReqwestTransport};
use captionsync::adapters::local::FsCaptionSource;
use captionsync::ports::credentials::CredentialPort;
use captionsync::{AuthError, BatchOrchestrator, Outcome, RunError, Step, SyncConfig};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

const API_KEY: &str = "good-key";
const TOKEN: &str = "test-token";
const REFRESHED_TOKEN: &str = "refreshed-token";
const REFRESH_TOKEN: &str = "refresh";

#[derive(Debug, Clone)]
struct Upload {
    video_id: String,
    language: String,
    field: String,
    filename: String,
    content_type: String,
    body: Bytes,
}

#[derive(Default)]
struct FakeApi {
    tracks: HashMap<String, Vec<String>>,
    /// Videos whose listed tracks are already gone when deleted
    ghost_tracks: HashSet<String>,
    failing_uploads: HashSet<String>,
    /// Issue tokens that are already inside the renewal margin
    short_lived_tokens: bool,
    reject_refresh: bool,
    calls: Vec<String>,
    uploads: Vec<Upload>,
}

type Shared = Arc<Mutex<FakeApi>>;

fn authorized(headers: &HeaderMap) -> bool {
    let value = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    value == Some("Bearer test-token") || value == Some("Bearer refreshed-token")
}

fn token_body(access_token: &str, expires_in: u64) -> Response {
    Json(json!({
        "token_type": "Bearer",
        "access_token": access_token,
        "refresh_token": REFRESH_TOKEN,
        "expires_in": expires_in
    }))
    .into_response()
}

async fn auth(State(api): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut api = api.lock().unwrap();
    api.calls.push("auth".to_string());
    if body["apiKey"] == API_KEY {
        let expires_in = if api.short_lived_tokens { 30 } else { 3600 };
        token_body(TOKEN, expires_in)
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({"title": "Invalid API key"}))).into_response()
    }
}

async fn refresh(State(api): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut api = api.lock().unwrap();
    api.calls.push("refresh".to_string());
    if api.reject_refresh || body["refreshToken"] != REFRESH_TOKEN {
        return (StatusCode::UNAUTHORIZED, Json(json!({"title": "Invalid refresh token"})))
            .into_response();
    }
    token_body(REFRESHED_TOKEN, 3600)
}

async fn list(
    State(api): State<Shared>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut api = api.lock().unwrap();
    api.calls.push(format!("list {}", id));
    match api.tracks.get(&id) {
        Some(languages) => {
            let data: Vec<Value> = languages
                .iter()
                .map(|lang| json!({"uri": format!("/videos/{}/captions/{}", id, lang), "srclang": lang}))
                .collect();
            Json(json!({"data": data, "pagination": {"currentPage": 1}})).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"title": "Video not found"}))).into_response(),
    }
}

async fn delete_caption(
    State(api): State<Shared>,
    UrlPath((id, lang)): UrlPath<(String, String)>,
    headers: HeaderMap,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    let mut api = api.lock().unwrap();
    api.calls.push(format!("delete {} {}", id, lang));
    if api.ghost_tracks.contains(&id) {
        return StatusCode::NOT_FOUND;
    }
    let languages = api.tracks.entry(id).or_default();
    match languages.iter().position(|l| *l == lang) {
        Some(index) => {
            languages.remove(index);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn upload(
    State(api): State<Shared>,
    UrlPath((id, lang)): UrlPath<(String, String)>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut received = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let body = field.bytes().await.unwrap();
        received.push(Upload {
            video_id: id.clone(),
            language: lang.clone(),
            field: name,
            filename,
            content_type,
            body,
        });
    }

    let mut api = api.lock().unwrap();
    api.calls.push(format!("upload {} {}", id, lang));
    if api.failing_uploads.contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "encoder exploded").into_response();
    }
    api.uploads.extend(received);
    api.tracks.entry(id).or_default().push(lang.clone());
    Json(json!({"srclang": lang, "default": false})).into_response()
}

async fn spawn(api: FakeApi) -> (String, Shared) {
    let state = Arc::new(Mutex::new(api));
    let app = Router::new()
        .route("/auth/api-key", post(auth))
        .route("/auth/refresh", post(refresh))
        .route("/videos/:id/captions", get(list))
        .route(
            "/videos/:id/captions/:lang",
            post(upload).delete(delete_caption),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

type ApiOrchestrator = BatchOrchestrator<
    ApiVideoCaptions<ReqwestTransport<ApiKeyCredentials>>,
    FsCaptionSource,
    ApiKeyCredentials,
>;

fn config(base_url: &str, api_key: &str, folder: &Path) -> SyncConfig {
    SyncConfig {
        captions_dir: folder.to_path_buf(),
        language: "en".to_string(),
        api_base_url: base_url.to_string(),
        api_key: Some(api_key.to_string()),
        pacing_interval: Duration::ZERO,
        request_timeout: Duration::from_secs(5),
    }
}

fn orchestrator(base_url: &str, api_key: &str, folder: &Path) -> ApiOrchestrator {
    let config = config(base_url, api_key, folder);
    let credentials = ApiKeyCredentials::new(&config).unwrap();
    let transport = ReqwestTransport::new(&config, credentials.clone()).unwrap();
    let captions = ApiVideoCaptions::new(transport, &config.api_base_url).unwrap();
    BatchOrchestrator::new(config, captions, FsCaptionSource::new(), credentials)
}

fn folder_with(names: &[&str]) -> TempDir {
    let dir = tempdir().unwrap();
    for name in names {
        fs::write(dir.path().join(name), format!("WEBVTT\n\nNOTE {}\n", name)).unwrap();
    }
    dir
}

#[tokio::test]
async fn test_batch_uploads_new_and_replaces_existing() {
    let mut api = FakeApi::default();
    api.tracks.insert("vid1".to_string(), vec![]);
    api.tracks
        .insert("vid2".to_string(), vec!["en".to_string(), "fr".to_string()]);
    let (base_url, state) = spawn(api).await;
    let dir = folder_with(&["[vid1]_Title_en.vtt", "[vid2]_Other_en.vtt", "stray.vtt"]);

    let summary = orchestrator(&base_url, API_KEY, dir.path())
        .run(None, None)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, vec!["vid1", "vid2"]);
    assert_eq!(summary.failure_count(), 0);
    assert_eq!(summary.unresolvable.len(), 1);
    assert_eq!(summary.unresolvable[0].filename, "stray.vtt");

    let api = state.lock().unwrap();
    assert_eq!(
        api.calls,
        vec![
            "auth",
            "list vid1",
            "upload vid1 en",
            "list vid2",
            "delete vid2 en",
            "upload vid2 en",
        ]
    );
    assert_eq!(api.tracks["vid2"], vec!["fr", "en"]);

    let first = &api.uploads[0];
    assert_eq!(first.video_id, "vid1");
    assert_eq!(first.language, "en");
    assert_eq!(first.field, "file");
    assert_eq!(first.filename, "[vid1]_Title_en.vtt");
    assert_eq!(first.content_type, "text/vtt");
    assert_eq!(
        first.body,
        Bytes::from("WEBVTT\n\nNOTE [vid1]_Title_en.vtt\n")
    );
}

#[tokio::test]
async fn test_delete_not_found_still_uploads() {
    let mut api = FakeApi::default();
    api.tracks.insert("vid1".to_string(), vec!["en".to_string()]);
    api.ghost_tracks.insert("vid1".to_string());
    let (base_url, state) = spawn(api).await;
    let dir = folder_with(&["[vid1]_Title_en.vtt"]);

    let summary = orchestrator(&base_url, API_KEY, dir.path())
        .run(None, None)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, vec!["vid1"]);
    let api = state.lock().unwrap();
    assert_eq!(
        api.calls,
        vec!["auth", "list vid1", "delete vid1 en", "upload vid1 en"]
    );
}

#[tokio::test]
async fn test_upload_error_reported_and_batch_continues() {
    let mut api = FakeApi::default();
    api.tracks.insert("vid1".to_string(), vec![]);
    api.tracks.insert("vid2".to_string(), vec![]);
    api.failing_uploads.insert("vid1".to_string());
    let (base_url, _state) = spawn(api).await;
    let dir = folder_with(&["[vid1]_Title_en.vtt", "[vid2]_Other_en.vtt"]);

    let summary = orchestrator(&base_url, API_KEY, dir.path())
        .run(None, None)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, vec!["vid2"]);
    assert_eq!(summary.failure_count(), 1);
    let failure = &summary.failures[0];
    assert_eq!(failure.resource_id, "vid1");
    assert_eq!(failure.step, Step::Upload);
    assert_eq!(failure.error, "unexpected status 500: encoder exploded");
}

#[tokio::test]
async fn test_unknown_video_fails_at_list() {
    let (base_url, state) = spawn(FakeApi::default()).await;
    let dir = folder_with(&["[nope]_x.vtt"]);

    let summary = orchestrator(&base_url, API_KEY, dir.path())
        .run(None, None)
        .await
        .unwrap();

    assert_eq!(summary.failures[0].step, Step::List);
    assert!(summary.failures[0].error.contains("404"));
    assert_eq!(state.lock().unwrap().calls, vec!["auth", "list nope"]);
}

#[tokio::test]
async fn test_rejected_api_key_aborts_run() {
    let (base_url, state) = spawn(FakeApi::default()).await;
    let dir = folder_with(&["[vid1]_Title_en.vtt"]);

    let result = orchestrator(&base_url, "wrong-key", dir.path())
        .run(None, None)
        .await;

    assert!(matches!(
        result,
        Err(RunError::Auth(AuthError::Rejected { status: 400, .. }))
    ));
    assert_eq!(state.lock().unwrap().calls, vec!["auth"]);
}

#[tokio::test]
async fn test_run_one_with_explicit_video_id() {
    let mut api = FakeApi::default();
    api.tracks.insert("vi42".to_string(), vec!["de".to_string()]);
    let (base_url, state) = spawn(api).await;
    let dir = folder_with(&["german.vtt"]);

    let outcome = orchestrator(&base_url, API_KEY, dir.path())
        .run_one("vi42", &dir.path().join("german.vtt"), Some("de"))
        .await
        .unwrap();

    assert!(matches!(outcome, Outcome::Success { ref language, .. } if language == "de"));
    let api = state.lock().unwrap();
    assert_eq!(
        api.calls,
        vec!["auth", "list vi42", "delete vi42 de", "upload vi42 de"]
    );
    assert_eq!(api.uploads[0].filename, "german.vtt");
}

#[tokio::test]
async fn test_expiring_token_is_refreshed() {
    let api = FakeApi {
        short_lived_tokens: true,
        ..FakeApi::default()
    };
    let (base_url, state) = spawn(api).await;
    let dir = tempdir().unwrap();
    let credentials = ApiKeyCredentials::new(&config(&base_url, API_KEY, dir.path())).unwrap();

    assert_eq!(credentials.bearer_token().await.unwrap(), TOKEN);
    assert_eq!(credentials.bearer_token().await.unwrap(), REFRESHED_TOKEN);
    // The refreshed token is long-lived, so it is reused as is.
    assert_eq!(credentials.bearer_token().await.unwrap(), REFRESHED_TOKEN);

    assert_eq!(state.lock().unwrap().calls, vec!["auth", "refresh"]);
}

#[tokio::test]
async fn test_rejected_refresh_exchanges_api_key_again() {
    let api = FakeApi {
        short_lived_tokens: true,
        reject_refresh: true,
        ..FakeApi::default()
    };
    let (base_url, state) = spawn(api).await;
    let dir = tempdir().unwrap();
    let credentials = ApiKeyCredentials::new(&config(&base_url, API_KEY, dir.path())).unwrap();

    assert_eq!(credentials.bearer_token().await.unwrap(), TOKEN);
    assert_eq!(credentials.bearer_token().await.unwrap(), TOKEN);

    assert_eq!(
        state.lock().unwrap().calls,
        vec!["auth", "refresh", "auth"]
    );
}

#[tokio::test]
async fn test_batch_refreshes_token_between_requests() {
    let mut api = FakeApi {
        short_lived_tokens: true,
        ..FakeApi::default()
    };
    api.tracks.insert("vid1".to_string(), vec![]);
    let (base_url, state) = spawn(api).await;
    let dir = folder_with(&["[vid1]_Title_en.vtt"]);

    let summary = orchestrator(&base_url, API_KEY, dir.path())
        .run(None, None)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, vec!["vid1"]);
    assert_eq!(
        state.lock().unwrap().calls,
        vec!["auth", "refresh", "list vid1", "upload vid1 en"]
    );
}
