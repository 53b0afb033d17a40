use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use liscrape_core::ProfileRecord;
use liscrape_scraper::{BrowserSettings, ScrapePolicy};
use tempfile::TempDir;
use tower::ServiceExt;

fn state(dir: &TempDir) -> AppState {
    AppState {
        store: Arc::new(FileStore::new(dir.path())),
        scrape: Arc::new(ScrapeSettings {
            browser: BrowserSettings {
                executable: Some("/nonexistent/chrome".into()),
                ..BrowserSettings::default()
            },
            policy: ScrapePolicy::default(),
        }),
    }
}

fn open_app(state: AppState) -> Router {
    build_app(state, AuthState::disabled())
}

async fn seed(state: &AppState, id: &str, first: &str, last: &str, headline: &str) {
    let record = ProfileRecord {
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        headline: Some(headline.to_string()),
        ..ProfileRecord::default()
    };
    state.store.merge_profile(id, &record).await.expect("seed profile");
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn scrape_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/profiles/scrape")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_codes_map_to_statuses() {
    let status = |code: &str| ApiError::new("req-1", code, "message").into_response().status();
    assert_eq!(status("not_found"), StatusCode::NOT_FOUND);
    assert_eq!(status("internal_error"), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn store_errors_map_to_api_codes() {
    let invalid = map_store_error("req-1".into(), &StoreError::InvalidProfileId("../x".into()));
    assert_eq!(invalid.error.code, "validation_error");

    let transition = map_store_error(
        "req-1".into(),
        &StoreError::InvalidTaskTransition {
            task_id: uuid::Uuid::nil(),
            from: liscrape_core::TaskState::Completed,
            to: liscrape_core::TaskState::Running,
        },
    );
    assert_eq!(transition.error.code, "internal_error");

    let io = map_store_error(
        "req-1".into(),
        &StoreError::Io {
            path: "/data".into(),
            source: std::io::Error::other("disk full"),
        },
    );
    assert_eq!(io.error.code, "internal_error");
    assert!(!io.error.message.contains("disk full"));
}

#[tokio::test]
async fn health_reports_storage_ok() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, json) = send(open_app(state(&dir)), get_request("/api/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["storage"], "ok");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn list_returns_stored_summaries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = state(&dir);
    seed(&state, "jane-doe", "Jane", "Doe", "Data Engineer").await;
    seed(&state, "john-roe", "John", "Roe", "Product Designer").await;

    let (status, json) = send(open_app(state), get_request("/api/v1/profiles")).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = json["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|p| p["id"].as_str())
        .collect();
    assert_eq!(ids, ["jane-doe", "john-roe"]);
}

#[tokio::test]
async fn search_filters_by_name_and_headline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = state(&dir);
    seed(&state, "jane-doe", "Jane", "Doe", "Data Engineer").await;
    seed(&state, "john-roe", "John", "Roe", "Product Designer").await;

    let (status, json) = send(
        open_app(state),
        get_request("/api/v1/profiles/search?query=DESIGNER"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], "john-roe");
}

#[tokio::test]
async fn search_without_query_returns_everything() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = state(&dir);
    seed(&state, "jane-doe", "Jane", "Doe", "Data Engineer").await;

    let (status, json) = send(open_app(state), get_request("/api/v1/profiles/search")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn get_profile_returns_document_with_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = state(&dir);
    seed(&state, "jane-doe", "Jane", "Doe", "Data Engineer").await;

    let (status, json) = send(open_app(state), get_request("/api/v1/profiles/jane-doe")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], "jane-doe");
    assert_eq!(json["data"]["headline"], "Data Engineer");
}

#[tokio::test]
async fn get_unknown_profile_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, json) = send(
        open_app(state(&dir)),
        get_request("/api/v1/profiles/nobody"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn scrape_is_accepted_and_task_is_queryable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = state(&dir);
    let (status, json) = send(
        open_app(state.clone()),
        scrape_request(serde_json::json!({
            "profile_url": "https://www.linkedin.com/in/jane-doe/",
            "session_cookie": "AQEDAR",
            "scrape_posts": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["data"]["profile_id"], "jane-doe");
    let task_id = json["data"]["task_id"].as_str().expect("task id").to_string();

    let (status, json) = send(
        open_app(state),
        get_request(&format!("/api/v1/tasks/{task_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["task_id"], task_id.as_str());
    assert_eq!(json["data"]["profile_id"], "jane-doe");
}

#[tokio::test]
async fn scrape_accepts_short_field_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, json) = send(
        open_app(state(&dir)),
        scrape_request(serde_json::json!({
            "url": "https://www.linkedin.com/in/john-roe",
            "cookie": "AQEDAR"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(json["data"]["profile_id"], "john-roe");
}

#[tokio::test]
async fn scrape_rejects_blank_cookie() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, json) = send(
        open_app(state(&dir)),
        scrape_request(serde_json::json!({
            "profile_url": "https://www.linkedin.com/in/jane-doe/",
            "session_cookie": "   "
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn scrape_rejects_url_without_profile() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, json) = send(
        open_app(state(&dir)),
        scrape_request(serde_json::json!({
            "profile_url": "https://",
            "session_cookie": "AQEDAR"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn task_lookup_rejects_malformed_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (status, _) = send(
        open_app(state(&dir)),
        get_request("/api/v1/tasks/not-a-uuid"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let uri = format!("/api/v1/tasks/{}", uuid::Uuid::new_v4());
    let (status, json) = send(open_app(state(&dir)), get_request(&uri)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn protected_routes_require_bearer_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let auth = AuthState::from_keys("secret-key", false).expect("auth");
    let app = build_app(state(&dir), auth);

    let (status, _) = send(app.clone(), get_request("/api/v1/profiles")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let authorized = Request::builder()
        .uri("/api/v1/profiles")
        .header(header::AUTHORIZATION, "Bearer secret-key")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(app.clone(), authorized).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app, get_request("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
}
