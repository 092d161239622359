use codespher_chat::config::AppConfig;
use codespher_chat::message::{ChatResponse, PendingCount};
use codespher_chat::routes::create_router;
use codespher_chat::state::AppState;
use codespher_chat::storage::{MemoryStore, projects::Project, requests::Request as ServiceRequest};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::util::ServiceExt;

const ADMIN_KEY: &str = "secret123";

fn app() -> Router {
    let config = AppConfig {
        admin_key: ADMIN_KEY.to_string(),
        simulated_delay: false,
        ..Default::default()
    };
    let state = Arc::new(AppState::new(&config, Arc::new(MemoryStore::new()), None));
    create_router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-admin-key", ADMIN_KEY);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_chat_endpoint() {
    let response = app()
        .oneshot(json_request("POST", "/chat", json!({ "message": "hello", "session_id": null })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = read_json(response).await;
    assert!(!chat_resp.session_id.is_empty());
    assert!(chat_resp.options_widget.is_none());
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let response = app()
        .oneshot(json_request("POST", "/chat", json!({ "message": "   " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_guided_flow_creates_request() {
    let app = app();

    // Project type
    let response = app
        .clone()
        .oneshot(json_request("POST", "/chat", json!({ "message": "أريد موقع لشركتي" })))
        .await
        .unwrap();
    let chat_resp: ChatResponse = read_json(response).await;
    let session_id = chat_resp.session_id;
    let widget = chat_resp.options_widget.expect("options widget");
    assert_eq!(widget.options.len(), 5);

    // Empty selection
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/chat/options",
            json!({ "session_id": session_id, "selected": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Tick two options
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/chat/options",
            json!({ "session_id": session_id, "selected": [widget.options[0], widget.options[3]] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = read_json(response).await;
    assert!(chat_resp.reply.contains("موقع تعريفي (Portfolio)، موقع حجز مواعيد"));

    // Contact details
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/chat",
            json!({ "message": "اسمي أحمد، هاتف 07701234567", "session_id": session_id }),
        ))
        .await
        .unwrap();
    let chat_resp: ChatResponse = read_json(response).await;
    let request = chat_resp.request.expect("request created");
    assert_eq!(request.kind, "موقع ويب");

    // Stored for the dashboard
    let response = app
        .clone()
        .oneshot(admin_request("GET", "/admin/requests", None))
        .await
        .unwrap();
    let stored: Vec<ServiceRequest> = read_json(response).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, request.id);

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/admin/requests/pending", None))
        .await
        .unwrap();
    let pending: PendingCount = read_json(response).await;
    assert_eq!(pending.pending, 1);

    // Status update clears the badge
    let response = app
        .clone()
        .oneshot(admin_request(
            "PUT",
            &format!("/admin/requests/{}/status", request.id),
            Some(json!({ "status": "in_progress" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(admin_request("GET", "/admin/requests/pending", None))
        .await
        .unwrap();
    let pending: PendingCount = read_json(response).await;
    assert_eq!(pending.pending, 0);
}

#[tokio::test]
async fn test_options_without_draft_is_rejected() {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/chat/options",
            json!({ "session_id": "nobody", "selected": ["تطبيق iOS"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_requires_key() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/admin/requests")
                .header("x-admin-key", "wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_transcript_and_clear() {
    let app = app();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/chat",
            json!({ "message": "مرحبا", "session_id": "visitor-a" }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(get("/chat/transcript?session_id=visitor-a"))
        .await
        .unwrap();
    let transcript: Vec<Value> = read_json(response).await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0]["sender"], "user");
    assert_eq!(transcript[1]["sender"], "ai");

    let response = app.clone().oneshot(get("/chat/transcript")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/chat/history?session_id=visitor-a")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get("/chat/transcript?session_id=visitor-a"))
        .await
        .unwrap();
    let transcript: Vec<Value> = read_json(response).await;
    assert!(transcript.is_empty());
}

#[tokio::test]
async fn test_sessions_do_not_share_conversations() {
    let app = app();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/chat",
            json!({ "message": "اسمي أحمد، هاتف 07701234567 أريد استشارة", "session_id": "visitor-a" }),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/chat",
            json!({ "message": "أحتاج برمجة بميزانية 500 دولار", "session_id": "visitor-b" }),
        ))
        .await
        .unwrap();
    let chat_resp: ChatResponse = read_json(response).await;
    // visitor-b has no earlier turns, so nothing is merged into a request
    assert!(chat_resp.request.is_none());
    assert!(!chat_resp.reply.contains("أحمد"));

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/admin/requests", None))
        .await
        .unwrap();
    let stored: Vec<ServiceRequest> = read_json(response).await;
    assert!(stored.iter().all(|r| r.customer_info.phone.is_none()));

    let response = app
        .clone()
        .oneshot(get("/chat/transcript?session_id=visitor-b"))
        .await
        .unwrap();
    let transcript: Vec<Value> = read_json(response).await;
    assert_eq!(transcript.len(), 2);
    assert!(transcript.iter().all(|e| !e["content"].as_str().unwrap().contains("07701234567")));
}

#[tokio::test]
async fn test_unusable_session_id_is_rejected() {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/chat",
            json!({ "message": "مرحبا", "session_id": "../../etc/passwd" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_unknown_request_is_not_found() {
    let response = app()
        .oneshot(admin_request("DELETE", "/admin/requests/nope", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unset_admin_key_locks_admin_routes() {
    let config = AppConfig { simulated_delay: false, ..Default::default() };
    let app = create_router(Arc::new(AppState::new(&config, Arc::new(MemoryStore::new()), None)));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin/requests")
                .header("x-admin-key", "")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_project_admin_and_public_listing() {
    let app = app();

    let response = app
        .clone()
        .oneshot(admin_request(
            "POST",
            "/admin/projects",
            Some(json!({ "name": "متجر الورد", "url": "https://example.com" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let project: Project = read_json(response).await;

    let response = app
        .clone()
        .oneshot(get("/projects"))
        .await
        .unwrap();
    let listed: Vec<Project> = read_json(response).await;
    assert_eq!(listed.len(), 1);

    let response = app
        .clone()
        .oneshot(admin_request(
            "POST",
            &format!("/admin/projects/{}/toggle", project.id),
            None,
        ))
        .await
        .unwrap();
    let toggled: Project = read_json(response).await;
    assert!(!toggled.is_active);

    let response = app
        .clone()
        .oneshot(get("/projects"))
        .await
        .unwrap();
    let listed: Vec<Project> = read_json(response).await;
    assert!(listed.is_empty());

    let response = app
        .clone()
        .oneshot(admin_request("DELETE", &format!("/admin/projects/{}", project.id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(admin_request("DELETE", &format!("/admin/projects/{}", project.id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
