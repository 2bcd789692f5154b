use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

use model_view_service::{AppCatalog, HttpModelSource, Loader, ModelStore, build_router};

fn catalog() -> Arc<AppCatalog> {
    let catalog = AppCatalog::new();
    catalog
        .insert(json!({
            "model_id": "42",
            "name": "Cargo damage",
            "output": { "type": "IMG_CLASSIFIER", "labels": ["cat", "dog"] }
        }))
        .unwrap();
    catalog
        .insert(json!({ "model_id": "7", "output": { "type": "UNKNOWN_TYPE" } }))
        .unwrap();
    Arc::new(catalog)
}

/// Serve the catalog on an ephemeral port and point the loader back at it.
async fn spawn_service() -> (String, ModelStore) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let store = ModelStore::new();
    let source = Arc::new(HttpModelSource::new(base_url.clone()));
    let loader = Arc::new(Loader::new(source, store.clone()));
    let router = build_router(loader, catalog());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (base_url, store)
}

async fn get_text(url: &str) -> (StatusCode, String) {
    let response = reqwest::get(url).await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.text().await.unwrap())
}

#[tokio::test]
async fn renders_image_classifier_for_known_app() {
    let (base, store) = spawn_service().await;

    let (status, body) = get_text(&format!("{base}/execute/42")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with(r#"<section class="widget image-classifier" data-model-id="42">"#));
    assert!(body.contains("<li>cat</li><li>dog</li>"));
    assert_eq!(store.get().unwrap().extra["name"], json!("Cargo damage"));
}

#[tokio::test]
async fn unknown_app_renders_nothing_and_keeps_store() {
    let (base, store) = spawn_service().await;

    let (status, body) = get_text(&format!("{base}/execute/missing")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    assert!(store.get().is_none());
}

#[tokio::test]
async fn unknown_app_after_known_app_renders_nothing() {
    let (base, store) = spawn_service().await;

    let (_, body) = get_text(&format!("{base}/execute/42")).await;
    assert!(body.contains("<li>cat</li>"));

    let (status, body) = get_text(&format!("{base}/execute/missing")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    assert_eq!(store.get().unwrap().extra["model_id"], json!("42"));
}

#[tokio::test]
async fn unknown_output_type_renders_nothing() {
    let (base, store) = spawn_service().await;

    let (_, body) = get_text(&format!("{base}/execute/7")).await;

    assert_eq!(body, "");
    assert_eq!(store.get().unwrap().output_type(), Some("UNKNOWN_TYPE"));
}

#[tokio::test]
async fn active_model_follows_latest_load() {
    let (base, _) = spawn_service().await;

    let (status, _) = get_text(&format!("{base}/api/active-model")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    get_text(&format!("{base}/execute/42")).await;
    get_text(&format!("{base}/execute/7")).await;

    let (status, body) = get_text(&format!("{base}/api/active-model")).await;
    assert_eq!(status, StatusCode::OK);
    let model: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(model, json!({ "model_id": "7", "output": { "type": "UNKNOWN_TYPE" } }));
}

/// Router whose loader points at an address nothing listens on.
fn offline_router() -> (Router, ModelStore) {
    let store = ModelStore::new();
    let source = Arc::new(HttpModelSource::new("http://127.0.0.1:9"));
    let loader = Arc::new(Loader::new(source, store.clone()));
    (build_router(loader, catalog()), store)
}

async fn body_text(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn missing_id_renders_notice() {
    let (router, store) = offline_router();

    let (status, body) = body_text(router, "/execute").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<p>Invalid application</p>");
    assert!(store.get().is_none());
}

#[tokio::test]
async fn transport_failure_renders_nothing() {
    let (router, store) = offline_router();

    let (status, body) = body_text(router, "/execute/42").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    assert!(store.get().is_none());
}

#[tokio::test]
async fn catalog_speaks_descriptor_envelope() {
    let (router, _) = offline_router();

    let (status, body) = body_text(router.clone(), "/api/app/42/").await;
    assert_eq!(status, StatusCode::OK);
    let envelope: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(envelope["status"], json!("OK"));
    assert_eq!(envelope["model"]["output"]["type"], json!("IMG_CLASSIFIER"));

    let (status, body) = body_text(router, "/api/app/nope/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "status": 404 }));
}
