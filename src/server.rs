use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::{
    catalog::AppCatalog,
    model::{Loader, ModelStore},
    view::ExecuteView,
};

#[derive(Clone)]
pub struct AppState {
    pub store: ModelStore,
    pub loader: Arc<Loader>,
    pub catalog: Arc<AppCatalog>,
}

pub fn build_router(loader: Arc<Loader>, catalog: Arc<AppCatalog>) -> Router {
    let state = AppState {
        store: loader.store().clone(),
        loader,
        catalog,
    };

    Router::new()
        .route("/health", get(health))
        .route("/execute", get(execute_without_id))
        .route("/execute/", get(execute_without_id))
        .route("/execute/:app_id", get(execute))
        .route("/api/app/:app_id/", get(app_model))
        .route("/api/active-model", get(active_model))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "ok"
}

async fn execute_without_id(State(state): State<AppState>) -> Html<String> {
    let view = ExecuteView::mount(None, &state.store, state.loader.clone());
    Html(view.render().to_html())
}

async fn execute(State(state): State<AppState>, Path(app_id): Path<String>) -> Html<String> {
    let mut view = ExecuteView::mount(Some(app_id), &state.store, state.loader.clone());
    let outcome = view.settle().await;
    debug!(app_id = ?view.app_id(), ?outcome, phase = ?view.phase(), "execute view settled");
    Html(view.render().to_html())
}

async fn app_model(State(state): State<AppState>, Path(app_id): Path<String>) -> Response {
    let envelope = state.catalog.lookup(&app_id);
    let status = if envelope.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Json(envelope)).into_response()
}

async fn active_model(State(state): State<AppState>) -> Response {
    match state.store.get() {
        Some(model) => Json(model.as_ref().clone()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
