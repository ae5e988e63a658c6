//! Stored content endpoints
//!
//! GET /api/contents - List all stored items, newest first
//! GET /api/contents/{id} - Fetch one stored item

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::{AppState, ErrorResponse};

/// Build the contents router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contents", get(list_contents))
        .route("/api/contents/{id}", get(get_content))
}

/// List all stored items
async fn list_contents(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.list().await)
}

/// Fetch one stored item by ID
async fn get_content(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.get(&id).await {
        Some(item) => (StatusCode::OK, Json(item)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("content not found: {}", id),
            }),
        )
            .into_response(),
    }
}
