//! Generation API endpoint
//!
//! POST /api/generate - Run one generation request

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use super::{AppState, ErrorResponse};
use crate::generate::{GenerateError, GenerateRequest};

/// Build the generate router
pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate", post(generate))
}

/// Run a generation request and return the finished content item
async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> impl IntoResponse {
    match state.generator.generate(request).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => {
            let status = match &e {
                GenerateError::Validation(_) => StatusCode::BAD_REQUEST,
                GenerateError::Busy => StatusCode::CONFLICT,
                GenerateError::Gateway(_) => StatusCode::BAD_GATEWAY,
                GenerateError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
