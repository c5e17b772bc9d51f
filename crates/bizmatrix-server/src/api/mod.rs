mod export;
mod search;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use bizmatrix_core::{AiSource, DirectorySource, SearchSession, SessionError, SessionSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

/// Shared handler state: one search session over the two providers.
pub struct AppState<A, D> {
    pub session: SearchSession<A, D>,
}

impl<A, D> Clone for AppState<A, D> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_session_error(request_id: String, error: &SessionError) -> ApiError {
    match error {
        SessionError::Busy => ApiError::new(request_id, "conflict", error.to_string()),
        SessionError::Unexpected(_) => {
            tracing::error!(error = %error, "search session failed");
            ApiError::new(request_id, "internal_error", error.to_string())
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app<A, D>(state: AppState<A, D>) -> Router
where
    A: AiSource + 'static,
    D: DirectorySource + 'static,
{
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/search", post(search::run_search::<A, D>))
        .route("/api/v1/search/reset", post(search::reset_search::<A, D>))
        .route("/api/v1/results", get(get_results::<A, D>))
        .route("/api/v1/export", get(export::export_all::<A, D>))
        .route("/api/v1/export/{page}", get(export::export_page::<A, D>))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn get_results<A, D>(
    State(state): State<AppState<A, D>>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SessionSnapshot>>
where
    A: AiSource + 'static,
    D: DirectorySource + 'static,
{
    Json(ApiResponse {
        data: state.session.snapshot().await,
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
