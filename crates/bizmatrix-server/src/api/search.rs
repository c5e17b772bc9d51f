use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use bizmatrix_core::{
    AiSource, DirectorySource, GeoPoint, RoundReport, SearchQuery, SessionSnapshot,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_session_error, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) const LOCATION_INVALID_NOTICE: &str =
    "Location unavailable: the supplied coordinates are out of range and were ignored.";
pub(super) const LOCATION_MISSING_NOTICE: &str =
    "Location unavailable: the directory provider needs an address or coordinates.";

#[derive(Debug, Deserialize)]
pub(super) struct SearchRequest {
    #[serde(flatten)]
    pub query: SearchQuery,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Serialize)]
pub(super) struct SearchResponse {
    #[serde(flatten)]
    pub report: RoundReport,
    pub notices: Vec<String>,
}

/// Resolves the usable location and any notices about it.
fn resolve_location(request: &SearchRequest) -> (Option<GeoPoint>, Vec<String>) {
    let mut notices = Vec::new();
    let location = match request.location {
        Some(point) => {
            let valid = point.validated();
            if valid.is_none() {
                notices.push(LOCATION_INVALID_NOTICE.to_string());
            }
            valid
        }
        None => None,
    };
    if location.is_none() && request.query.location_text().is_none() {
        notices.push(LOCATION_MISSING_NOTICE.to_string());
    }
    (location, notices)
}

pub(super) async fn run_search<A, D>(
    State(state): State<AppState<A, D>>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError>
where
    A: AiSource + 'static,
    D: DirectorySource + 'static,
{
    let Json(request) =
        payload.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;

    request
        .query
        .validate()
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let (location, notices) = resolve_location(&request);
    for notice in &notices {
        tracing::info!(notice = %notice, "search location notice");
    }

    let report = state
        .session
        .search(request.query, location)
        .await
        .map_err(|e| map_session_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: SearchResponse { report, notices },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn reset_search<A, D>(
    State(state): State<AppState<A, D>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, ApiError>
where
    A: AiSource + 'static,
    D: DirectorySource + 'static,
{
    state
        .session
        .reset()
        .await
        .map_err(|e| map_session_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: state.session.snapshot().await,
        meta: ResponseMeta::new(req_id.0),
    }))
}
