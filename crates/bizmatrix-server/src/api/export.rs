use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension,
};
use bizmatrix_core::{
    all_results_filename, page_filename, to_csv, AiSource, BusinessRecord, DirectorySource,
};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

fn csv_attachment(records: &[BusinessRecord], filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        to_csv(records),
    )
        .into_response()
}

pub(super) async fn export_all<A, D>(
    State(state): State<AppState<A, D>>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Response, ApiError>
where
    A: AiSource + 'static,
    D: DirectorySource + 'static,
{
    let records = state.session.snapshot().await.all_records();
    if records.is_empty() {
        return Err(ApiError::new(req_id.0, "not_found", "no results to export"));
    }
    Ok(csv_attachment(&records, &all_results_filename()))
}

pub(super) async fn export_page<A, D>(
    State(state): State<AppState<A, D>>,
    Extension(req_id): Extension<RequestId>,
    page: Result<Path<usize>, PathRejection>,
) -> Result<Response, ApiError>
where
    A: AiSource + 'static,
    D: DirectorySource + 'static,
{
    let Path(page) =
        page.map_err(|e| ApiError::new(req_id.0.clone(), "bad_request", e.body_text()))?;
    let snapshot = state.session.snapshot().await;
    let records = page
        .checked_sub(1)
        .and_then(|index| snapshot.rounds.get(index))
        .filter(|round| !round.is_empty())
        .ok_or_else(|| ApiError::new(req_id.0, "not_found", format!("page {page} not found")))?;
    Ok(csv_attachment(records, &page_filename(page)))
}
