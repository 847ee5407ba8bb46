use axum::{
    Json,
    body::Body,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::pipeline::{ReportSummary, SearchRequest, generate_overdue_report};
use crate::report::XLSX_CONTENT_TYPE;

#[derive(Debug, Serialize)]
pub struct SearchCompaniesResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub summary: ReportSummary,
}

pub async fn search_companies(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<Json<SearchCompaniesResponse>> {
    let Json(request) = body.map_err(|rejection| {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let summary =
        generate_overdue_report(state.registry.as_ref(), &state.reports, &request).await?;

    Ok(Json(SearchCompaniesResponse {
        status: "success",
        summary,
    }))
}

/// Streams a stored report as an attachment.
pub async fn download_report(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    request: Request,
) -> Response {
    let Some(path) = state.reports.resolve(&filename).await else {
        return file_not_found(&filename, "no such report");
    };

    let mut response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response.map(Body::new),
        Err(never) => match never {},
    };

    // removed between resolve and open
    if response.status() == StatusCode::NOT_FOUND {
        return file_not_found(&filename, "report removed before it was served");
    }

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(XLSX_CONTENT_TYPE),
    );
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    response
}

fn file_not_found(filename: &str, reason: &str) -> Response {
    tracing::error!(filename = %filename, error = %reason, "Error downloading file");
    (StatusCode::INTERNAL_SERVER_ERROR, "File not found.").into_response()
}
