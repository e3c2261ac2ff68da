//! Job status and download routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/jobs/{job_id}", get(get_job))
        .route("/download/{job_id}", get(download))
}

/// GET /api/jobs/{job_id} — a single job's status.
async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match state.get_job(&job_id) {
        Some(job) => (StatusCode::OK, Json(serde_json::json!(job))),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Job not found" })),
        ),
    }
}

/// GET /api/download/{job_id} — the generated document.
async fn download(State(state): State<Arc<AppState>>, Path(job_id): Path<String>) -> Response {
    // Only known job ids ever reach the filesystem.
    let Some(job) = state.get_job(&job_id) else {
        return not_found("Job not found");
    };
    let path = state.config.data_paths.output_for(&job.id);

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let stem = std::path::Path::new(&job.filename)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document")
                .replace(|c: char| !c.is_ascii_alphanumeric() && !"-_. ".contains(c), "_");
            let disposition = format!("attachment; filename=\"{}_formatted.docx\"", stem);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, DOCX_MIME.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(_) => not_found("Formatted document not found"),
    }
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
