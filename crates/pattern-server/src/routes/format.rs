//! Analysis and formatting routes.

use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use pattern_core::{lines_from_text, LineRecord};
use pattern_docx::{DocxWriter, RenderOptions};
use pattern_engine::DocumentStats;
use pattern_ingest::{records_from_bytes, FileType};
use serde::Deserialize;
use tracing::{error, info};

use crate::state::{now_millis, AppState, FormatJob, JobStatus};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/format", post(format_text))
        .route("/upload", post(upload))
}

type ApiResponse = (StatusCode, Json<serde_json::Value>);

fn error_response(status: StatusCode, message: impl std::fmt::Display) -> ApiResponse {
    (status, Json(serde_json::json!({ "error": message.to_string() })))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    text: String,
}

#[derive(Debug, Deserialize)]
struct FormatRequest {
    text: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    include_toc: bool,
}

/// POST /api/analyze — classify and structure text without rendering.
async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResponse {
    let Json(req) = match body {
        Ok(body) => body,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.body_text()),
    };
    if req.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No text provided");
    }

    let processor = state.processor();
    let result = tokio::task::spawn_blocking(move || processor.process_text(&req.text)).await;

    match result {
        Ok(analysis) => match serde_json::to_value(&analysis) {
            Ok(value) => (StatusCode::OK, Json(value)),
            Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
        },
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// POST /api/format — format pasted text into a `.docx`.
async fn format_text(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FormatRequest>, JsonRejection>,
) -> ApiResponse {
    let Json(req) = match body {
        Ok(body) => body,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.body_text()),
    };
    if req.text.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No text provided");
    }

    let filename = req
        .filename
        .as_deref()
        .map(sanitize_filename)
        .unwrap_or_else(|| "document.txt".to_string());
    let options = RenderOptions {
        include_toc: req.include_toc,
        ..RenderOptions::default()
    };
    run_format_job(&state, filename, lines_from_text(&req.text), options).await
}

/// POST /api/upload — format an uploaded `.txt`, `.md` or `.docx` file.
async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> ApiResponse {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.body_text()),
        };
        if field.name() != Some("file") {
            continue;
        }

        let filename = sanitize_filename(field.file_name().unwrap_or("unnamed"));
        let file_type = FileType::from_path(Path::new(&filename));
        if file_type == FileType::Unknown {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Unsupported file type: {}", filename),
            );
        }

        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.body_text()),
        };

        let records = match records_from_bytes(&bytes, file_type) {
            Ok(records) => records,
            Err(e) => return error_response(StatusCode::UNPROCESSABLE_ENTITY, e),
        };
        if records.is_empty() {
            return error_response(StatusCode::BAD_REQUEST, "Uploaded file contains no text");
        }
        return run_format_job(&state, filename, records, RenderOptions::default()).await;
    }

    error_response(StatusCode::BAD_REQUEST, "No file provided")
}

/// Analyse, render and store one document, tracking it as a job.
async fn run_format_job(
    state: &Arc<AppState>,
    filename: String,
    records: Vec<LineRecord>,
    options: RenderOptions,
) -> ApiResponse {
    let job_id = uuid::Uuid::new_v4().to_string();
    let output_path = state.config.data_paths.output_for(&job_id);

    state.insert_job(FormatJob {
        id: job_id.clone(),
        filename: filename.clone(),
        status: JobStatus::Processing,
        output_path: None,
        stats: None,
        error: None,
        created_at: now_millis(),
        completed_at: None,
    });
    info!("Formatting job {}: {} ({} lines)", job_id, filename, records.len());

    let processor = state.processor();
    let path = output_path.clone();
    let result = tokio::task::spawn_blocking(move || -> pattern_core::Result<DocumentStats> {
        let analysis = processor.process_lines(&records);
        DocxWriter::new(options).write_to(&analysis, &path)?;
        Ok(analysis.stats)
    })
    .await
    .map_err(|e| pattern_core::Error::Internal(e.to_string()))
    .and_then(|r| r);

    match result {
        Ok(stats) => {
            let output = output_path.to_string_lossy().to_string();
            state.update_job(&job_id, |job| {
                job.status = JobStatus::Completed;
                job.output_path = Some(output);
                job.stats = Some(stats.clone());
                job.completed_at = Some(now_millis());
            });
            info!("Job {} completed: {} sections", job_id, stats.sections);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "job_id": job_id,
                    "stats": stats,
                    "download_url": format!("/api/download/{}", job_id),
                    "status": JobStatus::Completed,
                })),
            )
        }
        Err(e) => {
            error!("Job {} failed: {}", job_id, e);
            let message = e.to_string();
            state.update_job(&job_id, |job| {
                job.status = JobStatus::Failed;
                job.error = Some(message.clone());
                job.completed_at = Some(now_millis());
            });
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "job_id": job_id,
                    "error": message,
                    "status": JobStatus::Failed,
                })),
            )
        }
    }
}

fn sanitize_filename(name: &str) -> String {
    // Remove directory components
    let name = name.replace(['/', '\\'], "").replace("..", "");

    Path::new(&name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string()
}
