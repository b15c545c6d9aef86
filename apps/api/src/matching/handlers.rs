//! Axum route handlers for the Match API.

use std::path::{Path, PathBuf};

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::db::fetch_jobs;
use crate::errors::AppError;
use crate::extract;
use crate::matching::engine::{match_resume, MatchReport};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume_text: String,
}

/// POST /api/v1/match
///
/// Matches pasted resume text against the job corpus.
pub async fn handle_match_text(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchReport>, AppError> {
    run_match(&state, &request.resume_text).await
}

/// POST /api/v1/match/upload
///
/// Accepts a resume as the multipart `file` field, persists the upload,
/// extracts its text, and runs the same match pipeline.
pub async fn handle_match_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MatchReport>, AppError> {
    let mut resume_text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("file field is missing a filename".to_string()))?;
        if !extract::is_allowed(&filename) {
            return Err(AppError::Validation(format!(
                "unsupported file type: {filename}"
            )));
        }

        let data: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;

        let stored = store_upload(&state.config.upload_dir, &filename, &data).await?;
        debug!("stored upload at {}", stored.display());

        resume_text = Some(extract::extract_text(&filename, &data));
        break;
    }

    let resume_text = resume_text.ok_or_else(|| {
        AppError::Validation("multipart body must include a 'file' field".to_string())
    })?;

    run_match(&state, &resume_text).await
}

async fn run_match(state: &AppState, resume_text: &str) -> Result<Json<MatchReport>, AppError> {
    let jobs = fetch_jobs(&state.db).await?;
    let report = match_resume(jobs, resume_text, &state.semantic).await?;
    Ok(Json(report))
}

/// Writes the upload under a collision-free name and returns its path.
async fn store_upload(upload_dir: &str, filename: &str, data: &[u8]) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = Path::new(upload_dir).join(format!(
        "{}_{}",
        Uuid::new_v4().simple(),
        sanitize_filename(filename)
    ));
    tokio::fs::write(&path, data).await?;
    Ok(path)
}

/// Strips anything that could escape the upload directory: keeps
/// alphanumerics, dots, dashes, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
