use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::path::Path as FsPath;
use uuid::Uuid;

use crate::{
    api::middleware::{ApiError, ApiResult},
    api::AppState,
    models::{Job, JobResponse},
    services::pdf,
};

const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "doc", "docx", "txt"];

/// Accept a customer document and create the job in `uploaded` state.
pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("document").to_string();
        let ext = FsPath::new(&original_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "Invalid file type .{}. Only PDF, JPG, PNG, DOC, DOCX, TXT allowed",
                ext
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        if data.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }

        // Store under a fresh UUID name so filenames never collide.
        let stored_name = format!("{}.{}", Uuid::new_v4(), ext);
        let file_path = state.upload_dir.join(&stored_name);
        tokio::fs::write(&file_path, &data)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to store upload: {}", e)))?;

        // Accurate page counting for PDFs; images and office documents
        // settle on a real count after conversion. A count failure never
        // fails the upload.
        let page_count = if ext == "pdf" {
            let path = file_path.clone();
            match tokio::task::spawn_blocking(move || pdf::page_count(&path)).await {
                Ok(Ok(count)) => count as i64,
                Ok(Err(e)) => {
                    tracing::warn!("Page count failed for {}: {}", original_name, e);
                    1
                }
                Err(e) => {
                    tracing::warn!("Page count task failed for {}: {}", original_name, e);
                    1
                }
            }
        } else {
            1
        };

        let job = Job::new(
            original_name,
            file_path.to_string_lossy().into_owned(),
            page_count,
        );
        state.db.create_job(&job).await?;

        return Ok((StatusCode::CREATED, Json(JobResponse::from(job))));
    }

    Err(ApiError::BadRequest(
        "Multipart upload missing a 'file' field".to_string(),
    ))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let job = state
        .db
        .get_job_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;

    Ok(Json(JobResponse::from(job)))
}
