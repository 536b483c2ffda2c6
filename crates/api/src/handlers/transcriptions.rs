//! Handlers for the `/transcriptions` resource.
//!
//! Submission validates the upload synchronously and returns a job id
//! without waiting on the pipeline; all stage failures surface as data in
//! the poll response, never as an HTTP error.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use scribe_core::error::JobFailure;
use scribe_core::input::{validate_upload, UploadHints};
use scribe_core::job::{JobId, JobInput, JobSnapshot, JobStage, MinutesResult};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Wire DTOs
// ---------------------------------------------------------------------------

/// Body of a successful submission.
#[derive(Debug, Serialize)]
pub struct JobSubmitted {
    pub job_id: JobId,
}

/// Body of a poll response.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: JobId,
    pub stage: JobStage,
    pub progress: u8,
    pub message: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<MinutesResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
}

impl From<&JobSnapshot> for JobStatusResponse {
    fn from(snapshot: &JobSnapshot) -> Self {
        Self {
            job_id: snapshot.id,
            stage: snapshot.stage,
            progress: snapshot.progress,
            message: snapshot.message.clone(),
            completed: snapshot.is_terminal(),
            result: snapshot.result.clone(),
            error: snapshot.error.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// Accumulated multipart fields of one submission.
#[derive(Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    hints: UploadHints,
}

/// POST /api/v1/transcriptions
///
/// Accepts a multipart form with a required `file` field and optional
/// `meeting_summary`, `key_terms`, and `model` text fields. Returns 202
/// with the fresh job id; never waits for any pipeline stage.
pub async fn submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let form = read_form(multipart).await?;

    let (filename, data) = form
        .file
        .ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    // Everything rejected here happens before a job id exists.
    let ext = validate_upload(
        &filename,
        data.len() as u64,
        state.config.max_upload_bytes,
        &form.hints,
    )?;

    // Stage the audio in a uniquely named temp file; the executor removes
    // it once the job reaches a terminal state.
    let audio_path =
        std::env::temp_dir().join(format!("scribe-upload-{}.{ext}", uuid::Uuid::new_v4()));
    tokio::fs::write(&audio_path, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;
    tracing::debug!(
        path = %audio_path.display(),
        bytes = data.len(),
        "Uploaded audio staged",
    );

    let input = JobInput {
        audio_path,
        meeting_summary: form.hints.meeting_summary,
        key_terms: form.hints.key_terms,
        model: form.hints.model,
    };
    let job_id = state.submission.submit(input).await?;

    tracing::info!(job_id = %job_id, filename = %filename, "Transcription job accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: JobSubmitted { job_id },
        }),
    ))
}

/// Drain the multipart stream into an [`UploadForm`].
async fn read_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("recording").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.file = Some((filename, data.to_vec()));
            }
            "meeting_summary" => {
                form.hints.meeting_summary = Some(read_text(field).await?);
            }
            "key_terms" => {
                form.hints.key_terms = Some(read_text(field).await?);
            }
            "model" => {
                form.hints.model = Some(read_text(field).await?);
            }
            _ => {} // ignore unknown fields
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// ---------------------------------------------------------------------------
// Poll
// ---------------------------------------------------------------------------

/// GET /api/v1/transcriptions/{id}
///
/// Current job state. Returns 404 for ids that are unknown, malformed, or
/// already evicted after a delivered terminal snapshot. Stage failures are
/// data in a 200 response, never an HTTP error.
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let Ok(job_id) = JobId::parse(&id) else {
        return Err(AppError::UnknownJob(id));
    };

    let snapshot = state.status.get_status(job_id).await?;

    Ok(Json(DataResponse {
        data: JobStatusResponse::from(snapshot.as_ref()),
    }))
}
