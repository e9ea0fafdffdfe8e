//! Request handlers for the drafting service.

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::draft::{draft_with_client, InstructionSource};
use crate::pipeline::compose;
use crate::server::error::ApiError;
use crate::server::store::StoredLetter;
use crate::server::AppState;

/// MIME type of the generated letters.
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const HOME_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Show Cause Notice — Reply Drafter</title>
</head>
<body>
  <h1>Show Cause Notice — Reply Drafter</h1>
  <form action="/upload/" method="post" enctype="multipart/form-data">
    <p><label>Notice (PDF/DOCX): <input type="file" name="file" required></label></p>
    <p><label>Reference reply (optional): <input type="file" name="reference"></label></p>
    <p><label>Instructions (optional): <input type="text" name="prompt" size="60"></label></p>
    <p><button type="submit">Draft reply</button></p>
  </form>
</body>
</html>
"#;

/// `GET /` — static landing page with the upload form.
pub async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub gstin: Option<String>,
    pub legal_name: Option<String>,
    pub address: Option<String>,
    pub download_url: String,
}

/// `POST /upload/` — run the drafting pipeline for one notice.
///
/// Multipart fields: `file` (the notice, required), `reference` (optional
/// document carrying the drafting instruction), `prompt` (optional text
/// field). When both instruction sources are present the reference
/// document wins.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut notice: Option<Vec<u8>> = None;
    let mut reference: Option<Vec<u8>> = None;
    let mut prompt: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Could not read 'file': {e}")))?;
                notice = Some(bytes.to_vec());
            }
            "reference" => {
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Could not read 'reference': {e}"))
                })?;
                if !bytes.is_empty() {
                    reference = Some(bytes.to_vec());
                }
            }
            "prompt" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Could not read 'prompt': {e}")))?;
                if !text.trim().is_empty() {
                    prompt = Some(text);
                }
            }
            // Unknown fields are drained and ignored.
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    let notice = notice
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing 'file' upload field".into()))?;

    let instruction = match (reference, prompt) {
        (Some(bytes), _) => InstructionSource::Reference(bytes),
        (None, Some(text)) => InstructionSource::Inline(text),
        (None, None) => InstructionSource::Default,
    };

    let output = draft_with_client(&notice, instruction, &state.config, &state.client).await?;

    let letter = compose::ReplyLetter {
        letterhead: &state.config.letterhead,
        reply_date: Local::now().date_naive(),
        party: &output.record,
        body: &output.reply,
    };
    let bytes = compose::to_bytes(&letter)?;
    let stored = state.store.save(&bytes).await?;

    info!(
        letter_id = %stored.id,
        gstin = output.record.gstin.as_deref().unwrap_or("-"),
        completion_tokens = output.stats.completion_tokens,
        "reply letter generated"
    );

    Ok(Json(UploadResponse {
        message: "Reply drafted",
        gstin: output.record.gstin,
        legal_name: output.record.legal_name,
        address: output.record.address,
        download_url: format!("/download/{}", stored.id),
    }))
}

/// `GET /download/` — stream the most recently generated letter.
pub async fn download_latest(State(state): State<AppState>) -> Result<Response, ApiError> {
    let stored = state
        .store
        .latest()
        .ok_or_else(|| ApiError::NotFound("No reply has been generated yet".into()))?;
    serve_letter(stored).await
}

/// `GET /download/:id` — stream one specific letter.
pub async fn download_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest("Malformed letter id".into()))?;
    let stored = state
        .store
        .find(id)
        .ok_or_else(|| ApiError::NotFound(format!("No letter with id {id}")))?;
    serve_letter(stored).await
}

/// Read the letter from disk and wrap it as a DOCX attachment.
async fn serve_letter(stored: StoredLetter) -> Result<Response, ApiError> {
    let bytes = tokio::fs::read(&stored.path)
        .await
        .map_err(|_| ApiError::NotFound(format!("Letter {} is no longer on disk", stored.id)))?;

    let headers = [
        (header::CONTENT_TYPE, DOCX_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"reply-{}.docx\"", stored.id),
        ),
    ];
    Ok((headers, bytes).into_response())
}
