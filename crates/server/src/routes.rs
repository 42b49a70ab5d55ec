//! HTTP handlers for the web UI.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use img2txt_core::{default_language, find_language, report, Detection, Language, UI_LANGUAGES};
use img2txt_ocr::PipelineOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Instrument;

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Upload extensions the form accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image uploaded")]
    MissingImage,
    #[error("Unsupported file type '{0}' (expected jpg, jpeg or png)")]
    UnsupportedType(String),
    #[error("Unknown language '{0}'")]
    UnknownLanguage(String),
    #[error("Invalid form data: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Multipart(e) => e.status(),
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

// ── Page & metadata ──────────────────────────────────────────────────────────

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub engine_loaded: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", engine_loaded: state.pipeline.engine().is_loaded() })
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: &'static [Language],
    pub default: Language,
}

pub async fn languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse { languages: UI_LANGUAGES, default: default_language() })
}

/// POST /api/engine/reset - drop the cached OCR engine so the next run reloads it.
pub async fn reset_engine(State(state): State<AppState>) -> StatusCode {
    state.pipeline.engine().reset();
    StatusCode::NO_CONTENT
}

// ── Extract & translate ──────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub extracted: String,
    pub translated: String,
    pub language: String,
    pub language_code: String,
    pub detections: Vec<Detection>,
    /// Binarized image as base64 PNG, when pre-processing was on.
    pub processed_image: Option<String>,
    pub download_name: String,
    pub download_body: String,
}

struct ExtractForm {
    image: Vec<u8>,
    language: Language,
    preprocess: bool,
}

async fn read_form(mut multipart: Multipart) -> Result<ExtractForm, ApiError> {
    let mut image = None;
    let mut language = default_language();
    let mut preprocess = true;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let ext = file_name
                    .rsplit_once('.')
                    .map(|(_, e)| e.to_lowercase())
                    .unwrap_or_default();
                if !ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
                    return Err(ApiError::UnsupportedType(file_name));
                }
                image = Some(field.bytes().await?.to_vec());
            }
            "language" => {
                let value = field.text().await?;
                language = find_language(&value).ok_or(ApiError::UnknownLanguage(value))?;
            }
            "preprocess" => {
                let value = field.text().await?;
                preprocess = matches!(value.trim().to_lowercase().as_str(), "true" | "on" | "1" | "yes");
            }
            _ => {}
        }
    }

    let image = image.filter(|b| !b.is_empty()).ok_or(ApiError::MissingImage)?;
    Ok(ExtractForm { image, language, preprocess })
}

/// POST /api/extract - OCR an uploaded image and translate the result.
///
/// Multipart fields: `image` (jpg/jpeg/png), `language` (UI name or code,
/// default Hindi), `preprocess` (bool, default true). OCR failures come back
/// as an empty extraction, translation failures as an error string in
/// `translated`.
pub async fn extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let form = read_form(multipart).await?;
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!(
        "extract",
        %request_id,
        language = form.language.code,
        preprocess = form.preprocess,
        bytes = form.image.len()
    );

    async move {
        let _guard = state.run_lock.lock().await;

        let options = PipelineOptions { preprocess: form.preprocess, clean: true };
        let output = state.pipeline.process_bytes(form.image, options).await;
        tracing::info!(detections = output.detections.len(), "Extraction complete");

        let translated = state.translator.translate(&output.text, form.language.code).await;

        Ok::<_, ApiError>(Json(ExtractResponse {
            download_name: report::download_file_name(&form.language),
            download_body: report::download_body(&output.text, &translated, &form.language),
            processed_image: output.processed_png.as_deref().map(|png| STANDARD.encode(png)),
            detections: output.detections.into_inner(),
            extracted: output.text,
            translated,
            language: form.language.name.to_string(),
            language_code: form.language.code.to_string(),
        }))
    }
    .instrument(span)
    .await
}

// ── Download ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub extracted: String,
    pub translated: String,
    pub language: String,
}

/// POST /api/download - the result as a `translation_{language}.txt` attachment.
pub async fn download(Json(req): Json<DownloadRequest>) -> Result<Response, ApiError> {
    let language = find_language(&req.language).ok_or(ApiError::UnknownLanguage(req.language.clone()))?;
    let body = report::download_body(&req.extracted, &req.translated, &language);
    let disposition = format!("attachment; filename=\"{}\"", report::download_file_name(&language));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
