//! Screenshot OCR endpoint.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    extract::multipart::MultipartRejection,
    routing::post,
    Json, Router,
};
use lens_core::{LensError, OcrResult};

use crate::{AppError, AppState, ErrorBody};

const FILE_FIELD: &str = "file";

/// Multipart form accepted by `/ocr/extract`.
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct OcrUpload {
    /// Screenshot in any common image format
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

pub fn ocr_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/ocr/extract", post(ocr_extract))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Run OCR on an uploaded screenshot.
#[utoipa::path(
    post,
    path = "/ocr/extract",
    request_body(content = OcrUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Recognized text", body = OcrResult),
        (status = 400, description = "Invalid image payload", body = ErrorBody),
        (status = 503, description = "OCR dependencies not ready", body = ErrorBody)
    ),
    tag = "OCR"
)]
pub async fn ocr_extract(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<OcrResult>, AppError> {
    let mut multipart = multipart?;
    let payload = read_file_field(&mut multipart).await?;
    tracing::debug!("OCR upload of {} bytes", payload.len());

    let result = state.ocr.extract_text(payload).await?;
    Ok(Json(result))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return Ok(field.bytes().await?.to_vec());
        }
    }
    Err(LensError::InvalidInput(format!("Missing multipart field {:?}", FILE_FIELD)).into())
}
