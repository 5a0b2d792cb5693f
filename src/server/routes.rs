//! Route handlers.

use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};

use crate::batch::validate_batch;
use crate::ingest::read_records;
use crate::verdict::ValidationReport;

use super::error::AppError;
use super::state::AppState;

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({"message": "CSV Validation API is running."}))
}

/// `GET /schema`: the schema document exactly as loaded.
pub async fn get_schema(State(state): State<AppState>) -> Json<Value> {
    Json(state.schema.document().clone())
}

/// `POST /validate`: validates the CSV in the multipart field `file`.
pub async fn validate_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ValidationReport>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadUpload(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !filename.ends_with(".csv") {
            return Err(AppError::UnsupportedFileType);
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadUpload(e.to_string()))?;
        tracing::info!(filename = %filename, bytes = data.len(), "validating upload");

        let schema = state.schema.clone();
        let report = tokio::task::spawn_blocking(move || {
            let records = read_records(&data)?;
            Ok::<_, crate::ingest::IngestError>(ValidationReport::new(
                filename,
                validate_batch(&schema, &records),
            ))
        })
        .await
        .map_err(|e| AppError::Processing(e.to_string()))?
        .map_err(|e| AppError::Processing(e.to_string()))?;

        return Ok(Json(report));
    }

    Err(AppError::MissingFile)
}
