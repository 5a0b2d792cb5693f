//! HTTP error type.
//!
//! Every failure becomes a status code plus a `{"detail": "..."}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// The upload's file name does not end in `.csv` (400).
    #[error("Only CSV files are supported")]
    UnsupportedFileType,

    /// The form has no `file` field (400).
    #[error("No file uploaded: expected a multipart field named 'file'")]
    MissingFile,

    /// The multipart body could not be read (400).
    #[error("Invalid upload: {0}")]
    BadUpload(String),

    /// Decoding or validating the upload failed (500).
    #[error("Error processing file: {0}")]
    Processing(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedFileType | Self::MissingFile | Self::BadUpload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "upload processing failed");
        } else {
            tracing::warn!(error = %self, "rejected upload");
        }

        let body = ErrorBody {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
