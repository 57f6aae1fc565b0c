//! HTTP-facing errors and the status codes admin failures map to.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use at_core::AppError;
use thiserror::Error;

/// Request-level failures that never reach the admin flow.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("malformed form data: {0}")]
    Multipart(String),

    #[error("field {0} is not valid UTF-8")]
    Encoding(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Multipart(_) | ApiError::Encoding(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

/// Status for an admin page re-rendered after a failed mutation.
pub fn status_of(err: &AppError) -> StatusCode {
    match err {
        AppError::Busy(_) => StatusCode::CONFLICT,
        AppError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        AppError::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Read(_) | AppError::Upload(_) | AppError::UrlResolution(_) | AppError::Write(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}
