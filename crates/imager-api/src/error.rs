//! Maps core failures onto HTTP responses.
//!
//! Anonymous callers on login-only routes get 401 with a Basic challenge;
//! authenticated callers touching someone else's private content get 403.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use imager_core::AppError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    App(#[from] AppError),

    /// An Authorization header was sent but did not check out.
    #[error("invalid username/password")]
    BadCredentials,
}

impl ApiError {
    fn detail(&self) -> String {
        match self {
            ApiError::BadCredentials => "Invalid username/password.".into(),
            ApiError::App(AppError::Unauthenticated(_)) => {
                "Authentication credentials were not provided.".into()
            }
            ApiError::App(AppError::Internal(_)) => "Internal server error.".into(),
            ApiError::App(err) => err.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadCredentials => StatusCode::UNAUTHORIZED,
            ApiError::App(err) => match err {
                AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppError::NotFound(..) => StatusCode::NOT_FOUND,
                AppError::Conflict(_) => StatusCode::CONFLICT,
                AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
                AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("request failed: {self}");
        }

        let mut builder = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Basic realm=\"imager\""));
        }
        builder.json(json!({ "detail": self.detail() }))
    }
}
