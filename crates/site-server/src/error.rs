//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use theme_state::ThemeAdminError;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Human-readable message
    pub error: String,
}

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Caller is not the admin
    Unauthorized(String),
    /// Request rejected before any write
    BadRequest(String),
    /// Upstream or server failure
    Internal(String),
}

impl AppError {
    /// Status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Unauthorized(msg) | AppError::BadRequest(msg) | AppError::Internal(msg) => {
                msg
            }
        };

        (status, Json(ApiError { error: message })).into_response()
    }
}

impl From<ThemeAdminError> for AppError {
    fn from(err: ThemeAdminError) -> Self {
        match err {
            ThemeAdminError::Unauthorized => AppError::Unauthorized(err.to_string()),
            ThemeAdminError::InvalidPalette(_) => AppError::BadRequest(err.to_string()),
            ThemeAdminError::UpstreamWriteFailure(ref source) => {
                tracing::error!(error = %source, "Palette write failed");
                AppError::Internal(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::StoreError;

    #[test]
    fn test_admin_errors_map_to_status() {
        let cases = [
            (ThemeAdminError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ThemeAdminError::InvalidPalette("nope".into()), StatusCode::BAD_REQUEST),
            (
                ThemeAdminError::UpstreamWriteFailure(StoreError::Unavailable("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn test_invalid_palette_message_names_id() {
        let err = AppError::from(ThemeAdminError::InvalidPalette("nope".into()));
        match err {
            AppError::BadRequest(msg) => assert_eq!(msg, "Invalid palette ID: nope"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
