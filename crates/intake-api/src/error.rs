//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. `HttpAppError`
//! wraps `AppError` (orphan rule: `IntoResponse` cannot be implemented for a
//! type from `intake-core` directly) and renders the public response
//! contract: `{success:false, error:<message>}` with the variant's status.
//! Downstream causes are logged server-side and never sent to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use intake_core::{AppError, LogLevel};
use serde::Serialize;

use intake_services::{FileStoreError, MailError, SheetError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Wrapper type for AppError to implement IntoResponse.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<FileStoreError> for HttpAppError {
    fn from(err: FileStoreError) -> Self {
        HttpAppError(AppError::FileStore(err.to_string()))
    }
}

impl From<SheetError> for HttpAppError {
    fn from(err: SheetError) -> Self {
        HttpAppError(AppError::Spreadsheet(err.to_string()))
    }
}

impl From<MailError> for HttpAppError {
    fn from(err: MailError) -> Self {
        HttpAppError(AppError::Mail(err.to_string()))
    }
}

impl From<std::io::Error> for HttpAppError {
    fn from(err: std::io::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let details = error.detailed_message();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %details, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %details, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %details, error_type = error_type, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        log_error(app_error);

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(ErrorResponse {
            success: false,
            error: app_error.client_message(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_error_becomes_generic_server_error() {
        let err: HttpAppError = FileStoreError::Api {
            status: 403,
            body: "insufficient permissions".to_string(),
        }
        .into();
        assert_eq!(err.0.http_status_code(), 500);
        assert_eq!(err.0.client_message(), "Server error");
    }

    #[test]
    fn sheet_and_mail_errors_become_generic_server_errors() {
        let sheet: HttpAppError = SheetError::Auth("no token".to_string()).into();
        let mail: HttpAppError = MailError::Transport("relay down".to_string()).into();
        assert_eq!(sheet.0.http_status_code(), 500);
        assert_eq!(mail.0.http_status_code(), 500);
        assert_eq!(sheet.0.client_message(), "Server error");
        assert_eq!(mail.0.client_message(), "Server error");
    }

    #[test]
    fn error_response_serializes_the_contract_shape() {
        let body = ErrorResponse {
            success: false,
            error: "Missing required fields".to_string(),
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["success"], serde_json::json!(false));
        assert_eq!(json["error"], serde_json::json!("Missing required fields"));
    }
}
