//! Error types module
//!
//! All failures in the submission pipeline are unified under `AppError`.
//! Each variant knows its HTTP status, its client-facing message, and the
//! level at which the underlying cause should be logged. Downstream failures
//! (file store, spreadsheet, mail) all collapse to a generic "Server error"
//! for clients; the detail stays in the server logs.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like duplicate submissions
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate submission within the resubmit window")]
    RateLimited,

    #[error("File store error: {0}")]
    FileStore(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl AppError {
    /// HTTP status code for the public response.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::MissingFields => 400,
            AppError::InvalidInput(_) => 400,
            AppError::RateLimited => 429,
            AppError::FileStore(_)
            | AppError::Spreadsheet(_)
            | AppError::Mail(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => 500,
        }
    }

    /// Client-facing message. Downstream causes are never exposed here;
    /// they collapse to the generic "Server error" of the response contract.
    pub fn client_message(&self) -> String {
        match self {
            AppError::MissingFields => "Missing required fields".to_string(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::RateLimited => "Please wait 30 seconds before resubmitting".to_string(),
            AppError::FileStore(_)
            | AppError::Spreadsheet(_)
            | AppError::Mail(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => "Server error".to_string(),
        }
    }

    /// Log level for the server-side record of this error.
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::MissingFields | AppError::InvalidInput(_) => LogLevel::Debug,
            AppError::RateLimited => LogLevel::Warn,
            AppError::FileStore(_)
            | AppError::Spreadsheet(_)
            | AppError::Mail(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => LogLevel::Error,
        }
    }

    /// Error type name for structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::MissingFields => "MissingFields",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::RateLimited => "RateLimited",
            AppError::FileStore(_) => "FileStore",
            AppError::Spreadsheet(_) => "Spreadsheet",
            AppError::Mail(_) => "Mail",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Detailed message including the source chain, for server-side logs only.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_maps_to_400_with_contract_message() {
        let err = AppError::MissingFields;
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message(), "Missing required fields");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn rate_limited_maps_to_429_with_contract_message() {
        let err = AppError::RateLimited;
        assert_eq!(err.http_status_code(), 429);
        assert_eq!(
            err.client_message(),
            "Please wait 30 seconds before resubmitting"
        );
    }

    #[test]
    fn downstream_errors_collapse_to_generic_server_error() {
        for err in [
            AppError::FileStore("drive 500".to_string()),
            AppError::Spreadsheet("append failed".to_string()),
            AppError::Mail("relay refused".to_string()),
            AppError::Internal("boom".to_string()),
        ] {
            assert_eq!(err.http_status_code(), 500);
            assert_eq!(err.client_message(), "Server error");
            assert_eq!(err.log_level(), LogLevel::Error);
        }
    }

    #[test]
    fn detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("token exchange refused");
        let err = AppError::InternalWithSource {
            message: "upload failed".to_string(),
            source,
        };
        let details = err.detailed_message();
        assert!(details.contains("Caused by: token exchange refused"));
    }
}
