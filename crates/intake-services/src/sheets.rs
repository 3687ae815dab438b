//! Spreadsheet row writer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::google::GoogleAuth;

const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// Spreadsheet operation errors
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Auth failed: {0}")]
    Auth(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Spreadsheet API error: {status} - {body}")]
    Api { status: u16, body: String },
}

/// Append-one-row abstraction over the spreadsheet API.
#[async_trait]
pub trait RowWriter: Send + Sync {
    /// Append a single row of cell values to the configured sheet.
    async fn append_row(&self, values: &[String]) -> Result<(), SheetError>;

    /// Browsable URL of the spreadsheet, for notification links.
    fn sheet_url(&self) -> String;
}

/// Sheets v4 client bound to one spreadsheet and sheet name.
pub struct SheetsClient {
    http_client: reqwest::Client,
    auth: Arc<GoogleAuth>,
    spreadsheet_id: String,
    sheet_name: String,
    api_base: String,
}

impl SheetsClient {
    pub fn new(
        auth: Arc<GoogleAuth>,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Result<Self, anyhow::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http_client,
            auth,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// API base override for tests against a stub server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl RowWriter for SheetsClient {
    async fn append_row(&self, values: &[String]) -> Result<(), SheetError> {
        let range = format!("{}!A:K", self.sheet_name);
        let url = format!(
            "{}/v4/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED",
            self.api_base,
            self.spreadsheet_id,
            urlencoding::encode(&range)
        );

        let token = self
            .auth
            .token()
            .await
            .map_err(|e| SheetError::Auth(e.to_string()))?;

        let body = json!({ "values": [values] });
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SheetError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(cells = values.len(), "Appended spreadsheet row");
        Ok(())
    }

    fn sheet_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}",
            self.spreadsheet_id
        )
    }
}
