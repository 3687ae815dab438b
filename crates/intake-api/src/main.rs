use std::sync::Arc;

use intake_api::{setup, state::AppState};
use intake_core::Config;
use intake_services::{DriveClient, GoogleAuth, SheetsClient, SmtpMailer};

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    intake_api::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded and validated successfully");

    // Shared service-account auth backs both Google clients.
    let auth = GoogleAuth::from_config(&config)?;
    let file_store = Arc::new(DriveClient::new(auth.clone())?);
    let row_writer = Arc::new(SheetsClient::new(
        auth,
        config.spreadsheet_id.clone(),
        config.sheet_name.clone(),
    )?);
    let mailer = Arc::new(SmtpMailer::from_config(&config)?);

    let state = Arc::new(AppState::new(config.clone(), file_store, row_writer, mailer));
    let router = setup::build_router(&config, state)?;

    setup::start_server(&config, router).await?;

    Ok(())
}
