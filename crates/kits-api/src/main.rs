use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use kits_api::auth::ServiceAccountAuth;
use kits_api::build_router;
use kits_api::config::Settings;
use kits_api::kits::KitService;
use kits_api::sheets::GoogleSheetsClient;
use kits_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,kits_api=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("🚀 Starting kits API...");

    // Missing spreadsheet id or credentials abort here
    let settings = Settings::load()?;
    info!("✅ Configuration loaded");

    let timeout = Duration::from_secs(settings.sheets.timeout_seconds);
    let auth = Arc::new(ServiceAccountAuth::new(settings.service_account_key()?, timeout)?);
    let sheets = Arc::new(GoogleSheetsClient::new(&settings.sheets, auth)?);
    info!(
        "✅ Google Sheets client ready for spreadsheet {}",
        settings.sheets.spreadsheet_id
    );

    let addr = SocketAddr::from((
        settings
            .server
            .host
            .parse::<std::net::IpAddr>()
            .with_context(|| format!("Invalid server.host {}", settings.server.host))?,
        settings.server.port,
    ));

    let state = Arc::new(AppState::new(settings, KitService::new(sheets)));
    let app = build_router(state);

    info!("🎯 kits-api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
