use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;

use crate::auth::ServiceAccountKey;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub sheets: SheetsConfig,
    pub tenancy: TenancyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// Full service account JSON document
    pub service_account_key: String,
    pub api_base_url: String,
    pub timeout_seconds: u64,
}

// The service account key never reaches logs.
impl fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("service_account_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TenancyConfig {
    pub kits_key_case: KeyCase,
    pub admin_key_case: KeyCase,
}

/// How a route turns an email into a tab title.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyCase {
    Lowercase,
    Preserve,
}

impl KeyCase {
    pub fn apply(self, email: &str) -> String {
        match self {
            KeyCase::Lowercase => email.to_lowercase(),
            KeyCase::Preserve => email.to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let builder = Self::defaults()?
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option(
                "sheets.spreadsheet_id",
                std::env::var("GOOGLE_SHEETS_SPREADSHEET_ID").ok(),
            )?
            .set_override_option(
                "sheets.service_account_key",
                std::env::var("GOOGLE_SERVICE_ACCOUNT_KEY").ok(),
            )?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Builder pre-filled with every default, so callers only layer overrides.
    pub fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("sheets.spreadsheet_id", "")?
            .set_default("sheets.service_account_key", "")?
            .set_default("sheets.api_base_url", "https://sheets.googleapis.com")?
            .set_default("sheets.timeout_seconds", 30)?
            .set_default("tenancy.kits_key_case", "lowercase")?
            .set_default("tenancy.admin_key_case", "preserve")?;
        Ok(builder)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sheets.spreadsheet_id.trim().is_empty() {
            anyhow::bail!("GOOGLE_SHEETS_SPREADSHEET_ID is missing");
        }
        if self.sheets.service_account_key.trim().is_empty() {
            anyhow::bail!("GOOGLE_SERVICE_ACCOUNT_KEY is missing");
        }
        self.service_account_key()?;
        Ok(())
    }

    pub fn service_account_key(&self) -> Result<ServiceAccountKey> {
        ServiceAccountKey::from_json(&self.sheets.service_account_key)
            .context("GOOGLE_SERVICE_ACCOUNT_KEY is not a valid service account JSON document")
    }
}
