pub mod settings;

pub use settings::{KeyCase, ServerConfig, Settings, SheetsConfig, TenancyConfig};
