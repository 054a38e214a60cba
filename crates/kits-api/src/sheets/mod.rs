//! Spreadsheet datastore binding.
//!
//! `SheetsBackend` is the seam the kit pipeline talks to. `GoogleSheetsClient`
//! speaks the Sheets REST v4 API, `MemorySheets` keeps tabs in process.

pub mod google;
pub mod memory;
pub mod range;

use async_trait::async_trait;
use thiserror::Error;

pub use google::GoogleSheetsClient;
pub use memory::MemorySheets;
pub use range::SheetRange;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Sheets transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Sheets API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Service account auth error: {0}")]
    Auth(String),

    #[error("Unexpected Sheets response: {0}")]
    Decode(String),

    #[error("Invalid Sheets URL: {0}")]
    Url(String),
}

impl SheetsError {
    /// Google answers a duplicate `addSheet` with a 400 naming the existing tab.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, SheetsError::Api { status: 400, body } if body.contains("already exists"))
    }
}

/// Remote tabular datastore addressed by spreadsheet id and tab title.
#[async_trait]
pub trait SheetsBackend: Send + Sync {
    fn spreadsheet_id(&self) -> &str;

    async fn list_tab_titles(&self) -> Result<Vec<String>, SheetsError>;

    async fn add_tab(&self, title: &str) -> Result<(), SheetsError>;

    /// Writes `rows` starting at the top-left cell of `range` (RAW input).
    async fn write_rows(&self, range: &SheetRange, rows: Vec<Vec<String>>) -> Result<(), SheetsError>;

    /// Reads `range` row by row. Trailing empty cells and rows are omitted,
    /// so an empty row in the middle comes back as a zero-length vector.
    async fn read_rows(&self, range: &SheetRange) -> Result<Vec<Vec<String>>, SheetsError>;
}
