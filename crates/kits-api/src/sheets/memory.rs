use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::{SheetRange, SheetsBackend, SheetsError};

#[derive(Debug, Clone, Default)]
struct MemoryTab {
    title: String,
    /// Row-major cells, index 0 is spreadsheet row 1.
    cells: Vec<Vec<String>>,
}

/// Remote call counters, one per backend operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_tabs: u64,
    pub add_tab: u64,
    pub write: u64,
    pub read: u64,
}

impl CallCounts {
    pub fn total(&self) -> u64 {
        self.list_tabs + self.add_tab + self.write + self.read
    }
}

/// In-process spreadsheet that mimics the Sheets value API closely enough
/// for the kit pipeline: trailing blanks are trimmed on read, duplicate tab
/// titles are rejected like Google does.
#[derive(Default)]
pub struct MemorySheets {
    spreadsheet_id: String,
    tabs: Mutex<Vec<MemoryTab>>,
    failure: Option<String>,
    list_calls: AtomicU64,
    add_calls: AtomicU64,
    write_calls: AtomicU64,
    read_calls: AtomicU64,
}

impl MemorySheets {
    pub fn new(spreadsheet_id: &str) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.to_string(),
            ..Self::default()
        }
    }

    /// Every call fails with a 503 carrying `message`.
    pub fn failing(spreadsheet_id: &str, message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(spreadsheet_id)
        }
    }

    /// Seeds a tab; `rows[0]` lands on spreadsheet row 1.
    pub async fn insert_tab(&self, title: &str, rows: Vec<Vec<String>>) {
        self.tabs.lock().await.push(MemoryTab {
            title: title.to_string(),
            cells: rows,
        });
    }

    pub async fn tab_rows(&self, title: &str) -> Option<Vec<Vec<String>>> {
        self.tabs
            .lock()
            .await
            .iter()
            .find(|t| t.title == title)
            .map(|t| t.cells.clone())
    }

    pub async fn tab_count(&self) -> usize {
        self.tabs.lock().await.len()
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            list_tabs: self.list_calls.load(Ordering::Relaxed),
            add_tab: self.add_calls.load(Ordering::Relaxed),
            write: self.write_calls.load(Ordering::Relaxed),
            read: self.read_calls.load(Ordering::Relaxed),
        }
    }

    fn check_failure(&self) -> Result<(), SheetsError> {
        match &self.failure {
            Some(message) => Err(SheetsError::Api {
                status: 503,
                body: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn unknown_range(range: &SheetRange) -> SheetsError {
        SheetsError::Api {
            status: 400,
            body: format!("Unable to parse range: {}", range.a1()),
        }
    }
}

#[async_trait]
impl SheetsBackend for MemorySheets {
    fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    async fn list_tab_titles(&self) -> Result<Vec<String>, SheetsError> {
        self.list_calls.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;
        Ok(self.tabs.lock().await.iter().map(|t| t.title.clone()).collect())
    }

    async fn add_tab(&self, title: &str) -> Result<(), SheetsError> {
        self.add_calls.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;

        let mut tabs = self.tabs.lock().await;
        if tabs.iter().any(|t| t.title == title) {
            return Err(SheetsError::Api {
                status: 400,
                body: format!(
                    "Invalid requests[0].addSheet: A sheet with the name \"{}\" already exists. Please enter another name.",
                    title
                ),
            });
        }
        tabs.push(MemoryTab {
            title: title.to_string(),
            cells: Vec::new(),
        });
        Ok(())
    }

    async fn write_rows(&self, range: &SheetRange, rows: Vec<Vec<String>>) -> Result<(), SheetsError> {
        self.write_calls.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;

        let mut tabs = self.tabs.lock().await;
        let tab = tabs
            .iter_mut()
            .find(|t| t.title == range.tab)
            .ok_or_else(|| Self::unknown_range(range))?;

        for (offset, values) in rows.into_iter().enumerate() {
            let row_idx = (range.first_row as usize - 1) + offset;
            if tab.cells.len() <= row_idx {
                tab.cells.resize(row_idx + 1, Vec::new());
            }
            let row = &mut tab.cells[row_idx];
            for (col_offset, value) in values.into_iter().enumerate() {
                let col_idx = range.first_column + col_offset;
                if row.len() <= col_idx {
                    row.resize(col_idx + 1, String::new());
                }
                row[col_idx] = value;
            }
        }
        Ok(())
    }

    async fn read_rows(&self, range: &SheetRange) -> Result<Vec<Vec<String>>, SheetsError> {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;

        let tabs = self.tabs.lock().await;
        let tab = tabs
            .iter()
            .find(|t| t.title == range.tab)
            .ok_or_else(|| Self::unknown_range(range))?;

        let start = range.first_row as usize - 1;
        let end = range
            .last_row
            .map(|r| r as usize)
            .unwrap_or(tab.cells.len())
            .min(tab.cells.len());

        let mut rows: Vec<Vec<String>> = tab
            .cells
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|row| {
                let mut cells: Vec<String> = row
                    .iter()
                    .skip(range.first_column)
                    .take(range.column_count())
                    .cloned()
                    .collect();
                while cells.last().is_some_and(|c| c.is_empty()) {
                    cells.pop();
                }
                cells
            })
            .collect();

        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }
}
