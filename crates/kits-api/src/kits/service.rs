use std::sync::Arc;
use tracing::debug;

use super::normalizer::{admin_row, normalize, AdminKitRow, KitRecord};
use super::provisioner::TenantSheetProvisioner;
use super::schema::{data_range, FIRST_DATA_ROW};
use crate::sheets::{SheetsBackend, SheetsError};

/// Provision -> read -> normalize, shared by the kit routes.
pub struct KitService {
    sheets: Arc<dyn SheetsBackend>,
    provisioner: TenantSheetProvisioner,
}

impl KitService {
    pub fn new(sheets: Arc<dyn SheetsBackend>) -> Self {
        Self {
            provisioner: TenantSheetProvisioner::new(sheets.clone()),
            sheets,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        self.sheets.spreadsheet_id()
    }

    /// Non-empty data rows paired with their 1-based sheet row number.
    async fn data_rows(&self, sheet_name: &str) -> Result<Vec<(u32, Vec<String>)>, SheetsError> {
        self.provisioner.ensure(sheet_name).await?;

        let rows = self.sheets.read_rows(&data_range(sheet_name)).await?;
        debug!("Read {} rows from \"{}\"", rows.len(), sheet_name);

        Ok(rows
            .into_iter()
            .zip(FIRST_DATA_ROW..)
            .filter(|(row, _)| !row.is_empty())
            .map(|(row, number)| (number, row))
            .collect())
    }

    /// Active kits only, in sheet order.
    pub async fn active_kits(&self, sheet_name: &str) -> Result<Vec<KitRecord>, SheetsError> {
        Ok(self
            .data_rows(sheet_name)
            .await?
            .iter()
            .map(|(number, row)| normalize(row, *number))
            .filter(|kit| kit.active.is_active())
            .collect())
    }

    /// Every kit as raw strings, with its sheet row for traceability.
    pub async fn admin_kits(&self, sheet_name: &str) -> Result<Vec<AdminKitRow>, SheetsError> {
        Ok(self
            .data_rows(sheet_name)
            .await?
            .iter()
            .map(|(number, row)| admin_row(row, *number, sheet_name))
            .collect())
    }
}
