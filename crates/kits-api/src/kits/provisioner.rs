use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::schema::{header_range, header_row, is_header};
use crate::sheets::{SheetsBackend, SheetsError};

type TenantLocks = DashMap<String, Arc<Mutex<()>>>;

/// Holds the per-tenant lock for one `ensure` call. On drop the map entry is
/// removed unless another caller is still holding or waiting on it.
struct TenantLease<'a> {
    locks: &'a TenantLocks,
    tenant_key: &'a str,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TenantLease<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(self.tenant_key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Makes sure a tenant tab exists and carries the header row.
///
/// Calls for the same tenant key are serialized in-process. A tab created
/// concurrently elsewhere is detected through Google's "already exists"
/// answer and treated as present.
pub struct TenantSheetProvisioner {
    sheets: Arc<dyn SheetsBackend>,
    locks: TenantLocks,
}

impl TenantSheetProvisioner {
    pub fn new(sheets: Arc<dyn SheetsBackend>) -> Self {
        Self {
            sheets,
            locks: DashMap::new(),
        }
    }

    async fn lease<'a>(&'a self, tenant_key: &'a str) -> TenantLease<'a> {
        let lock = Arc::clone(
            self.locks
                .entry(tenant_key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );

        TenantLease {
            locks: &self.locks,
            tenant_key,
            guard: Some(lock.lock_owned().await),
        }
    }

    pub async fn ensure(&self, tenant_key: &str) -> Result<(), SheetsError> {
        let _lease = self.lease(tenant_key).await;

        let titles = self.sheets.list_tab_titles().await?;
        if titles.iter().any(|title| title == tenant_key) {
            return self.verify_header(tenant_key).await;
        }

        info!("[KITS] Creating tab \"{}\"", tenant_key);
        match self.sheets.add_tab(tenant_key).await {
            Ok(()) => {}
            Err(e) if e.is_already_exists() => {
                warn!("Tab \"{}\" was created concurrently, reusing it", tenant_key);
                return self.verify_header(tenant_key).await;
            }
            Err(e) => return Err(e),
        }

        self.write_header(tenant_key).await
    }

    async fn write_header(&self, tenant_key: &str) -> Result<(), SheetsError> {
        self.sheets
            .write_rows(&header_range(tenant_key), vec![header_row()])
            .await?;
        info!("[KITS] Header initialized for \"{}\"", tenant_key);
        Ok(())
    }

    /// Repairs a tab left without a header by an interrupted provisioning.
    /// A header that differs from the schema is reported, never overwritten.
    async fn verify_header(&self, tenant_key: &str) -> Result<(), SheetsError> {
        let rows = self.sheets.read_rows(&header_range(tenant_key)).await?;

        match rows.first() {
            Some(row) if is_header(row) => {
                debug!("Tab \"{}\" already provisioned", tenant_key);
                Ok(())
            }
            Some(row) if row.iter().any(|cell| !cell.trim().is_empty()) => {
                warn!(
                    "Tab \"{}\" row 1 does not match the kit header, leaving it untouched",
                    tenant_key
                );
                Ok(())
            }
            _ => {
                warn!("Tab \"{}\" has no header row, repairing", tenant_key);
                self.write_header(tenant_key).await
            }
        }
    }
}
