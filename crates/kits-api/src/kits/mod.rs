//! Per-tenant kit catalog: tab provisioning and row normalization.

pub mod normalizer;
pub mod provisioner;
pub mod schema;
pub mod service;

pub use normalizer::{AdminKitRow, KitConfig, KitRecord, KitStatus};
pub use provisioner::TenantSheetProvisioner;
pub use service::KitService;
