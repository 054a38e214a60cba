use crate::kits::{AdminKitRow, KitRecord};
use crate::state::AppState;
use crate::utils::error::ApiError;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct KitsQuery {
    pub email: Option<String>,
}

impl KitsQuery {
    fn required_email(&self, missing: &str) -> Result<String, ApiError> {
        let email = self.email.as_deref().unwrap_or("").trim();
        if email.is_empty() {
            return Err(ApiError::InvalidRequest(missing.to_string()));
        }
        Ok(email.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitsResponse<T> {
    pub email: String,
    pub sheet_name: String,
    pub count: usize,
    pub kits: Vec<T>,
}

impl<T> KitsResponse<T> {
    fn new(email: String, sheet_name: String, kits: Vec<T>) -> Self {
        Self {
            email,
            sheet_name,
            count: kits.len(),
            kits,
        }
    }
}

/// GET /kits?email=...
pub async fn list_kits_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<KitsQuery>, QueryRejection>,
) -> Result<Json<KitsResponse<KitRecord>>, ApiError> {
    let Query(query) = query?;
    let email = query.required_email("Missing email query parameter")?;
    let sheet_name = state.settings.tenancy.kits_key_case.apply(&email);

    let kits = state
        .kit_service
        .active_kits(&sheet_name)
        .await
        .map_err(ApiError::integration("Error reading Google Sheet", &sheet_name))?;

    info!("Served {} active kits for \"{}\"", kits.len(), sheet_name);
    Ok(Json(KitsResponse::new(email, sheet_name, kits)))
}

/// GET /admin/kits?email=...
pub async fn admin_kits_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<KitsQuery>, QueryRejection>,
) -> Result<Json<KitsResponse<AdminKitRow>>, ApiError> {
    let Query(query) = query?;
    let email = query.required_email("Missing email")?;
    let sheet_name = state.settings.tenancy.admin_key_case.apply(&email);

    let kits = state
        .kit_service
        .admin_kits(&sheet_name)
        .await
        .map_err(ApiError::integration("Internal error while reading kits", &sheet_name))?;

    info!("[ADMIN] Served {} kits for \"{}\"", kits.len(), sheet_name);
    Ok(Json(KitsResponse::new(email, sheet_name, kits)))
}
