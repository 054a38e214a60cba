use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use super::schema::*;

const INACTIVE_TOKENS: [&str; 4] = ["non", "no", "0", "false"];

/// Active flag, derived once from the free-text `Active` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KitStatus {
    Active,
    Inactive,
}

impl KitStatus {
    /// Inactive only for an explicit "non"/"no"/"0"/"false"; blank means active.
    pub fn from_flag(raw: &str) -> Self {
        let flag = raw.trim().to_lowercase();
        if INACTIVE_TOKENS.contains(&flag.as_str()) {
            KitStatus::Inactive
        } else {
            KitStatus::Active
        }
    }

    pub fn is_active(self) -> bool {
        self == KitStatus::Active
    }
}

impl Serialize for KitStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_active())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KitConfig {
    pub nombre_pages_livret: String,
    pub type_livret: String,
    pub type_impression_couverture: String,
    pub type_impression_corps: String,
    pub papier_couverture: String,
    pub papier_corps: String,
    pub format_ferme_livret: String,
    pub pochette: String,
    pub mise_en_pochette: String,
    pub patron_m2: String,
    pub impression_patron: String,
}

/// Typed kit as served by `/kits`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KitRecord {
    pub kit_id: String,
    #[serde(rename = "name")]
    pub kit_name: String,
    pub image_url: String,
    pub default_qty_livret: f64,
    pub default_qty_pochette: f64,
    pub default_qty_patron: f64,

    // Filled by the pricing integration, never computed here
    pub price_livret: f64,
    pub price_pochette: f64,
    pub price_patron: f64,

    pub active: KitStatus,
    pub config: KitConfig,
    pub pjm_options: Option<Value>,
}

/// Raw projection served by `/admin/kits`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminKitRow {
    pub row_index: u32,
    pub sheet_name: String,
    pub kit_id: String,
    pub kit_name: String,
    pub image_url: String,
    pub default_qty_livret: String,
    pub default_qty_pochette: String,
    pub default_qty_patron: String,
    pub nombre_pages_livret: String,
    pub type_livret: String,
    pub type_impression_couv: String,
    pub type_impression_corps: String,
    pub papier_couverture: String,
    pub papier_corps: String,
    pub format_ferme_livret: String,
    pub pochette: String,
    pub mise_en_pochette: String,
    pub patron_m2: String,
    pub impression_patron: String,
    pub active_raw: String,
    pub pjm_options_json: String,
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

fn owned(row: &[String], index: usize) -> String {
    cell(row, index).to_string()
}

/// Sheet numbers may use a decimal comma. Like a lenient float parse, the
/// longest leading decimal literal wins ("12 pcs" -> 12); anything else is 0.
pub fn parse_number_from_sheet(value: Option<&str>) -> f64 {
    let Some(raw) = value else {
        return 0.0;
    };
    let normalized = raw.trim().replacen(',', ".", 1);

    leading_decimal(&normalized)
        .and_then(|literal| literal.parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

fn leading_decimal(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| -> usize {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = if matches!(bytes.first(), Some(b'+' | b'-')) { 1 } else { 0 };
    let int_end = digits_from(end);
    let mut digit_count = int_end - end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        digit_count += frac_end - (end + 1);
        end = frac_end;
    }
    if digit_count == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    Some(&s[..end])
}

fn decode_options(raw: &str, kit_id: &str, row_number: u32) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                kit_id = kit_id,
                row = row_number,
                "Invalid PJMOptionsJSON, keeping kit without options: {}",
                e
            );
            None
        }
    }
}

/// Maps one data row to a typed record. `row_number` is the 1-based sheet row.
pub fn normalize(row: &[String], row_number: u32) -> KitRecord {
    let kit_id = owned(row, KIT_ID);
    let pjm_options = decode_options(cell(row, PJM_OPTIONS_JSON), &kit_id, row_number);

    KitRecord {
        kit_name: owned(row, KIT_NAME),
        image_url: owned(row, IMAGE_URL),
        default_qty_livret: parse_number_from_sheet(row.get(DEFAULT_QTY_LIVRET).map(String::as_str)),
        default_qty_pochette: parse_number_from_sheet(row.get(DEFAULT_QTY_POCHETTE).map(String::as_str)),
        default_qty_patron: parse_number_from_sheet(row.get(DEFAULT_QTY_PATRON).map(String::as_str)),
        price_livret: 0.0,
        price_pochette: 0.0,
        price_patron: 0.0,
        active: KitStatus::from_flag(cell(row, ACTIVE)),
        config: KitConfig {
            nombre_pages_livret: owned(row, NOMBRE_PAGES_LIVRET),
            type_livret: owned(row, TYPE_LIVRET),
            type_impression_couverture: owned(row, TYPE_IMPRESSION_COUVERTURE),
            type_impression_corps: owned(row, TYPE_IMPRESSION_CORPS),
            papier_couverture: owned(row, PAPIER_COUVERTURE),
            papier_corps: owned(row, PAPIER_CORPS),
            format_ferme_livret: owned(row, FORMAT_FERME_LIVRET),
            pochette: owned(row, POCHETTE),
            mise_en_pochette: owned(row, MISE_EN_POCHETTE),
            patron_m2: owned(row, PATRON_M2),
            impression_patron: owned(row, IMPRESSION_PATRON),
        },
        pjm_options,
        kit_id,
    }
}

pub fn admin_row(row: &[String], row_index: u32, sheet_name: &str) -> AdminKitRow {
    AdminKitRow {
        row_index,
        sheet_name: sheet_name.to_string(),
        kit_id: owned(row, KIT_ID),
        kit_name: owned(row, KIT_NAME),
        image_url: owned(row, IMAGE_URL),
        default_qty_livret: owned(row, DEFAULT_QTY_LIVRET),
        default_qty_pochette: owned(row, DEFAULT_QTY_POCHETTE),
        default_qty_patron: owned(row, DEFAULT_QTY_PATRON),
        nombre_pages_livret: owned(row, NOMBRE_PAGES_LIVRET),
        type_livret: owned(row, TYPE_LIVRET),
        type_impression_couv: owned(row, TYPE_IMPRESSION_COUVERTURE),
        type_impression_corps: owned(row, TYPE_IMPRESSION_CORPS),
        papier_couverture: owned(row, PAPIER_COUVERTURE),
        papier_corps: owned(row, PAPIER_CORPS),
        format_ferme_livret: owned(row, FORMAT_FERME_LIVRET),
        pochette: owned(row, POCHETTE),
        mise_en_pochette: owned(row, MISE_EN_POCHETTE),
        patron_m2: owned(row, PATRON_M2),
        impression_patron: owned(row, IMPRESSION_PATRON),
        active_raw: owned(row, ACTIVE),
        pjm_options_json: owned(row, PJM_OPTIONS_JSON),
    }
}
