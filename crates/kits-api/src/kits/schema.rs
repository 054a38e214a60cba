//! Fixed column layout of a tenant tab. Columns are positional: the cell at
//! index `i` always belongs to `HEADER[i]`.

use crate::sheets::SheetRange;

pub const HEADER: [&str; 19] = [
    "KitId",
    "KitName",
    "ImageURL",
    "DefaultQtyLivret",
    "DefaultQtyPochette",
    "DefaultQtyPatron",
    "NombrePagesLivret",
    "TypeLivret",
    "TypeImpressionCouverture",
    "TypeImpressionCorps",
    "PapierCouverture",
    "PapierCorps",
    "FormatFermeLivret",
    "Pochette",
    "MiseEnPochette",
    "PatronM2",
    "ImpressionPatron",
    "Active",
    "PJMOptionsJSON",
];

pub const COLUMN_COUNT: usize = HEADER.len();
pub const HEADER_ROW: u32 = 1;
pub const FIRST_DATA_ROW: u32 = 2;

pub const KIT_ID: usize = 0;
pub const KIT_NAME: usize = 1;
pub const IMAGE_URL: usize = 2;
pub const DEFAULT_QTY_LIVRET: usize = 3;
pub const DEFAULT_QTY_POCHETTE: usize = 4;
pub const DEFAULT_QTY_PATRON: usize = 5;
pub const NOMBRE_PAGES_LIVRET: usize = 6;
pub const TYPE_LIVRET: usize = 7;
pub const TYPE_IMPRESSION_COUVERTURE: usize = 8;
pub const TYPE_IMPRESSION_CORPS: usize = 9;
pub const PAPIER_COUVERTURE: usize = 10;
pub const PAPIER_CORPS: usize = 11;
pub const FORMAT_FERME_LIVRET: usize = 12;
pub const POCHETTE: usize = 13;
pub const MISE_EN_POCHETTE: usize = 14;
pub const PATRON_M2: usize = 15;
pub const IMPRESSION_PATRON: usize = 16;
pub const ACTIVE: usize = 17;
pub const PJM_OPTIONS_JSON: usize = 18;

/// `'<tab>'!A1:S1`
pub fn header_range(tab: &str) -> SheetRange {
    SheetRange::rows(tab, HEADER_ROW, Some(HEADER_ROW), COLUMN_COUNT)
}

/// `'<tab>'!A2:S`
pub fn data_range(tab: &str) -> SheetRange {
    SheetRange::rows(tab, FIRST_DATA_ROW, None, COLUMN_COUNT)
}

pub fn header_row() -> Vec<String> {
    HEADER.iter().map(|h| h.to_string()).collect()
}

pub fn is_header(row: &[String]) -> bool {
    row.len() == COLUMN_COUNT && row.iter().zip(HEADER.iter()).all(|(cell, expected)| cell == expected)
}
