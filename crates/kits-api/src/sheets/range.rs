use std::fmt;

/// Rectangular block of one tab: rows are 1-based, columns 0-based.
/// `last_row = None` means open-ended (`A2:S`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub tab: String,
    pub first_row: u32,
    pub last_row: Option<u32>,
    pub first_column: usize,
    pub last_column: usize,
}

impl SheetRange {
    /// Columns `A..` spanning `column_count` columns.
    pub fn rows(tab: &str, first_row: u32, last_row: Option<u32>, column_count: usize) -> Self {
        Self {
            tab: tab.to_string(),
            first_row,
            last_row,
            first_column: 0,
            last_column: column_count.saturating_sub(1),
        }
    }

    pub fn column_count(&self) -> usize {
        self.last_column + 1 - self.first_column
    }

    pub fn a1(&self) -> String {
        let end_row = self.last_row.map(|r| r.to_string()).unwrap_or_default();
        format!(
            "{}!{}{}:{}{}",
            quote_tab(&self.tab),
            column_letter(self.first_column),
            self.first_row,
            column_letter(self.last_column),
            end_row
        )
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.a1())
    }
}

/// Tab titles are always quoted; embedded quotes are doubled.
pub fn quote_tab(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// 0 -> A, 25 -> Z, 26 -> AA
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(18), "S");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_a1_ranges() {
        let header = SheetRange::rows("client1@test.com", 1, Some(1), 19);
        assert_eq!(header.a1(), "'client1@test.com'!A1:S1");
        assert_eq!(header.column_count(), 19);

        let data = SheetRange::rows("client1@test.com", 2, None, 19);
        assert_eq!(data.a1(), "'client1@test.com'!A2:S");
    }

    #[test]
    fn test_quote_tab_escapes_quotes() {
        assert_eq!(quote_tab("o'brien@test.com"), "'o''brien@test.com'");
        let range = SheetRange::rows("o'brien@test.com", 2, None, 19);
        assert_eq!(range.to_string(), "'o''brien@test.com'!A2:S");
    }
}
