//! Narrow read/write interface over the remote spreadsheet service.
//!
//! Everything the tool knows about the service fits in three operations:
//! fetch a sheet as a string grid, write one row of values, and clone one
//! row's formatting onto another. The HTTP client lives in [`http`]; tests
//! run against the in-memory [`fake`] instead.

pub mod http;

#[cfg(test)]
pub mod fake;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Address of one sheet within a spreadsheet document.
///
/// `sheet_gid` is the numeric grid id the batch-update API addresses
/// formatting requests by; value reads and writes go by title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRef {
    pub spreadsheet_id: String,
    pub sheet_title: String,
    pub sheet_gid: i64,
}

/// The three remote operations the core logic is allowed to perform.
pub trait TableService {
    /// Fetch the sheet as rows of cell strings. Trailing empty cells and
    /// rows may be absent, exactly as the service reports them.
    fn read_grid(&self, table: &TableRef) -> Result<Vec<Vec<String>>>;

    /// Write `values` into `row` starting at column 1, with user-entered
    /// value semantics (numbers and dates parse as a typist's would).
    fn write_row(&self, table: &TableRef, row: u32, values: &[String]) -> Result<()>;

    /// Copy cell formatting (not values) from `source_row` to `dest_row`
    /// over the first `columns` columns.
    fn copy_row_format(
        &self,
        table: &TableRef,
        source_row: u32,
        dest_row: u32,
        columns: u32,
    ) -> Result<()>;
}

/// Spreadsheet column label for a 1-based index: 1 -> A, 27 -> AA.
pub fn column_label(col: u32) -> String {
    let mut col = col;
    let mut label = Vec::new();
    while col > 0 {
        label.push(b'A' + ((col - 1) % 26) as u8);
        col = (col - 1) / 26;
    }
    label.iter().rev().map(|byte| *byte as char).collect()
}

/// A1 range covering columns `start_col..=end_col` of one row, sheet title
/// included: `'DOC. ENTREGADOS'!A30:Q30`.
pub fn row_range(sheet_title: &str, row: u32, start_col: u32, end_col: u32) -> String {
    format!(
        "{}!{}{row}:{}{row}",
        quote_sheet_title(sheet_title),
        column_label(start_col),
        column_label(end_col)
    )
}

/// A1 reference to a whole sheet (the service returns every populated cell).
pub fn sheet_range(sheet_title: &str) -> String {
    quote_sheet_title(sheet_title)
}

fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}
