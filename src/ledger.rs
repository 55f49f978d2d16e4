//! Ledger row allocation and formatted appends.
//!
//! The delivered-documents sheet is append-only: a new entry always lands one
//! past the last populated row, numbered one past its item. Formatting is
//! cloned from an earlier entry row so the ledger keeps its look without a
//! styling engine.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::sheets::{TableRef, TableService};
use crate::table::cell;

/// Width of a ledger entry, leading blank marker included.
pub const LEDGER_COLUMNS: usize = 17;

/// Fixed geometry of the delivered-documents sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerLayout {
    /// 1-based first data row; everything above is banner and header.
    pub start_row: u32,
    /// 1-based column holding the item number.
    pub item_column: u32,
    /// Columns written (and format-copied) per entry.
    pub column_span: u32,
    /// The format source sits this many rows above the target. The ledger
    /// interleaves a spacer row between entries, hence 2 rather than 1.
    pub format_source_offset: u32,
}

impl Default for LedgerLayout {
    fn default() -> Self {
        Self {
            start_row: 29,
            item_column: 2,
            column_span: LEDGER_COLUMNS as u32,
            format_source_offset: 2,
        }
    }
}

/// One delivered-documents entry in sheet column order.
///
/// `to_cells` prepends the blank marker column, so the struct itself carries
/// only the meaningful fields.
#[derive(Debug, Clone)]
pub struct LedgerRow {
    pub item: u32,
    pub worker_id: String,
    pub folder: String,
    pub contract: String,
    pub change_order: String,
    pub doc_type: String,
    pub code: String,
    pub description: String,
    pub revision: String,
    pub discipline: String,
    pub quantity: u32,
    pub worker_name: String,
    pub worker_role: String,
    /// Already rendered as `DD/MM/YYYY`.
    pub date: String,
    pub remarks: String,
    pub delivered_by: String,
}

impl LedgerRow {
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            String::new(),
            self.item.to_string(),
            self.worker_id.clone(),
            self.folder.clone(),
            self.contract.clone(),
            self.change_order.clone(),
            self.doc_type.clone(),
            self.code.clone(),
            self.description.clone(),
            self.revision.clone(),
            self.discipline.clone(),
            self.quantity.to_string(),
            self.worker_name.clone(),
            self.worker_role.clone(),
            self.date.clone(),
            self.remarks.clone(),
            self.delivered_by.clone(),
        ]
    }
}

/// Next item number and target row for a fresh read of the ledger grid.
///
/// Scans from `start_row` for the last row with a non-empty item cell. An
/// empty ledger yields `(1, start_row)`; a malformed item number counts as 0
/// rather than failing the whole append.
pub fn next_item_and_row(grid: &[Vec<String>], layout: &LedgerLayout) -> (u32, u32) {
    let item_idx = layout.item_column.saturating_sub(1) as usize;
    let mut last_row: Option<usize> = None;
    for (idx, row) in grid.iter().enumerate().skip(layout.start_row as usize - 1) {
        if !cell(row, item_idx).trim().is_empty() {
            last_row = Some(idx + 1);
        }
    }
    let Some(last_row) = last_row else {
        return (1, layout.start_row);
    };
    let item = cell(&grid[last_row - 1], item_idx)
        .trim()
        .parse::<u32>()
        .unwrap_or(0);
    (item + 1, last_row as u32 + 1)
}

/// Write one entry at `target_row` and clone formatting onto it.
///
/// The format copy is skipped while the ledger is still too short to have a
/// source row at or past `start_row`. Both calls are independent remote
/// mutations; an error from either bubbles to the caller untouched.
pub fn append(
    service: &dyn TableService,
    table: &TableRef,
    layout: &LedgerLayout,
    row: &LedgerRow,
    target_row: u32,
) -> Result<()> {
    service.write_row(table, target_row, &row.to_cells())?;
    let source_row = i64::from(target_row) - i64::from(layout.format_source_offset);
    if source_row >= i64::from(layout.start_row) {
        service.copy_row_format(table, source_row as u32, target_row, layout.column_span)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::fake::FakeTables;

    fn layout() -> LedgerLayout {
        LedgerLayout {
            start_row: 4,
            ..LedgerLayout::default()
        }
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn row(item: u32) -> LedgerRow {
        LedgerRow {
            item,
            worker_id: "123".to_string(),
            folder: "F-1".to_string(),
            contract: "CONTRACT".to_string(),
            change_order: String::new(),
            doc_type: String::new(),
            code: "D-1".to_string(),
            description: String::new(),
            revision: String::new(),
            discipline: String::new(),
            quantity: 1,
            worker_name: "ANA SOTO".to_string(),
            worker_role: "SUPERVISOR".to_string(),
            date: "05/08/2026".to_string(),
            remarks: String::new(),
            delivered_by: "MARÍA REYES".to_string(),
        }
    }

    #[test]
    fn empty_ledger_starts_at_the_start_row() {
        assert_eq!(next_item_and_row(&[], &layout()), (1, 4));
        // populated rows above start_row do not count
        let grid = grid(&[&["", "99"], &["", "100"], &["", ""]]);
        assert_eq!(next_item_and_row(&grid, &layout()), (1, 4));
    }

    #[test]
    fn next_item_follows_the_last_populated_row() {
        let grid = grid(&[&[], &[], &[], &["", "6"], &["", "7"], &["", ""]]);
        assert_eq!(next_item_and_row(&grid, &layout()), (8, 6));
    }

    #[test]
    fn trailing_blank_item_cells_are_ignored() {
        let grid = grid(&[&[], &[], &[], &["", "3"], &["", "  "], &["x", ""]]);
        assert_eq!(next_item_and_row(&grid, &layout()), (4, 5));
    }

    #[test]
    fn malformed_item_counts_as_zero() {
        let grid = grid(&[&[], &[], &[], &["", "N/A"]]);
        assert_eq!(next_item_and_row(&grid, &layout()), (1, 5));
    }

    #[test]
    fn entry_spans_all_ledger_columns() {
        let cells = row(1).to_cells();
        assert_eq!(cells.len(), LEDGER_COLUMNS);
        assert_eq!(cells[0], "");
        assert_eq!(cells[1], "1");
        assert_eq!(cells[16], "MARÍA REYES");
    }

    #[test]
    fn append_near_the_start_skips_the_format_copy() {
        let tables = FakeTables::default();
        let ledger = FakeTables::table_ref("LEDGER");
        append(&tables, &ledger, &layout(), &row(1), 4).unwrap();
        append(&tables, &ledger, &layout(), &row(2), 5).unwrap();
        assert!(tables.format_copies(&ledger).is_empty());
        assert_eq!(tables.cell(&ledger, 4, 2), "1");
        assert_eq!(tables.cell(&ledger, 5, 2), "2");
    }

    #[test]
    fn append_copies_format_from_two_rows_back() {
        let tables = FakeTables::default();
        let ledger = FakeTables::table_ref("LEDGER");
        append(&tables, &ledger, &layout(), &row(3), 6).unwrap();
        assert_eq!(tables.format_copies(&ledger), [(4, 6)]);
    }
}
