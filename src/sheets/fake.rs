//! In-memory [`TableService`] for tests.
//!
//! Grids are keyed by sheet title; writes grow the grid as needed, format
//! copies are only recorded. A single write can be armed to fail so commit
//! tests can exercise per-code error isolation.

use anyhow::{anyhow, Result};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::sheets::{TableRef, TableService};

#[derive(Default)]
pub struct FakeTables {
    grids: RefCell<BTreeMap<String, Vec<Vec<String>>>>,
    format_copies: RefCell<BTreeMap<String, Vec<(u32, u32)>>>,
    write_count: Cell<usize>,
    fail_on_write: Cell<Option<usize>>,
}

impl FakeTables {
    pub fn table_ref(sheet_title: &str) -> TableRef {
        TableRef {
            spreadsheet_id: format!("fake-{}", sheet_title.to_lowercase()),
            sheet_title: sheet_title.to_string(),
            sheet_gid: 0,
        }
    }

    pub fn seed(&self, table: &TableRef, grid: Vec<Vec<String>>) {
        self.grids
            .borrow_mut()
            .insert(table.sheet_title.clone(), grid);
    }

    /// Make the n-th `write_row` call (1-based) fail once.
    pub fn fail_on_write(&self, nth: usize) {
        self.fail_on_write.set(Some(nth));
    }

    pub fn cell(&self, table: &TableRef, row: u32, col: u32) -> String {
        self.grids
            .borrow()
            .get(&table.sheet_title)
            .and_then(|grid| grid.get(row as usize - 1))
            .and_then(|cells| cells.get(col as usize - 1))
            .cloned()
            .unwrap_or_default()
    }

    pub fn row(&self, table: &TableRef, row: u32) -> Vec<String> {
        self.grids
            .borrow()
            .get(&table.sheet_title)
            .and_then(|grid| grid.get(row as usize - 1))
            .cloned()
            .unwrap_or_default()
    }

    pub fn format_copies(&self, table: &TableRef) -> Vec<(u32, u32)> {
        self.format_copies
            .borrow()
            .get(&table.sheet_title)
            .cloned()
            .unwrap_or_default()
    }
}

impl TableService for FakeTables {
    fn read_grid(&self, table: &TableRef) -> Result<Vec<Vec<String>>> {
        Ok(self
            .grids
            .borrow()
            .get(&table.sheet_title)
            .cloned()
            .unwrap_or_default())
    }

    fn write_row(&self, table: &TableRef, row: u32, values: &[String]) -> Result<()> {
        let count = self.write_count.get() + 1;
        self.write_count.set(count);
        if self.fail_on_write.get() == Some(count) {
            return Err(anyhow!("injected write failure"));
        }
        let mut grids = self.grids.borrow_mut();
        let grid = grids.entry(table.sheet_title.clone()).or_default();
        if grid.len() < row as usize {
            grid.resize(row as usize, Vec::new());
        }
        let cells = &mut grid[row as usize - 1];
        if cells.len() < values.len() {
            cells.resize(values.len(), String::new());
        }
        cells[..values.len()].clone_from_slice(values);
        Ok(())
    }

    fn copy_row_format(
        &self,
        table: &TableRef,
        source_row: u32,
        dest_row: u32,
        _columns: u32,
    ) -> Result<()> {
        self.format_copies
            .borrow_mut()
            .entry(table.sheet_title.clone())
            .or_default()
            .push((source_row, dest_row));
        Ok(())
    }
}
