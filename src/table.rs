//! Header-relative access to a grid of spreadsheet cells.
//!
//! Remote sheets come back as ragged string grids with a header row buried at
//! a sheet-specific offset. `Table` snapshots one read: normalized header,
//! injective name-to-index map, and the data rows below the header.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors surfaced while interpreting a fetched grid as a table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table has {rows} row(s), header expected at row {header_row}")]
    InsufficientData { rows: usize, header_row: u32 },
    #[error("missing column {name:?}")]
    MissingColumn { name: String },
}

/// One read snapshot of a sheet: header plus the rows below it.
///
/// Cells are trimmed on ingest. Rows may be shorter than the header; by-name
/// lookups past the end of a row read as the empty string.
#[derive(Debug)]
pub struct Table {
    header: Vec<String>,
    index: BTreeMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Interpret a fetched grid with its header at `header_row` (1-based).
    ///
    /// Header names are trimmed, newlines collapsed to spaces, uppercased,
    /// and deduplicated with `_1`, `_2`… suffixes so the name-to-index map
    /// stays injective.
    pub fn from_grid(grid: Vec<Vec<String>>, header_row: u32) -> Result<Self, TableError> {
        if grid.len() < header_row as usize {
            return Err(TableError::InsufficientData {
                rows: grid.len(),
                header_row,
            });
        }
        let mut grid = grid;
        let rows: Vec<Vec<String>> = grid
            .split_off(header_row as usize)
            .into_iter()
            .map(|row| row.into_iter().map(|cell| cell.trim().to_string()).collect())
            .collect();
        let raw_header = grid.pop().unwrap_or_default();
        let header = dedup_names(raw_header.iter().map(|name| normalize_name(name)));
        let index = header
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        Ok(Self {
            header,
            index,
            rows,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column(name).ok_or_else(|| TableError::MissingColumn {
            name: name.to_string(),
        })
    }

    /// Cell of `row` under the named column, or `""` when the column is
    /// absent or the row is too short.
    pub fn get<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.column(name)
            .map(|idx| cell(row, idx))
            .unwrap_or_default()
    }
}

/// Positional cell access that reads past-the-end as empty.
pub fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or_default()
}

fn normalize_name(name: &str) -> String {
    name.replace('\n', " ").trim().to_uppercase()
}

fn dedup_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut out = Vec::new();
    for name in names {
        match seen.get_mut(&name) {
            Some(count) => {
                *count += 1;
                out.push(format!("{name}_{count}"));
            }
            None => {
                seen.insert(name.clone(), 0);
                out.push(name);
            }
        }
    }
    out
}
