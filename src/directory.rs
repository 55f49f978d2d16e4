//! Worker directory snapshot keyed by the assigned correlative id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::table::Table;

/// Where the personnel sheet keeps its header and key columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryLayout {
    /// 1-based row of the header inside the personnel sheet.
    pub header_row: u32,
    pub id_column: String,
    pub name_column: String,
    pub role_column: String,
}

impl Default for DirectoryLayout {
    fn default() -> Self {
        Self {
            header_row: 6,
            id_column: "CC CORRELATIVO ASIGNADO".to_string(),
            name_column: "RESPONSABLE".to_string(),
            role_column: "CARGO".to_string(),
        }
    }
}

/// One personnel row, keyed by id, with the raw cells kept by column name.
#[derive(Debug, Clone)]
pub struct WorkerRecord {
    pub id: String,
    pub name: String,
    pub role: String,
    pub attrs: BTreeMap<String, String>,
}

/// Immutable per-session index of the personnel sheet.
///
/// Blank or duplicate ids overwrite earlier entries (last-write-wins); that
/// mirrors how the upstream sheet is maintained and is not an error here.
pub struct WorkerDirectory {
    by_id: BTreeMap<String, WorkerRecord>,
    names: Vec<String>,
    records: Vec<WorkerRecord>,
}

impl WorkerDirectory {
    pub fn from_table(table: &Table, layout: &DirectoryLayout) -> Self {
        let mut by_id = BTreeMap::new();
        let mut names = Vec::new();
        let mut records = Vec::new();
        for row in table.rows() {
            if row.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            let attrs: BTreeMap<String, String> = table
                .header()
                .iter()
                .map(|name| (name.clone(), table.get(row, name).to_string()))
                .collect();
            let record = WorkerRecord {
                id: table.get(row, &layout.id_column).to_string(),
                name: table.get(row, &layout.name_column).to_string(),
                role: table.get(row, &layout.role_column).to_string(),
                attrs,
            };
            by_id.insert(record.id.clone(), record.clone());
            names.push(record.name.clone());
            records.push(record);
        }
        Self {
            by_id,
            names,
            records,
        }
    }

    /// Exact-id lookup; the input is trimmed before matching.
    pub fn by_id(&self, id: &str) -> Option<&WorkerRecord> {
        self.by_id.get(id.trim())
    }

    /// Worker names in sheet order, one per non-blank row.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn records(&self) -> &[WorkerRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        let grid = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        Table::from_grid(grid, 1).unwrap()
    }

    fn layout() -> DirectoryLayout {
        DirectoryLayout {
            header_row: 1,
            ..DirectoryLayout::default()
        }
    }

    #[test]
    fn blank_rows_are_skipped() {
        let table = table(&[
            &["CC CORRELATIVO ASIGNADO", "RESPONSABLE", "CARGO"],
            &["", "  ", ""],
            &["123", "ANA SOTO", "SUPERVISOR"],
        ]);
        let dir = WorkerDirectory::from_table(&table, &layout());
        assert_eq!(dir.records().len(), 1);
        assert_eq!(dir.names(), ["ANA SOTO"]);
    }

    #[test]
    fn duplicate_ids_are_last_write_wins() {
        let table = table(&[
            &["CC CORRELATIVO ASIGNADO", "RESPONSABLE", "CARGO"],
            &["123", "ANA SOTO", "SUPERVISOR"],
            &["123", "PEDRO RUIZ", "CAPATAZ"],
        ]);
        let dir = WorkerDirectory::from_table(&table, &layout());
        assert_eq!(dir.by_id("123").unwrap().name, "PEDRO RUIZ");
        // both rows still appear in sheet order
        assert_eq!(dir.records().len(), 2);
    }

    #[test]
    fn id_lookup_trims_the_input() {
        let table = table(&[
            &["CC CORRELATIVO ASIGNADO", "RESPONSABLE", "CARGO"],
            &["123", "ANA SOTO", "SUPERVISOR"],
        ]);
        let dir = WorkerDirectory::from_table(&table, &layout());
        let record = dir.by_id("  123  ").unwrap();
        assert_eq!(record.role, "SUPERVISOR");
        assert_eq!(record.attrs.get("RESPONSABLE").unwrap(), "ANA SOTO");
    }
}
