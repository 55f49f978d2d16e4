//! Document catalog lookups against the log sheet.
//!
//! A delivered code is enriched from the first log row whose deliverable
//! number matches it. Missing rows are not an error: the ledger still gets a
//! row, just with blank catalog fields, and the caller is told which codes
//! went unmatched.

use serde::{Deserialize, Serialize};

use crate::table::{cell, Table, TableError};

/// Where the log sheet keeps its header and the columns we read.
///
/// The change-order and document-type cells have no stable header upstream,
/// so they are addressed by position; the rest go by column name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogLayout {
    /// 1-based row of the header inside the log sheet.
    pub header_row: u32,
    pub lookup_column: String,
    /// 0-based cell index of the change-order (ECO) id within a log row.
    pub change_order_index: usize,
    /// 0-based cell index of the document type within a log row.
    pub doc_type_index: usize,
    pub description_column: String,
    pub discipline_column: String,
    pub eco_column: String,
    /// Checked in order; the first non-empty cell wins.
    pub revision_columns: Vec<String>,
}

impl Default for CatalogLayout {
    fn default() -> Self {
        Self {
            header_row: 16,
            lookup_column: "N° ENTREGABLE SQM".to_string(),
            change_order_index: 3,
            doc_type_index: 5,
            description_column: "DESCRIPCIÓN DEL DOCUMENTO".to_string(),
            discipline_column: "DISCIPLINA".to_string(),
            eco_column: "ECO".to_string(),
            revision_columns: vec!["REV.".to_string(), "REV".to_string()],
        }
    }
}

/// Catalog fields copied into a ledger row. All-empty when the code was not
/// found in the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub change_order: String,
    pub doc_type: String,
    pub description: String,
    pub discipline: String,
    pub revision: String,
}

/// Find the first log row for `code` (trim + case-insensitive).
///
/// `Ok(None)` means the code is simply not in the log. Only a missing lookup
/// column is an error.
pub fn lookup(
    table: &Table,
    layout: &CatalogLayout,
    code: &str,
) -> Result<Option<DocumentMetadata>, TableError> {
    let lookup_idx = table.require_column(&layout.lookup_column)?;
    let needle = code.trim().to_lowercase();
    for row in table.rows() {
        if cell(row, lookup_idx).to_lowercase() != needle {
            continue;
        }
        let revision = layout
            .revision_columns
            .iter()
            .map(|name| table.get(row, name))
            .find(|value| !value.is_empty())
            .unwrap_or_default();
        return Ok(Some(DocumentMetadata {
            change_order: cell(row, layout.change_order_index).to_string(),
            doc_type: cell(row, layout.doc_type_index).to_string(),
            description: table.get(row, &layout.description_column).to_string(),
            discipline: table.get(row, &layout.discipline_column).to_string(),
            revision: revision.to_string(),
        }));
    }
    Ok(None)
}

/// Deliverable codes whose ECO and discipline match the given filters.
///
/// Empty filter lists match everything on that dimension. Filter values and
/// sheet cells are compared trimmed and uppercased; the returned codes are
/// unique and keep log order.
pub fn filter_codes(
    table: &Table,
    layout: &CatalogLayout,
    ecos: &[String],
    disciplines: &[String],
) -> Result<Vec<String>, TableError> {
    let code_idx = table.require_column(&layout.lookup_column)?;
    let eco_idx = table.require_column(&layout.eco_column)?;
    let discipline_idx = table.require_column(&layout.discipline_column)?;
    let ecos: Vec<String> = ecos.iter().map(|value| facet(value)).collect();
    let disciplines: Vec<String> = disciplines.iter().map(|value| facet(value)).collect();
    let mut codes = Vec::new();
    for row in table.rows() {
        if !ecos.is_empty() && !ecos.contains(&facet(cell(row, eco_idx))) {
            continue;
        }
        if !disciplines.is_empty() && !disciplines.contains(&facet(cell(row, discipline_idx))) {
            continue;
        }
        let code = cell(row, code_idx);
        if !code.is_empty() && !codes.iter().any(|seen| seen == code) {
            codes.push(code.to_string());
        }
    }
    Ok(codes)
}

/// Sorted unique facet values of a column (trimmed, uppercased, blanks
/// dropped). Backs the ECO and discipline listings.
pub fn distinct_values(table: &Table, column: &str) -> Result<Vec<String>, TableError> {
    let idx = table.require_column(column)?;
    let mut values: Vec<String> = table
        .rows()
        .iter()
        .map(|row| facet(cell(row, idx)))
        .filter(|value| !value.is_empty())
        .collect();
    values.sort();
    values.dedup();
    Ok(values)
}

fn facet(value: &str) -> String {
    value.trim().to_uppercase()
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

    fn layout() -> CatalogLayout {
        CatalogLayout {
            header_row: 1,
            change_order_index: 1,
            doc_type_index: 2,
            ..CatalogLayout::default()
        }
    }

    fn log() -> Table {
        table(&[
            &[
                "N° ENTREGABLE SQM",
                "H1",
                "H2",
                "ECO",
                "DISCIPLINA",
                "DESCRIPCIÓN DEL DOCUMENTO",
                "REV.",
                "REV",
            ],
            &["D-100", "ECO-7", "PLANO", "ECO-7", "CIVIL", "Fundaciones", "", "B"],
            &["D-200", "ECO-7", "INFORME", "eco-7", "ELÉCTRICA", "Canalizado", "C", "A"],
            &["D-200", "ECO-9", "PLANO", "ECO-9", "CIVIL", "Duplicado", "D", ""],
        ])
    }

    #[test]
    fn lookup_is_trim_and_case_insensitive() {
        let log = log();
        let direct = lookup(&log, &layout(), "D-100").unwrap().unwrap();
        let sloppy = lookup(&log, &layout(), "  d-100  ").unwrap().unwrap();
        assert_eq!(direct, sloppy);
        assert_eq!(direct.change_order, "ECO-7");
        assert_eq!(direct.doc_type, "PLANO");
        assert_eq!(direct.description, "Fundaciones");
        assert_eq!(direct.discipline, "CIVIL");
    }

    #[test]
    fn first_matching_row_wins() {
        let meta = lookup(&log(), &layout(), "D-200").unwrap().unwrap();
        assert_eq!(meta.description, "Canalizado");
    }

    #[test]
    fn revision_prefers_the_first_non_empty_column() {
        let log = log();
        // REV. is blank for D-100, so REV supplies the value
        let fallback = lookup(&log, &layout(), "D-100").unwrap().unwrap();
        assert_eq!(fallback.revision, "B");
        let primary = lookup(&log, &layout(), "D-200").unwrap().unwrap();
        assert_eq!(primary.revision, "C");
    }

    #[test]
    fn unknown_code_is_not_an_error() {
        assert!(lookup(&log(), &layout(), "D-999").unwrap().is_none());
    }

    #[test]
    fn missing_lookup_column_is_an_error() {
        let bare = table(&[&["ECO", "DISCIPLINA"]]);
        let err = lookup(&bare, &layout(), "D-1").unwrap_err();
        assert!(matches!(err, TableError::MissingColumn { .. }));
    }

    #[test]
    fn filter_crosses_eco_and_discipline() {
        let codes = filter_codes(
            &log(),
            &layout(),
            &["eco-7 ".to_string()],
            &["CIVIL".to_string()],
        )
        .unwrap();
        assert_eq!(codes, ["D-100"]);
    }

    #[test]
    fn filter_deduplicates_codes_in_log_order() {
        let codes = filter_codes(&log(), &layout(), &[], &[]).unwrap();
        assert_eq!(codes, ["D-100", "D-200"]);
    }

    #[test]
    fn distinct_values_are_sorted_and_normalized() {
        let ecos = distinct_values(&log(), "ECO").unwrap();
        assert_eq!(ecos, ["ECO-7", "ECO-9"]);
    }
}
