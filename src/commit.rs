//! Per-code commit pipeline with aggregate reporting.
//!
//! A commit turns each selected code into one ledger append. The catalog is
//! snapshotted once up front; the ledger is re-read before every append so
//! each row lands after the previous one. A failed append is recorded against
//! its code and the remaining codes still run; nothing is rolled back.

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::catalog::{self, DocumentMetadata};
use crate::config::AppConfig;
use crate::directory::WorkerRecord;
use crate::ledger::{self, LedgerRow};
use crate::session::Session;
use crate::sheets::TableService;
use crate::table::Table;

/// Ledger date column format.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Per-commit inputs shared by every appended row.
pub struct EntryDetails {
    pub folder: String,
    pub quantity: u32,
    pub date: NaiveDate,
    pub remarks: String,
}

#[derive(Debug)]
pub struct AppendedRow {
    pub code: String,
    pub item: u32,
    pub row: u32,
}

#[derive(Debug)]
pub struct CommitFailure {
    pub code: String,
    pub error: String,
}

/// Outcome of one commit attempt, reported in aggregate.
///
/// `unmatched` lists codes that were written with blank catalog fields; the
/// append still happened, the caller decides whether to warn.
#[derive(Debug, Default)]
pub struct CommitReport {
    pub appended: Vec<AppendedRow>,
    pub failures: Vec<CommitFailure>,
    pub unmatched: Vec<String>,
}

impl CommitReport {
    pub fn fully_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Append one ledger row per selected code.
///
/// Fails fast (before any write) when the selection is empty or the catalog
/// is unusable; individual append failures are collected in the report
/// instead of aborting the run. The session is left untouched — the caller
/// clears it only on full success.
pub fn commit(
    service: &dyn TableService,
    config: &AppConfig,
    worker: &WorkerRecord,
    session: &Session,
    details: &EntryDetails,
) -> Result<CommitReport> {
    if session.is_empty() {
        bail!("no document codes selected");
    }
    let catalog_grid = service.read_grid(&config.catalog)?;
    let catalog_table = Table::from_grid(catalog_grid, config.catalog_layout.header_row)?;
    catalog_table.require_column(&config.catalog_layout.lookup_column)?;

    let date = details.date.format(DATE_FORMAT).to_string();
    let mut report = CommitReport::default();
    for code in session.codes() {
        let metadata = match catalog::lookup(&catalog_table, &config.catalog_layout, code)? {
            Some(metadata) => metadata,
            None => {
                report.unmatched.push(code.clone());
                DocumentMetadata::default()
            }
        };
        match append_one(service, config, worker, details, &date, code, &metadata) {
            Ok(appended) => {
                tracing::info!(
                    code = %appended.code,
                    item = appended.item,
                    row = appended.row,
                    "ledger row appended"
                );
                report.appended.push(appended);
            }
            Err(err) => {
                tracing::warn!(code = %code, error = %err, "ledger append failed");
                report.failures.push(CommitFailure {
                    code: code.clone(),
                    error: format!("{err:#}"),
                });
            }
        }
    }
    Ok(report)
}

fn append_one(
    service: &dyn TableService,
    config: &AppConfig,
    worker: &WorkerRecord,
    details: &EntryDetails,
    date: &str,
    code: &str,
    metadata: &DocumentMetadata,
) -> Result<AppendedRow> {
    let grid = service.read_grid(&config.ledger)?;
    let (item, target_row) = ledger::next_item_and_row(&grid, &config.ledger_layout);
    let row = LedgerRow {
        item,
        worker_id: worker.id.clone(),
        folder: details.folder.clone(),
        contract: config.contract_name.clone(),
        change_order: metadata.change_order.clone(),
        doc_type: metadata.doc_type.clone(),
        code: code.to_string(),
        description: metadata.description.clone(),
        revision: metadata.revision.clone(),
        discipline: metadata.discipline.clone(),
        quantity: details.quantity,
        worker_name: worker.name.clone(),
        worker_role: worker.role.clone(),
        date: date.to_string(),
        remarks: details.remarks.clone(),
        delivered_by: config.delivered_by.clone(),
    };
    ledger::append(service, &config.ledger, &config.ledger_layout, &row, target_row)?;
    Ok(AppendedRow {
        code: code.to_string(),
        item,
        row: target_row,
    })
}
