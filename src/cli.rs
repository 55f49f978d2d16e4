//! CLI argument parsing for the delivery-ledger workflow.
//!
//! The CLI is intentionally thin: each command wires reads and writes through
//! the core modules without embedding policy, so the same logic could back a
//! different surface.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for the delivery-ledger workflow.
#[derive(Parser, Debug)]
#[command(
    name = "entrega",
    version,
    about = "Bulk delivery-ledger entry for spreadsheet-backed document tracking",
    after_help = "Commands:\n  init                     Write a default config file\n  workers                  Find workers by id or name substring\n  lookup <CODE>...         Show catalog metadata for document codes\n  filter                   List document codes by ECO and discipline\n  next                     Show the next ledger item number and row\n  commit                   Append one ledger row per selected code\n\nExamples:\n  entrega workers --name soto\n  entrega lookup D-100 D-101\n  entrega filter --eco ECO-25 --discipline CIVIL\n  entrega commit --worker-id 123 --codes \"D-100,D-101\" --folder F-12\n  entrega commit --worker-name soto --eco ECO-25 --date 05/08/2026",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Config file overriding the built-in deployment defaults
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level workflow commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Workers(WorkersArgs),
    Lookup(LookupArgs),
    Filter(FilterArgs),
    Next,
    Commit(CommitArgs),
}

/// Init command inputs for bootstrapping a config file.
#[derive(Parser, Debug)]
#[command(about = "Write a default config file")]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Worker search inputs.
#[derive(Parser, Debug)]
#[command(about = "Find workers by id or name substring")]
pub struct WorkersArgs {
    /// Exact worker id (CC correlativo asignado)
    #[arg(long, value_name = "ID", conflicts_with = "name")]
    pub id: Option<String>,

    /// Case-insensitive name substring
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

/// Catalog lookup inputs.
#[derive(Parser, Debug)]
#[command(about = "Show catalog metadata for document codes")]
pub struct LookupArgs {
    /// Document codes to look up
    #[arg(value_name = "CODE", required = true)]
    pub codes: Vec<String>,
}

/// Catalog filter inputs. With no filters, lists the available values.
#[derive(Parser, Debug)]
#[command(about = "List document codes by ECO and discipline")]
pub struct FilterArgs {
    /// Change-order id to match (repeatable)
    #[arg(long, value_name = "ECO")]
    pub eco: Vec<String>,

    /// Discipline to match (repeatable)
    #[arg(long, value_name = "NAME")]
    pub discipline: Vec<String>,
}

/// Commit command inputs: worker selection, code selection, and the shared
/// row fields.
#[derive(Parser, Debug)]
#[command(about = "Append one ledger row per selected document code")]
pub struct CommitArgs {
    /// Worker id (CC correlativo asignado)
    #[arg(long, value_name = "ID", conflicts_with = "worker_name")]
    pub worker_id: Option<String>,

    /// Case-insensitive worker name substring; must resolve to one worker
    #[arg(long, value_name = "NAME")]
    pub worker_name: Option<String>,

    /// Comma/newline separated document codes (repeatable)
    #[arg(long, value_name = "CODES")]
    pub codes: Vec<String>,

    /// One document code (repeatable)
    #[arg(long, value_name = "CODE")]
    pub code: Vec<String>,

    /// Add every catalog code under this change order (repeatable)
    #[arg(long, value_name = "ECO")]
    pub eco: Vec<String>,

    /// Add every catalog code under this discipline (repeatable)
    #[arg(long, value_name = "NAME")]
    pub discipline: Vec<String>,

    /// Folder reference written with each row
    #[arg(long, value_name = "NAME")]
    pub folder: Option<String>,

    /// Quantity written with each row
    #[arg(long, value_name = "N", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub quantity: u32,

    /// Delivery date; defaults to today
    #[arg(long, value_name = "DD/MM/YYYY")]
    pub date: Option<String>,

    /// Remarks written with each row
    #[arg(long, value_name = "TEXT")]
    pub remarks: Option<String>,
}
