use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod commit;
mod config;
mod credentials;
mod directory;
mod ledger;
mod session;
mod sheets;
mod table;

use cli::{Command, CommitArgs, FilterArgs, InitArgs, LookupArgs, RootArgs, WorkersArgs};
use commit::{CommitReport, EntryDetails, DATE_FORMAT};
use config::AppConfig;
use credentials::Credentials;
use directory::{WorkerDirectory, WorkerRecord};
use session::Session;
use sheets::http::SheetsClient;
use sheets::{TableRef, TableService};
use table::Table;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = RootArgs::parse();
    if let Command::Init(init) = &args.command {
        return run_init(init, args.config.as_deref());
    }
    let config = config::load_config(args.config.as_deref())?;
    let credentials = Credentials::from_env()?;
    let client = SheetsClient::new(&credentials);
    match &args.command {
        Command::Init(_) => unreachable!("handled above"),
        Command::Workers(workers) => run_workers(&client, &config, workers),
        Command::Lookup(lookup) => run_lookup(&client, &config, lookup),
        Command::Filter(filter) => run_filter(&client, &config, filter),
        Command::Next => run_next(&client, &config),
        Command::Commit(commit) => run_commit(&client, &config, commit),
    }
}

fn run_init(args: &InitArgs, explicit: Option<&Path>) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config::default_config_path()?,
    };
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config::write_config(&path, &config::default_config())?;
    println!("wrote {}", path.display());
    Ok(())
}

fn run_workers(client: &SheetsClient, config: &AppConfig, args: &WorkersArgs) -> Result<()> {
    let directory = load_directory(client, config)?;
    if let Some(id) = &args.id {
        let worker = directory
            .by_id(id)
            .ok_or_else(|| anyhow!("worker id {id:?} not found"))?;
        print_worker(worker);
        return Ok(());
    }
    if let Some(query) = &args.name {
        let needle = query.trim().to_lowercase();
        let matches: Vec<&String> = directory
            .names()
            .iter()
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect();
        if matches.is_empty() {
            bail!("no worker name contains {query:?}");
        }
        for name in matches {
            if let Some(worker) = directory.records().iter().find(|record| &record.name == name) {
                print_worker(worker);
            }
        }
        return Ok(());
    }
    for worker in directory.records() {
        print_worker(worker);
    }
    Ok(())
}

fn run_lookup(client: &SheetsClient, config: &AppConfig, args: &LookupArgs) -> Result<()> {
    let table = load_catalog(client, config)?;
    for code in &args.codes {
        match catalog::lookup(&table, &config.catalog_layout, code)? {
            Some(meta) => {
                println!("{code}:");
                println!("  eco:         {}", meta.change_order);
                println!("  type:        {}", meta.doc_type);
                println!("  description: {}", meta.description);
                println!("  discipline:  {}", meta.discipline);
                println!("  revision:    {}", meta.revision);
            }
            None => println!("{code}: no catalog match"),
        }
    }
    Ok(())
}

fn run_filter(client: &SheetsClient, config: &AppConfig, args: &FilterArgs) -> Result<()> {
    let table = load_catalog(client, config)?;
    let layout = &config.catalog_layout;
    if args.eco.is_empty() && args.discipline.is_empty() {
        println!("{}:", layout.eco_column);
        for value in catalog::distinct_values(&table, &layout.eco_column)? {
            println!("  {value}");
        }
        println!("{}:", layout.discipline_column);
        for value in catalog::distinct_values(&table, &layout.discipline_column)? {
            println!("  {value}");
        }
        return Ok(());
    }
    let codes = catalog::filter_codes(&table, layout, &args.eco, &args.discipline)?;
    if codes.is_empty() {
        eprintln!("no codes matched the filter");
        return Ok(());
    }
    for code in codes {
        println!("{code}");
    }
    Ok(())
}

fn run_next(client: &SheetsClient, config: &AppConfig) -> Result<()> {
    let grid = client.read_grid(&config.ledger)?;
    let (item, row) = ledger::next_item_and_row(&grid, &config.ledger_layout);
    println!("next item {item} at row {row}");
    Ok(())
}

fn run_commit(client: &SheetsClient, config: &AppConfig, args: &CommitArgs) -> Result<()> {
    let mut session = Session::default();
    for chunk in &args.codes {
        session.add_manual(chunk);
    }
    for code in &args.code {
        session.add_single(code);
    }
    if !args.eco.is_empty() || !args.discipline.is_empty() {
        let table = load_catalog(client, config)?;
        let codes = catalog::filter_codes(&table, &config.catalog_layout, &args.eco, &args.discipline)?;
        session.add_filtered(codes);
    }
    if session.is_empty() {
        bail!("no document codes selected; use --codes, --code, or --eco/--discipline");
    }

    let directory = load_directory(client, config)?;
    let worker = resolve_worker(&directory, args.worker_id.as_deref(), args.worker_name.as_deref())?;
    let date = match &args.date {
        Some(text) => NaiveDate::parse_from_str(text, DATE_FORMAT)
            .with_context(|| format!("parse date {text:?} as DD/MM/YYYY"))?,
        None => Local::now().date_naive(),
    };
    let details = EntryDetails {
        folder: args.folder.clone().unwrap_or_default(),
        quantity: args.quantity,
        date,
        remarks: args.remarks.clone().unwrap_or_default(),
    };
    tracing::info!(worker = %worker.id, codes = session.len(), "committing selection");

    let report = commit::commit(client, config, &worker, &session, &details)?;
    print_report(&report);
    if !report.fully_succeeded() {
        let total = report.appended.len() + report.failures.len();
        bail!("{} of {total} code(s) failed to append", report.failures.len());
    }
    session.clear();
    Ok(())
}

fn resolve_worker(
    directory: &WorkerDirectory,
    id: Option<&str>,
    name: Option<&str>,
) -> Result<WorkerRecord> {
    if let Some(id) = id {
        return directory
            .by_id(id)
            .cloned()
            .ok_or_else(|| anyhow!("worker id {id:?} not found"));
    }
    let Some(query) = name else {
        bail!("select a worker with --worker-id or --worker-name");
    };
    let needle = query.trim().to_lowercase();
    let matches: Vec<&WorkerRecord> = directory
        .records()
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .collect();
    match matches.as_slice() {
        [] => bail!("no worker name contains {query:?}"),
        [only] => Ok((*only).clone()),
        _ => {
            let exact: Vec<&&WorkerRecord> = matches
                .iter()
                .filter(|record| record.name.to_lowercase() == needle)
                .collect();
            if let [only] = exact.as_slice() {
                return Ok((**only).clone());
            }
            let names: Vec<&str> = matches.iter().map(|record| record.name.as_str()).collect();
            bail!("worker name {query:?} is ambiguous: {}", names.join(", "));
        }
    }
}

fn load_directory(client: &SheetsClient, config: &AppConfig) -> Result<WorkerDirectory> {
    let table = load_table(client, &config.directory, config.directory_layout.header_row)?;
    Ok(WorkerDirectory::from_table(&table, &config.directory_layout))
}

fn load_catalog(client: &SheetsClient, config: &AppConfig) -> Result<Table> {
    load_table(client, &config.catalog, config.catalog_layout.header_row)
}

fn load_table(client: &SheetsClient, table: &TableRef, header_row: u32) -> Result<Table> {
    let grid = client.read_grid(table)?;
    Ok(Table::from_grid(grid, header_row)?)
}

fn print_worker(worker: &WorkerRecord) {
    println!("{:<12} {:<40} {}", worker.id, worker.name, worker.role);
}

fn print_report(report: &CommitReport) {
    println!("appended {} row(s)", report.appended.len());
    for entry in &report.appended {
        println!("  {}  item {} row {}", entry.code, entry.item, entry.row);
    }
    if !report.unmatched.is_empty() {
        println!(
            "no catalog match (blank fields written): {}",
            report.unmatched.join(", ")
        );
    }
    if !report.failures.is_empty() {
        println!("failed:");
        for failure in &report.failures {
            println!("  {}  {}", failure.code, failure.error);
        }
    }
}
