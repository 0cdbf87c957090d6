use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use clap::{Parser, Subcommand};
use client_archive::{repository::RecordRepository, store::FileSlot};

use crate::config::{LoggingConfig, StoreConfig};

mod add;
mod assets;
mod delete;
mod edit;
mod export;
mod import;
mod list;
mod print;
mod show;

/// Client Archive command line
#[derive(Debug, Parser)]
#[command(name = "client-archive", about = "Offline client record keeper", long_about = None)]
pub(crate) struct Cli {
    /// Storage settings.
    #[command(flatten)]
    pub(crate) store: StoreConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a client record
    Add(add::AddArgs),
    /// Change fields of an existing record
    Edit(edit::EditArgs),
    /// Delete a record
    Delete(delete::DeleteArgs),
    /// List records, optionally filtered
    List(list::ListArgs),
    /// Show one record as JSON
    Show(show::ShowArgs),
    /// Merge records from a .json or .csv file
    Import(import::ImportArgs),
    /// Export every record as JSON or CSV
    Export(export::ExportArgs),
    /// Render a printable HTML card or report
    Print(print::PrintArgs),
    /// Manage the offline asset cache
    Assets(assets::AssetsCommand),
}

impl Cli {
    /// Load configuration from `.env`, the environment and CLI arguments.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) fn run(self) -> Result<(), String> {
        let store = &self.store;

        match self.command {
            Commands::Add(args) => add::run(args, store),
            Commands::Edit(args) => edit::run(args, store),
            Commands::Delete(args) => delete::run(&args, store),
            Commands::List(args) => list::run(&args, store),
            Commands::Show(args) => show::run(&args, store),
            Commands::Import(args) => import::run(&args, store),
            Commands::Export(args) => export::run(&args, store),
            Commands::Print(args) => print::run(&args, store),
            Commands::Assets(command) => assets::run(command, store),
        }
    }
}

fn open_repository(store: &StoreConfig) -> Result<RecordRepository<FileSlot>, String> {
    Ok(RecordRepository::open(store.slot()?))
}

/// Write a line to stdout.
fn emit(text: &str) -> Result<(), String> {
    writeln!(io::stdout().lock(), "{text}")
        .map_err(|error| format!("failed to write output: {error}"))
}

/// Write bytes to `output`, or to stdout when no path was given.
fn write_output(output: Option<&Path>, bytes: &[u8]) -> Result<(), String> {
    match output {
        Some(path) => fs::write(path, bytes)
            .map_err(|error| format!("failed to write {}: {error}", path.display())),
        None => io::stdout()
            .lock()
            .write_all(bytes)
            .map_err(|error| format!("failed to write output: {error}")),
    }
}
