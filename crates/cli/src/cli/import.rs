use std::{fs, path::PathBuf};

use clap::Args;
use client_archive::transfer::ImportFormat;

use crate::config::StoreConfig;

use super::{emit, open_repository};

#[derive(Debug, Args)]
pub(crate) struct ImportArgs {
    /// File to import; the format follows the .json or .csv extension
    file: PathBuf,
}

pub(crate) fn run(args: &ImportArgs, store: &StoreConfig) -> Result<(), String> {
    let format = ImportFormat::from_path(&args.file).map_err(|error| error.to_string())?;

    let text = fs::read_to_string(&args.file)
        .map_err(|error| format!("failed to read {}: {error}", args.file.display()))?;

    let mut repository = open_repository(store)?;

    let summary = repository
        .import(format, &text)
        .map_err(|error| format!("Import failed: {error}"))?;

    emit(&format!("imported: {}", summary.imported))?;
    if summary.rejected > 0 {
        emit(&format!("skipped: {}", summary.rejected))?;
    }
    emit(&format!("total: {}", summary.total))
}
