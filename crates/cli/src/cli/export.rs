use std::path::PathBuf;

use clap::{Args, ValueEnum};
use client_archive::transfer::ExportFormat;

use crate::config::StoreConfig;

use super::{open_repository, write_output};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum Format {
    /// Pretty-printed JSON array
    Json,
    /// CSV with a header row
    Csv,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => Self::Json,
            Format::Csv => Self::Csv,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct ExportArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Destination file; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
}

pub(crate) fn run(args: &ExportArgs, store: &StoreConfig) -> Result<(), String> {
    let repository = open_repository(store)?;

    let mut text = repository
        .export(args.format.into())
        .map_err(|error| format!("Export failed: {error}"))?;

    if args.output.is_none() {
        text.push('\n');
    }

    write_output(args.output.as_deref(), text.as_bytes())
}
