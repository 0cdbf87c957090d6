use std::path::PathBuf;

use clap::Args;
use client_archive::{print::Renderer, records::RecordId};
use jiff::tz::TimeZone;

use crate::config::StoreConfig;

use super::{open_repository, write_output};

#[derive(Debug, Args)]
pub(crate) struct PrintArgs {
    /// Record id; every record is printed when omitted
    id: Option<String>,

    /// Destination HTML file; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Currency used to display prices
    #[arg(long, default_value = "EUR")]
    currency: String,
}

pub(crate) fn run(args: &PrintArgs, store: &StoreConfig) -> Result<(), String> {
    let repository = open_repository(store)?;
    let renderer = Renderer::for_currency_code(&args.currency, TimeZone::system())
        .ok_or_else(|| format!("unknown currency {}", args.currency))?;

    let html = match args.id.as_deref() {
        Some(id) => {
            let id = RecordId::from(id);
            let record = repository
                .get(&id)
                .ok_or_else(|| format!("no client with id {id}"))?;

            renderer.client_card(record)
        }
        None if repository.is_empty() => return Err("No clients to print".to_string()),
        None => renderer.client_report(repository.records()),
    };

    write_output(args.output.as_deref(), html.as_bytes())
}
