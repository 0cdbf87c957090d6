use clap::Args;
use client_archive::print::Renderer;
use jiff::tz::TimeZone;

use crate::config::StoreConfig;

use super::{emit, open_repository};

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Case-insensitive filter over name, phone, car, registration and price
    #[arg(long, short, default_value = "")]
    pub(crate) query: String,

    /// Currency used to display prices
    #[arg(long, default_value = "EUR")]
    currency: String,
}

pub(crate) fn run(args: &ListArgs, store: &StoreConfig) -> Result<(), String> {
    let repository = open_repository(store)?;
    let renderer = Renderer::for_currency_code(&args.currency, TimeZone::system())
        .ok_or_else(|| format!("unknown currency {}", args.currency))?;

    let records = repository.list(&args.query);

    if records.is_empty() {
        return emit("No clients");
    }

    let shown = records.len();

    emit(&renderer.records_table(records))?;
    emit(&format!("{shown} of {} clients", repository.len()))
}
