use clap::Args;
use client_archive::records::RecordFields;
use rust_decimal::Decimal;

use crate::config::StoreConfig;

use super::{emit, open_repository};

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Client name
    #[arg(long)]
    name: String,

    /// Client phone number
    #[arg(long)]
    phone: String,

    /// Price paid; zero when omitted
    #[arg(long)]
    pub(crate) price: Option<Decimal>,

    /// Vehicle make and model
    #[arg(long, default_value = "")]
    car: String,

    /// Registration plate, e.g. 231-D-12345
    #[arg(long, default_value = "")]
    reg: String,
}

pub(crate) fn run(args: AddArgs, store: &StoreConfig) -> Result<(), String> {
    let mut repository = open_repository(store)?;

    let record = repository
        .add(&RecordFields {
            name: args.name,
            phone: args.phone,
            price: args.price,
            car: args.car,
            reg: args.reg,
        })
        .map_err(|error| format!("failed to add client: {error}"))?;

    emit(&format!("id: {}", record.id))?;
    emit(&format!("created_at: {}", record.created_at))?;
    emit(&format!("total: {}", repository.len()))
}
