use clap::Args;
use client_archive::records::{RecordFields, RecordId};
use rust_decimal::Decimal;

use crate::config::StoreConfig;

use super::{emit, open_repository};

#[derive(Debug, Args)]
pub(crate) struct EditArgs {
    /// Record id
    id: String,

    /// New client name
    #[arg(long)]
    name: Option<String>,

    /// New phone number
    #[arg(long)]
    phone: Option<String>,

    /// New price
    #[arg(long)]
    price: Option<Decimal>,

    /// New vehicle
    #[arg(long)]
    car: Option<String>,

    /// New registration plate; pass an empty string to clear it
    #[arg(long)]
    reg: Option<String>,
}

pub(crate) fn run(args: EditArgs, store: &StoreConfig) -> Result<(), String> {
    let mut repository = open_repository(store)?;
    let id = RecordId::from(args.id);

    let current = repository
        .get(&id)
        .ok_or_else(|| format!("no client with id {id}"))?;

    let mut fields = RecordFields::from(current);

    if let Some(name) = args.name {
        fields.name = name;
    }
    if let Some(phone) = args.phone {
        fields.phone = phone;
    }
    if let Some(price) = args.price {
        fields.price = Some(price);
    }
    if let Some(car) = args.car {
        fields.car = car;
    }
    if let Some(reg) = args.reg {
        fields.reg = reg;
    }

    let updated = repository
        .update(&id, &fields)
        .map_err(|error| format!("failed to update client: {error}"))?
        .ok_or_else(|| format!("no client with id {id}"))?;

    if let Some(updated_at) = updated.updated_at {
        emit(&format!("updated_at: {updated_at}"))?;
    }

    emit(&format!("id: {}", updated.id))
}
