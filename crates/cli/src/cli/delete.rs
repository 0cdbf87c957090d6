use clap::Args;
use client_archive::records::RecordId;

use crate::config::StoreConfig;

use super::{emit, open_repository};

#[derive(Debug, Args)]
pub(crate) struct DeleteArgs {
    /// Record id
    id: String,
}

pub(crate) fn run(args: &DeleteArgs, store: &StoreConfig) -> Result<(), String> {
    let mut repository = open_repository(store)?;
    let id = RecordId::from(args.id.as_str());

    let removed = repository
        .remove(&id)
        .map_err(|error| format!("failed to delete client: {error}"))?;

    match removed {
        Some(record) => emit(&format!("deleted: {} ({})", record.id, record.name)),
        None => Err(format!("no client with id {id}")),
    }
}
