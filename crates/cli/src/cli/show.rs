use clap::Args;
use client_archive::records::RecordId;

use crate::config::StoreConfig;

use super::{emit, open_repository};

#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    /// Record id
    id: String,
}

pub(crate) fn run(args: &ShowArgs, store: &StoreConfig) -> Result<(), String> {
    let repository = open_repository(store)?;
    let id = RecordId::from(args.id.as_str());

    let record = repository
        .get(&id)
        .ok_or_else(|| format!("no client with id {id}"))?;

    let json = serde_json::to_string_pretty(record)
        .map_err(|error| format!("failed to encode client: {error}"))?;

    emit(&json)
}
