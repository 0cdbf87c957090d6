use std::path::PathBuf;

use clap::{Args, Subcommand};
use client_archive::assets::{ASSET_MANIFEST, AssetCache, AssetOrigin, DirSource};

use crate::config::StoreConfig;

use super::{emit, write_output};

#[derive(Debug, Args)]
pub(crate) struct AssetsCommand {
    #[command(subcommand)]
    command: AssetsSubcommand,
}

#[derive(Debug, Subcommand)]
enum AssetsSubcommand {
    /// Copy the application shell into the current cache version
    Install(InstallArgs),
    /// Drop every cache version except the current one
    Activate,
    /// Serve one asset cache-first, filling the cache on a miss
    Fetch(FetchArgs),
}

#[derive(Debug, Args)]
struct InstallArgs {
    /// Directory holding the built application shell
    #[arg(long)]
    from: PathBuf,
}

#[derive(Debug, Args)]
struct FetchArgs {
    /// Asset path, e.g. ./style.css
    path: String,

    /// Directory to fetch from on a cache miss
    #[arg(long)]
    from: PathBuf,

    /// Destination file; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
}

pub(crate) fn run(command: AssetsCommand, store: &StoreConfig) -> Result<(), String> {
    let cache = AssetCache::new(store.asset_root()?);

    match command.command {
        AssetsSubcommand::Install(args) => {
            let installed = cache
                .install(&ASSET_MANIFEST, &DirSource::new(args.from))
                .map_err(|error| format!("failed to install assets: {error}"))?;

            emit(&format!("installed: {installed} assets into {}", cache.version()))
        }
        AssetsSubcommand::Activate => {
            let purged = cache
                .activate()
                .map_err(|error| format!("failed to activate assets: {error}"))?;

            for version in &purged {
                emit(&format!("purged: {version}"))?;
            }

            emit(&format!("active: {}", cache.version()))
        }
        AssetsSubcommand::Fetch(args) => {
            let asset = cache
                .fetch(&args.path, &DirSource::new(args.from))
                .map_err(|error| format!("failed to fetch {}: {error}", args.path))?;

            if matches!(asset.origin, AssetOrigin::Source) {
                tracing::info!(path = %args.path, "asset cached from source");
            }

            write_output(args.output.as_deref(), &asset.bytes)
        }
    }
}
