//! Storage & Logging Config

use std::path::PathBuf;

use clap::Args;
use client_archive::store::{DEFAULT_KEY, FileSlot};

/// Directory name used under the platform data directory.
const APP_DIR: &str = "client-archive";

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, global = true, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Where records and cached assets live.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// Data directory; defaults to the platform data directory
    #[arg(long, global = true, env = "ARCHIVE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage slot name; records are kept in `<data-dir>/<key>.json`
    #[arg(long, global = true, env = "ARCHIVE_STORE_KEY", default_value = DEFAULT_KEY)]
    pub store_key: String,
}

impl StoreConfig {
    /// Resolved data directory.
    ///
    /// # Errors
    ///
    /// Returns an error when no directory was given and the platform has no
    /// data directory.
    pub fn data_dir(&self) -> Result<PathBuf, String> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs_next::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| "could not determine a data directory, pass --data-dir".to_string()),
        }
    }

    /// Slot holding the record collection.
    ///
    /// # Errors
    ///
    /// Returns an error when the data directory cannot be resolved.
    pub fn slot(&self) -> Result<FileSlot, String> {
        Ok(FileSlot::in_dir(self.data_dir()?, &self.store_key))
    }

    /// Root of the offline asset cache.
    ///
    /// # Errors
    ///
    /// Returns an error when the data directory cannot be resolved.
    pub fn asset_root(&self) -> Result<PathBuf, String> {
        Ok(self.data_dir()?.join("assets"))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn explicit_data_dir_places_slot_file() -> TestResult {
        let config = StoreConfig {
            data_dir: Some(PathBuf::from("/tmp/archive")),
            store_key: "clients".to_string(),
        };

        assert_eq!(config.slot()?.path(), Path::new("/tmp/archive/clients.json"));
        assert_eq!(config.asset_root()?, Path::new("/tmp/archive/assets"));

        Ok(())
    }
}
