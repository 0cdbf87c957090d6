//! Client Archive prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    assets::{
        ASSET_MANIFEST, Asset, AssetCache, AssetError, AssetOrigin, AssetSource, CACHE_VERSION,
        DirSource,
    },
    effects::{Clock, FixedClock, IdGenerator, SequentialIds, SystemClock, UuidIdGenerator},
    merge::merge,
    normalize::{NormalizeError, is_valid_registration, normalize},
    print::Renderer,
    records::{Record, RecordFields, RecordId, ValidationError},
    repository::{ImportSummary, RecordRepository, RepositoryError},
    store::{BlobSlot, DEFAULT_KEY, FileSlot, MemorySlot, Store, StoreError},
    transfer::{ExportError, ExportFormat, ImportError, ImportFormat, ParsedImport},
};
