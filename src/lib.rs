//! Client Archive
//!
//! Client Archive is an offline client-record keeper: validated records, lenient JSON and CSV import with
//! merge-by-id, exports, printable views and a single-blob persistent store.

pub mod assets;
pub mod csv;
pub mod effects;
pub mod merge;
pub mod normalize;
pub mod prelude;
pub mod print;
pub mod records;
pub mod repository;
pub mod search;
pub mod store;
pub mod transfer;
