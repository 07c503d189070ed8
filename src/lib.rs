//! bookdb - Audiobook catalog persistence and change detection
//!
//! Records (books, authors, narrators, series, tags, watchlist entries) are
//! described by static attribute schemas. Schemas drive identity, per-record
//! JSON storage, attribute-level diffs and content fingerprints; a read-only
//! spreadsheet mirror feeds records in.

pub mod domain;
pub mod storage;
pub mod sheet;
pub mod cli;

pub use domain::{Author, Book, Model, ModelType, Narrator, Series, Tag, Watch};
