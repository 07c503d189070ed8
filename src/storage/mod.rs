//! # Storage Layer
//!
//! Persistence for catalog records with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Records | Pretty JSON, sorted keys | `<db_root>/<type>/<token>.json` |
//! | Fingerprints | Flat JSON object | `<db_root>/fingerprint/<bucket>-<Type>.json` |
//! | Replacements | Two-column CSV | `.bookdb/replacements.csv` |
//! | Config | TOML | `.bookdb/config.toml` |
//!
//! ## Write Safety
//!
//! - All writes are whole-file (temp file + rename)
//! - Directories are created on first write
//! - No locking; the last writer wins
//!
//! ## Project Structure
//!
//! ```text
//! .bookdb/
//! ├── config.toml           # Project configuration
//! ├── replacements.csv      # Field-label replacement table
//! └── .gitignore
//! book-data/
//! ├── book/
//! │   └── ana-example-2019-the-fish.json
//! ├── author/
//! └── fingerprint/
//!     └── sheet-Book.json
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a bookdb project
//! - [`Store`] - Persistence contract with change-aware saves
//! - [`FileStore`] - One JSON file per record
//! - [`FingerprintStore`] - Content hashes for skipping unchanged records
//! - [`Config`] - Project and global configuration

mod store;
mod file_store;
mod fingerprint;
mod config;
mod project;

pub use store::{identity_of, RecordStream, SaveOutcome, Store, StoreError};
pub use file_store::FileStore;
pub use fingerprint::{take_fingerprint, FingerprintStore, FINGERPRINT_DIR};
pub use config::{
    Config, ConfigError, DiffConfig, GlobalConfig, OutputFormat, ProjectConfig, SheetConfig, PROJECT_DIR,
};
pub use project::{Project, ProjectError};
