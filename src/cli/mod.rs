//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project management | `init` |
//! | Records | File store access | `list`, `show`, `put`, `diff` |
//! | Naming | Identity and label helpers | `token`, `label` |
//! | Sheet | Spreadsheet mirror | `sheet status`, `sheet pull` |
//! | Fingerprint | Change detection | `fingerprint` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! The default can be changed with `default_format` in the global config.
//!
//! ## Logging
//!
//! Diagnostics go to stderr through `tracing`. The filter is read from
//! `BOOKDB_LOG` (default `warn`); `--verbose` forces `debug`:
//! ```bash
//! BOOKDB_LOG=bookdb=info bookdb sheet pull book
//! bookdb --verbose put book ana.json
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

/// Runs `$body` with `$m` bound to the record type named by a [`ModelType`](crate::domain::ModelType)
macro_rules! with_model {
    ($model_type:expr, $m:ident => $body:expr) => {
        match $model_type {
            $crate::domain::ModelType::Book => {
                type $m = $crate::domain::Book;
                $body
            }
            $crate::domain::ModelType::Author => {
                type $m = $crate::domain::Author;
                $body
            }
            $crate::domain::ModelType::Narrator => {
                type $m = $crate::domain::Narrator;
                $body
            }
            $crate::domain::ModelType::Series => {
                type $m = $crate::domain::Series;
                $body
            }
            $crate::domain::ModelType::Tag => {
                type $m = $crate::domain::Tag;
                $body
            }
            $crate::domain::ModelType::Watch => {
                type $m = $crate::domain::Watch;
                $body
            }
        }
    };
}

mod app;
mod output;
mod records;
mod naming_cmd;
mod sheet_cmd;
mod fingerprint_cmd;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
