//! # Spreadsheet mirror
//!
//! Read access to a spreadsheet holding one tab per record type.
//!
//! ## Tab Layout
//!
//! The first `frozen_rows` rows of a tab are headers. Column keys come from the
//! header texts through [`Namer::field_label`](crate::domain::Namer::field_label);
//! a header cell left blank inherits the text last seen in its row, so merged
//! parent headers span their children:
//!
//! ```text
//! | Book  |        | Audiobook |                |
//! | Title | Author | Narrator  | Duration Hours |
//!
//! -> bookTitle, bookAuthor, audiobookNarrator, audiobookDurationHours
//! ```
//!
//! Every later non-empty row decodes into one record through the type's
//! [`SheetRow`] adapter.
//!
//! ## Key Types
//!
//! - [`SheetSource`] - Where tabs and rows come from
//! - [`SheetStore`] - Read-mostly [`Store`](crate::storage::Store) over one tab
//! - [`SheetRow`] - Column key to attribute setter, per record type

mod source;
mod adapter;
mod rows;
mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use source::{CellValue, CsvSheetSource, MemorySheetSource, SheetSource, Spreadsheet, TabProperties};
pub use adapter::{column_keys, decode_row, CellError, SheetRow};
pub use store::{Indexed, SheetStore};

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Tab '{0}' not found in spreadsheet")]
    TabNotFound(String),

    #[error("Tab '{title}' has {rows} rows but {frozen} frozen header rows")]
    MissingHeaders {
        title: String,
        rows: usize,
        frozen: usize,
    },

    #[error("Failed to read sheet export {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tab} row {row}, column '{column}': {source}")]
    Decode {
        tab: String,
        row: usize,
        column: String,
        #[source]
        source: CellError,
    },
}
