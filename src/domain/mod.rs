//! Domain models for the book catalog
//!
//! Entity types, their schema tables, identity naming and the diff engine.
//! Nothing in here touches the filesystem except loading the replacement table.

mod value;
mod schema;
mod model_type;
mod naming;
mod diff;
mod book;
mod author;
mod narrator;
mod series;
mod tag;
mod watch;

pub use value::{render_float, render_stars, AttrKind, AttrValue};
pub use schema::{required_values, Attribute, Model, Schema};
pub use model_type::{ModelType, UnknownModelType};
pub use naming::{file_token, Namer, NamingError, ReplacementTable, FILE_TOKEN_MAX_LEN};
pub use diff::{decode_as, AttributeDiff, Diff, DiffEngine, DiffError, Equality, Operation, DEFAULT_FLOAT_TOLERANCE};
pub use book::{rating, Book};
pub use author::Author;
pub use narrator::{narrator_rating, Narrator};
pub use series::Series;
pub use tag::Tag;
pub use watch::Watch;
