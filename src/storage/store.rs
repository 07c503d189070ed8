//! Generic store contract
//!
//! Every backend persists one entity type and derives record identity from
//! the type's schema. The change-aware save path and the lookup helpers are
//! provided on top of a handful of backend methods.

use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{file_token, Diff, DiffEngine, Model};
use crate::sheet::SheetError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cannot identify {type_name} record: identity attributes are missing")]
    Identity { type_name: &'static str },

    #[error("Failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize {type_name} record: {source}")]
    Serialize {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{operation} is not supported by the {backend} store")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    #[error("{type_name} record '{id}' not found")]
    NotFound { type_name: &'static str, id: String },

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the record simply can't be identified yet
    pub fn is_identity(&self) -> bool {
        matches!(self, StoreError::Identity { .. })
    }
}

/// Identity token of a model, or an identity error
pub fn identity_of<M: Model>(model: &M) -> Result<String, StoreError> {
    let values = M::schema().id_values(model);
    let token = file_token(&values);
    if token.is_empty() {
        return Err(StoreError::Identity {
            type_name: M::MODEL_TYPE.type_name(),
        });
    }
    Ok(token)
}

/// Result of a change-aware save
#[derive(Debug, Clone)]
pub struct SaveOutcome<M> {
    pub id: String,
    pub model: M,

    /// Whether the backend was written
    pub written: bool,

    /// Rendered diff; empty when nothing changed
    pub listing: String,
}

/// Boxed lazy record sequence
pub type RecordStream<'a, M> = Box<dyn Iterator<Item = Result<M, StoreError>> + 'a>;

/// Persistence contract shared by every backend
pub trait Store<M: Model> {
    /// Engine used by [`Store::diff`] and the change-aware save
    fn diff_engine(&self) -> &DiffEngine;

    /// Backend lookup by precomputed identity
    fn find_by_id(&self, id: &str) -> Result<Option<M>, StoreError>;

    /// Persists the model and returns it
    fn save(&self, model: &M) -> Result<M, StoreError>;

    /// All records, lazily, in a stable order
    fn stream(&self) -> RecordStream<'_, M>;

    fn type_name(&self) -> &'static str {
        M::MODEL_TYPE.type_name()
    }

    fn id_from_model(&self, model: &M) -> Result<String, StoreError> {
        identity_of(model)
    }

    /// Backend-local lookup that never reaches a remote
    fn find_by_id_cached(&self, id: &str) -> Result<Option<M>, StoreError> {
        self.find_by_id(id)
    }

    fn find_like(&self, model: &M) -> Result<Option<M>, StoreError> {
        let id = self.id_from_model(model)?;
        self.find_by_id(&id)
    }

    fn find_like_cached(&self, model: &M) -> Result<Option<M>, StoreError> {
        let id = self.id_from_model(model)?;
        self.find_by_id_cached(&id)
    }

    /// Identity lookup first, then the first streamed record matching `predicate`
    fn find_like_or_match(&self, model: &M, predicate: &dyn Fn(&M) -> bool) -> Result<Option<M>, StoreError> {
        match self.find_like(model) {
            Ok(Some(found)) => return Ok(Some(found)),
            Ok(None) => {}
            Err(e) if e.is_identity() => {}
            Err(e) => return Err(e),
        }
        for record in self.stream() {
            let record = record?;
            if predicate(&record) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    fn diff(&self, before: Option<&M>, after: Option<&M>) -> Diff<M> {
        self.diff_engine().diff(before, after)
    }

    /// Saves only when the model differs from the stored copy, without printing
    fn save_if_changed_quiet(&self, model: &M) -> Result<SaveOutcome<M>, StoreError> {
        let id = self.id_from_model(model)?;
        let existing = self.find_by_id_cached(&id)?;
        let diff = self.diff(existing.as_ref(), Some(model));

        if !diff.has_changed() {
            tracing::debug!(type_name = self.type_name(), %id, "unchanged, skipping save");
            return Ok(SaveOutcome {
                id,
                model: model.clone(),
                written: false,
                listing: String::new(),
            });
        }

        let saved = self.save(model)?;
        Ok(SaveOutcome {
            id,
            model: saved,
            written: true,
            listing: diff.render(),
        })
    }

    /// Saves only when changed, printing `~~~ <type>/<id>` and the listing
    fn save_if_changed(&self, model: &M) -> Result<M, StoreError> {
        let outcome = self.save_if_changed_quiet(model)?;
        if outcome.written {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "~~~ {}/{}", self.type_name(), outcome.id);
            let _ = write!(stdout, "{}", outcome.listing);
        }
        Ok(outcome.model)
    }
}
