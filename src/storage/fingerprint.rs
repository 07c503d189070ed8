//! Content fingerprints
//!
//! A fingerprint is a SHA-256 over the schema-visible values of a record, so
//! syncing can skip records that have not changed without loading and diffing
//! the stored copy. Prints live in one flat JSON object per bucket and type:
//! `<db_root>/fingerprint/<bucket>-<Type>.json`. They are a cache and can be
//! deleted at any time.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::domain::Model;

use super::store::{identity_of, StoreError};

/// Directory under the db root holding bucket files
pub const FINGERPRINT_DIR: &str = "fingerprint";

/// Hex SHA-256 over one JSON `[name, value]` line per attribute
///
/// Absent values encode as `null`.
pub fn take_fingerprint<M: Model>(model: &M) -> String {
    let mut hasher = Sha256::new();
    for attr in M::schema().attributes() {
        let value = attr.value(model).map(|v| v.fingerprint_form());
        let entry = serde_json::json!([attr.name, value]);
        hasher.update(entry.to_string().as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

/// Identity → fingerprint cache for one bucket of one type
pub struct FingerprintStore<M> {
    path: PathBuf,

    /// Loaded on first use
    prints: Option<BTreeMap<String, String>>,

    _model: PhantomData<fn() -> M>,
}

impl<M: Model> FingerprintStore<M> {
    pub fn new(db_root: &Path, bucket: &str) -> Self {
        let file_name = format!("{}-{}.json", bucket, M::MODEL_TYPE.display_name());
        Self {
            path: db_root.join(FINGERPRINT_DIR).join(file_name),
            prints: None,
            _model: PhantomData,
        }
    }

    /// Returns the bucket file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn prints(&mut self) -> Result<&mut BTreeMap<String, String>, StoreError> {
        if self.prints.is_none() {
            let loaded = self.load()?;
            tracing::debug!(path = %self.path.display(), count = loaded.len(), "loaded fingerprints");
            self.prints = Some(loaded);
        }
        Ok(self.prints.get_or_insert_with(BTreeMap::new))
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        serde_json::from_str(&content).map_err(|source| StoreError::Load {
            path: self.path.clone(),
            source,
        })
    }

    /// Stored print for an identity, if any
    pub fn stored(&mut self, id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.prints()?.get(id).cloned())
    }

    /// True when there is no stored print or it differs from the model's
    pub fn has_changed(&mut self, model: &M) -> Result<bool, StoreError> {
        let id = identity_of(model)?;
        let actual = take_fingerprint(model);
        Ok(self.prints()?.get(&id) != Some(&actual))
    }

    /// Records the model's print; returns false without any I/O when unchanged
    pub fn update_fingerprint(&mut self, model: &M) -> Result<bool, StoreError> {
        let id = identity_of(model)?;
        let fingerprint = take_fingerprint(model);

        let prints = self.prints()?;
        if prints.get(&id) == Some(&fingerprint) {
            return Ok(false);
        }
        prints.insert(id, fingerprint);
        self.write()?;
        Ok(true)
    }

    /// Rewrites the whole bucket file (temp file + rename)
    fn write(&self) -> Result<(), StoreError> {
        let Some(prints) = &self.prints else {
            return Ok(());
        };

        if let Some(dir) = self.path.parent() {
            if !dir.is_dir() {
                fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
                tracing::debug!(dir = %dir.display(), "created fingerprint directory");
            }
        }

        let mut content = serde_json::to_string_pretty(prints).map_err(|source| StoreError::Serialize {
            type_name: M::MODEL_TYPE.type_name(),
            source,
        })?;
        content.push('\n');

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(|e| StoreError::io(&temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        tracing::info!(path = %self.path.display(), "wrote fingerprints");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Book, Narrator};
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_book() -> Book {
        let mut book = Book::new("Ana Example", "The Fish");
        book.pages = Some(320);
        book
    }

    #[test]
    fn fingerprint_is_pure_hex() {
        let book = sample_book();
        let print = take_fingerprint(&book);
        assert_eq!(print.len(), 64);
        assert!(print.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(print, take_fingerprint(&book.clone()));
    }

    #[test]
    fn schema_changes_change_the_print() {
        let book = sample_book();
        let mut other = book.clone();
        other.pages = Some(321);
        assert_ne!(take_fingerprint(&book), take_fingerprint(&other));

        let mut narrated = book.clone();
        narrated.narrator_name = Some("Sam Reader".to_string());
        assert_ne!(take_fingerprint(&book), take_fingerprint(&narrated));
    }

    #[test]
    fn list_items_with_separators_change_the_print() {
        let mut joined = sample_book();
        joined.tags.insert("a, b".to_string());
        let mut split = sample_book();
        split.tags.insert("a".to_string());
        split.tags.insert("b".to_string());
        assert_ne!(take_fingerprint(&joined), take_fingerprint(&split));
    }

    #[test]
    fn text_cannot_spill_into_the_next_attribute() {
        let mut long_title = sample_book();
        long_title.title = Some("The FishnarratorName".to_string());
        let mut split = sample_book();
        split.narrator_name = Some("narratorName".to_string());
        assert_ne!(take_fingerprint(&long_title), take_fingerprint(&split));
    }

    #[test]
    fn transient_fields_do_not_change_the_print() {
        let book = sample_book();
        let mut fetched = book.clone();
        fetched.fetched_at = Some(Utc::now());
        assert_eq!(take_fingerprint(&book), take_fingerprint(&fetched));
    }

    #[test]
    fn tiny_float_noise_below_rendering_precision_is_ignored() {
        let mut a = Narrator::named("Sam Reader");
        a.total_duration_hours = Some(12.5);
        let mut b = a.clone();
        b.total_duration_hours = Some(12.500001);
        assert_eq!(take_fingerprint(&a), take_fingerprint(&b));
    }

    #[test]
    fn missing_entry_has_changed_until_updated() {
        let dir = TempDir::new().unwrap();
        let mut store: FingerprintStore<Book> = FingerprintStore::new(dir.path(), "sheet");
        let book = sample_book();

        assert!(store.has_changed(&book).unwrap());
        assert!(!store.path().exists());

        assert!(store.update_fingerprint(&book).unwrap());
        assert!(!store.has_changed(&book).unwrap());
        assert!(dir.path().join("fingerprint").join("sheet-Book.json").is_file());
    }

    #[test]
    fn unchanged_update_skips_io() {
        let dir = TempDir::new().unwrap();
        let mut store: FingerprintStore<Book> = FingerprintStore::new(dir.path(), "sheet");
        let book = sample_book();
        store.update_fingerprint(&book).unwrap();

        fs::remove_file(store.path()).unwrap();
        assert!(!store.update_fingerprint(&book).unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn buckets_persist_across_instances() {
        let dir = TempDir::new().unwrap();
        let book = sample_book();
        {
            let mut store: FingerprintStore<Book> = FingerprintStore::new(dir.path(), "sheet");
            store.update_fingerprint(&book).unwrap();
        }

        let mut reopened: FingerprintStore<Book> = FingerprintStore::new(dir.path(), "sheet");
        assert!(!reopened.has_changed(&book).unwrap());
        assert_eq!(
            reopened.stored("ana-example-the-fish").unwrap(),
            Some(take_fingerprint(&book))
        );

        let mut other_bucket: FingerprintStore<Book> = FingerprintStore::new(dir.path(), "goodreads");
        assert!(other_bucket.has_changed(&book).unwrap());
    }

    #[test]
    fn unidentifiable_models_are_rejected() {
        let dir = TempDir::new().unwrap();
        let mut store: FingerprintStore<Book> = FingerprintStore::new(dir.path(), "sheet");
        assert!(store.has_changed(&Book::default()).unwrap_err().is_identity());
    }
}
