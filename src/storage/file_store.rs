//! JSON file storage
//!
//! One pretty-printed JSON file per record at
//! `<db_root>/<type>/<token>.json`. Keys are sorted and absent values are
//! omitted so files diff cleanly under version control.

use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::domain::{file_token, DiffEngine, Model};

use super::store::{RecordStream, Store, StoreError};

/// Store for one record type as JSON files
pub struct FileStore<M> {
    /// Directory holding this type's files
    dir: PathBuf,

    engine: DiffEngine,

    _model: PhantomData<fn() -> M>,
}

impl<M: Model> FileStore<M> {
    /// Creates a store under the given db root
    pub fn new(db_root: &Path, engine: DiffEngine) -> Self {
        Self {
            dir: db_root.join(M::MODEL_TYPE.type_name()),
            engine,
            _model: PhantomData,
        }
    }

    /// Returns the directory containing this type's files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file for an identity
    pub fn path_for_id(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_token(&[id])))
    }

    fn read_from_file(&self, path: &Path) -> Result<M, StoreError> {
        let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&content).map_err(|source| StoreError::Load {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Renders a model as sorted, pretty JSON with a trailing newline
    fn render(&self, model: &M) -> Result<String, StoreError> {
        let type_name = M::MODEL_TYPE.type_name();
        // Round trip through Value so object keys come out sorted
        let value = serde_json::to_value(model).map_err(|source| StoreError::Serialize { type_name, source })?;
        let mut content =
            serde_json::to_string_pretty(&value).map_err(|source| StoreError::Serialize { type_name, source })?;
        content.push('\n');
        Ok(content)
    }

    /// Writes a record file atomically (temp file + rename)
    fn write_to_file(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        if !self.dir.is_dir() {
            fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
            tracing::debug!(dir = %self.dir.display(), "created record directory");
        }

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content).map_err(|e| StoreError::io(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| StoreError::io(path, e))?;
        Ok(())
    }

    /// Record file paths sorted by file name
    fn record_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.dir, e))?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "json") {
                paths.push(path);
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }
}

impl<M: Model> Store<M> for FileStore<M> {
    fn diff_engine(&self) -> &DiffEngine {
        &self.engine
    }

    fn find_by_id(&self, id: &str) -> Result<Option<M>, StoreError> {
        let path = self.path_for_id(id);
        match self.read_from_file(&path) {
            Ok(model) => Ok(Some(model)),
            Err(StoreError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, model: &M) -> Result<M, StoreError> {
        let id = self.id_from_model(model)?;
        let path = self.path_for_id(&id);
        let content = self.render(model)?;
        self.write_to_file(&path, &content)?;
        tracing::info!(path = %path.display(), "saved {} record", self.type_name());
        Ok(model.clone())
    }

    fn stream(&self) -> RecordStream<'_, M> {
        match self.record_paths() {
            Ok(paths) => Box::new(paths.into_iter().map(move |p| self.read_from_file(&p))),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{rating, Author, Book, Watch};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn book_store(dir: &TempDir) -> FileStore<Book> {
        FileStore::new(dir.path(), DiffEngine::new())
    }

    fn sample_book() -> Book {
        let mut book = Book::new("Ana Example", "The Fish!");
        book.date_publish = NaiveDate::from_ymd_opt(2019, 5, 1);
        book.pages = Some(320);
        book.duration_hours = Some(9.25);
        book.tags.insert("found-family".to_string());
        book.ratings.insert(rating::OVERALL.to_string(), 4.5);
        book
    }

    #[test]
    fn save_and_find_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = book_store(&dir);
        let book = sample_book();

        store.save(&book).unwrap();
        let id = store.id_from_model(&book).unwrap();
        assert_eq!(id, "ana-example-2019-the-fish");

        let found = store.find_by_id(&id).unwrap().unwrap();
        assert_eq!(found, book);
        assert_eq!(store.find_like(&book).unwrap(), Some(book));
    }

    #[test]
    fn files_are_laid_out_by_type_and_token() {
        let dir = TempDir::new().unwrap();
        let store = book_store(&dir);
        store.save(&sample_book()).unwrap();

        let path = dir.path().join("book").join("ana-example-2019-the-fish.json");
        assert!(path.is_file());
        assert!(!path.with_extension("json.tmp").exists());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("}\n"));
        assert!(!content.contains("narratorName"));
        let author_at = content.find("\"authorName\"").unwrap();
        let title_at = content.find("\"title\"").unwrap();
        assert!(author_at < title_at);
    }

    #[test]
    fn missing_record_is_none() {
        let dir = TempDir::new().unwrap();
        let store = book_store(&dir);
        assert_eq!(store.find_by_id("nobody-nothing").unwrap(), None);
    }

    #[test]
    fn save_without_identity_fails() {
        let dir = TempDir::new().unwrap();
        let store = book_store(&dir);
        let mut book = Book::default();
        book.title = Some("Orphan".to_string());

        let err = store.save(&book).unwrap_err();
        assert!(err.is_identity());
        assert!(store.find_like(&book).unwrap_err().is_identity());
        assert!(!dir.path().join("book").exists());
    }

    #[test]
    fn corrupt_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let store: FileStore<Author> = FileStore::new(dir.path(), DiffEngine::new());
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join("broken.json"), "{ not json").unwrap();

        let err = store.find_by_id("broken").unwrap_err();
        match err {
            StoreError::Load { path, .. } => assert!(path.ends_with("broken.json")),
            other => panic!("expected load error, got {other:?}"),
        }
    }

    #[test]
    fn stream_is_sorted_and_restartable() {
        let dir = TempDir::new().unwrap();
        let store: FileStore<Author> = FileStore::new(dir.path(), DiffEngine::new());
        assert_eq!(store.stream().count(), 0);

        for name in ["Zed Writer", "Ana Example", "Mo Author"] {
            store.save(&Author::named(name)).unwrap();
        }
        fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

        let names: Vec<_> = store
            .stream()
            .map(|a| a.unwrap().name.unwrap())
            .collect();
        assert_eq!(names, vec!["Ana Example", "Mo Author", "Zed Writer"]);
        assert_eq!(store.stream().count(), 3);
    }

    #[test]
    fn save_if_changed_writes_once() {
        let dir = TempDir::new().unwrap();
        let store = book_store(&dir);
        let book = sample_book();

        let first = store.save_if_changed_quiet(&book).unwrap();
        assert!(first.written);
        assert!(first.listing.contains("+ title: The Fish!"));

        let path = store.path_for_id(&first.id);
        let modified = fs::metadata(&path).unwrap().modified().unwrap();

        let second = store.save_if_changed_quiet(&book).unwrap();
        assert!(!second.written);
        assert!(second.listing.is_empty());
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn save_if_changed_lists_only_changes() {
        let dir = TempDir::new().unwrap();
        let store = book_store(&dir);
        let mut book = sample_book();
        store.save(&book).unwrap();

        book.pages = Some(333);
        let outcome = store.save_if_changed_quiet(&book).unwrap();
        assert!(outcome.written);
        assert_eq!(outcome.listing, "- pages: 320\n+ pages: 333\n");
        assert_eq!(store.find_like(&book).unwrap().unwrap().pages, Some(333));
    }

    #[test]
    fn find_like_or_match_falls_back_to_predicate() {
        let dir = TempDir::new().unwrap();
        let store: FileStore<Watch> = FileStore::new(dir.path(), DiffEngine::new());
        let watch = Watch {
            author_name: Some("Ana Example".to_string()),
            book_title: Some("Next One".to_string()),
            goodreads_url: Some("https://example.com/next".to_string()),
        };
        store.save(&watch).unwrap();

        let probe = Watch {
            goodreads_url: watch.goodreads_url.clone(),
            ..Watch::default()
        };
        let found = store
            .find_like_or_match(&probe, &|w: &Watch| w.goodreads_url == probe.goodreads_url)
            .unwrap();
        assert_eq!(found, Some(watch));
        assert_eq!(store.find_like_or_match(&probe, &|_: &Watch| false).unwrap(), None);
    }
}
