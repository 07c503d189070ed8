//! Project management
//!
//! Handles project initialization and wires configuration into stores.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::domain::{DiffEngine, Model, Namer, NamingError, ReplacementTable};
use crate::sheet::{CsvSheetSource, SheetRow, SheetSource, SheetStore};

use super::config::{Config, ConfigError, PROJECT_DIR};
use super::{FileStore, FingerprintStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a bookdb project. Run 'bookdb init' first.")]
    NotInProject,

    #[error("No sheet source configured. Set [sheet] source in .bookdb/config.toml")]
    NoSheetSource,
}

const DEFAULT_CONFIG: &str = r#"# bookdb configuration

# Record root, relative to the project root
db_root = "book-data"

# Field-label replacement table, relative to .bookdb/
replacements = "replacements.csv"

[sheet]
# Directory of per-tab CSV exports, relative to the project root
# source = "sheet-export"
frozen_rows = 1

[diff]
# Relative tolerance for float attributes
float_tolerance = 0.0001
"#;

/// Seed entries for the replacement table: `original,replacement`
const DEFAULT_REPLACEMENTS: &str = "bookIsbn,isbn\n";

const DEFAULT_GITIGNORE: &str = r#"# Interrupted atomic writes
*.tmp
"#;

/// A bookdb project
pub struct Project {
    root: PathBuf,
    config: Config,
    namer: Arc<Namer>,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(PROJECT_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;
        let replacements_path = config.replacements_path()?;
        let table = match ReplacementTable::load(&replacements_path) {
            Ok(table) => table,
            Err(NamingError::Missing(_)) => {
                return Err(ConfigError::MissingResource(replacements_path).into())
            }
            Err(e) => return Err(e).context("Failed to load replacement table"),
        };
        tracing::debug!(entries = table.len(), "loaded replacement table");

        Ok(Self {
            root,
            config,
            namer: Arc::new(Namer::new(table)),
        })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left alone, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let project_dir = root.join(PROJECT_DIR);

        fs::create_dir_all(&project_dir).with_context(|| {
            format!("Failed to create {} directory: {}", PROJECT_DIR, project_dir.display())
        })?;

        write_if_absent(&project_dir.join("config.toml"), DEFAULT_CONFIG)?;
        write_if_absent(&project_dir.join("replacements.csv"), DEFAULT_REPLACEMENTS)?;
        write_if_absent(&project_dir.join(".gitignore"), DEFAULT_GITIGNORE)?;

        let project = Self::open(root)?;
        let db_root = project.db_root();
        fs::create_dir_all(&db_root)
            .with_context(|| format!("Failed to create db root: {}", db_root.display()))?;
        tracing::info!(root = %project.root.display(), "initialized project");
        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .bookdb directory path
    pub fn project_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Absolute record root
    pub fn db_root(&self) -> PathBuf {
        self.root.join(&self.config.project.db_root)
    }

    /// Namer bound to the project's replacement table
    pub fn namer(&self) -> Arc<Namer> {
        Arc::clone(&self.namer)
    }

    /// Diff engine honoring the configured float tolerance
    pub fn diff_engine(&self) -> DiffEngine {
        let tolerance = self.config.project.diff.float_tolerance;
        if tolerance == 0.0 {
            DiffEngine::exact()
        } else {
            DiffEngine::with_float_tolerance(tolerance)
        }
    }

    pub fn file_store<M: Model>(&self) -> FileStore<M> {
        FileStore::new(&self.db_root(), self.diff_engine())
    }

    pub fn fingerprint_store<M: Model>(&self, bucket: &str) -> FingerprintStore<M> {
        FingerprintStore::new(&self.db_root(), bucket)
    }

    /// Spreadsheet source from the configured CSV export directory
    pub fn sheet_source(&self) -> Result<Arc<dyn SheetSource>> {
        let dir = self.config.sheet_source_dir()?.ok_or(ProjectError::NoSheetSource)?;
        if !dir.is_dir() {
            return Err(ConfigError::MissingResource(dir).into());
        }
        Ok(Arc::new(CsvSheetSource::new(dir, self.config.project.sheet.frozen_rows)))
    }

    pub fn sheet_store<M: SheetRow>(&self) -> Result<SheetStore<M>> {
        Ok(SheetStore::new(self.sheet_source()?, self.namer(), self.diff_engine()))
    }

    /// Returns a relative path from the project root
    pub fn relative_path(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.root).ok().map(|p| p.to_path_buf())
    }
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Author, Book};
    use crate::storage::Store;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.project_dir().is_dir());
        assert!(project.project_dir().join("config.toml").is_file());
        assert!(project.project_dir().join("replacements.csv").is_file());
        assert!(project.project_dir().join(".gitignore").is_file());
        assert!(dir.path().join("book-data").is_dir());
        assert_eq!(project.namer().field_label(&["Book", "ISBN"]), "isbn");
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        fs::write(dir.path().join(".bookdb/replacements.csv"), "Tabs,Audiobookstore\n").unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.namer().replacements().get("Tabs"), Some("Audiobookstore"));
    }

    #[test]
    fn open_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let err = Project::open(dir.path()).err().unwrap();

        assert!(matches!(err.downcast_ref::<ProjectError>(), Some(ProjectError::NotInProject)));
    }

    #[test]
    fn missing_replacement_table_fails() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();
        fs::remove_file(dir.path().join(".bookdb/replacements.csv")).unwrap();

        let err = Project::open(dir.path()).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingResource(_))
        ));
    }

    #[test]
    fn stores_live_under_db_root() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let books = project.file_store::<Book>();
        assert_eq!(books.dir(), dir.path().join("book-data").join("book"));

        let prints = project.fingerprint_store::<Author>("sheet");
        assert_eq!(
            prints.path(),
            dir.path().join("book-data/fingerprint/sheet-Author.json")
        );
    }

    #[test]
    fn sheet_store_requires_a_source() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let err = project.sheet_store::<Author>().err().unwrap();
        assert!(matches!(err.downcast_ref::<ProjectError>(), Some(ProjectError::NoSheetSource)));
    }

    #[test]
    fn sheet_store_reads_configured_exports() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();
        fs::write(
            dir.path().join(".bookdb/config.toml"),
            "[sheet]\nsource = \"exports\"\nfrozen_rows = 1\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("exports")).unwrap();
        fs::write(dir.path().join("exports/Authors.csv"), "Author Name\nAna Example\n").unwrap();

        let project = Project::open(dir.path()).unwrap();
        let store = project.sheet_store::<Author>().unwrap();
        assert!(store.find_by_id("ana-example").unwrap().is_some());
    }

    #[test]
    fn zero_tolerance_is_exact() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();
        fs::write(dir.path().join(".bookdb/config.toml"), "[diff]\nfloat_tolerance = 0.0\n").unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(
            project.diff_engine().equality_for(crate::domain::AttrKind::Float),
            crate::domain::Equality::Exact
        );
    }

    #[test]
    fn relative_path() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        let abs_path = dir.path().join("book-data").join("book").join("x.json");
        let rel_path = project.relative_path(&abs_path);

        assert_eq!(rel_path, Some(PathBuf::from("book-data/book/x.json")));
    }
}
