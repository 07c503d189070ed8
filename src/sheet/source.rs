//! Spreadsheet sources
//!
//! The remote spreadsheet API is out of reach here; a [`SheetSource`] is the
//! boundary it would plug into. Two local sources are provided: an in-memory
//! one and a directory of per-tab CSV exports.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::SheetError;

/// A single cell as returned by the spreadsheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell rendered as text; `None` when blank
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(crate::domain::render_float(*n)),
            CellValue::Bool(b) => Some(b.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

/// Tab metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabProperties {
    pub title: String,
    pub frozen_rows: usize,
    pub column_count: usize,
}

/// Spreadsheet metadata
#[derive(Debug, Clone, Default)]
pub struct Spreadsheet {
    pub title: String,
    pub tabs: Vec<TabProperties>,
}

impl Spreadsheet {
    pub fn tab(&self, title: &str) -> Option<&TabProperties> {
        self.tabs.iter().find(|t| t.title == title)
    }
}

/// Read access to a spreadsheet
pub trait SheetSource {
    /// Spreadsheet metadata with every tab
    fn spreadsheet(&self) -> Result<Spreadsheet, SheetError>;

    /// All rows of a tab, header rows included
    fn rows(&self, tab: &str) -> Result<Vec<Vec<CellValue>>, SheetError>;
}

/// In-memory spreadsheet, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySheetSource {
    title: String,
    tabs: Vec<(TabProperties, Vec<Vec<CellValue>>)>,
}

impl MemorySheetSource {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tabs: Vec::new(),
        }
    }

    /// Adds a tab; the column count is the widest row
    pub fn with_tab(mut self, title: impl Into<String>, frozen_rows: usize, rows: Vec<Vec<CellValue>>) -> Self {
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        self.tabs.push((
            TabProperties {
                title: title.into(),
                frozen_rows,
                column_count,
            },
            rows,
        ));
        self
    }

    /// Adds a tab of plain text cells; empty strings become empty cells
    pub fn with_text_tab(self, title: impl Into<String>, frozen_rows: usize, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|c| CellValue::from(*c)).collect())
            .collect();
        self.with_tab(title, frozen_rows, rows)
    }
}

impl SheetSource for MemorySheetSource {
    fn spreadsheet(&self) -> Result<Spreadsheet, SheetError> {
        Ok(Spreadsheet {
            title: self.title.clone(),
            tabs: self.tabs.iter().map(|(props, _)| props.clone()).collect(),
        })
    }

    fn rows(&self, tab: &str) -> Result<Vec<Vec<CellValue>>, SheetError> {
        self.tabs
            .iter()
            .find(|(props, _)| props.title == tab)
            .map(|(_, rows)| rows.clone())
            .ok_or_else(|| SheetError::TabNotFound(tab.to_string()))
    }
}

/// Directory of CSV exports, one `<Tab Title>.csv` per tab
#[derive(Debug, Clone)]
pub struct CsvSheetSource {
    dir: PathBuf,
    frozen_rows: usize,
}

impl CsvSheetSource {
    pub fn new(dir: impl Into<PathBuf>, frozen_rows: usize) -> Self {
        Self {
            dir: dir.into(),
            frozen_rows,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn tab_path(&self, tab: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", tab))
    }

    fn read_tab(&self, path: &Path) -> Result<Vec<Vec<CellValue>>, SheetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|source| SheetError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| SheetError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            rows.push(record.iter().map(CellValue::from).collect());
        }
        Ok(rows)
    }
}

impl SheetSource for CsvSheetSource {
    fn spreadsheet(&self) -> Result<Spreadsheet, SheetError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| SheetError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SheetError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "csv") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut tabs = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(title) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let rows = self.read_tab(&path)?;
            tabs.push(TabProperties {
                title: title.to_string(),
                frozen_rows: self.frozen_rows,
                column_count: rows.iter().map(Vec::len).max().unwrap_or(0),
            });
        }

        let title = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Spreadsheet { title, tabs })
    }

    fn rows(&self, tab: &str) -> Result<Vec<Vec<CellValue>>, SheetError> {
        let path = self.tab_path(tab);
        match fs::metadata(&path) {
            Ok(_) => self.read_tab(&path),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SheetError::TabNotFound(tab.to_string())),
            Err(source) => Err(SheetError::Io { path, source }),
        }
    }
}
