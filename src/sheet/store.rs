//! Store over one spreadsheet tab
//!
//! Everything is fetched on first access and indexed by identity; later
//! lookups never go back to the source. The write path is deliberately
//! missing: `save` only confirms the record exists in the tab.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{DiffEngine, Namer};
use crate::storage::{identity_of, RecordStream, Store, StoreError};

use super::adapter::{column_keys, decode_row, SheetRow};
use super::source::{SheetSource, Spreadsheet, TabProperties};
use super::SheetError;

/// A record and the sheet row it came from
#[derive(Debug, Clone, PartialEq)]
pub struct Indexed<M> {
    pub model: M,

    /// 1-based row number as shown in the spreadsheet
    pub row_num: usize,
}

struct TabData<M> {
    tab: TabProperties,
    column_keys: Vec<String>,
    records: Vec<Indexed<M>>,
    by_id: HashMap<String, usize>,
}

/// Read-mostly store backed by a spreadsheet tab
pub struct SheetStore<M> {
    source: Arc<dyn SheetSource>,
    namer: Arc<Namer>,
    engine: DiffEngine,
    spreadsheet: OnceCell<Spreadsheet>,
    data: OnceCell<TabData<M>>,
}

impl<M: SheetRow> SheetStore<M> {
    pub fn new(source: Arc<dyn SheetSource>, namer: Arc<Namer>, engine: DiffEngine) -> Self {
        Self {
            source,
            namer,
            engine,
            spreadsheet: OnceCell::new(),
            data: OnceCell::new(),
        }
    }

    pub fn tab_title(&self) -> &'static str {
        M::MODEL_TYPE.tab_title()
    }

    /// Spreadsheet metadata, fetched once
    pub fn spreadsheet(&self) -> Result<&Spreadsheet, SheetError> {
        if let Some(sheet) = self.spreadsheet.get() {
            return Ok(sheet);
        }
        let sheet = self.source.spreadsheet()?;
        tracing::debug!(title = %sheet.title, tabs = sheet.tabs.len(), "fetched spreadsheet metadata");
        Ok(self.spreadsheet.get_or_init(|| sheet))
    }

    fn data(&self) -> Result<&TabData<M>, SheetError> {
        if let Some(data) = self.data.get() {
            return Ok(data);
        }
        let data = self.load()?;
        Ok(self.data.get_or_init(|| data))
    }

    fn load(&self) -> Result<TabData<M>, SheetError> {
        let title = self.tab_title();
        let tab = self
            .spreadsheet()?
            .tab(title)
            .cloned()
            .ok_or_else(|| SheetError::TabNotFound(title.to_string()))?;

        let rows = self.source.rows(title)?;
        if rows.len() < tab.frozen_rows {
            return Err(SheetError::MissingHeaders {
                title: title.to_string(),
                rows: rows.len(),
                frozen: tab.frozen_rows,
            });
        }

        let (headers, body) = rows.split_at(tab.frozen_rows);
        let column_keys = column_keys(headers, tab.column_count, &self.namer);

        let mut records = Vec::new();
        let mut by_id = HashMap::new();
        for (offset, cells) in body.iter().enumerate() {
            let row_num = tab.frozen_rows + offset + 1;
            let model = match decode_row::<M>(&column_keys, cells) {
                Ok(Some(model)) => model,
                Ok(None) => continue,
                Err((col, source)) => {
                    return Err(SheetError::Decode {
                        tab: title.to_string(),
                        row: row_num,
                        column: column_keys.get(col).cloned().unwrap_or_default(),
                        source,
                    })
                }
            };

            match identity_of(&model) {
                Ok(id) => {
                    if by_id.contains_key(&id) {
                        tracing::warn!(tab = title, row = row_num, %id, "duplicate record, keeping the first");
                    } else {
                        by_id.insert(id, records.len());
                    }
                }
                Err(_) => tracing::debug!(tab = title, row = row_num, "row has no identity, not indexed"),
            }
            records.push(Indexed { model, row_num });
        }

        tracing::debug!(tab = title, records = records.len(), "loaded sheet tab");
        Ok(TabData {
            tab,
            column_keys,
            records,
            by_id,
        })
    }

    /// Tab metadata
    pub fn tab(&self) -> Result<&TabProperties, SheetError> {
        Ok(&self.data()?.tab)
    }

    /// Column keys derived from the header rows
    pub fn column_keys(&self) -> Result<&[String], SheetError> {
        Ok(&self.data()?.column_keys)
    }

    /// Every decoded row in sheet order
    pub fn records(&self) -> Result<&[Indexed<M>], SheetError> {
        Ok(&self.data()?.records)
    }

    fn indexed_by_id(&self, id: &str) -> Result<Option<&Indexed<M>>, SheetError> {
        let data = self.data()?;
        Ok(data.by_id.get(id).and_then(|i| data.records.get(*i)))
    }

    /// Row holding the model's record
    pub fn row_num(&self, model: &M) -> Result<Option<usize>, StoreError> {
        let id = identity_of(model)?;
        Ok(self.indexed_by_id(&id)?.map(|r| r.row_num))
    }

    pub fn has_match(&self, predicate: impl Fn(&M) -> bool) -> Result<bool, SheetError> {
        Ok(self.records()?.iter().any(|r| predicate(&r.model)))
    }
}

impl<M: SheetRow> Store<M> for SheetStore<M> {
    fn diff_engine(&self) -> &DiffEngine {
        &self.engine
    }

    fn find_by_id(&self, id: &str) -> Result<Option<M>, StoreError> {
        Ok(self.indexed_by_id(id)?.map(|r| r.model.clone()))
    }

    fn save(&self, model: &M) -> Result<M, StoreError> {
        let id = self.id_from_model(model)?;
        if self.indexed_by_id(&id)?.is_none() {
            return Err(StoreError::NotFound {
                type_name: self.type_name(),
                id,
            });
        }
        Err(StoreError::Unsupported {
            backend: "sheet",
            operation: "save",
        })
    }

    fn stream(&self) -> RecordStream<'_, M> {
        match self.records() {
            Ok(records) => Box::new(records.iter().map(|r| Ok(r.model.clone()))),
            Err(e) => Box::new(std::iter::once(Err(StoreError::from(e)))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Author, Book, ReplacementTable};
    use crate::sheet::{CellError, MemorySheetSource};

    fn authors_source() -> MemorySheetSource {
        MemorySheetSource::new("Books DB").with_text_tab(
            "Authors",
            2,
            &[
                &["Author", "", "", "Rate"],
                &["Name", "Pronouns", "Book Count", "Overall"],
                &["Ana Example", "she/her", "12", "4.5"],
                &["", "", "", ""],
                &["Mo Author", "", "3", ""],
            ],
        )
    }

    fn store<M: SheetRow>(source: MemorySheetSource) -> SheetStore<M> {
        SheetStore::new(Arc::new(source), Arc::new(Namer::default()), DiffEngine::new())
    }

    #[test]
    fn loads_and_indexes_rows() {
        let store: SheetStore<Author> = store(authors_source());

        assert_eq!(
            store.column_keys().unwrap(),
            &["authorName", "authorPronouns", "authorBookCount", "rateOverall"]
        );
        let records = store.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_num, 3);
        assert_eq!(records[1].row_num, 5);

        let ana = store.find_by_id("ana-example").unwrap().unwrap();
        assert_eq!(ana.owned_count, Some(12));
        assert_eq!(ana.pronouns.as_deref(), Some("she/her"));
        assert_eq!(store.find_by_id_cached("ana-example").unwrap(), Some(ana.clone()));
        assert_eq!(store.row_num(&ana).unwrap(), Some(3));
    }

    #[test]
    fn stream_follows_row_order() {
        let store: SheetStore<Author> = store(authors_source());
        let names: Vec<_> = store.stream().map(|a| a.unwrap().name.unwrap()).collect();
        assert_eq!(names, vec!["Ana Example", "Mo Author"]);
        assert!(store.has_match(|a| a.owned_count == Some(3)).unwrap());
        assert!(!store.has_match(|a| a.owned_count == Some(99)).unwrap());
    }

    #[test]
    fn save_is_unsupported() {
        let store: SheetStore<Author> = store(authors_source());

        let err = store.save(&Author::named("Ana Example")).unwrap_err();
        assert!(matches!(err, StoreError::Unsupported { .. }));

        let err = store.save(&Author::named("Nobody Known")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn missing_tab_is_an_error() {
        let store: SheetStore<Book> = store(authors_source());
        let err = store.find_by_id("anything").unwrap_err();
        assert!(matches!(err, StoreError::Sheet(SheetError::TabNotFound(_))));
        assert!(store.stream().next().unwrap().is_err());
    }

    #[test]
    fn decode_errors_name_the_cell() {
        let source = MemorySheetSource::new("Books DB").with_text_tab(
            "Authors",
            1,
            &[&["Author Name", "Author Book Count"], &["Ana Example", "lots"]],
        );
        let store: SheetStore<Author> = store(source);

        let err = store.records().unwrap_err();
        match err {
            SheetError::Decode {
                tab,
                row,
                column,
                source,
            } => {
                assert_eq!(tab, "Authors");
                assert_eq!(row, 2);
                assert_eq!(column, "authorBookCount");
                assert!(matches!(source, CellError::Invalid { .. }));
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_columns_are_decode_errors() {
        let source = MemorySheetSource::new("Books DB").with_text_tab(
            "Authors",
            1,
            &[&["Author Name", "Favorite Color"], &["Ana Example", "teal"]],
        );
        let store: SheetStore<Author> = store(source);
        assert!(matches!(
            store.records(),
            Err(SheetError::Decode {
                source: CellError::UnknownKey(_),
                ..
            })
        ));
    }

    #[test]
    fn replacements_shape_column_keys() {
        let mut table = ReplacementTable::new();
        table.insert("writer", "author");
        let source = MemorySheetSource::new("Books DB")
            .with_text_tab("Authors", 1, &[&["Writer Name"], &["Ana Example"]]);
        let store: SheetStore<Author> =
            SheetStore::new(Arc::new(source), Arc::new(Namer::new(table)), DiffEngine::new());
        assert_eq!(store.column_keys().unwrap(), &["authorName"]);
    }
}
