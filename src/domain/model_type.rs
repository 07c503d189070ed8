//! Entity type registry
//!
//! A fixed table from type tag to the names each backend uses for it: the
//! record directory on disk, the spreadsheet tab title, and the type name in
//! fingerprint bucket files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("Unknown record type '{0}' (expected one of: book, author, narrator, series, tag, watch)")]
pub struct UnknownModelType(pub String);

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Book,
    Author,
    Narrator,
    Series,
    Tag,
    Watch,
}

impl ModelType {
    pub const ALL: [ModelType; 6] = [
        ModelType::Book,
        ModelType::Author,
        ModelType::Narrator,
        ModelType::Series,
        ModelType::Tag,
        ModelType::Watch,
    ];

    /// Directory name under the db root
    pub fn type_name(&self) -> &'static str {
        match self {
            ModelType::Book => "book",
            ModelType::Author => "author",
            ModelType::Narrator => "narrator",
            ModelType::Series => "series",
            ModelType::Tag => "tag",
            ModelType::Watch => "watch",
        }
    }

    /// Spreadsheet tab holding this type
    pub fn tab_title(&self) -> &'static str {
        match self {
            ModelType::Book => "Books",
            ModelType::Author => "Authors",
            ModelType::Narrator => "Narrators",
            ModelType::Series => "Series",
            ModelType::Tag => "Tags",
            ModelType::Watch => "Watchlist",
        }
    }

    /// Type name used in fingerprint bucket file names
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::Book => "Book",
            ModelType::Author => "Author",
            ModelType::Narrator => "Narrator",
            ModelType::Series => "Series",
            ModelType::Tag => "Tag",
            ModelType::Watch => "Watch",
        }
    }

    pub fn from_tab_title(title: &str) -> Option<ModelType> {
        Self::ALL.into_iter().find(|t| t.tab_title() == title)
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ModelType {
    type Err = UnknownModelType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| {
                t.type_name().eq_ignore_ascii_case(wanted)
                    || t.tab_title().eq_ignore_ascii_case(wanted)
                    || t.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownModelType(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_names_and_tab_titles() {
        assert_eq!("book".parse::<ModelType>(), Ok(ModelType::Book));
        assert_eq!("Books".parse::<ModelType>(), Ok(ModelType::Book));
        assert_eq!("WATCHLIST".parse::<ModelType>(), Ok(ModelType::Watch));
        assert_eq!(" series ".parse::<ModelType>(), Ok(ModelType::Series));
    }

    #[test]
    fn rejects_unknown_names() {
        let err = "podcast".parse::<ModelType>().unwrap_err();
        assert_eq!(err, UnknownModelType("podcast".to_string()));
        assert!(err.to_string().contains("book, author"));
    }

    #[test]
    fn tab_titles_round_trip() {
        for t in ModelType::ALL {
            assert_eq!(ModelType::from_tab_title(t.tab_title()), Some(t));
        }
    }
}
