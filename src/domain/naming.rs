//! Naming conventions
//!
//! Two related jobs:
//! - [`file_token`] turns identity values into a filesystem-safe token
//!   (`["The Fish!", "Vol. 2"]` → `the-fish-vol-2`).
//! - [`Namer::field_label`] turns spreadsheet header text into camel-case
//!   field labels (`["Author", "Name"]` → `authorName`), with a replacement
//!   table for aliases and acronym fixes.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// Maximum length of a file token, in characters
pub const FILE_TOKEN_MAX_LEN: usize = 150;

const QUOTE_CHARS: [char; 4] = ['\'', '"', '`', '\u{2019}'];

#[derive(Debug, Error)]
pub enum NamingError {
    #[error("Replacement table not found: {0}")]
    Missing(String),

    #[error("Failed to read replacement table {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Builds a file token from free-text parts
///
/// Blank parts are dropped; the rest are trimmed, lower-cased, stripped of
/// quotes and joined with hyphens. Every run of characters outside `[a-z0-9]`
/// becomes a single hyphen and the result never starts or ends with one.
pub fn file_token<S: AsRef<str>>(parts: &[S]) -> String {
    let mut token = String::new();
    let mut pending_hyphen = false;

    for part in parts {
        let part = part.as_ref().trim();
        if part.is_empty() {
            continue;
        }
        for c in part.to_lowercase().chars() {
            if QUOTE_CHARS.contains(&c) {
                continue;
            }
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                if pending_hyphen && !token.is_empty() {
                    token.push('-');
                }
                pending_hyphen = false;
                token.push(c);
            } else {
                pending_hyphen = true;
            }
        }
        pending_hyphen = true;
    }

    truncate_token(token, FILE_TOKEN_MAX_LEN)
}

fn truncate_token(token: String, max_len: usize) -> String {
    if token.len() <= max_len {
        return token;
    }
    // Tokens are pure ASCII at this point, so byte and char counts agree
    token[..max_len].trim_end_matches('-').to_string()
}

/// Alias table applied while building field labels
#[derive(Debug, Clone, Default)]
pub struct ReplacementTable {
    entries: HashMap<String, String>,
}

impl ReplacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a two-column CSV file
    pub fn load(path: &Path) -> Result<Self, NamingError> {
        if !path.is_file() {
            return Err(NamingError::Missing(path.display().to_string()));
        }
        let file = std::fs::File::open(path).map_err(|e| NamingError::Read {
            path: path.display().to_string(),
            source: csv::Error::from(e),
        })?;
        Self::from_reader(file).map_err(|source| NamingError::Read {
            path: path.display().to_string(),
            source,
        })
    }

    /// Parses `original,replacement` rows; a single-column row maps to ""
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = HashMap::new();
        for record in csv_reader.records() {
            let record = record?;
            let Some(original) = record.get(0) else {
                continue;
            };
            if original.is_empty() {
                continue;
            }
            let replacement = record.get(1).unwrap_or("");
            entries.insert(original.to_string(), replacement.to_string());
        }

        Ok(Self { entries })
    }

    pub fn insert(&mut self, original: impl Into<String>, replacement: impl Into<String>) {
        self.entries.insert(original.into(), replacement.into());
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn apply(&self, text: String) -> String {
        match self.entries.get(&text) {
            Some(replacement) => replacement.clone(),
            None => text,
        }
    }
}

/// Field label builder bound to a replacement table
#[derive(Debug, Clone, Default)]
pub struct Namer {
    replacements: ReplacementTable,
}

impl Namer {
    pub fn new(replacements: ReplacementTable) -> Self {
        Self { replacements }
    }

    pub fn replacements(&self) -> &ReplacementTable {
        &self.replacements
    }

    /// Builds a camel-case label from header texts
    pub fn field_label<S: AsRef<str>>(&self, texts: &[S]) -> String {
        let label: String = texts
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| !t.trim().is_empty())
            .map(|t| self.format_text(t))
            .enumerate()
            .map(|(i, word)| if i == 0 { word } else { upper_first(&word) })
            .map(|word| self.replacements.apply(word))
            .collect();
        self.replacements.apply(label)
    }

    /// Formats one header text into a camel-case fragment
    pub fn format_text(&self, text: &str) -> String {
        let words: Vec<String> = match self.replacements.get(text) {
            Some(replacement) => vec![replacement.to_string()],
            None => text.to_lowercase().split_whitespace().map(str::to_string).collect(),
        };

        let formatted: String = words
            .into_iter()
            .map(|word| word.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>())
            .filter(|w| !w.is_empty())
            .enumerate()
            .map(|(i, word)| if i == 0 { word } else { upper_first(&word) })
            .map(|word| self.replacements.apply(word))
            .collect();
        self.replacements.apply(formatted)
    }
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
