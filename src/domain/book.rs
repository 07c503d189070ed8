//! Book records
//!
//! A book is identified by its author, publish year (when known) and title.
//! Everything else is descriptive and may be filled in piecemeal by the
//! remote collaborators or the spreadsheet.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::model_type::ModelType;
use super::schema::{required_values, Attribute, Model, Schema};
use super::value::{render_stars, AttrKind, AttrValue};

/// Rating category keys shared by books, authors, series and tags
pub mod rating {
    pub const CHARACTER_DEPTH: &str = "characterDepth";
    pub const CHARACTER_GROWTH: &str = "characterGrowth";
    pub const CHARACTER_CONSISTENCY: &str = "characterConsistency";
    pub const WORLD: &str = "world";
    pub const TENSION: &str = "tension";
    pub const B_PLOT: &str = "bPlot";
    pub const VIBE: &str = "vibe";
    pub const HEA: &str = "hea";
    pub const OVERALL: &str = "overall";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrator_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,

    /// Free text, e.g. "2" or "1.5"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_part: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_publish: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_purchase: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_read: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodreads_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audiobook_store_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storygraph_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    /// Rating per category, see [`rating`]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ratings: BTreeMap<String, f64>,

    /// Did not finish
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnf: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<bool>,

    /// When a remote collaborator last returned this book; never persisted
    #[serde(skip)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn new(author_name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            author_name: Some(author_name.into()),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Star string derived from the overall rating
    pub fn stars(&self) -> Option<String> {
        self.ratings.get(rating::OVERALL).map(|r| render_stars(*r))
    }

    /// Hours and minutes, e.g. `9:05`
    pub fn duration_text(&self) -> Option<String> {
        let hours = self.duration_hours.filter(|h| *h > 0.0)?;
        let minutes = (hours * 60.0).round() as i64;
        Some(format!("{}:{:02}", minutes / 60, minutes % 60))
    }
}

fn book_id_values(book: &Book) -> Vec<String> {
    let year = book.date_publish.map(|d| d.year().to_string());
    let mut values = required_values(&[book.author_name.as_deref(), book.title.as_deref()]);
    if let (Some(year), false) = (year, values.is_empty()) {
        values.insert(1, year);
    }
    values
}

static BOOK_ATTRIBUTES: [Attribute<Book>; 21] = [
    Attribute::identity("authorName", AttrKind::Text, |b: &Book| AttrValue::text(&b.author_name)),
    Attribute::identity("datePublish", AttrKind::Date, |b: &Book| AttrValue::date(b.date_publish)),
    Attribute::identity("title", AttrKind::Text, |b: &Book| AttrValue::text(&b.title)),
    Attribute::new("narratorName", AttrKind::Text, |b: &Book| AttrValue::text(&b.narrator_name)),
    Attribute::new("seriesName", AttrKind::Text, |b: &Book| AttrValue::text(&b.series_name)),
    Attribute::new("seriesPart", AttrKind::Text, |b: &Book| AttrValue::text(&b.series_part)),
    Attribute::new("datePurchase", AttrKind::Date, |b: &Book| AttrValue::date(b.date_purchase)),
    Attribute::new("dateRead", AttrKind::Date, |b: &Book| AttrValue::date(b.date_read)),
    Attribute::new("durationHours", AttrKind::Float, |b: &Book| AttrValue::float(b.duration_hours)),
    Attribute::new("pages", AttrKind::Int, |b: &Book| AttrValue::int(b.pages)),
    Attribute::new("isbn", AttrKind::Text, |b: &Book| AttrValue::text(&b.isbn)),
    Attribute::new("genre", AttrKind::Text, |b: &Book| AttrValue::text(&b.genre)),
    Attribute::new("publisherName", AttrKind::Text, |b: &Book| AttrValue::text(&b.publisher_name)),
    Attribute::new("goodreadsUrl", AttrKind::Text, |b: &Book| AttrValue::text(&b.goodreads_url)),
    Attribute::new("audiobookStoreUrl", AttrKind::Text, |b: &Book| {
        AttrValue::text(&b.audiobook_store_url)
    }),
    Attribute::new("storygraphUrl", AttrKind::Text, |b: &Book| AttrValue::text(&b.storygraph_url)),
    Attribute::new("imageUrl", AttrKind::Text, |b: &Book| AttrValue::text(&b.image_url)),
    Attribute::new("tags", AttrKind::List, |b: &Book| AttrValue::list(&b.tags)),
    Attribute::new("ratings", AttrKind::Ratings, |b: &Book| AttrValue::ratings(&b.ratings)),
    Attribute::new("dnf", AttrKind::Bool, |b: &Book| AttrValue::bool(b.dnf)),
    Attribute::new("reading", AttrKind::Bool, |b: &Book| AttrValue::bool(b.reading)),
];

static BOOK_SCHEMA: Schema<Book> = Schema::new(&BOOK_ATTRIBUTES, book_id_values);

impl Model for Book {
    const MODEL_TYPE: ModelType = ModelType::Book;

    fn schema() -> &'static Schema<Self> {
        &BOOK_SCHEMA
    }

    fn summary(&self) -> String {
        let mut summary = format!(
            "{} by {}",
            self.title.as_deref().unwrap_or("(untitled)"),
            self.author_name.as_deref().unwrap_or("(unknown)")
        );
        if let Some(stars) = self.stars() {
            summary.push_str(&format!(" [{}]", stars));
        }
        summary
    }
}
