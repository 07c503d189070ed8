//! Watch-list records
//!
//! Books not owned yet, tracked by author and title only.

use serde::{Deserialize, Serialize};

use super::model_type::ModelType;
use super::schema::{required_values, Attribute, Model, Schema};
use super::value::{AttrKind, AttrValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Watch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodreads_url: Option<String>,
}

static WATCH_ATTRIBUTES: [Attribute<Watch>; 3] = [
    Attribute::identity("authorName", AttrKind::Text, |w: &Watch| AttrValue::text(&w.author_name)),
    Attribute::identity("bookTitle", AttrKind::Text, |w: &Watch| AttrValue::text(&w.book_title)),
    Attribute::new("goodreadsUrl", AttrKind::Text, |w: &Watch| AttrValue::text(&w.goodreads_url)),
];

static WATCH_SCHEMA: Schema<Watch> = Schema::new(&WATCH_ATTRIBUTES, |w: &Watch| {
    required_values(&[w.author_name.as_deref(), w.book_title.as_deref()])
});

impl Model for Watch {
    const MODEL_TYPE: ModelType = ModelType::Watch;

    fn schema() -> &'static Schema<Self> {
        &WATCH_SCHEMA
    }

    fn summary(&self) -> String {
        format!(
            "{} by {}",
            self.book_title.as_deref().unwrap_or("(untitled)"),
            self.author_name.as_deref().unwrap_or("(unknown)")
        )
    }
}
