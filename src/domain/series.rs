//! Series records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::book::rating;
use super::model_type::ModelType;
use super::schema::{required_values, Attribute, Model, Schema};
use super::value::{render_stars, AttrKind, AttrValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Series {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodreads_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audiobook_store_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_graph_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_count: Option<i64>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ratings: BTreeMap<String, f64>,
}

impl Series {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

static SERIES_ATTRIBUTES: [Attribute<Series>; 6] = [
    Attribute::identity("name", AttrKind::Text, |s: &Series| AttrValue::text(&s.name)),
    Attribute::new("goodreadsUrl", AttrKind::Text, |s: &Series| AttrValue::text(&s.goodreads_url)),
    Attribute::new("audiobookStoreUrl", AttrKind::Text, |s: &Series| {
        AttrValue::text(&s.audiobook_store_url)
    }),
    Attribute::new("storyGraphUrl", AttrKind::Text, |s: &Series| AttrValue::text(&s.story_graph_url)),
    Attribute::new("ownedCount", AttrKind::Int, |s: &Series| AttrValue::int(s.owned_count)),
    Attribute::new("ratings", AttrKind::Ratings, |s: &Series| AttrValue::ratings(&s.ratings)),
];

static SERIES_SCHEMA: Schema<Series> = Schema::new(&SERIES_ATTRIBUTES, |s: &Series| {
    required_values(&[s.name.as_deref()])
});

impl Model for Series {
    const MODEL_TYPE: ModelType = ModelType::Series;

    fn schema() -> &'static Schema<Self> {
        &SERIES_SCHEMA
    }

    fn summary(&self) -> String {
        let name = self.name.as_deref().unwrap_or("(unnamed)");
        match self.ratings.get(rating::OVERALL) {
            Some(overall) => format!("{} [{}]", name, render_stars(*overall)),
            None => name.to_string(),
        }
    }
}
