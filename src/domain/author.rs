//! Author records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::book::rating;
use super::model_type::ModelType;
use super::schema::{required_values, Attribute, Model, Schema};
use super::value::{render_stars, AttrKind, AttrValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Author {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodreads_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audiobook_store_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_graph_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,

    /// Books owned by this author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_count: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated_count: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnf_count: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub five_star_count: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_pages: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_duration_hours: Option<f64>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ratings: BTreeMap<String, f64>,
}

impl Author {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn stars(&self) -> Option<String> {
        self.ratings.get(rating::OVERALL).map(|r| render_stars(*r))
    }
}

static AUTHOR_ATTRIBUTES: [Attribute<Author>; 15] = [
    Attribute::identity("name", AttrKind::Text, |a: &Author| AttrValue::text(&a.name)),
    Attribute::new("pronouns", AttrKind::Text, |a: &Author| AttrValue::text(&a.pronouns)),
    Attribute::new("goodreadsUrl", AttrKind::Text, |a: &Author| AttrValue::text(&a.goodreads_url)),
    Attribute::new("audiobookStoreUrl", AttrKind::Text, |a: &Author| {
        AttrValue::text(&a.audiobook_store_url)
    }),
    Attribute::new("storyGraphUrl", AttrKind::Text, |a: &Author| AttrValue::text(&a.story_graph_url)),
    Attribute::new("siteUrl", AttrKind::Text, |a: &Author| AttrValue::text(&a.site_url)),
    Attribute::new("ownedCount", AttrKind::Int, |a: &Author| AttrValue::int(a.owned_count)),
    Attribute::new("ratedCount", AttrKind::Int, |a: &Author| AttrValue::int(a.rated_count)),
    Attribute::new("dnfCount", AttrKind::Int, |a: &Author| AttrValue::int(a.dnf_count)),
    Attribute::new("fiveStarCount", AttrKind::Int, |a: &Author| AttrValue::int(a.five_star_count)),
    Attribute::new("minRating", AttrKind::Float, |a: &Author| AttrValue::float(a.min_rating)),
    Attribute::new("maxRating", AttrKind::Float, |a: &Author| AttrValue::float(a.max_rating)),
    Attribute::new("meanPages", AttrKind::Float, |a: &Author| AttrValue::float(a.mean_pages)),
    Attribute::new("meanDurationHours", AttrKind::Float, |a: &Author| {
        AttrValue::float(a.mean_duration_hours)
    }),
    Attribute::new("ratings", AttrKind::Ratings, |a: &Author| AttrValue::ratings(&a.ratings)),
];

static AUTHOR_SCHEMA: Schema<Author> = Schema::new(&AUTHOR_ATTRIBUTES, |a: &Author| {
    required_values(&[a.name.as_deref()])
});

impl Model for Author {
    const MODEL_TYPE: ModelType = ModelType::Author;

    fn schema() -> &'static Schema<Self> {
        &AUTHOR_SCHEMA
    }

    fn summary(&self) -> String {
        let name = self.name.as_deref().unwrap_or("(unnamed)");
        match self.owned_count {
            Some(count) => format!("{} ({} owned)", name, count),
            None => name.to_string(),
        }
    }
}
