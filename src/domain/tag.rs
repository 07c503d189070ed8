//! Tag records
//!
//! Tags aggregate over the books carrying them: counts, hours and how likely
//! a book with the tag is to be rated well.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model_type::ModelType;
use super::schema::{required_values, Attribute, Model, Schema};
use super::value::{AttrKind, AttrValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_count: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated_count: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated_duration_hours: Option<f64>,

    /// Share of rated books at four stars or better
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_rate: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_duration_hours: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive_likelihood: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_like: Option<f64>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ratings: BTreeMap<String, f64>,
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

static TAG_ATTRIBUTES: [Attribute<Tag>; 10] = [
    Attribute::identity("name", AttrKind::Text, |t: &Tag| AttrValue::text(&t.name)),
    Attribute::new("description", AttrKind::Text, |t: &Tag| AttrValue::text(&t.description)),
    Attribute::new("ownedCount", AttrKind::Int, |t: &Tag| AttrValue::int(t.owned_count)),
    Attribute::new("ratedCount", AttrKind::Int, |t: &Tag| AttrValue::int(t.rated_count)),
    Attribute::new("ratedDurationHours", AttrKind::Float, |t: &Tag| {
        AttrValue::float(t.rated_duration_hours)
    }),
    Attribute::new("positiveRate", AttrKind::Float, |t: &Tag| AttrValue::float(t.positive_rate)),
    Attribute::new("positiveDurationHours", AttrKind::Float, |t: &Tag| {
        AttrValue::float(t.positive_duration_hours)
    }),
    Attribute::new("positiveLikelihood", AttrKind::Float, |t: &Tag| {
        AttrValue::float(t.positive_likelihood)
    }),
    Attribute::new("effectiveLike", AttrKind::Float, |t: &Tag| AttrValue::float(t.effective_like)),
    Attribute::new("ratings", AttrKind::Ratings, |t: &Tag| AttrValue::ratings(&t.ratings)),
];

static TAG_SCHEMA: Schema<Tag> = Schema::new(&TAG_ATTRIBUTES, |t: &Tag| required_values(&[t.name.as_deref()]));

impl Model for Tag {
    const MODEL_TYPE: ModelType = ModelType::Tag;

    fn schema() -> &'static Schema<Self> {
        &TAG_SCHEMA
    }

    fn summary(&self) -> String {
        let name = self.name.as_deref().unwrap_or("(unnamed)");
        match self.positive_rate {
            Some(rate) => format!("{} ({:.0}% positive)", name, rate * 100.0),
            None => name.to_string(),
        }
    }
}
