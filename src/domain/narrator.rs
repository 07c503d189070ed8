//! Narrator records

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::model_type::ModelType;
use super::schema::{required_values, Attribute, Model, Schema};
use super::value::{AttrKind, AttrValue};

/// Narrator rating category keys
pub mod narrator_rating {
    pub const FEMME: &str = "femme";
    pub const MASC: &str = "masc";
    pub const MEN: &str = "men";
    pub const KIDS: &str = "kids";
    pub const VARIETY: &str = "variety";
    pub const CLARITY: &str = "clarity";
    pub const ACCENTS: &str = "accents";
    pub const EMOTION: &str = "emotion";
    pub const DISTINCT_NARRATOR: &str = "distinctNarrator";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Narrator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub goodreads_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned_count: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration_hours: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub negatives: BTreeSet<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ratings: BTreeMap<String, f64>,
}

impl Narrator {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Mean pages per hour of narration; not stored
    pub fn mean_pages_per_hour(&self) -> Option<f64> {
        let pages = self.total_pages?;
        let hours = self.total_duration_hours.filter(|h| *h > 0.0)?;
        Some(pages as f64 / hours)
    }
}

static NARRATOR_ATTRIBUTES: [Attribute<Narrator>; 9] = [
    Attribute::identity("name", AttrKind::Text, |n: &Narrator| AttrValue::text(&n.name)),
    Attribute::new("accent", AttrKind::Text, |n: &Narrator| AttrValue::text(&n.accent)),
    Attribute::new("goodreadsUrl", AttrKind::Text, |n: &Narrator| AttrValue::text(&n.goodreads_url)),
    Attribute::new("siteUrl", AttrKind::Text, |n: &Narrator| AttrValue::text(&n.site_url)),
    Attribute::new("ownedCount", AttrKind::Int, |n: &Narrator| AttrValue::int(n.owned_count)),
    Attribute::new("totalDurationHours", AttrKind::Float, |n: &Narrator| {
        AttrValue::float(n.total_duration_hours)
    }),
    Attribute::new("totalPages", AttrKind::Int, |n: &Narrator| AttrValue::int(n.total_pages)),
    Attribute::new("negatives", AttrKind::List, |n: &Narrator| AttrValue::list(&n.negatives)),
    Attribute::new("ratings", AttrKind::Ratings, |n: &Narrator| AttrValue::ratings(&n.ratings)),
];

static NARRATOR_SCHEMA: Schema<Narrator> = Schema::new(&NARRATOR_ATTRIBUTES, |n: &Narrator| {
    required_values(&[n.name.as_deref()])
});

impl Model for Narrator {
    const MODEL_TYPE: ModelType = ModelType::Narrator;

    fn schema() -> &'static Schema<Self> {
        &NARRATOR_SCHEMA
    }

    fn summary(&self) -> String {
        let name = self.name.as_deref().unwrap_or("(unnamed)");
        match &self.accent {
            Some(accent) => format!("{} ({})", name, accent),
            None => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_per_hour_needs_both_totals() {
        let mut narrator = Narrator::named("Sam Reader");
        assert_eq!(narrator.mean_pages_per_hour(), None);

        narrator.total_pages = Some(900);
        narrator.total_duration_hours = Some(30.0);
        assert_eq!(narrator.mean_pages_per_hour(), Some(30.0));

        narrator.total_duration_hours = Some(0.0);
        assert_eq!(narrator.mean_pages_per_hour(), None);
    }
}
