//! Attribute values
//!
//! Schema accessors return an [`AttrValue`] so heterogeneous attributes can be
//! compared, rendered and hashed through one type. Every value has a single
//! canonical rendering, shared by diff text and fingerprints.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Type tag of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    Text,
    Int,
    Float,
    Bool,
    Date,
    List,
    Ratings,
}

impl AttrKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttrKind::Text => "text",
            AttrKind::Int => "int",
            AttrKind::Float => "float",
            AttrKind::Bool => "bool",
            AttrKind::Date => "date",
            AttrKind::List => "list",
            AttrKind::Ratings => "ratings",
        }
    }
}

/// A single attribute value read off a model
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    List(Vec<String>),
    Ratings(BTreeMap<String, f64>),
}

impl AttrValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            AttrValue::Text(_) => AttrKind::Text,
            AttrValue::Int(_) => AttrKind::Int,
            AttrValue::Float(_) => AttrKind::Float,
            AttrValue::Bool(_) => AttrKind::Bool,
            AttrValue::Date(_) => AttrKind::Date,
            AttrValue::List(_) => AttrKind::List,
            AttrValue::Ratings(_) => AttrKind::Ratings,
        }
    }

    /// Canonical string form used for diff lines and fingerprints
    pub fn canonical(&self) -> String {
        match self {
            AttrValue::Text(s) => s.clone(),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(f) => render_float(*f),
            AttrValue::Bool(b) => b.to_string(),
            AttrValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            AttrValue::List(items) => items.join(", "),
            AttrValue::Ratings(ratings) => ratings
                .iter()
                .map(|(k, v)| format!("{}={}", k, render_float(*v)))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Structured form fed to fingerprints
    ///
    /// Scalars use the canonical string. Lists and ratings stay structured, so
    /// an item containing `", "` never collides with two separate items.
    pub fn fingerprint_form(&self) -> serde_json::Value {
        match self {
            AttrValue::List(items) => serde_json::Value::from(items.clone()),
            AttrValue::Ratings(ratings) => ratings
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(render_float(*v))))
                .collect::<serde_json::Map<_, _>>()
                .into(),
            other => serde_json::Value::String(other.canonical()),
        }
    }

    pub fn text(value: &Option<String>) -> Option<AttrValue> {
        value
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| AttrValue::Text(s.clone()))
    }

    pub fn int(value: Option<i64>) -> Option<AttrValue> {
        value.map(AttrValue::Int)
    }

    pub fn float(value: Option<f64>) -> Option<AttrValue> {
        value.map(AttrValue::Float)
    }

    pub fn bool(value: Option<bool>) -> Option<AttrValue> {
        value.map(AttrValue::Bool)
    }

    pub fn date(value: Option<NaiveDate>) -> Option<AttrValue> {
        value.map(AttrValue::Date)
    }

    /// Empty sets read as absent
    pub fn list(values: &BTreeSet<String>) -> Option<AttrValue> {
        if values.is_empty() {
            None
        } else {
            Some(AttrValue::List(values.iter().cloned().collect()))
        }
    }

    /// Empty maps read as absent
    pub fn ratings(values: &BTreeMap<String, f64>) -> Option<AttrValue> {
        if values.is_empty() {
            None
        } else {
            Some(AttrValue::Ratings(values.clone()))
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Integral values render without decimals, everything else with four places
pub fn render_float(value: f64) -> String {
    if value.is_finite() && (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.4}", value)
    }
}

const STAR_FRACTIONS: [&str; 4] = ["", "\u{bc}", "\u{bd}", "\u{be}"];

/// Star string for a rating out of five, to the nearest quarter
pub fn render_stars(rating: f64) -> String {
    let quarters = (rating * 4.0).round() as i64;
    let whole = quarters.div_euclid(4);
    let fraction = quarters.rem_euclid(4) as usize;
    format!("{}{}\u{2b50}/5", whole, STAR_FRACTIONS[fraction])
}
