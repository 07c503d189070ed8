//! Structural diffs between two instances of one entity type
//!
//! The engine walks the schema in order and classifies every attribute as
//! added, changed, deleted or kept. Equality is exact by default and can be
//! overridden per attribute kind; floats (and rating maps) compare within a
//! relative tolerance unless the engine is built with [`DiffEngine::exact`].

use std::collections::HashMap;
use std::fmt::Write as _;

use serde_json::Value;
use thiserror::Error;

use super::author::Author;
use super::book::Book;
use super::model_type::{ModelType, UnknownModelType};
use super::narrator::Narrator;
use super::schema::Model;
use super::series::Series;
use super::tag::Tag;
use super::value::{AttrKind, AttrValue};
use super::watch::Watch;

/// Default relative tolerance for float comparisons
pub const DEFAULT_FLOAT_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("Cannot diff {type_name}: {reason}")]
    Structural { type_name: String, reason: String },
}

impl DiffError {
    fn structural(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        DiffError::Structural {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/// What happened to one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Change,
    Delete,
    Keep,
}

impl Operation {
    /// Listing prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            Operation::Add => "+ ",
            Operation::Change => "~ ",
            Operation::Delete => "- ",
            Operation::Keep => "  ",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Change => "change",
            Operation::Delete => "delete",
            Operation::Keep => "keep",
        }
    }
}

/// Change record for one attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDiff {
    pub attribute: &'static str,
    pub kind: AttrKind,
    pub operation: Operation,
    pub before: Option<AttrValue>,
    pub after: Option<AttrValue>,
}

impl AttributeDiff {
    /// `- name: old` and/or `+ name: new`, newline-terminated; empty for Keep
    pub fn render(&self) -> String {
        let mut out = String::new();
        if matches!(self.operation, Operation::Delete | Operation::Change) {
            if let Some(before) = &self.before {
                let _ = writeln!(out, "{}{}: {}", Operation::Delete.prefix(), self.attribute, before);
            }
        }
        if matches!(self.operation, Operation::Add | Operation::Change) {
            if let Some(after) = &self.after {
                let _ = writeln!(out, "{}{}: {}", Operation::Add.prefix(), self.attribute, after);
            }
        }
        out
    }
}

/// Ordered per-attribute changes between two optional instances
#[derive(Debug, Clone)]
pub struct Diff<M> {
    pub before: Option<M>,
    pub after: Option<M>,
    pub changes: Vec<AttributeDiff>,
}

impl<M> Diff<M> {
    pub fn has_changed(&self) -> bool {
        self.changes.iter().any(|c| c.operation != Operation::Keep)
    }

    /// Changes other than Keep, in schema order
    pub fn changed(&self) -> impl Iterator<Item = &AttributeDiff> {
        self.changes.iter().filter(|c| c.operation != Operation::Keep)
    }

    /// Human-readable listing of every non-Keep change
    pub fn render(&self) -> String {
        self.changed().map(AttributeDiff::render).collect()
    }
}

/// Equality rule for one attribute kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Equality {
    Exact,
    /// `|a - b| <= eps * max(1, |a|, |b|)`
    CloseEnough(f64),
}

impl Equality {
    pub fn floats_equal(&self, a: f64, b: f64) -> bool {
        match self {
            Equality::Exact => a == b,
            Equality::CloseEnough(eps) => {
                let scale = 1f64.max(a.abs()).max(b.abs());
                (a - b).abs() <= eps * scale
            }
        }
    }

    pub fn values_equal(&self, a: &AttrValue, b: &AttrValue) -> bool {
        match (a, b) {
            (AttrValue::Float(x), AttrValue::Float(y)) => self.floats_equal(*x, *y),
            (AttrValue::Ratings(x), AttrValue::Ratings(y)) => {
                x.len() == y.len()
                    && x.iter()
                        .zip(y.iter())
                        .all(|((ka, va), (kb, vb))| ka == kb && self.floats_equal(*va, *vb))
            }
            _ => a == b,
        }
    }
}

/// Schema-driven diff with per-kind equality overrides
#[derive(Debug, Clone)]
pub struct DiffEngine {
    overrides: HashMap<AttrKind, Equality>,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::with_float_tolerance(DEFAULT_FLOAT_TOLERANCE)
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain value equality for every kind
    pub fn exact() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    pub fn with_float_tolerance(eps: f64) -> Self {
        Self::exact()
            .with_equality(AttrKind::Float, Equality::CloseEnough(eps))
            .with_equality(AttrKind::Ratings, Equality::CloseEnough(eps))
    }

    pub fn with_equality(mut self, kind: AttrKind, equality: Equality) -> Self {
        self.overrides.insert(kind, equality);
        self
    }

    pub fn equality_for(&self, kind: AttrKind) -> Equality {
        self.overrides.get(&kind).copied().unwrap_or(Equality::Exact)
    }

    /// Compares two optional instances attribute by attribute
    pub fn diff<M: Model>(&self, before: Option<&M>, after: Option<&M>) -> Diff<M> {
        let changes = M::schema()
            .attributes()
            .iter()
            .map(|attr| {
                let before_value = before.and_then(|m| attr.value(m));
                let after_value = after.and_then(|m| attr.value(m));
                let operation = match (before, after) {
                    (None, None) => Operation::Keep,
                    (None, Some(_)) => Operation::Add,
                    (Some(_), None) => Operation::Delete,
                    (Some(_), Some(_)) => self.classify(attr.kind, &before_value, &after_value),
                };
                AttributeDiff {
                    attribute: attr.name,
                    kind: attr.kind,
                    operation,
                    before: before_value,
                    after: after_value,
                }
            })
            .collect();

        Diff {
            before: before.cloned(),
            after: after.cloned(),
            changes,
        }
    }

    fn classify(&self, kind: AttrKind, before: &Option<AttrValue>, after: &Option<AttrValue>) -> Operation {
        match (before, after) {
            (None, None) => Operation::Keep,
            (None, Some(_)) => Operation::Add,
            (Some(_), None) => Operation::Delete,
            (Some(b), Some(a)) => {
                if self.equality_for(kind).values_equal(b, a) {
                    Operation::Keep
                } else {
                    Operation::Change
                }
            }
        }
    }

    /// Diffs two JSON documents as records of the named type
    pub fn diff_json(
        &self,
        type_name: &str,
        before: Option<&Value>,
        after: Option<&Value>,
    ) -> Result<Diff<Value>, DiffError> {
        let model_type: ModelType = type_name
            .parse()
            .map_err(|e: UnknownModelType| DiffError::structural(type_name, e.to_string()))?;

        match model_type {
            ModelType::Book => self.diff_json_as::<Book>(before, after),
            ModelType::Author => self.diff_json_as::<Author>(before, after),
            ModelType::Narrator => self.diff_json_as::<Narrator>(before, after),
            ModelType::Series => self.diff_json_as::<Series>(before, after),
            ModelType::Tag => self.diff_json_as::<Tag>(before, after),
            ModelType::Watch => self.diff_json_as::<Watch>(before, after),
        }
    }

    fn diff_json_as<M: Model>(&self, before: Option<&Value>, after: Option<&Value>) -> Result<Diff<Value>, DiffError> {
        let before_model = before.map(decode_as::<M>).transpose()?;
        let after_model = after.map(decode_as::<M>).transpose()?;
        let diff = self.diff(before_model.as_ref(), after_model.as_ref());
        Ok(Diff {
            before: before.cloned(),
            after: after.cloned(),
            changes: diff.changes,
        })
    }
}

/// Decodes a JSON document, rejecting anything that is not a record of `M`
pub fn decode_as<M: Model>(doc: &Value) -> Result<M, DiffError> {
    let type_name = M::MODEL_TYPE.type_name();
    let object = doc
        .as_object()
        .ok_or_else(|| DiffError::structural(type_name, "document is not a JSON object"))?;

    let schema = M::schema();
    if let Some(unknown) = object.keys().find(|k| schema.attribute(k).is_none()) {
        return Err(DiffError::structural(
            type_name,
            format!("'{}' is not an attribute of {}", unknown, type_name),
        ));
    }

    serde_json::from_value(doc.clone()).map_err(|e| DiffError::structural(type_name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::rating;
    use chrono::NaiveDate;
    use serde_json::json;

    fn sample_book() -> Book {
        let mut book = Book::new("Ana Example", "The Fish");
        book.date_publish = NaiveDate::from_ymd_opt(2019, 5, 1);
        book.duration_hours = Some(9.5);
        book.pages = Some(320);
        book.tags.insert("slow-burn".to_string());
        book.ratings.insert(rating::OVERALL.to_string(), 4.25);
        book
    }

    #[test]
    fn diff_with_itself_has_no_changes() {
        let book = sample_book();
        let diff = DiffEngine::new().diff(Some(&book), Some(&book));
        assert!(!diff.has_changed());
        assert_eq!(diff.render(), "");
        assert_eq!(diff.changes.len(), Book::schema().attributes().len());
    }

    #[test]
    fn absent_before_is_all_add() {
        let book = sample_book();
        let diff = DiffEngine::new().diff(None, Some(&book));
        assert!(diff.changes.iter().all(|c| c.operation == Operation::Add));
        assert!(diff.render().contains("+ title: The Fish\n"));
        // Absent values produce no lines
        assert!(!diff.render().contains("narratorName"));
    }

    #[test]
    fn absent_after_is_all_delete() {
        let book = sample_book();
        let diff = DiffEngine::new().diff(Some(&book), None);
        assert!(diff.changes.iter().all(|c| c.operation == Operation::Delete));
        assert!(diff.render().contains("- pages: 320\n"));
    }

    #[test]
    fn both_absent_is_all_keep() {
        let diff = DiffEngine::new().diff::<Book>(None, None);
        assert!(!diff.has_changed());
    }

    #[test]
    fn classifies_attribute_changes() {
        let before = sample_book();
        let mut after = before.clone();
        after.pages = Some(330);
        after.narrator_name = Some("Sam Reader".to_string());
        after.duration_hours = None;

        let diff = DiffEngine::new().diff(Some(&before), Some(&after));
        let op = |name: &str| {
            diff.changes
                .iter()
                .find(|c| c.attribute == name)
                .map(|c| c.operation)
                .unwrap()
        };
        assert_eq!(op("pages"), Operation::Change);
        assert_eq!(op("narratorName"), Operation::Add);
        assert_eq!(op("durationHours"), Operation::Delete);
        assert_eq!(op("title"), Operation::Keep);

        assert_eq!(diff.render(), expected_listing());
    }

    fn expected_listing() -> String {
        // Schema order: narratorName comes before durationHours and pages
        [
            "+ narratorName: Sam Reader",
            "- durationHours: 9.5000",
            "- pages: 320",
            "+ pages: 330",
        ]
        .iter()
        .map(|l| format!("{}\n", l))
        .collect()
    }

    #[test]
    fn float_tolerance_is_configurable() {
        let mut before = sample_book();
        before.duration_hours = Some(4.999999);
        let mut after = before.clone();
        after.duration_hours = Some(5.000001);

        let tolerant = DiffEngine::with_float_tolerance(1e-3).diff(Some(&before), Some(&after));
        assert!(!tolerant.has_changed());

        let exact = DiffEngine::exact().diff(Some(&before), Some(&after));
        assert!(exact.has_changed());
        let change = exact.changed().next().unwrap();
        assert_eq!(change.attribute, "durationHours");
        assert_eq!(change.operation, Operation::Change);
    }

    #[test]
    fn ratings_compare_with_float_rule() {
        let before = sample_book();
        let mut after = before.clone();
        after.ratings.insert(rating::OVERALL.to_string(), 4.250001);
        assert!(!DiffEngine::new().diff(Some(&before), Some(&after)).has_changed());

        after.ratings.insert(rating::VIBE.to_string(), 3.0);
        assert!(DiffEngine::new().diff(Some(&before), Some(&after)).has_changed());
    }

    #[test]
    fn relative_tolerance_scales_with_magnitude() {
        let eq = Equality::CloseEnough(1e-4);
        assert!(eq.floats_equal(10_000.0, 10_000.5));
        assert!(!eq.floats_equal(0.5, 0.5002));
        assert!(Equality::Exact.floats_equal(1.0, 1.0));
    }

    #[test]
    fn json_diff_decodes_named_type() {
        let before = json!({"name": "Ana Example", "ownedCount": 3});
        let after = json!({"name": "Ana Example", "ownedCount": 4});
        let diff = DiffEngine::new().diff_json("author", Some(&before), Some(&after)).unwrap();
        assert!(diff.has_changed());
        assert_eq!(diff.render(), "- ownedCount: 3\n+ ownedCount: 4\n");
    }

    #[test]
    fn json_diff_rejects_unknown_type() {
        let doc = json!({"name": "x"});
        let err = DiffEngine::new().diff_json("podcast", Some(&doc), None).unwrap_err();
        assert!(matches!(err, DiffError::Structural { .. }));
    }

    #[test]
    fn json_diff_rejects_foreign_documents() {
        let watch = json!({"authorName": "Ana Example", "bookTitle": "The Fish"});
        let err = DiffEngine::new().diff_json("tag", Some(&watch), None).unwrap_err();
        assert!(err.to_string().contains("'authorName' is not an attribute of tag"));

        let not_object = json!(["a", "b"]);
        assert!(DiffEngine::new().diff_json("book", None, Some(&not_object)).is_err());
    }
}
