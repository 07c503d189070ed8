//! Schema descriptors
//!
//! Each entity type declares a static table of attributes: a name, a type tag,
//! an accessor and whether the attribute forms part of the record identity.
//! Identity values come from a separate function because some of them are
//! derived (a book's publish year) rather than read verbatim.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::model_type::ModelType;
use super::value::{AttrKind, AttrValue};

/// Immutable description of one attribute of `M`
pub struct Attribute<M: 'static> {
    /// Attribute name, used in diff lines and fingerprints
    pub name: &'static str,

    /// Type tag, selects the equality rule in the diff engine
    pub kind: AttrKind,

    /// Whether the attribute contributes to the record identity
    pub identity: bool,

    /// Reads the attribute; `None` when absent
    pub get: fn(&M) -> Option<AttrValue>,
}

impl<M: 'static> Attribute<M> {
    pub const fn new(name: &'static str, kind: AttrKind, get: fn(&M) -> Option<AttrValue>) -> Self {
        Self {
            name,
            kind,
            identity: false,
            get,
        }
    }

    pub const fn identity(name: &'static str, kind: AttrKind, get: fn(&M) -> Option<AttrValue>) -> Self {
        Self {
            name,
            kind,
            identity: true,
            get,
        }
    }

    pub fn value(&self, model: &M) -> Option<AttrValue> {
        (self.get)(model)
    }
}

impl<M: 'static> fmt::Debug for Attribute<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Ordered attribute table plus identity extractor for `M`
pub struct Schema<M: 'static> {
    attributes: &'static [Attribute<M>],
    id_values: fn(&M) -> Vec<String>,
}

impl<M: 'static> Schema<M> {
    pub const fn new(attributes: &'static [Attribute<M>], id_values: fn(&M) -> Vec<String>) -> Self {
        Self {
            attributes,
            id_values,
        }
    }

    /// Attributes in declaration order
    pub fn attributes(&self) -> &'static [Attribute<M>] {
        self.attributes
    }

    /// Attributes flagged as identity-forming
    pub fn identity_attributes(&self) -> impl Iterator<Item = &'static Attribute<M>> {
        self.attributes.iter().filter(|a| a.identity)
    }

    pub fn attribute(&self, name: &str) -> Option<&'static Attribute<M>> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Identity values, or an empty vector when the model can't be identified yet
    pub fn id_values(&self, model: &M) -> Vec<String> {
        (self.id_values)(model)
    }
}

/// An entity type the stores can persist
pub trait Model: Clone + fmt::Debug + Default + Serialize + DeserializeOwned + 'static {
    const MODEL_TYPE: ModelType;

    fn schema() -> &'static Schema<Self>;

    /// Short human-readable summary for listings
    fn summary(&self) -> String;
}

/// Keeps only non-blank values; an empty result if any required value is missing
pub fn required_values(values: &[Option<&str>]) -> Vec<String> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => out.push(v.to_string()),
            _ => return Vec::new(),
        }
    }
    out
}
