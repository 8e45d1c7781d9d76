use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

/// A uniquely identified record that can live in a [`RecordStore`].
///
/// The store and the action log only ever look at `id()`; every other
/// field belongs to the caller's schema.
///
/// [`RecordStore`]: crate::storage::RecordStore
pub trait Entity: Clone + Debug + PartialEq {
    fn id(&self) -> &str;
}

/// A partial change that can be merged into an entity.
///
/// Merging always happens on a clone of the current state, so the
/// snapshot kept for undo is never the value being patched.
pub trait Patch<E> {
    fn apply_to(&self, target: &mut E);
}

impl<E, F> Patch<E> for F
where
    F: Fn(&mut E),
{
    fn apply_to(&self, target: &mut E) {
        self(target)
    }
}

/// Schema-less entity: an id plus arbitrary JSON fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

impl Entity for Record {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Top-level JSON merge patch for [`Record`].
///
/// Each key overwrites the field of the same name; a `null` value drops
/// the field. An `id` key is ignored, identity is never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordPatch(pub Map<String, Value>);

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn unset(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into(), Value::Null);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Patch<Record> for RecordPatch {
    fn apply_to(&self, target: &mut Record) {
        for (name, value) in &self.0 {
            if name == "id" {
                continue;
            }
            if value.is_null() {
                target.fields.remove(name);
            } else {
                target.fields.insert(name.clone(), value.clone());
            }
        }
    }
}
