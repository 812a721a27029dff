//! Reported-state document tree and structural diff
//!
//! A [`Document`] is an ordered key→value map whose leaves are booleans,
//! numbers, strings or lists. Nested maps are diffed key-by-key; anything
//! else is compared as a whole.
//!
//! [`diff`] produces a [`Patch`] such that applying it on top of the base
//! document reproduces the new document exactly:
//!
//! ```text
//! base.apply(&diff(&base, &next)) == next
//! ```

use alloc::collections::btree_map::{self, BTreeMap};
use alloc::string::String;
use alloc::vec::Vec;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A leaf or subtree in a [`Document`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean flag
    Bool(bool),
    /// Integer quantity (raw readings, counts)
    Integer(i64),
    /// Floating point quantity (timestamps in seconds)
    Number(f64),
    /// Text
    Text(String),
    /// Ordered list, compared as a whole
    List(Vec<Value>),
    /// Nested map, diffed recursively
    Map(Document),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(String::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Value::Map(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Integer(v) => serializer.serialize_i64(*v),
            Value::Number(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(doc) => doc.serialize(serializer),
        }
    }
}

/// Ordered key→value map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(String::from(key), value.into())
    }

    /// Remove a key
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Look up a nested map
    pub fn get_map(&self, key: &str) -> Option<&Document> {
        match self.entries.get(key) {
            Some(Value::Map(doc)) => Some(doc),
            _ => None,
        }
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the document has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    /// Apply a patch produced by [`diff`]
    pub fn apply(&mut self, patch: &Patch) {
        for (key, change) in patch.iter() {
            match change {
                Change::Set(value) => {
                    self.entries.insert(key.clone(), value.clone());
                }
                Change::Remove => {
                    self.entries.remove(key);
                }
                Change::Nested(sub) => {
                    let slot = self
                        .entries
                        .entry(key.clone())
                        .or_insert_with(|| Value::Map(Document::new()));
                    if !matches!(slot, Value::Map(_)) {
                        *slot = Value::Map(Document::new());
                    }
                    if let Value::Map(doc) = slot {
                        doc.apply(sub);
                    }
                }
            }
        }
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One entry of a [`Patch`]
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Key is new or its value changed
    Set(Value),
    /// Key no longer exists (sent as `null`)
    Remove,
    /// Both sides are maps; only the listed sub-keys changed
    Nested(Patch),
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Change::Set(value) => value.serialize(serializer),
            Change::Remove => serializer.serialize_unit(),
            Change::Nested(patch) => patch.serialize(serializer),
        }
    }
}

/// Minimal set of changes between two documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    changes: BTreeMap<String, Change>,
}

impl Patch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self {
            changes: BTreeMap::new(),
        }
    }

    /// Patch that replaces everything, used when there is no baseline
    pub fn full(doc: &Document) -> Self {
        diff(&Document::new(), doc)
    }

    /// Patch that clears the given top-level keys
    pub fn clearing<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut patch = Self::new();
        for key in keys {
            patch.changes.insert(String::from(key), Change::Remove);
        }
        patch
    }

    /// Check if nothing changed
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of top-level changes
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Look up the change for a key
    pub fn get(&self, key: &str) -> Option<&Change> {
        self.changes.get(key)
    }

    /// Iterate changes in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Change> {
        self.changes.iter()
    }
}

impl Serialize for Patch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.changes.len()))?;
        for (key, change) in &self.changes {
            map.serialize_entry(key, change)?;
        }
        map.end()
    }
}

/// Compute the structural difference from `base` to `next`
///
/// - Keys only in `next` are [`Change::Set`]
/// - Keys only in `base` are [`Change::Remove`]
/// - Maps on both sides recurse and appear only if the sub-patch is non-empty
/// - Other values appear only if they differ
pub fn diff(base: &Document, next: &Document) -> Patch {
    let mut patch = Patch::new();

    for (key, next_value) in next.iter() {
        let change = match (base.get(key), next_value) {
            (Some(Value::Map(base_doc)), Value::Map(next_doc)) => {
                let sub = diff(base_doc, next_doc);
                if sub.is_empty() {
                    None
                } else {
                    Some(Change::Nested(sub))
                }
            }
            (Some(base_value), _) if base_value == next_value => None,
            _ => Some(Change::Set(next_value.clone())),
        };

        if let Some(change) = change {
            patch.changes.insert(key.clone(), change);
        }
    }

    for (key, _) in base.iter() {
        if next.get(key).is_none() {
            patch.changes.insert(key.clone(), Change::Remove);
        }
    }

    patch
}
