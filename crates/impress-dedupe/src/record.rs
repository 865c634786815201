//! Records, positional record indexes, and the per-call record store.
//!
//! The engine never compares records by value. Every record is addressed by
//! its position in the input, a [`RecordIndex`] of `(list, record)`, and all
//! set operations work on sets of those indexes. Field values are only read
//! through the [`FieldLookup`] a [`RecordStore`] provides for one call.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Set of record indexes forming one candidate duplicate group
pub type IndexSet = BTreeSet<RecordIndex>;

/// Positional reference to a record: list number and position within the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordIndex {
    pub list: usize,
    pub record: usize,
}

impl RecordIndex {
    pub fn new(list: usize, record: usize) -> Self {
        Self { list, record }
    }
}

impl From<(usize, usize)> for RecordIndex {
    fn from((list, record): (usize, usize)) -> Self {
        Self { list, record }
    }
}

impl fmt::Display for RecordIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.list, self.record)
    }
}

/// Read access to the named fields of a record.
///
/// Returns `None` both for an absent field and for an explicit null.
pub trait Fields {
    fn field(&self, name: &str) -> Option<&str>;
}

/// A bibliographic record: field name to optional value.
///
/// Serializes as a flat JSON/TOML map, e.g. `{"id": "1", "doi": null}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Option<String>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for a present value
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), Some(value.into()));
        self
    }

    /// Builder-style setter for an optional value
    pub fn with_opt(mut self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        self.fields.insert(name.into(), value.map(Into::into));
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }

    /// Field names, including those set to null
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Fields for Record {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }
}

impl From<HashMap<String, Option<String>>> for Record {
    fn from(map: HashMap<String, Option<String>>) -> Self {
        Self {
            fields: map.into_iter().collect(),
        }
    }
}

impl Fields for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl Fields for HashMap<String, Option<String>> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_deref())
    }
}

impl Fields for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl Fields for BTreeMap<String, Option<String>> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_deref())
    }
}

impl<T: Fields + ?Sized> Fields for &T {
    fn field(&self, name: &str) -> Option<&str> {
        (**self).field(name)
    }
}

/// Thread-safety bound that only applies when the `parallel` feature is on.
#[cfg(feature = "parallel")]
pub trait MaybeSync: Send + Sync {}
#[cfg(feature = "parallel")]
impl<T: Send + Sync + ?Sized> MaybeSync for T {}

/// Thread-safety bound that only applies when the `parallel` feature is on.
#[cfg(not(feature = "parallel"))]
pub trait MaybeSync {}
#[cfg(not(feature = "parallel"))]
impl<T: ?Sized> MaybeSync for T {}

/// Field access by record index, the view matching modules work against.
pub trait FieldLookup: MaybeSync {
    /// Value of `field` for the record at `index`; `None` when absent or null
    fn value(&self, index: RecordIndex, field: &str) -> Option<&str>;
}

/// Positional lookup over borrowed record lists, valid for one call.
pub struct RecordStore<'a, R> {
    lists: Vec<&'a [R]>,
}

impl<'a, R> RecordStore<'a, R> {
    pub fn new(lists: Vec<&'a [R]>) -> Self {
        Self { lists }
    }

    /// Store over a single list of records (list index 0)
    pub fn single(records: &'a [R]) -> Self {
        Self {
            lists: vec![records],
        }
    }

    pub fn get(&self, index: RecordIndex) -> Option<&'a R> {
        self.lists
            .get(index.list)
            .and_then(|list| list.get(index.record))
    }

    /// One index set per non-empty list, covering every position
    pub fn seed(&self) -> Vec<IndexSet> {
        self.lists
            .iter()
            .enumerate()
            .filter(|(_, list)| !list.is_empty())
            .map(|(l, list)| (0..list.len()).map(|r| RecordIndex::new(l, r)).collect())
            .collect()
    }

    /// Materialize an index set into record references, in index order
    pub fn resolve(&self, set: &IndexSet) -> Vec<&'a R> {
        set.iter().filter_map(|&index| self.get(index)).collect()
    }

    /// Total number of records across all lists
    pub fn len(&self) -> usize {
        self.lists.iter().map(|list| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Fields + MaybeSync> FieldLookup for RecordStore<'_, R> {
    fn value(&self, index: RecordIndex, field: &str) -> Option<&str> {
        self.get(index).and_then(|record| record.field(field))
    }
}
