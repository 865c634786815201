//! Exact field matching

use std::collections::BTreeMap;

use tracing::trace;

use super::{refine_each, DedupeModule};
use crate::error::{DedupeError, Result};
use crate::normalization::exact_key;
use crate::record::{FieldLookup, IndexSet};
use crate::set_ops::{join, retain_clusters, separate};

/// Dedupe by matching records on their field values.
///
/// Two records are candidates when they share a value in *any* configured
/// field; matches chain across fields (permissive `join`).
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueDedupe {
    fields: Vec<String>,
    case_sensitive: bool,
}

impl UniqueDedupe {
    /// Create a module matching on `fields`.
    ///
    /// Fails when no field is given or a field name is blank.
    pub fn new<I, S>(fields: I, case_sensitive: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(DedupeError::EmptyFieldList);
        }
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(DedupeError::EmptyFieldName);
        }
        Ok(Self {
            fields,
            case_sensitive,
        })
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Group the members of `set` by their value for `field`.
    ///
    /// Members with a null or empty value are left out entirely.
    fn group_by_field(&self, lookup: &dyn FieldLookup, set: &IndexSet, field: &str) -> Vec<IndexSet> {
        let mut groups: BTreeMap<String, IndexSet> = BTreeMap::new();
        for &index in set {
            if let Some(key) = exact_key(lookup.value(index, field), self.case_sensitive) {
                groups.entry(key).or_default().insert(index);
            }
        }
        groups.into_values().collect()
    }

    /// Union of the per-field groupings of one input set
    fn joined_groups(&self, lookup: &dyn FieldLookup, set: &IndexSet) -> Vec<IndexSet> {
        self.fields.iter().fold(Vec::new(), |joined, field| {
            join(joined, self.group_by_field(lookup, set, field))
        })
    }
}

impl DedupeModule for UniqueDedupe {
    fn describe(&self) -> String {
        format!("unique({})", self.fields.join(", "))
    }

    fn fields(&self) -> Vec<&str> {
        self.fields.iter().map(String::as_str).collect()
    }

    fn execute(&self, lookup: &dyn FieldLookup, sets: Vec<IndexSet>) -> Vec<IndexSet> {
        let clusters = retain_clusters(refine_each(sets, |set| self.joined_groups(lookup, &set)));
        trace!(module = %self.describe(), clusters = clusters.len(), "exact match pass");
        clusters
    }
}

/// Dedupe by matching records on their field values jointly.
///
/// Runs [`UniqueDedupe`] for a baseline, then splits each baseline set with
/// [`separate`] field by field: records only stay together when no field
/// ties part of the set to a conflicting, more specific group.
///
/// For records `(a, b, doi)` = `(1, -, x)`, `(-, 1, x)`, `(1, -, y)`, the doi
/// field separates the third record from the first two even though all three
/// are linked through the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueTogetherDedupe {
    baseline: UniqueDedupe,
}

impl UniqueTogetherDedupe {
    pub fn new<I, S>(fields: I, case_sensitive: bool) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            baseline: UniqueDedupe::new(fields, case_sensitive)?,
        })
    }

    /// Separate one baseline set across all fields in configured order
    fn separated_groups(&self, lookup: &dyn FieldLookup, set: IndexSet) -> Vec<IndexSet> {
        let mut separated = vec![set.clone()];
        for field in &self.baseline.fields {
            let field_groups = self.baseline.group_by_field(lookup, &set, field);
            separated = separate(&separated, &field_groups);
        }
        separated
    }
}

impl DedupeModule for UniqueTogetherDedupe {
    fn describe(&self) -> String {
        format!("unique_together({})", self.baseline.fields.join(", "))
    }

    fn fields(&self) -> Vec<&str> {
        self.baseline.fields()
    }

    fn execute(&self, lookup: &dyn FieldLookup, sets: Vec<IndexSet>) -> Vec<IndexSet> {
        let baseline = self.baseline.execute(lookup, sets);
        let clusters = retain_clusters(refine_each(baseline, |set| {
            self.separated_groups(lookup, set)
        }));
        trace!(module = %self.describe(), clusters = clusters.len(), "joint match pass");
        clusters
    }
}
