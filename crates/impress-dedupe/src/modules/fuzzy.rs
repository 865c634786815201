//! Fuzzy text matching

use tracing::trace;

use super::{refine_each, DedupeModule};
use crate::error::{DedupeError, Result};
use crate::normalization::default_process;
use crate::record::{FieldLookup, IndexSet, RecordIndex};
use crate::set_ops::{condense, retain_clusters};
use crate::similarity::Scorer;

/// Dedupe by fuzzy text matching on a single field.
///
/// Within each input set every record is compared with the records after it;
/// pairs scoring at or above the threshold are linked and the links are
/// condensed into clusters. Null values compare as empty strings, which score
/// 0 against anything and so only match at a threshold of 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyDedupe {
    field: String,
    threshold: f64,
    scorer: Scorer,
}

impl FuzzyDedupe {
    /// Create a module with the default weighted-ratio scorer.
    ///
    /// `threshold` is the score cutoff for a match, between 0 and 100.
    pub fn new(field: impl Into<String>, threshold: f64) -> Result<Self> {
        Self::with_scorer(field, threshold, Scorer::default())
    }

    pub fn with_scorer(field: impl Into<String>, threshold: f64, scorer: Scorer) -> Result<Self> {
        let field = field.into();
        if field.trim().is_empty() {
            return Err(DedupeError::EmptyFieldName);
        }
        if !(0.0..=100.0).contains(&threshold) {
            return Err(DedupeError::InvalidThreshold { field, threshold });
        }
        Ok(Self {
            field,
            threshold,
            scorer,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    fn cluster_set(&self, lookup: &dyn FieldLookup, set: IndexSet) -> Vec<IndexSet> {
        let members: Vec<RecordIndex> = set.into_iter().collect();
        let values: Vec<String> = members
            .iter()
            .map(|&index| default_process(lookup.value(index, &self.field).unwrap_or("")))
            .collect();

        let mut candidates = Vec::with_capacity(members.len());
        for (i, &member) in members.iter().enumerate() {
            // earlier members were already compared against this one
            let mut candidate = IndexSet::from([member]);
            for j in (i + 1)..members.len() {
                if self.scorer.score_processed(&values[i], &values[j]) >= self.threshold {
                    candidate.insert(members[j]);
                }
            }
            candidates.push(candidate);
        }

        condense(candidates)
    }
}

impl DedupeModule for FuzzyDedupe {
    fn describe(&self) -> String {
        format!(
            "fuzzy({} >= {}, {})",
            self.field,
            self.threshold,
            self.scorer.as_str()
        )
    }

    fn fields(&self) -> Vec<&str> {
        vec![self.field.as_str()]
    }

    fn execute(&self, lookup: &dyn FieldLookup, sets: Vec<IndexSet>) -> Vec<IndexSet> {
        let clusters = retain_clusters(refine_each(sets, |set| self.cluster_set(lookup, set)));
        trace!(module = %self.describe(), clusters = clusters.len(), "fuzzy match pass");
        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, RecordStore};

    fn titled(titles: &[Option<&str>]) -> Vec<Record> {
        titles
            .iter()
            .map(|title| Record::new().with_opt("title", *title))
            .collect()
    }

    fn indexes(members: &[usize]) -> IndexSet {
        members.iter().map(|&r| RecordIndex::new(0, r)).collect()
    }

    fn run(module: &FuzzyDedupe, records: &[Record]) -> Vec<IndexSet> {
        let store = RecordStore::single(records);
        let mut clusters = module.execute(&store, store.seed());
        clusters.sort();
        clusters
    }

    #[test]
    fn matches_case_insensitively() {
        let records = titled(&[Some("foo bar"), Some("FOO BAR"), Some("baz")]);
        let module = FuzzyDedupe::new("title", 90.0).unwrap();
        assert_eq!(run(&module, &records), vec![indexes(&[0, 1])]);
    }

    #[test]
    fn clusters_near_duplicate_titles() {
        let records = titled(&[
            Some("this is a duplicate title"),
            Some("THIS IS A DUPLICATE TITLE!"),
            Some("this is duplicate title"),
            Some("this is unique"),
            Some("another duplicate"),
            Some("and another duplicate"),
        ]);
        let module = FuzzyDedupe::new("title", 90.0).unwrap();
        assert_eq!(
            run(&module, &records),
            vec![indexes(&[0, 1, 2]), indexes(&[4, 5])]
        );
    }

    #[test]
    fn null_titles_score_zero() {
        let records = titled(&[Some("a real title"), None, Some("")]);

        let module = FuzzyDedupe::new("title", 0.0).unwrap();
        assert_eq!(run(&module, &records), vec![indexes(&[0, 1, 2])]);

        let module = FuzzyDedupe::new("title", 0.5).unwrap();
        assert!(run(&module, &records).is_empty());
    }

    #[test]
    fn threshold_zero_links_everything() {
        let records = titled(&[Some("alpha"), Some("omega"), Some("zzz")]);
        let module = FuzzyDedupe::new("title", 0.0).unwrap();
        assert_eq!(run(&module, &records), vec![indexes(&[0, 1, 2])]);
    }

    #[test]
    fn links_chain_transitively() {
        // 0~1 and 1~2 match, 0 and 2 are further apart
        let records = titled(&[Some("abcdefghij"), Some("abcdefghix"), Some("abcdefghyx")]);
        let module = FuzzyDedupe::with_scorer("title", 90.0, Scorer::Ratio).unwrap();
        assert!(Scorer::Ratio.score("abcdefghij", "abcdefghyx") < 90.0);
        assert_eq!(run(&module, &records), vec![indexes(&[0, 1, 2])]);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(matches!(
            FuzzyDedupe::new("title", 100.5),
            Err(DedupeError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            FuzzyDedupe::new("title", -1.0),
            Err(DedupeError::InvalidThreshold { .. })
        ));
        assert!(FuzzyDedupe::new("title", f64::NAN).is_err());
        assert!(matches!(
            FuzzyDedupe::new("", 90.0),
            Err(DedupeError::EmptyFieldName)
        ));
    }
}
