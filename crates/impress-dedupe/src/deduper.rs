//! Deduplication entry point: clusters plus primary selection

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::primary::{select_primary, FirstRecord, RecordScorer};
use crate::record::{Fields, MaybeSync, RecordIndex, RecordStore};

/// One duplicate cluster with its chosen primary record
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup<'a, R> {
    pub primary: &'a R,
    pub secondaries: Vec<&'a R>,
}

impl<'a, R> DuplicateGroup<'a, R> {
    /// All records of the group, primary first
    pub fn records(&self) -> impl Iterator<Item = &'a R> + '_ {
        std::iter::once(self.primary).chain(self.secondaries.iter().copied())
    }

    pub fn len(&self) -> usize {
        1 + self.secondaries.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Index form of a [`DuplicateGroup`], for callers that keep records elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexGroup {
    pub primary: RecordIndex,
    pub secondaries: Vec<RecordIndex>,
}

/// A pipeline paired with the scorer that picks each cluster's primary.
///
/// ```
/// use impress_dedupe::{Deduper, FieldCompleteness, Pipeline, Record};
///
/// let pipeline = Pipeline::builder("ids").unique(["id"], true).build().unwrap();
/// let deduper = Deduper::new(pipeline).with_scorer(FieldCompleteness::new(["doi"]));
///
/// let records = vec![
///     Record::new().with("id", "7"),
///     Record::new().with("id", "7").with("doi", "10.1/x"),
/// ];
/// let groups = deduper.deduplicate(&records).unwrap();
/// assert_eq!(groups[0].primary.get("doi"), Some("10.1/x"));
/// ```
#[derive(Debug)]
pub struct Deduper<S = FirstRecord> {
    pipeline: Pipeline,
    scorer: S,
}

impl Deduper<FirstRecord> {
    /// Deduper that keeps the first record of each cluster as primary
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            scorer: FirstRecord,
        }
    }
}

impl<S> Deduper<S> {
    /// Replace the primary scorer
    pub fn with_scorer<T>(self, scorer: T) -> Deduper<T> {
        Deduper {
            pipeline: self.pipeline,
            scorer,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Duplicate clusters as record references, each in input order
    pub fn get_duplicates<'a, R: Fields + MaybeSync>(&self, records: &'a [R]) -> Vec<Vec<&'a R>> {
        self.pipeline.get_duplicates(records)
    }

    /// Pick the primary of one cluster.
    ///
    /// A single record is its own primary. An empty cluster is an error.
    pub fn separate_duplicates<'a, R>(&self, records: Vec<&'a R>) -> Result<DuplicateGroup<'a, R>>
    where
        S: RecordScorer<R>,
    {
        let (primary, secondaries) = select_primary(records, |record| self.scorer.score(record))?;
        Ok(DuplicateGroup {
            primary,
            secondaries,
        })
    }

    /// Find duplicate clusters and pick a primary for each
    pub fn deduplicate<'a, R>(&self, records: &'a [R]) -> Result<Vec<DuplicateGroup<'a, R>>>
    where
        R: Fields + MaybeSync,
        S: RecordScorer<R>,
    {
        let groups = self
            .get_duplicates(records)
            .into_iter()
            .map(|cluster| self.separate_duplicates(cluster))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            pipeline = %self.pipeline.name(),
            records = records.len(),
            groups = groups.len(),
            "deduplicated"
        );
        Ok(groups)
    }

    /// Like [`deduplicate`](Self::deduplicate) but reports positions
    pub fn deduplicate_indices<R>(&self, records: &[R]) -> Result<Vec<IndexGroup>>
    where
        R: Fields + MaybeSync,
        S: RecordScorer<R>,
    {
        let store = RecordStore::single(records);
        self.pipeline
            .find_clusters(records)
            .into_iter()
            .map(|cluster| {
                let members: Vec<RecordIndex> = cluster.into_iter().collect();
                let (primary, secondaries) = select_primary(members, |&index| {
                    store.get(index).map(|record| self.scorer.score(record))
                })?;
                Ok(IndexGroup {
                    primary,
                    secondaries,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DedupeError;
    use crate::primary::FieldCompleteness;
    use crate::record::Record;

    fn pipeline() -> Pipeline {
        Pipeline::builder("id_and_title")
            .unique(["id"], true)
            .fuzzy("title", 90.0)
            .build()
            .unwrap()
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("id", "1").with("title", "Dark matter halos"),
            Record::new().with("id", "2").with("title", "Stellar winds"),
            Record::new()
                .with("id", "1")
                .with("title", "Dark Matter Halos")
                .with("doi", "10.1/halo"),
            Record::new().with("id", "2").with("title", "Stellar winds!"),
            Record::new().with("id", "3").with("title", "Dark matter halos"),
        ]
    }

    #[test]
    fn default_scorer_keeps_first() {
        let deduper = Deduper::new(pipeline());
        let records = records();
        let groups = deduper.deduplicate(&records).unwrap();

        assert_eq!(groups.len(), 2);
        assert!(std::ptr::eq(groups[0].primary, &records[0]));
        assert!(std::ptr::eq(groups[0].secondaries[0], &records[2]));
        assert!(std::ptr::eq(groups[1].primary, &records[1]));
        assert_eq!(groups[1].len(), 2);
    }

    #[test]
    fn custom_scorer_promotes_complete_record() {
        let deduper = Deduper::new(pipeline()).with_scorer(FieldCompleteness::new(["doi"]));
        let records = records();
        let groups = deduper.deduplicate(&records).unwrap();

        assert!(std::ptr::eq(groups[0].primary, &records[2]));
        assert_eq!(groups[0].records().count(), 2);
    }

    #[test]
    fn index_groups_match_record_groups() {
        let deduper = Deduper::new(pipeline()).with_scorer(FieldCompleteness::new(["doi"]));
        let groups = deduper.deduplicate_indices(&records()).unwrap();
        assert_eq!(
            groups,
            vec![
                IndexGroup {
                    primary: RecordIndex::new(0, 2),
                    secondaries: vec![RecordIndex::new(0, 0)],
                },
                IndexGroup {
                    primary: RecordIndex::new(0, 1),
                    secondaries: vec![RecordIndex::new(0, 3)],
                },
            ]
        );
    }

    #[test]
    fn separate_duplicates_edge_cases() {
        let deduper = Deduper::new(pipeline());
        let record = Record::new().with("id", "1");

        let group = deduper.separate_duplicates(vec![&record]).unwrap();
        assert!(std::ptr::eq(group.primary, &record));
        assert!(group.secondaries.is_empty());

        let err = deduper.separate_duplicates(Vec::<&Record>::new()).unwrap_err();
        assert!(matches!(err, DedupeError::EmptyCluster));
    }

    #[test]
    fn no_duplicates_is_empty() {
        let deduper = Deduper::new(pipeline());
        assert!(deduper.deduplicate::<Record>(&[]).unwrap().is_empty());
        let distinct = vec![Record::new().with("id", "1"), Record::new().with("id", "2")];
        assert!(deduper.deduplicate(&distinct).unwrap().is_empty());
    }
}
