//! Pipeline orchestration
//!
//! A pipeline pipes the clusters of its first module into the next and so on
//! until every module has run, so each module refines the results of the
//! previous one. The pipeline itself is immutable configuration and can be
//! reused across any number of calls.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::error::{DedupeError, Result};
use crate::modules::{DedupeModule, FuzzyDedupe, UniqueDedupe, UniqueTogetherDedupe};
use crate::record::{FieldLookup, Fields, IndexSet, MaybeSync, RecordStore};
use crate::similarity::Scorer;

/// An ordered chain of matching modules
pub struct Pipeline {
    name: String,
    modules: Vec<Box<dyn DedupeModule>>,
}

impl Pipeline {
    /// Start building a pipeline
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modules(&self) -> &[Box<dyn DedupeModule>] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Find duplicate clusters among `records`, as index sets.
    ///
    /// Indexes refer to list 0. With no modules the whole input comes back as
    /// a single set; with no records the result is empty.
    pub fn find_clusters<R: Fields + MaybeSync>(&self, records: &[R]) -> Vec<IndexSet> {
        self.find_clusters_in_blocks(&[records])
    }

    /// Find duplicate clusters within pre-grouped blocks of records.
    ///
    /// Each block seeds its own candidate set, so records in different blocks
    /// are never matched with each other.
    pub fn find_clusters_in_blocks<R: Fields + MaybeSync>(&self, blocks: &[&[R]]) -> Vec<IndexSet> {
        let store = RecordStore::new(blocks.to_vec());
        let seed = store.seed();
        self.run(&store, seed)
    }

    /// Find duplicate clusters and materialize them as record references
    pub fn get_duplicates<'a, R: Fields + MaybeSync>(&self, records: &'a [R]) -> Vec<Vec<&'a R>> {
        let store = RecordStore::single(records);
        let seed = store.seed();
        self.run(&store, seed)
            .iter()
            .map(|set| store.resolve(set))
            .collect()
    }

    /// Feed `sets` through every module in order
    pub fn run(&self, lookup: &dyn FieldLookup, sets: Vec<IndexSet>) -> Vec<IndexSet> {
        let mut sets = sets;
        for (stage, module) in self.modules.iter().enumerate() {
            if sets.is_empty() {
                debug!(pipeline = %self.name, stage, "no candidates left, skipping remaining modules");
                break;
            }
            let input = sets.len();
            sets = module.execute(lookup, sets);
            debug!(
                pipeline = %self.name,
                stage,
                module = %module.describe(),
                input_sets = input,
                output_sets = sets.len(),
                "module finished"
            );
        }
        sets
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("modules", &self.modules)
            .finish()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stages: Vec<String> = self.modules.iter().map(|m| m.describe()).collect();
        write!(f, "{}: [{}]", self.name, stages.join(" -> "))
    }
}

/// Builder that validates modules before producing a [`Pipeline`]
pub struct PipelineBuilder {
    name: String,
    modules: Vec<Box<dyn DedupeModule>>,
    known_fields: Option<BTreeSet<String>>,
    error: Option<DedupeError>,
}

impl PipelineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: Vec::new(),
            known_fields: None,
            error: None,
        }
    }

    /// Restrict module fields to a record schema.
    ///
    /// Without a schema any field name is accepted.
    pub fn known_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Append an already constructed module
    pub fn module(mut self, module: impl DedupeModule + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn boxed_module(mut self, module: Box<dyn DedupeModule>) -> Self {
        self.modules.push(module);
        self
    }

    /// Append an exact matcher
    pub fn unique<I, S>(self, fields: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let module = UniqueDedupe::new(fields, case_sensitive);
        self.push(module)
    }

    /// Append a joint exact matcher
    pub fn unique_together<I, S>(self, fields: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let module = UniqueTogetherDedupe::new(fields, case_sensitive);
        self.push(module)
    }

    /// Append a fuzzy matcher with the default scorer
    pub fn fuzzy(self, field: impl Into<String>, threshold: f64) -> Self {
        let module = FuzzyDedupe::new(field, threshold);
        self.push(module)
    }

    pub fn fuzzy_with_scorer(self, field: impl Into<String>, threshold: f64, scorer: Scorer) -> Self {
        let module = FuzzyDedupe::with_scorer(field, threshold, scorer);
        self.push(module)
    }

    /// Keep the first construction error; later modules are ignored
    fn push<M: DedupeModule + 'static>(mut self, module: Result<M>) -> Self {
        if self.error.is_some() {
            return self;
        }
        match module {
            Ok(module) => self.modules.push(Box::new(module)),
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Validate and build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(known) = &self.known_fields {
            for module in &self.modules {
                if let Some(field) = module.fields().into_iter().find(|f| !known.contains(*f)) {
                    return Err(DedupeError::UnknownField {
                        field: field.to_string(),
                    });
                }
            }
        }
        Ok(Pipeline {
            name: self.name,
            modules: self.modules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, RecordIndex};

    fn records() -> Vec<Record> {
        vec![
            Record::new().with("id", "1").with("title", "Galaxy formation"),
            Record::new().with("id", "1").with("title", "Galaxy Formation."),
            Record::new().with("id", "1").with("title", "Star formation"),
            Record::new().with("id", "2").with("title", "Galaxy formation"),
        ]
    }

    #[test]
    fn empty_pipeline_returns_input_as_one_set() {
        let pipeline = Pipeline::builder("noop").build().unwrap();
        let clusters = pipeline.find_clusters(&records());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 4);
    }

    #[test]
    fn empty_records_give_no_clusters() {
        let pipeline = Pipeline::builder("noop").build().unwrap();
        assert!(pipeline.find_clusters::<Record>(&[]).is_empty());

        let pipeline = Pipeline::builder("ids").unique(["id"], true).build().unwrap();
        assert!(pipeline.get_duplicates::<Record>(&[]).is_empty());
    }

    #[test]
    fn modules_refine_in_order() {
        let pipeline = Pipeline::builder("id_and_title")
            .unique(["id"], true)
            .fuzzy("title", 90.0)
            .build()
            .unwrap();
        let clusters = pipeline.find_clusters(&records());
        assert_eq!(
            clusters,
            vec![IndexSet::from([RecordIndex::new(0, 0), RecordIndex::new(0, 1)])]
        );

        let recs = records();
        let duplicates = pipeline.get_duplicates(&recs);
        assert_eq!(duplicates.len(), 1);
        assert!(std::ptr::eq(duplicates[0][0], &recs[0]));
        assert!(std::ptr::eq(duplicates[0][1], &recs[1]));
    }

    #[test]
    fn blocks_are_never_matched_across() {
        let first = vec![Record::new().with("id", "1"), Record::new().with("id", "1")];
        let second = vec![Record::new().with("id", "1")];
        let pipeline = Pipeline::builder("ids").unique(["id"], true).build().unwrap();

        let clusters = pipeline.find_clusters_in_blocks(&[&first[..], &second[..]]);
        assert_eq!(
            clusters,
            vec![IndexSet::from([RecordIndex::new(0, 0), RecordIndex::new(0, 1)])]
        );
    }

    #[test]
    fn builder_reports_first_error() {
        let err = Pipeline::builder("bad")
            .fuzzy("title", 150.0)
            .unique(Vec::<String>::new(), true)
            .build()
            .unwrap_err();
        assert!(matches!(err, DedupeError::InvalidThreshold { .. }));
    }

    #[test]
    fn builder_checks_known_fields() {
        let err = Pipeline::builder("schema")
            .known_fields(["id", "title"])
            .unique(["id", "doi"], true)
            .build()
            .unwrap_err();
        assert!(matches!(err, DedupeError::UnknownField { ref field } if field == "doi"));

        assert!(Pipeline::builder("schema")
            .known_fields(["id", "title"])
            .unique(["id"], true)
            .fuzzy("title", 90.0)
            .build()
            .is_ok());
    }

    #[test]
    fn display_lists_stages() {
        let pipeline = Pipeline::builder("id_and_title")
            .unique(["id"], true)
            .fuzzy("title", 90.0)
            .build()
            .unwrap();
        assert_eq!(
            pipeline.to_string(),
            "id_and_title: [unique(id) -> fuzzy(title >= 90, weighted_ratio)]"
        );
        assert_eq!(pipeline.len(), 2);
    }
}
