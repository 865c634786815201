//! Matching modules: the pluggable stages of a dedupe pipeline.
//!
//! Every module consumes a list of candidate index sets and returns a refined
//! list, reading field values through the call's [`FieldLookup`]. Modules
//! only ever split or regroup what they are given; a record that is not in
//! any input set never appears in the output.

mod fuzzy;
mod unique;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub use fuzzy::FuzzyDedupe;
pub use unique::{UniqueDedupe, UniqueTogetherDedupe};

use crate::record::{FieldLookup, IndexSet, MaybeSync};

/// A matching strategy that refines candidate duplicate sets.
pub trait DedupeModule: std::fmt::Debug + Send + Sync {
    /// Short description for logs, e.g. `fuzzy(title >= 90)`
    fn describe(&self) -> String;

    /// Fields this module reads, used for schema validation
    fn fields(&self) -> Vec<&str>;

    /// Refine `sets` into duplicate clusters of at least two records
    fn execute(&self, lookup: &dyn FieldLookup, sets: Vec<IndexSet>) -> Vec<IndexSet>;
}

/// Apply `refine` to each input set independently and flatten the results.
///
/// Input sets never interact, so with the `parallel` feature they are
/// processed on the rayon pool.
pub(crate) fn refine_each<F>(sets: Vec<IndexSet>, refine: F) -> Vec<IndexSet>
where
    F: Fn(IndexSet) -> Vec<IndexSet> + MaybeSync,
{
    #[cfg(feature = "parallel")]
    {
        sets.into_par_iter().flat_map_iter(refine).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        sets.into_iter().flat_map(refine).collect()
    }
}
