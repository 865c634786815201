//! impress-dedupe: record deduplication with composable matching pipelines.
//!
//! Records (field name to optional value) are grouped into duplicate
//! clusters by a [`Pipeline`] of matching modules, each refining the
//! candidate sets of the one before:
//!
//! - [`UniqueDedupe`]: records sharing a value in any configured field
//! - [`UniqueTogetherDedupe`]: like `UniqueDedupe`, but splits groups whose
//!   fields point at conflicting records
//! - [`FuzzyDedupe`]: records whose text field scores above a threshold
//!
//! A [`Deduper`] then picks one primary record per cluster using a
//! [`RecordScorer`].
//!
//! ```
//! use impress_dedupe::{Deduper, PipelineRegistry, Record};
//!
//! let pipeline = PipelineRegistry::with_builtins().pipeline("id_and_title").unwrap();
//! let records = vec![
//!     Record::new().with("id", "1").with("title", "The Hubble constant"),
//!     Record::new().with("id", "1").with("title", "The Hubble Constant."),
//!     Record::new().with("id", "2").with("title", "Dark energy"),
//! ];
//!
//! let groups = Deduper::new(pipeline).deduplicate(&records).unwrap();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].secondaries.len(), 1);
//! ```

#[cfg(feature = "native")]
uniffi::setup_scaffolding!();

pub mod config;
pub mod deduper;
pub mod error;
pub mod modules;
pub mod normalization;
pub mod pipeline;
pub mod primary;
pub mod record;
pub mod registry;
pub mod set_ops;
pub mod similarity;

#[cfg(feature = "native")]
pub mod ffi;

pub use config::{ModuleConfig, PipelineConfig};
pub use deduper::{Deduper, DuplicateGroup, IndexGroup};
pub use error::{DedupeError, Result};
pub use modules::{DedupeModule, FuzzyDedupe, UniqueDedupe, UniqueTogetherDedupe};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use primary::{
    select_primary, FieldCompleteness, FieldValue, FirstRecord, Prioritized, RecordScorer,
    ScoreFn,
};
pub use record::{FieldLookup, Fields, IndexSet, MaybeSync, Record, RecordIndex, RecordStore};
pub use registry::{builtin_pipelines, PipelineRegistry, PipelineSource};
pub use set_ops::{condense, join, separate};
pub use similarity::Scorer;

#[cfg(feature = "native")]
pub use ffi::*;
