//! FFI surface for Swift/Kotlin callers

use std::collections::HashMap;

use crate::deduper::{Deduper, IndexGroup};
use crate::error::DedupeError;
use crate::registry::PipelineRegistry;

/// FFI-safe error type for deduplication operations
#[derive(uniffi::Error, Debug, Clone)]
#[uniffi(flat_error)]
pub enum FfiError {
    DedupeError { message: String },
}

impl std::fmt::Display for FfiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FfiError::DedupeError { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for FfiError {}

impl From<DedupeError> for FfiError {
    fn from(err: DedupeError) -> Self {
        FfiError::DedupeError {
            message: err.to_string(),
        }
    }
}

/// A duplicate cluster by position in the input list
#[derive(uniffi::Record, Debug, Clone, PartialEq, Eq)]
pub struct FfiDuplicateGroup {
    pub primary_index: u32,
    pub secondary_indices: Vec<u32>,
}

fn position(index: crate::record::RecordIndex) -> Result<u32, FfiError> {
    u32::try_from(index.record).map_err(|_| FfiError::DedupeError {
        message: format!("record position {} does not fit in u32", index.record),
    })
}

impl TryFrom<IndexGroup> for FfiDuplicateGroup {
    type Error = FfiError;

    fn try_from(group: IndexGroup) -> Result<Self, FfiError> {
        Ok(FfiDuplicateGroup {
            primary_index: position(group.primary)?,
            secondary_indices: group
                .secondaries
                .into_iter()
                .map(position)
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Deduplicate records with a builtin pipeline; the first record of each
/// cluster is its primary
#[uniffi::export]
pub fn deduplicate_records(
    records: Vec<HashMap<String, Option<String>>>,
    pipeline_name: String,
) -> Result<Vec<FfiDuplicateGroup>, FfiError> {
    let pipeline = PipelineRegistry::with_builtins().pipeline(&pipeline_name)?;
    Deduper::new(pipeline)
        .deduplicate_indices(&records)?
        .into_iter()
        .map(FfiDuplicateGroup::try_from)
        .collect()
}

/// Names of the builtin pipelines
#[uniffi::export]
pub fn builtin_pipeline_names() -> Vec<String> {
    PipelineRegistry::with_builtins()
        .names()
        .map(str::to_string)
        .collect()
}
