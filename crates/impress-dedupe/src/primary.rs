//! Primary record selection
//!
//! Once a cluster is found one record is kept as the primary and the others
//! become its secondaries. Which record wins is decided by a [`RecordScorer`]:
//! the record with the highest score is the primary, and on ties the earliest
//! record in input order wins. The default [`FirstRecord`] scores everything
//! equally, so the first record of each cluster is the primary.

use crate::error::{DedupeError, Result};
use crate::record::Fields;

/// Ranks records when choosing the primary of a cluster.
///
/// Integrators implement this to prefer, say, the most complete or the most
/// recent record. Scores only need to be partially ordered; a score that
/// compares as neither greater nor smaller never displaces the current best.
pub trait RecordScorer<R: ?Sized> {
    type Score: PartialOrd;

    fn score(&self, record: &R) -> Self::Score;
}

/// Constant score: the first record of a cluster is always the primary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstRecord;

impl<R: ?Sized> RecordScorer<R> for FirstRecord {
    type Score = ();

    fn score(&self, _record: &R) {}
}

/// Adapts a closure into a scorer
#[derive(Clone, Copy)]
pub struct ScoreFn<F>(pub F);

impl<R, F, S> RecordScorer<R> for ScoreFn<F>
where
    R: ?Sized,
    F: Fn(&R) -> S,
    S: PartialOrd,
{
    type Score = S;

    fn score(&self, record: &R) -> S {
        (self.0)(record)
    }
}

impl<F> std::fmt::Debug for ScoreFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ScoreFn")
    }
}

/// Prefers records with more of the given fields filled in.
///
/// Empty strings count as missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCompleteness {
    fields: Vec<String>,
}

impl FieldCompleteness {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl<R: Fields + ?Sized> RecordScorer<R> for FieldCompleteness {
    type Score = usize;

    fn score(&self, record: &R) -> usize {
        self.fields
            .iter()
            .filter(|field| record.field(field).is_some_and(|v| !v.is_empty()))
            .count()
    }
}

/// Prefers the record with the greatest value of one field.
///
/// Values compare as strings, and any value beats a missing one, which suits
/// fixed-width fields such as years or ISO dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    field: String,
}

impl FieldValue {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl<R: Fields + ?Sized> RecordScorer<R> for FieldValue {
    type Score = Option<String>;

    fn score(&self, record: &R) -> Option<String> {
        record
            .field(&self.field)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Ranks by `A`, falling back to `B` when `A` ties
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prioritized<A, B>(pub A, pub B);

impl<R, A, B> RecordScorer<R> for Prioritized<A, B>
where
    R: ?Sized,
    A: RecordScorer<R>,
    B: RecordScorer<R>,
{
    type Score = (A::Score, B::Score);

    fn score(&self, record: &R) -> Self::Score {
        (self.0.score(record), self.1.score(record))
    }
}

/// Split `items` into the highest scoring item and the rest.
///
/// Ties go to the earliest item; the rest keep their relative order.
/// Fails with [`DedupeError::EmptyCluster`] when `items` is empty.
pub fn select_primary<T, K, F>(mut items: Vec<T>, mut key: F) -> Result<(T, Vec<T>)>
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    let mut best: Option<(usize, K)> = None;
    for (position, item) in items.iter().enumerate() {
        let score = key(item);
        let better = best.as_ref().map_or(true, |(_, top)| score > *top);
        if better {
            best = Some((position, score));
        }
    }

    let (position, _) = best.ok_or(DedupeError::EmptyCluster)?;
    let primary = items.remove(position);
    Ok((primary, items))
}
