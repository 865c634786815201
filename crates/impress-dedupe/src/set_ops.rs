//! Set algebra over lists of index sets.
//!
//! Three operations combine candidate groups produced by different matching
//! criteria:
//!
//! - [`condense`] merges sets that share any element, transitively.
//! - [`join`] condenses two lists together (permissive combination).
//! - [`separate`] refines one list by another and splits apart members whose
//!   grouping would be ambiguous (conflict detection).
//!
//! Output order is never significant; only set membership is.

use std::collections::HashMap;

use crate::record::{IndexSet, RecordIndex};

/// Disjoint-set forest over dense slots, with path halving and union by size
struct DisjointSets {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSets {
    fn new() -> Self {
        Self {
            parent: Vec::new(),
            size: Vec::new(),
        }
    }

    fn make_set(&mut self) -> usize {
        let slot = self.parent.len();
        self.parent.push(slot);
        self.size.push(1);
        slot
    }

    fn find(&mut self, mut slot: usize) -> usize {
        while self.parent[slot] != slot {
            self.parent[slot] = self.parent[self.parent[slot]];
            slot = self.parent[slot];
        }
        slot
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut root_a, mut root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return;
        }
        if self.size[root_a] < self.size[root_b] {
            std::mem::swap(&mut root_a, &mut root_b);
        }
        self.parent[root_b] = root_a;
        self.size[root_a] += self.size[root_b];
    }
}

/// Condense a list of sets by joining them where they intersect.
///
/// Merging is transitive: `[{1,2},{3,4},{2,3}]` condenses to `[{1,2,3,4}]`
/// even though `{1,2}` and `{3,4}` share nothing directly. No two output sets
/// intersect, and the union of the output equals the union of the input.
/// Empty input sets carry no members and are dropped.
pub fn condense(sets: Vec<IndexSet>) -> Vec<IndexSet> {
    let mut forest = DisjointSets::new();
    let mut slots: HashMap<RecordIndex, usize> = HashMap::new();
    let mut order: Vec<RecordIndex> = Vec::new();

    for set in &sets {
        let mut first: Option<usize> = None;
        for &index in set {
            let slot = *slots.entry(index).or_insert_with(|| {
                order.push(index);
                forest.make_set()
            });
            match first {
                Some(anchor) => forest.union(anchor, slot),
                None => first = Some(slot),
            }
        }
    }

    // Group members by root, keeping groups in order of first appearance
    let mut groups: Vec<IndexSet> = Vec::new();
    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    for index in order {
        let root = forest.find(slots[&index]);
        let position = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(IndexSet::new());
            groups.len() - 1
        });
        groups[position].insert(index);
    }

    groups
}

/// Join index sets between two lists where they intersect.
///
/// Equivalent to condensing the concatenation of both lists: if
/// `[{1,2},{3,4}]` and `[{2,3}]` are passed in, the result is `[{1,2,3,4}]`,
/// since `{2,3}` from the second list links the two sets of the first.
pub fn join(first: Vec<IndexSet>, second: Vec<IndexSet>) -> Vec<IndexSet> {
    let mut combined = first;
    combined.extend(second);
    condense(combined)
}

/// Separate index sets based on how they intersect between two lists.
///
/// If a set from one list is intersected by two or more sets from the other
/// list, its non-intersecting members cannot be assigned to any of those
/// intersections (a conflict), so they are split off on their own. For
/// `[{1,2,3,4}]` and `[{1},{4}]` the result is `[{1},{4},{2,3}]`: there is no
/// way to tell whether `{2,3}` belongs with `{1}` or with `{4}`.
///
/// A set intersected by exactly one counterpart keeps its private remainder.
/// For `[{1,2},{4,5}]` and `[{2,3}]` the result is `[{1,2,3},{4,5}]`.
///
/// Empty sets are never emitted, and the union of the output always equals
/// the union of both inputs.
pub fn separate(first: &[IndexSet], second: &[IndexSet]) -> Vec<IndexSet> {
    let all_first: IndexSet = first.iter().flatten().copied().collect();
    let all_second: IndexSet = second.iter().flatten().copied().collect();
    // every member present in both lists
    let shared: IndexSet = all_first.intersection(&all_second).copied().collect();

    let mut first_included = vec![false; first.len()];
    let mut second_included = vec![false; second.len()];
    let mut separated = Vec::new();

    for (i, a) in first.iter().enumerate() {
        for (j, b) in second.iter().enumerate() {
            let intersection: IndexSet = a.intersection(b).copied().collect();
            if intersection.is_empty() {
                continue;
            }

            let mut split = intersection.clone();

            // `a` keeps its remainder only when nothing else in it is shared
            if a.difference(&intersection).all(|index| !shared.contains(index)) {
                split.extend(a.iter().copied());
                first_included[i] = true;
            }
            // and likewise for `b`
            if b.difference(&intersection).all(|index| !shared.contains(index)) {
                split.extend(b.iter().copied());
                second_included[j] = true;
            }

            separated.push(split);
        }
    }

    // Sets never folded into an intersection had zero or 2+ counterparts;
    // either way their unshared members form a set of their own.
    let leftovers = first
        .iter()
        .zip(first_included)
        .chain(second.iter().zip(second_included))
        .filter(|(_, included)| !included);
    for (set, _) in leftovers {
        let remainder: IndexSet = set.difference(&shared).copied().collect();
        if !remainder.is_empty() {
            separated.push(remainder);
        }
    }

    separated
}

/// Drop sets too small to be duplicate clusters
pub(crate) fn retain_clusters(sets: Vec<IndexSet>) -> Vec<IndexSet> {
    sets.into_iter().filter(|set| set.len() > 1).collect()
}
