//! Sibling-list reconciliation: matching previous children to next children
//! and planning the list operations that reorder one into the other.
//!
//! Matching yields, for every next child, the index of the previous child it
//! reuses (if any). Planning then emits removals for unused previous children
//! (highest index first), and walks the next list right to left, anchoring
//! each moved or inserted child immediately before its right neighbour.
//! Reused children on the longest increasing subsequence of previous indices
//! never move.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::vdom::{Key, Node};

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// For each next child, the previous child it reuses.
pub(crate) type Sources = Vec<Option<usize>>;

/// Keys that occur more than once in `children`, in first-occurrence order.
pub(crate) fn duplicate_keys(children: &[Node]) -> Vec<Key> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for key in children.iter().filter_map(Node::key) {
        if !seen.insert(key) && reported.insert(key) {
            duplicates.push(key.clone());
        }
    }
    duplicates
}

/// Keyed matching. Keyed children match by key; when a key repeats, the first
/// unconsumed previous child in document order wins. Unkeyed children match
/// index-aligned within the unkeyed group. A candidate of a different
/// kind/tag is not reused.
pub(crate) fn match_keyed(previous: &[Node], next: &[Node]) -> Sources {
    let mut by_key: HashMap<&Key, VecDeque<usize>> = HashMap::new();
    let mut unkeyed = Vec::new();
    for (index, child) in previous.iter().enumerate() {
        match child.key() {
            Some(key) => by_key.entry(key).or_default().push_back(index),
            None => unkeyed.push(index),
        }
    }

    let mut unkeyed_cursor = 0;
    next.iter()
        .map(|child| {
            let candidate = match child.key() {
                Some(key) => by_key.get_mut(key).and_then(VecDeque::pop_front),
                None => {
                    let candidate = unkeyed.get(unkeyed_cursor).copied();
                    unkeyed_cursor += 1;
                    candidate
                }
            };
            candidate.filter(|&p| previous[p].kind().same_shape(child.kind()))
        })
        .collect()
}

/// Positional matching, ignoring keys: child `i` reuses previous child `i`
/// when the kind/tag agrees.
pub(crate) fn match_positional(previous: &[Node], next: &[Node]) -> Sources {
    next.iter()
        .enumerate()
        .map(|(index, child)| {
            previous
                .get(index)
                .filter(|p| p.kind().same_shape(child.kind()))
                .map(|_| index)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// One list-level operation, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListOp {
    Remove(usize),
    Move { from: usize, to: usize },
    /// Insert next child `next` at list position `index`.
    Insert { index: usize, next: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Previous(usize),
    Next(usize),
}

/// Plan the operations turning a list of `previous_len` children into the
/// list described by `sources`.
pub(crate) fn plan(previous_len: usize, sources: &[Option<usize>]) -> Vec<ListOp> {
    let mut ops = Vec::new();

    let mut used = vec![false; previous_len];
    for &p in sources.iter().flatten() {
        used[p] = true;
    }
    for p in (0..previous_len).rev() {
        if !used[p] {
            ops.push(ListOp::Remove(p));
        }
    }

    let mut working: Vec<Slot> = (0..previous_len)
        .filter(|&p| used[p])
        .map(Slot::Previous)
        .collect();

    let stable = stable_positions(sources);
    let slot_of = |j: usize| match sources[j] {
        Some(p) => Slot::Previous(p),
        None => Slot::Next(j),
    };

    for j in (0..sources.len()).rev() {
        let anchor = if j + 1 < sources.len() {
            let right = slot_of(j + 1);
            working
                .iter()
                .position(|&s| s == right)
                .unwrap_or(working.len())
        } else {
            working.len()
        };

        match sources[j] {
            Some(_) if stable[j] => {}
            Some(p) => {
                let Some(from) = working.iter().position(|&s| s == Slot::Previous(p)) else {
                    continue;
                };
                working.remove(from);
                let to = if from < anchor { anchor - 1 } else { anchor };
                working.insert(to, Slot::Previous(p));
                if from != to {
                    ops.push(ListOp::Move { from, to });
                }
            }
            None => {
                working.insert(anchor, Slot::Next(j));
                ops.push(ListOp::Insert { index: anchor, next: j });
            }
        }
    }

    debug_assert!(
        working.iter().copied().eq((0..sources.len()).map(slot_of)),
        "planned list order diverged from next order"
    );
    ops
}

/// Mark the next positions whose reused previous child lies on the longest
/// strictly increasing subsequence of previous indices.
fn stable_positions(sources: &[Option<usize>]) -> Vec<bool> {
    let matched: Vec<(usize, usize)> = sources
        .iter()
        .enumerate()
        .filter_map(|(j, p)| p.map(|p| (j, p)))
        .collect();

    // tails[k]: index into `matched` of the smallest tail of an increasing
    // run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessor: Vec<Option<usize>> = vec![None; matched.len()];
    for (i, &(_, p)) in matched.iter().enumerate() {
        let len = tails.partition_point(|&t| matched[t].1 < p);
        if len > 0 {
            predecessor[i] = Some(tails[len - 1]);
        }
        if len == tails.len() {
            tails.push(i);
        } else {
            tails[len] = i;
        }
    }

    let mut stable = vec![false; sources.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        stable[matched[i].0] = true;
        cursor = predecessor[i];
    }
    stable
}

// ===========================================================================
// Tests
// ===========================================================================
