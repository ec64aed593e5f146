//! Tree diff: turns a previous and a next [`Node`] tree into a patch list.
//!
//! The mount container is treated as a sibling list holding zero or one root,
//! so mounting, unmounting and replacing the root go through the same list
//! reconciliation as any other children.

use std::collections::HashSet;
use std::slice;

use tracing::{debug, trace};

use super::keyed::{self, ListOp};
use super::patch::{NodePath, Patch};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::vdom::{Node, NodeIdentity, NodeKind};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with a sibling list whose keys are not unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// Ignore keys for that list and diff it index-aligned.
    #[default]
    Positional,
    /// Keep keyed matching; a repeated key matches the first unconsumed
    /// previous sibling in document order.
    FirstUnconsumed,
}

/// Tuning knobs for a diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffOptions {
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl DiffOptions {
    pub fn with_duplicate_keys(mut self, policy: DuplicateKeyPolicy) -> Self {
        self.duplicate_keys = policy;
        self
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Diff two trees with default options. `None` stands for "nothing mounted".
///
/// Diagnostics are logged but otherwise discarded; use [`diff_with`] to
/// collect them.
pub fn diff(previous: Option<&Node>, next: Option<&Node>) -> Vec<Patch> {
    let mut diagnostics = Diagnostics::new();
    diff_with(previous, next, &DiffOptions::default(), &mut diagnostics)
}

/// Diff two trees, recording malformed-input diagnostics into `diagnostics`.
pub fn diff_with(
    previous: Option<&Node>,
    next: Option<&Node>,
    options: &DiffOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<Patch> {
    let mut differ = Differ {
        options,
        diagnostics,
        patches: Vec::new(),
        previous_ancestors: Vec::new(),
        next_ancestors: Vec::new(),
    };
    let previous = previous.map(slice::from_ref).unwrap_or_default();
    let next = next.map(slice::from_ref).unwrap_or_default();
    differ.children(&NodePath::root(), previous, next);
    debug!(patches = differ.patches.len(), "diff complete");
    differ.patches
}

// ---------------------------------------------------------------------------
// Differ
// ---------------------------------------------------------------------------

struct Differ<'a> {
    options: &'a DiffOptions,
    diagnostics: &'a mut Diagnostics,
    patches: Vec<Patch>,
    /// Identities of the nodes enclosing the list being diffed, one stack per
    /// side.
    previous_ancestors: Vec<NodeIdentity>,
    next_ancestors: Vec<NodeIdentity>,
}

impl Differ<'_> {
    fn children(&mut self, parent: &NodePath, previous: &[Node], next: &[Node]) {
        let sources = self.match_children(parent, previous, next);

        for op in keyed::plan(previous.len(), &sources) {
            let patch = match op {
                ListOp::Remove(index) => Patch::Remove {
                    parent: parent.clone(),
                    index,
                },
                ListOp::Move { from, to } => Patch::Move {
                    parent: parent.clone(),
                    from,
                    to,
                },
                ListOp::Insert { index, next: j } => Patch::Insert {
                    parent: parent.clone(),
                    index,
                    node: next[j].clone(),
                },
            };
            trace!(%patch, "list op");
            self.patches.push(patch);
        }

        for (j, source) in sources.iter().enumerate() {
            if let Some(p) = *source {
                self.node(&parent.child(j), &previous[p], &next[j]);
            }
        }
    }

    /// Pick the matching strategy for one sibling list, reporting malformed
    /// input on the way.
    fn match_children(&mut self, parent: &NodePath, previous: &[Node], next: &[Node]) -> keyed::Sources {
        let cyclic = self.report_cycles(parent, previous, next);

        let mut duplicates = keyed::duplicate_keys(previous);
        for key in keyed::duplicate_keys(next) {
            if !duplicates.contains(&key) {
                duplicates.push(key);
            }
        }
        let has_duplicates = !duplicates.is_empty();
        for key in duplicates {
            self.diagnostics.record(Diagnostic::DuplicateKey {
                parent: parent.clone(),
                key,
            });
        }

        let positional = cyclic
            || (has_duplicates && self.options.duplicate_keys == DuplicateKeyPolicy::Positional);
        if positional {
            keyed::match_positional(previous, next)
        } else {
            keyed::match_keyed(previous, next)
        }
    }

    /// A child sharing the identity of one of its own ancestors can only come
    /// from a node cloned into its own subtree. Owned trees are always finite,
    /// so this flags shared identity rather than a true cycle; see
    /// [`NodeIdentity`](crate::vdom::NodeIdentity).
    fn report_cycles(&mut self, parent: &NodePath, previous: &[Node], next: &[Node]) -> bool {
        let mut offenders = HashSet::new();
        for child in previous {
            if self.previous_ancestors.contains(&child.identity()) {
                offenders.insert(child.identity());
            }
        }
        for child in next {
            if self.next_ancestors.contains(&child.identity()) {
                offenders.insert(child.identity());
            }
        }
        let mut offenders: Vec<_> = offenders.into_iter().collect();
        offenders.sort();
        let cyclic = !offenders.is_empty();
        for identity in offenders {
            self.diagnostics.record(Diagnostic::CyclicSubtree {
                parent: parent.clone(),
                identity,
            });
        }
        cyclic
    }

    /// Diff a matched pair living at `path`.
    fn node(&mut self, path: &NodePath, previous: &Node, next: &Node) {
        if let (NodeKind::Text { content: old }, NodeKind::Text { content: new }) =
            (previous.kind(), next.kind())
        {
            if old != new {
                self.patches.push(Patch::ReplaceText {
                    node: path.clone(),
                    content: new.clone(),
                });
            }
        }

        for property in next.properties().iter() {
            if previous.properties().get(&property.key()) != Some(property) {
                self.patches.push(Patch::SetProperty {
                    node: path.clone(),
                    property: property.clone(),
                });
            }
        }
        for key in previous.properties().keys() {
            if !next.properties().contains(key) {
                self.patches.push(Patch::RemoveProperty {
                    node: path.clone(),
                    key: key.clone(),
                });
            }
        }

        if previous.gestures() != next.gestures() {
            self.patches.push(Patch::ReplaceGestures {
                node: path.clone(),
                gestures: next.gestures().to_vec(),
            });
        }

        if previous.children().is_empty() && next.children().is_empty() {
            return;
        }
        self.previous_ancestors.push(previous.identity());
        self.next_ancestors.push(next.identity());
        self.children(path, previous.children(), next.children());
        self.previous_ancestors.pop();
        self.next_ancestors.pop();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
