//! Hydration: adopt server-rendered DOM for a freshly computed tree.
//!
//! The DOM and the tree are walked in lockstep. A DOM node is reused when its
//! kind/tag matches the tree node and, for elements, its marker (if any) names
//! the same child path. Reused nodes only receive non-structural patches:
//! listener attachment, gesture registration and property/text drift. On a
//! mismatch the server subtree at that position is replaced by a fresh mount.

use tracing::debug;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::diff::{NodePath, Patch};
use crate::dom::{Dom, DomId, DomNode};
use crate::vdom::{Node, NodeKind};

/// Outcome of hydrating one tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydrationReport {
    /// Patches turning the server DOM into the client tree, in order.
    pub patches: Vec<Patch>,
    /// Server nodes adopted as-is.
    pub reused: usize,
    /// Positions where the server subtree was discarded.
    pub mismatches: usize,
}

impl HydrationReport {
    /// Number of patches that change tree shape.
    pub fn structural_patches(&self) -> usize {
        self.patches.iter().filter(|p| p.is_structural()).count()
    }

    /// Whether the server DOM was adopted without any structural repair.
    pub fn is_clean(&self) -> bool {
        self.structural_patches() == 0
    }
}

/// Reconcile the server DOM in `dom` with `tree`.
pub fn hydrate(dom: &Dom, tree: &Node, diagnostics: &mut Diagnostics) -> HydrationReport {
    let mut hydrator = Hydrator {
        dom,
        diagnostics,
        report: HydrationReport::default(),
    };
    hydrator.children(&NodePath::root(), dom.children(dom.container()), std::slice::from_ref(tree));
    let report = hydrator.report;
    debug!(
        reused = report.reused,
        mismatches = report.mismatches,
        patches = report.patches.len(),
        "hydration complete"
    );
    report
}

struct Hydrator<'a> {
    dom: &'a Dom,
    diagnostics: &'a mut Diagnostics,
    report: HydrationReport,
}

impl Hydrator<'_> {
    fn children(&mut self, parent: &NodePath, existing: &[DomId], nodes: &[Node]) {
        for (index, node) in nodes.iter().enumerate() {
            let path = parent.child(index);
            let found = existing
                .get(index)
                .and_then(|&id| self.dom.get(id).map(|data| (id, data)));
            match found {
                Some((id, data)) if adoptable(data, node, &path) => self.adopt(&path, id, data, node),
                Some((_, data)) => {
                    self.mismatch(&path, node.kind().label(), describe(data));
                    self.report.patches.push(Patch::Remove {
                        parent: parent.clone(),
                        index,
                    });
                    self.mount(parent, index, node);
                }
                None => {
                    self.mismatch(&path, node.kind().label(), "nothing".into());
                    self.mount(parent, index, node);
                }
            }
        }

        for index in (nodes.len()..existing.len()).rev() {
            if let Some(data) = self.dom.get(existing[index]) {
                self.mismatch(&parent.child(index), "nothing", describe(data));
            }
            self.report.patches.push(Patch::Remove {
                parent: parent.clone(),
                index,
            });
        }
    }

    fn adopt(&mut self, path: &NodePath, id: DomId, data: &DomNode, node: &Node) {
        self.report.reused += 1;

        if let (NodeKind::Text { content: server }, NodeKind::Text { content: client }) =
            (&data.kind, node.kind())
        {
            if server != client {
                self.report.patches.push(Patch::ReplaceText {
                    node: path.clone(),
                    content: client.clone(),
                });
            }
        }

        for property in node.properties().iter() {
            let key = property.key();
            let server = data.properties.get(&key);
            let unchanged = match server {
                Some(server) => server == property,
                None => property.is_absent_in_markup(),
            };
            if !unchanged {
                self.report.patches.push(Patch::SetProperty {
                    node: path.clone(),
                    property: property.clone(),
                });
            }
        }
        for key in data.properties.keys() {
            if !node.properties().contains(key) {
                self.report.patches.push(Patch::RemoveProperty {
                    node: path.clone(),
                    key: key.clone(),
                });
            }
        }

        if data.gestures.as_slice() != node.gestures() {
            self.report.patches.push(Patch::ReplaceGestures {
                node: path.clone(),
                gestures: node.gestures().to_vec(),
            });
        }

        self.children(path, self.dom.children(id), node.children());
    }

    fn mount(&mut self, parent: &NodePath, index: usize, node: &Node) {
        self.report.patches.push(Patch::Insert {
            parent: parent.clone(),
            index,
            node: node.clone(),
        });
    }

    fn mismatch(&mut self, path: &NodePath, expected: &str, found: String) {
        self.report.mismatches += 1;
        self.diagnostics.record(Diagnostic::HydrationMismatch {
            path: path.clone(),
            expected: expected.to_owned(),
            found,
        });
    }
}

/// Same kind/tag, and for elements and fragments a marker that is either
/// missing or names `path`.
fn adoptable(data: &DomNode, node: &Node, path: &NodePath) -> bool {
    if !data.kind.same_shape(node.kind()) {
        return false;
    }
    match (&data.kind, &data.marker) {
        (NodeKind::Text { .. }, _) | (_, None) => true,
        (_, Some(marker)) => marker.parse::<NodePath>().is_ok_and(|m| m == *path),
    }
}

fn describe(data: &DomNode) -> String {
    match &data.marker {
        Some(marker) if !data.is_text() => format!("{} (marker {marker})", data.kind.label()),
        _ => data.kind.label().to_owned(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
