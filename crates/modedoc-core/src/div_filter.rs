//! Mode filter for div containers
//!
//! Every `div` in the tree is classified against the active mode by its
//! `class` attribute:
//!
//! - `class` names the mode: the div is lifted, i.e. replaced in its
//!   parent by its own children, in order;
//! - anything else (another mode, an unknown class, no class at all): the
//!   div and its whole subtree are removed.
//!
//! Rewriting happens in two sweeps over the owned tree, removals first and
//! lifts second, so no child list is edited while it is being walked.
//! Afterwards no div remains at any depth and the surviving nodes keep
//! their original relative order. The filter never fails.

use tracing::debug;

use modedoc_ast::{Node, NodeKind};

use crate::mode::Mode;

/// What the filter does with a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Not a container; left in place
    Keep,
    /// Matching container; replaced by its children
    Lift,
    /// Non-matching container; deleted with its subtree
    Remove,
}

/// Classify a single node against `mode`
pub fn classify(node: &Node, mode: Mode) -> Disposition {
    match &node.kind {
        NodeKind::Div { class, .. } if mode.matches_class(class.as_deref()) => Disposition::Lift,
        NodeKind::Div { .. } => Disposition::Remove,
        _ => Disposition::Keep,
    }
}

/// Counts of containers handled by one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Containers dissolved into their children
    pub lifted: usize,
    /// Containers deleted; divs nested inside a deleted div are not counted
    pub removed: usize,
}

/// Div filter for one active mode
#[derive(Debug, Clone, Copy)]
pub struct DivFilter {
    mode: Mode,
}

impl DivFilter {
    /// Create a filter for `mode`
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// Rewrite `tree`, returning the new tree and what was done
    ///
    /// If the tree's root is itself a div it is filtered like any other
    /// container, and the result is a `root` holding what survives.
    pub fn apply(&self, tree: Node) -> (Node, FilterReport) {
        let mut tree = if tree.is_div() {
            let position = tree.position;
            let mut root = Node::root(vec![tree]);
            root.position = position;
            root
        } else {
            tree
        };

        let mut report = FilterReport::default();
        self.sweep_removed(&mut tree, &mut report);
        self.sweep_lifted(&mut tree, &mut report);

        debug!(
            mode = %self.mode,
            lifted = report.lifted,
            removed = report.removed,
            "div filter applied"
        );
        (tree, report)
    }

    fn sweep_removed(&self, node: &mut Node, report: &mut FilterReport) {
        let mode = self.mode;
        let Some(children) = node.children_mut() else {
            return;
        };
        children.retain(|child| {
            let keep = classify(child, mode) != Disposition::Remove;
            if !keep {
                report.removed += 1;
            }
            keep
        });
        for child in children.iter_mut() {
            self.sweep_removed(child, report);
        }
    }

    fn sweep_lifted(&self, node: &mut Node, report: &mut FilterReport) {
        let Some(children) = node.children_mut() else {
            return;
        };
        let original = std::mem::take(children);
        let mut rebuilt = Vec::with_capacity(original.len());
        for mut child in original {
            // Inner lifts first, so a lifted div contributes already-flattened children.
            self.sweep_lifted(&mut child, report);
            if classify(&child, self.mode) == Disposition::Lift {
                report.lifted += 1;
                rebuilt.extend(child.take_children());
            } else {
                rebuilt.push(child);
            }
        }
        *children = rebuilt;
    }
}

/// Filter `tree` for `mode`, discarding the report
pub fn filter_divs(tree: Node, mode: Mode) -> Node {
    DivFilter::new(mode).apply(tree).0
}
