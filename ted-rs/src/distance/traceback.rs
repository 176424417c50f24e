//! Alignment recovery from the completed DP tables.
//!
//! The traceback walks each forest-alignment table backward from its final
//! cell, picking the branch that reproduces the stored minimum. Ties are
//! broken with a fixed preference, match/relabel over delete over insert,
//! so repeated runs emit byte-identical operation sequences. The walk uses
//! an explicit work stack and emits operations in document order: a node
//! before its children, aligned siblings left to right.

use crate::cost::CostModel;
use crate::distance::engine::{fill_forest_table, DpTables};
use crate::tree::NodeId;

/// A single edit in the alignment between two trees.
///
/// Node references are arena ids into the source or target tree the
/// comparison ran over.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOperation {
    /// Nodes are equivalent under the active cost model.
    Match {
        /// Source-side node.
        source: NodeId,
        /// Target-side node.
        target: NodeId,
    },
    /// Same position, differing label; `cost` is the label distance.
    Relabel {
        /// Source-side node.
        source: NodeId,
        /// Target-side node.
        target: NodeId,
        /// Label distance charged by the cost model.
        cost: f64,
    },
    /// Node present only in the source tree.
    Delete {
        /// Source-side node.
        source: NodeId,
        /// Per-node delete cost.
        cost: f64,
    },
    /// Node present only in the target tree.
    Insert {
        /// Target-side node.
        target: NodeId,
        /// Per-node insert cost.
        cost: f64,
    },
}

impl EditOperation {
    /// Returns the cost this operation contributes to the total distance.
    pub fn cost(&self) -> f64 {
        match self {
            EditOperation::Match { .. } => 0.0,
            EditOperation::Relabel { cost, .. } => *cost,
            EditOperation::Delete { cost, .. } => *cost,
            EditOperation::Insert { cost, .. } => *cost,
        }
    }

    /// Returns the source-side node, if the operation has one.
    pub fn source(&self) -> Option<NodeId> {
        match self {
            EditOperation::Match { source, .. }
            | EditOperation::Relabel { source, .. }
            | EditOperation::Delete { source, .. } => Some(*source),
            EditOperation::Insert { .. } => None,
        }
    }

    /// Returns the target-side node, if the operation has one.
    pub fn target(&self) -> Option<NodeId> {
        match self {
            EditOperation::Match { target, .. }
            | EditOperation::Relabel { target, .. }
            | EditOperation::Insert { target, .. } => Some(*target),
            EditOperation::Delete { .. } => None,
        }
    }
}

/// One step of a forest alignment, in left-to-right order.
enum ForestStep {
    /// Subtrees aligned; recurse into the pair.
    Aligned(NodeId, NodeId),
    /// Source subtree dropped.
    Dropped(NodeId),
    /// Target subtree added.
    Added(NodeId),
}

/// Pending traceback work.
enum Job {
    Pair { source: NodeId, target: NodeId },
    Forest { src: Vec<NodeId>, tgt: Vec<NodeId> },
    DeleteTree(NodeId),
    InsertTree(NodeId),
}

/// Recovers the operation sequence for the alignment of two root forests.
pub(crate) fn trace(
    tables: &DpTables<'_>,
    cost: &mut dyn CostModel,
    src_forest: &[NodeId],
    tgt_forest: &[NodeId],
) -> Vec<EditOperation> {
    let mut operations = Vec::new();
    let mut jobs = vec![Job::Forest {
        src: src_forest.to_vec(),
        tgt: tgt_forest.to_vec(),
    }];

    while let Some(job) = jobs.pop() {
        match job {
            Job::Pair { source, target } => {
                let relabel = cost.relabel(tables.source.node(source), tables.target.node(target));
                if relabel == 0.0 {
                    operations.push(EditOperation::Match { source, target });
                } else {
                    operations.push(EditOperation::Relabel {
                        source,
                        target,
                        cost: relabel,
                    });
                }
                jobs.push(Job::Forest {
                    src: tables.source.node(source).children().to_vec(),
                    tgt: tables.target.node(target).children().to_vec(),
                });
            }
            Job::Forest { src, tgt } => {
                let steps = walk_forest(tables, &src, &tgt);
                // LIFO stack: push in reverse so the leftmost step runs first.
                for step in steps.into_iter().rev() {
                    jobs.push(match step {
                        ForestStep::Aligned(s, t) => Job::Pair {
                            source: s,
                            target: t,
                        },
                        ForestStep::Dropped(s) => Job::DeleteTree(s),
                        ForestStep::Added(t) => Job::InsertTree(t),
                    });
                }
            }
            Job::DeleteTree(id) => {
                for node_id in tables.source.preorder_of(id) {
                    operations.push(EditOperation::Delete {
                        source: node_id,
                        cost: cost.delete(tables.source.node(node_id)),
                    });
                }
            }
            Job::InsertTree(id) => {
                for node_id in tables.target.preorder_of(id) {
                    operations.push(EditOperation::Insert {
                        target: node_id,
                        cost: cost.insert(tables.target.node(node_id)),
                    });
                }
            }
        }
    }

    operations
}

/// Walks one forest table backward, returning the steps in forward order.
///
/// Branch checks recompute the exact expressions used to fill the table, so
/// equality against the stored minimum is bit-for-bit and the preference
/// order decides every tie.
fn walk_forest(tables: &DpTables<'_>, src: &[NodeId], tgt: &[NodeId]) -> Vec<ForestStep> {
    let m = src.len();
    let n = tgt.len();
    let width = n + 1;
    let fd = fill_forest_table(tables, src, tgt);

    let mut steps = Vec::with_capacity(m + n);
    let (mut p, mut q) = (m, n);
    while p > 0 || q > 0 {
        let here = fd[p * width + q];

        if p > 0 && q > 0 {
            let sp = tables.source.pos_of(src[p - 1]);
            let tq = tables.target.pos_of(tgt[q - 1]);
            if here == fd[(p - 1) * width + q - 1] + tables.tree_dist(sp, tq) {
                steps.push(ForestStep::Aligned(src[p - 1], tgt[q - 1]));
                p -= 1;
                q -= 1;
                continue;
            }
        }
        if p > 0 {
            let sp = tables.source.pos_of(src[p - 1]);
            if here == fd[(p - 1) * width + q] + tables.del_subtree(sp) {
                steps.push(ForestStep::Dropped(src[p - 1]));
                p -= 1;
                continue;
            }
        }
        debug_assert!(q > 0, "forest traceback left the table");
        steps.push(ForestStep::Added(tgt[q - 1]));
        q -= 1;
    }

    steps.reverse();
    steps
}
