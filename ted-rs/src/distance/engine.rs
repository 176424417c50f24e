//! The dynamic-programming distance engine.
//!
//! Distances are tabulated over postorder positions: for every pair of
//! subtrees `(i, j)` the engine records the minimum cost of transforming
//! one into the other. A subtree match costs the root relabel plus the
//! distance between the two child forests; the forest distance is itself a
//! sequence alignment over sibling subtrees where dropping a subtree costs
//! the sum of its per-node delete (or insert) costs. Child pairs always
//! precede their parents in postorder, so a single increasing sweep fills
//! the whole table.

use tracing::debug;

use crate::cost::CostModel;
use crate::distance::traceback::{self, EditOperation};
use crate::distance::Algorithm;
use crate::tree::{NodeId, Tree};

/// Result of one comparison: the exact distance and the operation sequence
/// realizing it.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Minimum edit cost between the two trees.
    pub distance: f64,
    /// Alignment operations in document order; their costs sum to `distance`.
    pub operations: Vec<EditOperation>,
}

/// Tree edit distance engine for a fixed algorithm.
///
/// The engine owns its cost model, so independent comparisons with
/// different modes can run in the same process without shared state.
pub struct DistanceEngine {
    algorithm: Algorithm,
    cost: Box<dyn CostModel>,
}

impl DistanceEngine {
    /// Creates an engine for the given algorithm.
    pub fn new(algorithm: Algorithm) -> Self {
        DistanceEngine {
            algorithm,
            cost: algorithm.cost_model(),
        }
    }

    /// Returns the algorithm this engine runs.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Compares two trees, returning the distance and the full operation
    /// sequence.
    ///
    /// Deterministic: identical inputs produce identical operation
    /// sequences on every run. Empty trees are valid inputs; comparing two
    /// empty trees yields distance zero and no operations.
    pub fn compare(&mut self, source: &Tree, target: &Tree) -> Comparison {
        let tables = DpTables::fill(source, target, self.cost.as_mut());

        let src_forest: Vec<NodeId> = source.root().into_iter().collect();
        let tgt_forest: Vec<NodeId> = target.root().into_iter().collect();

        let distance = forest_distance(&tables, &src_forest, &tgt_forest);
        let operations =
            traceback::trace(&tables, self.cost.as_mut(), &src_forest, &tgt_forest);

        debug_assert!(
            (operations.iter().map(EditOperation::cost).sum::<f64>() - distance).abs() < 1e-9,
            "operation costs must sum to the table distance"
        );

        Comparison {
            distance,
            operations,
        }
    }
}

/// Filled DP state shared by the distance sweep and the traceback.
pub(crate) struct DpTables<'a> {
    pub(crate) source: &'a Tree,
    pub(crate) target: &'a Tree,
    /// Subtree-pair distances, indexed `i * target_len + j` over postorder
    /// positions. Sized once up front.
    dist: Vec<f64>,
    /// Prefix sums of per-node delete costs over source postorder.
    del_prefix: Vec<f64>,
    /// Prefix sums of per-node insert costs over target postorder.
    ins_prefix: Vec<f64>,
}

impl<'a> DpTables<'a> {
    fn fill(source: &'a Tree, target: &'a Tree, cost: &mut dyn CostModel) -> Self {
        let n1 = source.node_count();
        let n2 = target.node_count();
        debug!(source_nodes = n1, target_nodes = n2, "filling distance table");

        let mut del_prefix = vec![0.0; n1 + 1];
        for i in 0..n1 {
            del_prefix[i + 1] = del_prefix[i] + cost.delete(source.node_at(i));
        }
        let mut ins_prefix = vec![0.0; n2 + 1];
        for j in 0..n2 {
            ins_prefix[j + 1] = ins_prefix[j] + cost.insert(target.node_at(j));
        }

        let mut tables = DpTables {
            source,
            target,
            dist: vec![0.0; n1 * n2],
            del_prefix,
            ins_prefix,
        };

        for i in 0..n1 {
            for j in 0..n2 {
                let relabel = cost.relabel(source.node_at(i), target.node_at(j));
                let forest = forest_distance(
                    &tables,
                    source.node_at(i).children(),
                    target.node_at(j).children(),
                );
                tables.dist[i * n2 + j] = relabel + forest;
            }
        }

        tables
    }

    /// Distance between the subtrees at source postorder position `i` and
    /// target postorder position `j`.
    pub(crate) fn tree_dist(&self, i: usize, j: usize) -> f64 {
        self.dist[i * self.target.node_count() + j]
    }

    /// Summed delete cost of the source subtree at postorder position `pos`.
    /// The subtree spans `leftmost(pos)..=pos`, so the prefix sums answer in
    /// O(1).
    pub(crate) fn del_subtree(&self, pos: usize) -> f64 {
        self.del_prefix[pos + 1] - self.del_prefix[self.source.leftmost(pos)]
    }

    /// Summed insert cost of the target subtree at postorder position `pos`.
    pub(crate) fn ins_subtree(&self, pos: usize) -> f64 {
        self.ins_prefix[pos + 1] - self.ins_prefix[self.target.leftmost(pos)]
    }
}

/// Fills the sequence-alignment table for two sibling-subtree forests and
/// returns it. Cell `(p, q)` holds the distance between the first `p`
/// source subtrees and the first `q` target subtrees; index with
/// `p * (tgt.len() + 1) + q`.
pub(crate) fn fill_forest_table(
    tables: &DpTables<'_>,
    src: &[NodeId],
    tgt: &[NodeId],
) -> Vec<f64> {
    let m = src.len();
    let n = tgt.len();
    let width = n + 1;
    let mut fd = vec![0.0; (m + 1) * width];

    for p in 1..=m {
        let sp = tables.source.pos_of(src[p - 1]);
        fd[p * width] = fd[(p - 1) * width] + tables.del_subtree(sp);
    }
    for q in 1..=n {
        let tq = tables.target.pos_of(tgt[q - 1]);
        fd[q] = fd[q - 1] + tables.ins_subtree(tq);
    }

    for p in 1..=m {
        let sp = tables.source.pos_of(src[p - 1]);
        for q in 1..=n {
            let tq = tables.target.pos_of(tgt[q - 1]);
            let matched = fd[(p - 1) * width + q - 1] + tables.tree_dist(sp, tq);
            let deleted = fd[(p - 1) * width + q] + tables.del_subtree(sp);
            let inserted = fd[p * width + q - 1] + tables.ins_subtree(tq);
            fd[p * width + q] = matched.min(deleted).min(inserted);
        }
    }

    fd
}

/// Distance between two ordered forests of sibling subtrees.
pub(crate) fn forest_distance(tables: &DpTables<'_>, src: &[NodeId], tgt: &[NodeId]) -> f64 {
    let fd = fill_forest_table(tables, src, tgt);
    fd[fd.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    fn engine(algorithm: Algorithm) -> DistanceEngine {
        DistanceEngine::new(algorithm)
    }

    fn total_cost(comparison: &Comparison) -> f64 {
        comparison.operations.iter().map(EditOperation::cost).sum()
    }

    #[test]
    fn test_identity_both_algorithms() {
        let xml = r#"<doc a="1"><section><para>some text here</para></section><section/></doc>"#;
        for algorithm in [Algorithm::Structural, Algorithm::ContentAware] {
            let tree = parse_str(xml).unwrap();
            let result = engine(algorithm).compare(&tree, &tree);
            assert_eq!(result.distance, 0.0, "{algorithm} identity");
            assert!(result
                .operations
                .iter()
                .all(|op| matches!(op, EditOperation::Match { .. })));
        }
    }

    #[test]
    fn test_both_empty() {
        let empty = crate::tree::Tree::empty();
        let result = engine(Algorithm::Structural).compare(&empty, &empty);
        assert_eq!(result.distance, 0.0);
        assert!(result.operations.is_empty());
    }

    #[test]
    fn test_empty_source_costs_all_inserts() {
        let empty = crate::tree::Tree::empty();
        let target = parse_str("<a><b/><c/></a>").unwrap();
        let result = engine(Algorithm::Structural).compare(&empty, &target);
        assert_eq!(result.distance, 3.0);
        assert_eq!(result.operations.len(), 3);
        assert!(result
            .operations
            .iter()
            .all(|op| matches!(op, EditOperation::Insert { .. })));
    }

    #[test]
    fn test_empty_target_costs_all_deletes() {
        let source = parse_str("<a><b/><c/></a>").unwrap();
        let empty = crate::tree::Tree::empty();
        let result = engine(Algorithm::ContentAware).compare(&source, &empty);
        assert_eq!(result.distance, 3.0);
        assert_eq!(result.operations.len(), 3);
        assert!(result
            .operations
            .iter()
            .all(|op| matches!(op, EditOperation::Delete { .. })));
    }

    #[test]
    fn test_single_nodes_relabel() {
        let source = parse_str("<a/>").unwrap();
        let target = parse_str("<b/>").unwrap();
        let result = engine(Algorithm::Structural).compare(&source, &target);
        assert_eq!(result.distance, 1.0);
        assert_eq!(result.operations.len(), 1);
        assert!(matches!(
            result.operations[0],
            EditOperation::Relabel { cost, .. } if cost == 1.0
        ));
    }

    #[test]
    fn test_text_change_invisible_to_structural() {
        let source = parse_str("<a><b>x</b></a>").unwrap();
        let target = parse_str("<a><b>y</b></a>").unwrap();
        let result = engine(Algorithm::Structural).compare(&source, &target);
        assert_eq!(result.distance, 0.0);
        assert!(result
            .operations
            .iter()
            .all(|op| matches!(op, EditOperation::Match { .. })));
    }

    #[test]
    fn test_text_change_visible_to_content_aware() {
        let source = parse_str("<a><b>x</b></a>").unwrap();
        let target = parse_str("<a><b>y</b></a>").unwrap();
        let result = engine(Algorithm::ContentAware).compare(&source, &target);
        assert!(result.distance > 0.0);

        let relabels: Vec<_> = result
            .operations
            .iter()
            .filter(|op| matches!(op, EditOperation::Relabel { .. }))
            .collect();
        assert_eq!(relabels.len(), 1);
        if let EditOperation::Relabel { source: s, .. } = relabels[0] {
            assert_eq!(source.node(*s).tag(), "b");
        }

        // The root stays matched.
        let matched: Vec<_> = result
            .operations
            .iter()
            .filter(|op| matches!(op, EditOperation::Match { .. }))
            .collect();
        assert_eq!(matched.len(), 1);
        if let EditOperation::Match { source: s, .. } = matched[0] {
            assert_eq!(source.node(*s).tag(), "a");
        }
    }

    #[test]
    fn test_subtree_insertion() {
        let source = parse_str("<a><b/></a>").unwrap();
        let target = parse_str("<a><b/><c><d/></c></a>").unwrap();
        let result = engine(Algorithm::Structural).compare(&source, &target);
        assert_eq!(result.distance, 2.0);
        let inserts = result
            .operations
            .iter()
            .filter(|op| matches!(op, EditOperation::Insert { .. }))
            .count();
        assert_eq!(inserts, 2);
    }

    #[test]
    fn test_cost_equals_operations() {
        let source = parse_str(r#"<r><x a="1">one</x><y>two words</y><z/></r>"#).unwrap();
        let target = parse_str(r#"<r><x a="2">one</x><w>two other</w></r>"#).unwrap();
        for algorithm in [Algorithm::Structural, Algorithm::ContentAware] {
            let result = engine(algorithm).compare(&source, &target);
            assert!(
                (total_cost(&result) - result.distance).abs() < 1e-9,
                "{algorithm}: {} vs {}",
                total_cost(&result),
                result.distance
            );
        }
    }

    #[test]
    fn test_coverage() {
        let source = parse_str("<r><a><b/></a><c>text</c></r>").unwrap();
        let target = parse_str("<r><c>text</c><d/><a/></r>").unwrap();
        for algorithm in [Algorithm::Structural, Algorithm::ContentAware] {
            let result = engine(algorithm).compare(&source, &target);

            let mut src_seen = vec![0usize; source.node_count()];
            let mut tgt_seen = vec![0usize; target.node_count()];
            for op in &result.operations {
                if let Some(id) = op.source() {
                    src_seen[id.index()] += 1;
                }
                if let Some(id) = op.target() {
                    tgt_seen[id.index()] += 1;
                }
            }
            assert!(src_seen.iter().all(|&c| c == 1), "{algorithm} source side");
            assert!(tgt_seen.iter().all(|&c| c == 1), "{algorithm} target side");
        }
    }

    #[test]
    fn test_distance_bounded_by_total_size() {
        let source = parse_str("<a><b>x</b><c/></a>").unwrap();
        let target = parse_str("<q><r/><s>y</s><t/></q>").unwrap();
        let bound = (source.node_count() + target.node_count()) as f64;
        for algorithm in [Algorithm::Structural, Algorithm::ContentAware] {
            let result = engine(algorithm).compare(&source, &target);
            assert!(result.distance <= bound, "{algorithm}");
        }
    }

    #[test]
    fn test_deterministic_operation_sequences() {
        let source = parse_str("<r><a/><a/><a/></r>").unwrap();
        let target = parse_str("<r><a/><a/></r>").unwrap();
        for algorithm in [Algorithm::Structural, Algorithm::ContentAware] {
            let first = engine(algorithm).compare(&source, &target);
            let second = engine(algorithm).compare(&source, &target);
            assert_eq!(first.operations, second.operations, "{algorithm}");
        }
    }

    #[test]
    fn test_tie_break_prefers_match_then_delete() {
        // Three identical subtrees against two: the alignment must keep two
        // matches and one delete, never a relabel-free insert/delete churn.
        let source = parse_str("<r><a/><a/><a/></r>").unwrap();
        let target = parse_str("<r><a/><a/></r>").unwrap();
        let result = engine(Algorithm::Structural).compare(&source, &target);
        assert_eq!(result.distance, 1.0);
        let deletes = result
            .operations
            .iter()
            .filter(|op| matches!(op, EditOperation::Delete { .. }))
            .count();
        assert_eq!(deletes, 1);
        let matches = result
            .operations
            .iter()
            .filter(|op| matches!(op, EditOperation::Match { .. }))
            .count();
        assert_eq!(matches, 3);
    }
}
