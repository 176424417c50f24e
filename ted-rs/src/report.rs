//! Comparison reports.
//!
//! Turns a raw distance and operation sequence into a normalized similarity
//! score and a structured, serializable diff. The report is the only object
//! handed to writers; it is built whole or not at all.

use serde::Serialize;

use crate::distance::{Algorithm, Comparison, EditOperation};
use crate::tree::{NodeId, Tree, TreeStats};

/// Normalizes a raw distance into a similarity score in `[0, 1]`.
///
/// The denominator is the combined node count, the cost of deleting one
/// tree and inserting the other, floored at 1 so two empty trees score 1.0.
pub fn similarity(distance: f64, source_nodes: usize, target_nodes: usize) -> f64 {
    let denominator = (source_nodes + target_nodes).max(1) as f64;
    (1.0 - distance / denominator).clamp(0.0, 1.0)
}

/// Presentation group of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationGroup {
    /// Zero-cost alignment: unchanged nodes, or label differences the
    /// active cost model does not price.
    Matched,
    /// Cost-bearing relabels.
    Changed,
    /// Inserts and deletes.
    Structural,
}

/// Operation kind in the serialized report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Match,
    Relabel,
    Delete,
    Insert,
}

/// One side of an operation in the serialized report.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    /// Postorder index in the owning tree.
    pub index: usize,
    /// Element tag name.
    pub tag: String,
}

/// A serializable operation record, in traceback emission order.
#[derive(Debug, Clone, Serialize)]
pub struct OperationRecord {
    pub kind: OperationKind,
    pub group: OperationGroup,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<NodeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeSummary>,
    pub cost: f64,
}

/// Node counts of the two compared trees.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NodeCounts {
    pub source: usize,
    pub target: usize,
}

/// The complete result of one comparison.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    /// Algorithm selector string.
    pub algorithm: String,
    /// Raw minimum edit cost.
    pub distance: f64,
    /// Normalized similarity in `[0, 1]`.
    pub similarity: f64,
    /// Node counts of both trees.
    pub node_counts: NodeCounts,
    /// Source tree statistics.
    pub source_stats: TreeStats,
    /// Target tree statistics.
    pub target_stats: TreeStats,
    /// All operations, in traceback emission order.
    pub operations: Vec<OperationRecord>,
}

impl ComparisonReport {
    /// Builds the report for a finished comparison.
    pub fn build(
        algorithm: Algorithm,
        source: &Tree,
        target: &Tree,
        comparison: &Comparison,
    ) -> Self {
        let operations = comparison
            .operations
            .iter()
            .map(|op| operation_record(op, source, target))
            .collect();

        ComparisonReport {
            algorithm: algorithm.as_str().to_string(),
            distance: comparison.distance,
            similarity: similarity(comparison.distance, source.node_count(), target.node_count()),
            node_counts: NodeCounts {
                source: source.node_count(),
                target: target.node_count(),
            },
            source_stats: source.stats(),
            target_stats: target.stats(),
            operations,
        }
    }

    /// Number of non-matched operations, the size of the edit script proper.
    pub fn edit_script_size(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| op.group != OperationGroup::Matched)
            .count()
    }

    /// Operations in the given presentation group.
    pub fn group(&self, group: OperationGroup) -> impl Iterator<Item = &OperationRecord> {
        self.operations.iter().filter(move |op| op.group == group)
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable diff lines, one per non-matched operation, in
    /// emission order.
    pub fn diff_lines(&self) -> Vec<String> {
        self.operations
            .iter()
            .filter(|op| op.group != OperationGroup::Matched)
            .map(|op| match op.kind {
                OperationKind::Relabel | OperationKind::Match => format!(
                    "Update: {} -> {}",
                    describe(op.source.as_ref()),
                    describe(op.target.as_ref())
                ),
                OperationKind::Delete => format!("Delete: {}", describe(op.source.as_ref())),
                OperationKind::Insert => format!("Insert: {}", describe(op.target.as_ref())),
            })
            .collect()
    }
}

fn describe(summary: Option<&NodeSummary>) -> String {
    match summary {
        Some(s) => format!("<{}> [{}]", s.tag, s.index),
        None => "-".to_string(),
    }
}

fn operation_record(op: &EditOperation, source: &Tree, target: &Tree) -> OperationRecord {
    let summarize = |tree: &Tree, id: NodeId| NodeSummary {
        index: tree.pos_of(id),
        tag: tree.node(id).tag().to_string(),
    };

    let (kind, group) = match op {
        EditOperation::Match { .. } => (OperationKind::Match, OperationGroup::Matched),
        EditOperation::Relabel { .. } => (OperationKind::Relabel, OperationGroup::Changed),
        EditOperation::Delete { .. } => (OperationKind::Delete, OperationGroup::Structural),
        EditOperation::Insert { .. } => (OperationKind::Insert, OperationGroup::Structural),
    };

    OperationRecord {
        kind,
        group,
        source: op.source().map(|id| summarize(source, id)),
        target: op.target().map(|id| summarize(target, id)),
        cost: op.cost(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceEngine;
    use crate::xml::parse_str;

    fn report_for(algorithm: Algorithm, src: &str, tgt: &str) -> ComparisonReport {
        let source = parse_str(src).unwrap();
        let target = parse_str(tgt).unwrap();
        let comparison = DistanceEngine::new(algorithm).compare(&source, &target);
        ComparisonReport::build(algorithm, &source, &target, &comparison)
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity(0.0, 0, 0), 1.0);
        assert_eq!(similarity(0.0, 3, 3), 1.0);
        assert_eq!(similarity(6.0, 3, 3), 0.0);
        assert_eq!(similarity(10.0, 2, 2), 0.0);
        let mid = similarity(3.0, 3, 3);
        assert!((mid - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_identity_report() {
        let report = report_for(Algorithm::ContentAware, "<a><b>x</b></a>", "<a><b>x</b></a>");
        assert_eq!(report.distance, 0.0);
        assert_eq!(report.similarity, 1.0);
        assert_eq!(report.edit_script_size(), 0);
        assert!(report.diff_lines().is_empty());
    }

    #[test]
    fn test_partition_groups() {
        let report = report_for(
            Algorithm::ContentAware,
            "<r><a>x</a><b/></r>",
            "<r><a>y</a></r>",
        );
        let matched = report.group(OperationGroup::Matched).count();
        let changed = report.group(OperationGroup::Changed).count();
        let structural = report.group(OperationGroup::Structural).count();
        assert_eq!(matched, 1); // <r>
        assert_eq!(changed, 1); // <a> text change
        assert_eq!(structural, 1); // <b> deleted
        assert_eq!(matched + changed + structural, report.operations.len());
    }

    #[test]
    fn test_empty_target_similarity_zero() {
        let source = parse_str("<a><b/><c/></a>").unwrap();
        let target = crate::tree::Tree::empty();
        let comparison =
            DistanceEngine::new(Algorithm::Structural).compare(&source, &target);
        let report =
            ComparisonReport::build(Algorithm::Structural, &source, &target, &comparison);
        assert_eq!(report.distance, 3.0);
        assert_eq!(report.similarity, 0.0);
        assert_eq!(report.edit_script_size(), 3);
    }

    #[test]
    fn test_diff_lines_format() {
        let report = report_for(Algorithm::Structural, "<r><a/></r>", "<r><b/></r>");
        let lines = report.diff_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Update: <a>"), "{}", lines[0]);
        assert!(lines[0].contains("-> <b>"), "{}", lines[0]);
    }

    #[test]
    fn test_to_json() {
        let report = report_for(Algorithm::Structural, "<a/>", "<a/>");
        let json = report.to_json().unwrap();
        assert!(json.contains("\"similarity\": 1.0"));
    }

    #[test]
    fn test_serialized_shape() {
        let report = report_for(Algorithm::Structural, "<a/>", "<b/>");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["algorithm"], "structural");
        assert_eq!(value["node_counts"]["source"], 1);
        assert_eq!(value["node_counts"]["target"], 1);
        assert_eq!(value["operations"][0]["kind"], "relabel");
        assert_eq!(value["operations"][0]["group"], "changed");
        assert!(value["source_stats"]["total_nodes"].is_number());
    }
}
