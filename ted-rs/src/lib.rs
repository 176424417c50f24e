//! XML tree edit distance and change reporting.
//!
//! This library compares two XML documents as ordered labeled trees and
//! produces an exact minimum edit cost, a normalized similarity score, and
//! the operation sequence realizing the alignment.
//!
//! # Overview
//!
//! Documents are parsed into arena-indexed trees with a postorder index.
//! A dynamic program over subtree pairs computes the distance under one of
//! two cost models:
//!
//! - `structural` compares shape and tag names only.
//! - `content-aware` also grades attribute and text differences, nesting a
//!   sequence edit distance over text inside the node relabel cost.
//!
//! Traceback over the DP tables recovers a complete operation sequence
//! (match, relabel, delete, insert) whose costs sum to the distance; the
//! report builder turns it into a serializable result with a similarity
//! score in `[0, 1]`.
//!
//! # Example
//!
//! ```
//! use xml_ted::{Algorithm, ComparisonReport, DistanceEngine};
//!
//! let source = xml_ted::parse_str("<a><b>x</b></a>")?;
//! let target = xml_ted::parse_str("<a><b>y</b></a>")?;
//!
//! let mut engine = DistanceEngine::new(Algorithm::ContentAware);
//! let comparison = engine.compare(&source, &target);
//! let report = ComparisonReport::build(Algorithm::ContentAware, &source, &target, &comparison);
//!
//! assert!(report.distance > 0.0);
//! assert!(report.similarity < 1.0);
//! # Ok::<(), xml_ted::Error>(())
//! ```

pub mod constants;
pub mod cost;
pub mod distance;
pub mod error;
pub mod patch;
pub mod pipeline;
pub mod report;
pub mod text;
pub mod tree;
pub mod xml;

// Re-export commonly used types
pub use cost::{ContentCost, ContentWeights, CostModel, StructuralCost};
pub use distance::{Algorithm, Comparison, DistanceEngine, EditOperation};
pub use error::{Error, Result};
pub use pipeline::{
    compare_documents, compare_with_dataset, DatasetFailure, DatasetRun, DocumentComparison,
};
pub use report::{ComparisonReport, NodeCounts, OperationGroup, OperationKind, OperationRecord};
pub use tree::{Label, LabelDelta, LabelFingerprint, Node, NodeId, Tree, TreeBuilder, TreeStats};
pub use xml::{parse_file, parse_str, print_to_string, print_to_string_pretty, XmlPrinter};
