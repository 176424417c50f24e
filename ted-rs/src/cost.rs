//! Pluggable edit cost models.
//!
//! The distance engine is written against the [`CostModel`] trait; the two
//! comparison algorithms differ only in which implementation they inject.
//! Both charge one unit per inserted or deleted node and differ in how a
//! relabel is priced.

use crate::constants::{ATTR_WEIGHT, RELABEL_CAP, TAG_WEIGHT, TEXT_WEIGHT, UNIT_COST};
use crate::text::TextDistance;
use crate::tree::{LabelDelta, Node};

/// Insert, delete, and relabel costs for single nodes.
///
/// Implementations must be pure and deterministic. Symmetry is not required;
/// the DP picks the minimum regardless.
pub trait CostModel {
    /// Cost of deleting `node` from the source tree.
    fn delete(&self, node: &Node) -> f64;

    /// Cost of inserting `node` from the target tree.
    fn insert(&self, node: &Node) -> f64;

    /// Cost of relabeling `source` into `target` in place.
    ///
    /// Takes `&mut self` so implementations may memoize expensive
    /// sub-distances.
    fn relabel(&mut self, source: &Node, target: &Node) -> f64;
}

/// Structure-only costs: a relabel is free when the tags match and one unit
/// otherwise. Attributes and text never influence the cost (they are still
/// carried on the nodes for reporting).
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralCost;

impl CostModel for StructuralCost {
    fn delete(&self, _node: &Node) -> f64 {
        UNIT_COST
    }

    fn insert(&self, _node: &Node) -> f64 {
        UNIT_COST
    }

    fn relabel(&mut self, source: &Node, target: &Node) -> f64 {
        if source.tag() == target.tag() {
            0.0
        } else {
            UNIT_COST
        }
    }
}

/// Weights for the content-aware relabel cost.
///
/// The defaults make a tag mismatch dominate: relabeling across tags costs
/// at least a full unit, while text-only or attribute-only changes cost at
/// most half a unit each. `cap` bounds the total so delete plus insert
/// remains a viable fallback.
#[derive(Debug, Clone, Copy)]
pub struct ContentWeights {
    /// Charged when tags differ.
    pub tag: f64,
    /// Charged when attribute sets differ.
    pub attributes: f64,
    /// Scaled by the normalized text distance when texts differ.
    pub text: f64,
    /// Upper bound on the summed relabel cost.
    pub cap: f64,
}

impl Default for ContentWeights {
    fn default() -> Self {
        ContentWeights {
            tag: TAG_WEIGHT,
            attributes: ATTR_WEIGHT,
            text: TEXT_WEIGHT,
            cap: RELABEL_CAP,
        }
    }
}

/// Content-aware costs: a relabel is free only when tag, attributes, and
/// text all match; otherwise it is a weighted sum of the differing
/// components, with text graded by a nested sequence edit distance.
pub struct ContentCost {
    weights: ContentWeights,
    text_distance: TextDistance,
}

impl Default for ContentCost {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentCost {
    /// Creates a content-aware cost model with the default weights.
    pub fn new() -> Self {
        Self::with_weights(ContentWeights::default())
    }

    /// Creates a content-aware cost model with custom weights.
    pub fn with_weights(weights: ContentWeights) -> Self {
        ContentCost {
            weights,
            text_distance: TextDistance::new(),
        }
    }
}

impl CostModel for ContentCost {
    fn delete(&self, _node: &Node) -> f64 {
        UNIT_COST
    }

    fn insert(&self, _node: &Node) -> f64 {
        UNIT_COST
    }

    fn relabel(&mut self, source: &Node, target: &Node) -> f64 {
        let delta = source.fingerprint().delta(target.fingerprint());
        if delta.is_empty() {
            return 0.0;
        }

        let mut cost = 0.0;
        if delta.contains(LabelDelta::TAG) {
            cost += self.weights.tag;
        }
        if delta.contains(LabelDelta::ATTRS) {
            cost += self.weights.attributes;
        }
        if delta.contains(LabelDelta::TEXT) {
            let key = (
                source.fingerprint().text_digest(),
                target.fingerprint().text_digest(),
            );
            let text_a = source.text().unwrap_or("");
            let text_b = target.text().unwrap_or("");
            cost += self.weights.text * self.text_distance.normalized(text_a, text_b, key);
        }

        cost.min(self.weights.cap)
    }
}
