//! Tree edit distance computation.
//!
//! Two interchangeable algorithms share one dynamic-programming scaffold
//! and differ only in the injected [`CostModel`]:
//!
//! - [`Algorithm::Structural`] compares tree shape and tags only.
//! - [`Algorithm::ContentAware`] additionally grades attribute and text
//!   differences, folding a nested sequence edit distance over text into
//!   the relabel cost.
//!
//! [`CostModel`]: crate::cost::CostModel

mod engine;
mod traceback;

pub use engine::{Comparison, DistanceEngine};
pub use traceback::EditOperation;

use std::fmt;
use std::str::FromStr;

use crate::cost::{ContentCost, CostModel, StructuralCost};
use crate::error::Error;

/// Comparison algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Structure-only comparison: shape plus tag labels.
    Structural,
    /// Content-aware comparison: shape, tags, attributes, and text.
    ContentAware,
}

impl Algorithm {
    /// Returns the canonical selector string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Structural => "structural",
            Algorithm::ContentAware => "content-aware",
        }
    }

    /// Builds the cost model this algorithm runs with.
    pub(crate) fn cost_model(&self) -> Box<dyn CostModel> {
        match self {
            Algorithm::Structural => Box::new(StructuralCost),
            Algorithm::ContentAware => Box::new(ContentCost::new()),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "structural" => Ok(Algorithm::Structural),
            "content-aware" => Ok(Algorithm::ContentAware),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
