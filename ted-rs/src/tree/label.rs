//! Node labels and label fingerprints.
//!
//! A node's label is the triple of tag name, sorted attributes, and text
//! content. Labels are what the cost models compare; the fingerprint gives
//! an O(1) equality check per component so the hot DP loop never walks
//! strings for identical labels.

use bitflags::bitflags;
use md5::{Digest, Md5};

bitflags! {
    /// Which label components differ between two nodes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LabelDelta: u8 {
        /// Tag names differ.
        const TAG = 1;
        /// Attribute sets differ.
        const ATTRS = 2;
        /// Text content differs.
        const TEXT = 4;
    }
}

/// Borrowed view of a node's comparable label.
///
/// `text` is the empty string when the node has no text content; absent and
/// empty text compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label<'a> {
    /// Element tag name.
    pub tag: &'a str,
    /// Attributes, sorted by name.
    pub attributes: &'a [(String, String)],
    /// Text content, or `""`.
    pub text: &'a str,
}

/// Per-component md5 digests of a label, truncated to 128 bits each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelFingerprint {
    tag: u128,
    attrs: u128,
    text: u128,
}

impl LabelFingerprint {
    /// Computes the fingerprint of a label. Attributes must already be
    /// sorted by name.
    pub fn compute(tag: &str, attributes: &[(String, String)], text: Option<&str>) -> Self {
        let mut attr_hasher = Md5::new();
        for (name, value) in attributes {
            attr_hasher.update(name.as_bytes());
            attr_hasher.update([0u8]);
            attr_hasher.update(value.as_bytes());
            attr_hasher.update([0u8]);
        }

        LabelFingerprint {
            tag: digest_str(tag),
            attrs: u128::from_le_bytes(attr_hasher.finalize().into()),
            text: digest_str(text.unwrap_or("")),
        }
    }

    /// Returns the text component digest, used as a memo key for text
    /// distance computations.
    pub fn text_digest(&self) -> u128 {
        self.text
    }

    /// True when every label component matches.
    pub fn content_equals(&self, other: &LabelFingerprint) -> bool {
        self.delta(other).is_empty()
    }

    /// Returns the set of components that differ between the two labels.
    pub fn delta(&self, other: &LabelFingerprint) -> LabelDelta {
        let mut delta = LabelDelta::empty();
        if self.tag != other.tag {
            delta |= LabelDelta::TAG;
        }
        if self.attrs != other.attrs {
            delta |= LabelDelta::ATTRS;
        }
        if self.text != other.text {
            delta |= LabelDelta::TEXT;
        }
        delta
    }
}

fn digest_str(s: &str) -> u128 {
    let mut hasher = Md5::new();
    hasher.update(s.as_bytes());
    u128::from_le_bytes(hasher.finalize().into())
}
