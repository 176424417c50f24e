//! Transformed-tree construction.
//!
//! Applying the operation sequence to the source tree yields the
//! "target-as-transformed" document: matched and relabeled nodes take the
//! target label, inserted subtrees appear, deleted subtrees are dropped.
//! Under an ordered alignment this is exactly the target tree, which is
//! what gets serialized for visual diffing.

use crate::distance::EditOperation;
use crate::error::{Error, Result};
use crate::tree::{Tree, TreeBuilder};

/// Applies `operations` to `source`, producing the transformed tree.
///
/// Fails with [`Error::InvalidInput`] when the sequence does not cover the
/// two trees completely, which would make the transformation ambiguous.
pub fn apply(source: &Tree, target: &Tree, operations: &[EditOperation]) -> Result<Tree> {
    let mut source_covered = 0usize;
    let mut target_covered = 0usize;
    for op in operations {
        if op.source().is_some() {
            source_covered += 1;
        }
        if op.target().is_some() {
            target_covered += 1;
        }
    }
    if source_covered != source.node_count() || target_covered != target.node_count() {
        return Err(Error::InvalidInput(format!(
            "operation sequence covers {source_covered}/{} source and {target_covered}/{} target nodes",
            source.node_count(),
            target.node_count()
        )));
    }

    let Some(target_root) = target.root() else {
        return Ok(Tree::empty());
    };

    // Every target node survives in the transformed tree; rebuild it in
    // document order with fresh arena ids.
    let mut builder = TreeBuilder::new();
    let mut root = None;
    let mut stack = vec![(target_root, None)];
    while let Some((id, parent)) = stack.pop() {
        let node = target.node(id);
        let new_id = builder.add_node(
            node.tag(),
            node.attributes().to_vec(),
            node.text().map(str::to_string),
        );
        match parent {
            Some(parent) => builder.add_child(parent, new_id),
            None => root = Some(new_id),
        }
        for &child in node.children().iter().rev() {
            stack.push((child, Some(new_id)));
        }
    }

    let root =
        root.ok_or_else(|| Error::InvalidInput("transformation produced no root".to_string()))?;
    builder.build(root)
}
