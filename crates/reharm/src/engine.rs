//! Traversal and functional rewrite of the progression forest.
//!
//! Every function here is pure. Rewrites return a new [`Progression`];
//! nodes off the path from the top level to the target are reused by
//! reference, and nothing reachable from the input is modified.
//!
//! Ids that are not in the forest are not errors: lookups return `None` and
//! rewrites hand back the input unchanged.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{EngineError, NodeError};
use crate::node::{ChordNode, GroupNode, Node, NodeId, Progression};
use crate::rules::RuleCx;

/// The chord a subtree currently resolves to: the node itself for a chord,
/// otherwise the root chord of its last child.
pub fn root_chord_of(node: &Node) -> &ChordNode {
    let mut current = node;
    loop {
        match current {
            Node::Chord(chord) => return chord,
            Node::Group(group) => current = group.last_child(),
        }
    }
}

/// Find the node with `id` anywhere in the forest.
pub fn find<'a>(forest: &'a [Arc<Node>], id: &NodeId) -> Option<&'a Arc<Node>> {
    forest.iter().find_map(|node| {
        if node.id() == id {
            Some(node)
        } else {
            find(node.children(), id)
        }
    })
}

/// Find the group whose children contain `id`.
///
/// Returns `None` both for top-level nodes (their parent is the forest
/// itself) and for ids that are not present.
pub fn find_parent<'a>(forest: &'a [Arc<Node>], id: &NodeId) -> Option<&'a GroupNode> {
    forest.iter().find_map(|node| {
        let group = node.as_group()?;
        if group.children().iter().any(|child| child.id() == id) {
            Some(group)
        } else {
            find_parent(group.children(), id)
        }
    })
}

/// Longest chain of groups from `node` down to a chord; a chord has depth 0.
pub fn depth_of(node: &Node) -> usize {
    match node {
        Node::Chord(_) => 0,
        Node::Group(group) => 1 + forest_depth(group.children()),
    }
}

/// Deepest [`depth_of`] across a forest; 0 when empty.
pub fn forest_depth(forest: &[Arc<Node>]) -> usize {
    forest.iter().map(|node| depth_of(node)).max().unwrap_or(0)
}

/// Every id in the forest, depth first, left to right.
pub fn node_ids(forest: &[Arc<Node>]) -> Vec<&NodeId> {
    let mut ids = Vec::new();
    let mut stack: Vec<&Arc<Node>> = forest.iter().rev().collect();
    while let Some(node) = stack.pop() {
        ids.push(node.id());
        stack.extend(node.children().iter().rev());
    }
    ids
}

/// Check that no id occurs twice.
pub fn check_unique_ids(forest: &[Arc<Node>]) -> Result<(), NodeError> {
    let mut seen = HashSet::new();
    for id in node_ids(forest) {
        if !seen.insert(id) {
            return Err(NodeError::DuplicateId(id.clone()));
        }
    }
    Ok(())
}

/// Replace the node `id` with `rules[kind].substitute(node)`.
///
/// A node that fails the rule's `validate` (checked against the node's root
/// chord) is left as it is, as is a forest without `id`. An unknown `kind`
/// is an error whether or not `id` is present.
pub fn substitute_at(
    forest: &Progression,
    id: &NodeId,
    kind: &str,
    cx: &RuleCx<'_>,
) -> Result<Progression, EngineError> {
    let rule = cx.rules.rule(kind)?;

    let rewritten = rewrite(forest, id, &mut |node| {
        if !rule.validate(root_chord_of(node), cx.theory)? {
            debug!(%id, kind, "substitution not valid here, leaving node");
            return Ok(node.clone());
        }
        match rule.substitute(node, cx)? {
            Some(group) => {
                trace!(%id, group = %group.id(), kind, "substituted");
                Ok(Arc::new(Node::Group(group)))
            }
            None => Ok(node.clone()),
        }
    })?;
    Ok(rewritten)
}

/// Replace the node `id` with the collapse of its own rule.
///
/// Unconditional: collapsing a chord is the identity, so it leaves the forest
/// unchanged.
pub fn collapse_at(
    forest: &Progression,
    id: &NodeId,
    cx: &RuleCx<'_>,
) -> Result<Progression, EngineError> {
    rewrite(forest, id, &mut |node| {
        let collapsed = cx.rules.collapse(node, cx)?;
        trace!(%id, into = %collapsed.id(), "collapsed");
        Ok(collapsed)
    })
}

type Replace<'f> = dyn FnMut(&Arc<Node>) -> Result<Arc<Node>, EngineError> + 'f;

enum Step<T> {
    Missing,
    Kept,
    Replaced(T),
}

/// Apply `replace` to the node `id`, copying only its ancestors.
fn rewrite(
    forest: &Progression,
    id: &NodeId,
    replace: &mut Replace<'_>,
) -> Result<Progression, EngineError> {
    match rewrite_in(forest.nodes(), id, replace)? {
        Step::Replaced(nodes) => Ok(Progression::new(nodes)),
        Step::Kept => Ok(forest.clone()),
        Step::Missing => {
            debug!(%id, "node not in progression, nothing to rewrite");
            Ok(forest.clone())
        }
    }
}

fn rewrite_in(
    nodes: &[Arc<Node>],
    id: &NodeId,
    replace: &mut Replace<'_>,
) -> Result<Step<Vec<Arc<Node>>>, EngineError> {
    for (index, node) in nodes.iter().enumerate() {
        match rewrite_node(node, id, replace)? {
            Step::Missing => continue,
            Step::Kept => return Ok(Step::Kept),
            Step::Replaced(replacement) => {
                let mut next = nodes.to_vec();
                next[index] = replacement;
                return Ok(Step::Replaced(next));
            }
        }
    }
    Ok(Step::Missing)
}

fn rewrite_node(
    node: &Arc<Node>,
    id: &NodeId,
    replace: &mut Replace<'_>,
) -> Result<Step<Arc<Node>>, EngineError> {
    if node.id() == id {
        let replacement = replace(node)?;
        if Arc::ptr_eq(&replacement, node) {
            return Ok(Step::Kept);
        }
        return Ok(Step::Replaced(replacement));
    }

    let Node::Group(group) = node.as_ref() else {
        return Ok(Step::Missing);
    };
    Ok(match rewrite_in(group.children(), id, replace)? {
        Step::Replaced(children) => {
            Step::Replaced(Arc::new(Node::Group(group.with_children(children))))
        }
        Step::Kept => Step::Kept,
        Step::Missing => Step::Missing,
    })
}
