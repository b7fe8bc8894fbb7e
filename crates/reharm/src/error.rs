//! Error types for the node model, the rewrite engine and the session.

use pitch::PitchError;
use thiserror::Error;

use crate::node::NodeId;

/// A node that breaks the tree's structural invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("substitution group {0} has no children")]
    EmptyGroup(NodeId),

    #[error("node {id} is missing field '{field}'")]
    MissingField { id: NodeId, field: &'static str },

    #[error("chord {0} cannot have children")]
    ChordWithChildren(NodeId),

    #[error("group {0} cannot use the reserved type 'chord'")]
    ReservedType(NodeId),

    #[error("node id {0} appears more than once")]
    DuplicateId(NodeId),

    #[error("no sequential id follows {0}")]
    IdsExhausted(NodeId),
}

/// Errors from the rule registry and the rewrite engine.
///
/// A substitution whose `validate` fails is not an error: the rewrite is a
/// no-op. These variants are caller or configuration bugs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown substitution type '{0}'")]
    UnknownSubstitution(String),

    #[error("rule '{rule}' produced {got} children, its shape requires {expected}")]
    ShapeMismatch {
        rule: String,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    Theory(#[from] PitchError),

    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no key selected; choose a tonic and scale first")]
    NoKeySelected,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Theory(#[from] PitchError),

    #[error(transparent)]
    Node(#[from] NodeError),
}
