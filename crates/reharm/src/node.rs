//! The progression tree: chords, substitution groups and the top-level forest.
//!
//! Nodes are immutable once built and are shared between snapshots through
//! `Arc`, so a rewrite only allocates along the path it changes.
//!
//! The serde form is the one used for bookmarking a session:
//!
//! ```json
//! {"id": "a", "type": "chord", "root": "C", "name": "maj7"}
//! {"id": "b", "type": "V-I", "children": [ ... ]}
//! ```

use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::NodeError;

/// `type` tag carried by chord nodes. Every other tag names a substitution rule.
pub const CHORD_TYPE: &str = "chord";

/// Unique node identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

/// A single sounding chord. Quality is derived from `root` + `name` by the theory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordNode {
    pub id: NodeId,
    /// Pitch name: "C", "Bb", "F#"
    pub root: String,
    /// Quality token: "maj7", "m7", "7"
    pub name: String,
}

impl ChordNode {
    pub fn new(id: NodeId, root: impl Into<String>, name: impl Into<String>) -> Self {
        ChordNode {
            id,
            root: root.into(),
            name: name.into(),
        }
    }

    /// Chord symbol: "Cmaj7", "G7"
    pub fn symbol(&self) -> String {
        format!("{}{}", self.root, self.name)
    }
}

/// Expansion of one chord into an ordered, non-empty list of children.
///
/// By convention the resolved side is the last child; see
/// [`crate::engine::root_chord_of`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    id: NodeId,
    kind: String,
    children: Vec<Arc<Node>>,
}

impl GroupNode {
    pub fn new(
        id: NodeId,
        kind: impl Into<String>,
        children: Vec<Arc<Node>>,
    ) -> Result<Self, NodeError> {
        let kind = kind.into();
        if kind == CHORD_TYPE {
            return Err(NodeError::ReservedType(id));
        }
        if children.is_empty() {
            return Err(NodeError::EmptyGroup(id));
        }
        Ok(GroupNode { id, kind, children })
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Name of the substitution rule that produced this group
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn children(&self) -> &[Arc<Node>] {
        &self.children
    }

    pub fn first_child(&self) -> &Arc<Node> {
        match self.children.first() {
            Some(child) => child,
            None => unreachable!("group {} was built without children", self.id),
        }
    }

    pub fn last_child(&self) -> &Arc<Node> {
        match self.children.last() {
            Some(child) => child,
            None => unreachable!("group {} was built without children", self.id),
        }
    }

    /// Same id and kind, new children. Used by the rewrite engine, which
    /// always passes a list of the same length it started from.
    pub(crate) fn with_children(&self, children: Vec<Arc<Node>>) -> Self {
        debug_assert_eq!(children.len(), self.children.len());
        GroupNode {
            id: self.id.clone(),
            kind: self.kind.clone(),
            children,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNode")]
pub enum Node {
    Chord(ChordNode),
    Group(GroupNode),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Chord(chord) => &chord.id,
            Node::Group(group) => &group.id,
        }
    }

    /// The `type` tag: "chord" or the substitution rule name
    pub fn kind(&self) -> &str {
        match self {
            Node::Chord(_) => CHORD_TYPE,
            Node::Group(group) => &group.kind,
        }
    }

    /// Children in order; empty for chords
    pub fn children(&self) -> &[Arc<Node>] {
        match self {
            Node::Chord(_) => &[],
            Node::Group(group) => &group.children,
        }
    }

    pub fn as_chord(&self) -> Option<&ChordNode> {
        match self {
            Node::Chord(chord) => Some(chord),
            Node::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Node::Chord(_) => None,
            Node::Group(group) => Some(group),
        }
    }
}

impl From<ChordNode> for Node {
    fn from(chord: ChordNode) -> Self {
        Node::Chord(chord)
    }
}

impl From<GroupNode> for Node {
    fn from(group: GroupNode) -> Self {
        Node::Group(group)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Chord(chord) => {
                let mut state = serializer.serialize_struct("Node", 4)?;
                state.serialize_field("id", &chord.id)?;
                state.serialize_field("type", CHORD_TYPE)?;
                state.serialize_field("root", &chord.root)?;
                state.serialize_field("name", &chord.name)?;
                state.end()
            }
            Node::Group(group) => {
                let mut state = serializer.serialize_struct("Node", 3)?;
                state.serialize_field("id", &group.id)?;
                state.serialize_field("type", &group.kind)?;
                state.serialize_field("children", &group.children)?;
                state.end()
            }
        }
    }
}

/// Wire shape shared by both node kinds. Unknown fields (older bookmarks
/// stored a `quality` on chords) are ignored.
#[derive(Deserialize)]
struct RawNode {
    id: NodeId,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    children: Option<Vec<Arc<Node>>>,
}

impl TryFrom<RawNode> for Node {
    type Error = NodeError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if raw.kind == CHORD_TYPE {
            if raw.children.is_some() {
                return Err(NodeError::ChordWithChildren(raw.id));
            }
            let root = raw.root.ok_or_else(|| NodeError::MissingField {
                id: raw.id.clone(),
                field: "root",
            })?;
            let name = raw.name.ok_or_else(|| NodeError::MissingField {
                id: raw.id.clone(),
                field: "name",
            })?;
            return Ok(Node::Chord(ChordNode::new(raw.id, root, name)));
        }

        let children = raw.children.unwrap_or_default();
        Ok(Node::Group(GroupNode::new(raw.id, raw.kind, children)?))
    }
}

/// The ordered top-level forest.
///
/// Cloning is O(1); an unchanged rewrite hands back the very same forest,
/// which [`Progression::same_as`] detects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Progression(Arc<[Arc<Node>]>);

impl Progression {
    pub fn new(nodes: Vec<Arc<Node>>) -> Self {
        Progression(nodes.into())
    }

    pub fn empty() -> Self {
        Progression::new(Vec::new())
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.0.iter()
    }

    /// A new forest with `node` appended; this one is left untouched.
    pub fn appended(&self, node: Arc<Node>) -> Self {
        let mut nodes = self.0.to_vec();
        nodes.push(node);
        Progression::new(nodes)
    }

    /// Whether both handles point at the same snapshot
    pub fn same_as(&self, other: &Progression) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Progression {
    fn default() -> Self {
        Progression::empty()
    }
}

impl FromIterator<Node> for Progression {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Progression::new(iter.into_iter().map(Arc::new).collect())
    }
}
