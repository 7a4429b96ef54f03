//! Root-to-node paths through the node graph.
//!
//! Because a node may have several parents, a [`NodeId`] alone does not say
//! *where* in the graph something is. A [`Trail`] records the full path from
//! an ancestor down to a node, so two appearances of the same node can be
//! told apart.

use std::fmt;

use crate::graph::NodeId;

/// An ordered sequence of nodes, ancestor first.
///
/// Two trails are equal iff their node sequences are equal. Trails are
/// mutated in place while traversing (`add_descendant` before recursing,
/// `remove_descendant` after) to avoid allocating a new trail per step.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Trail {
    nodes: Vec<NodeId>,
}

impl Trail {
    /// Create an empty trail.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create a trail containing a single node.
    pub fn from_node(node: NodeId) -> Self {
        Self { nodes: vec![node] }
    }

    /// Create a trail from a list of nodes, ancestor first.
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    /// The nodes of this trail, ancestor first.
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of nodes in the trail.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the trail has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The first (top-most) node, if any.
    #[inline]
    pub fn root_node(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// The last (bottom-most) node, if any.
    #[inline]
    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Prepend an ancestor.
    pub fn add_ancestor(&mut self, node: NodeId) {
        self.nodes.insert(0, node);
    }

    /// Remove the first node.
    pub fn remove_ancestor(&mut self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(self.nodes.remove(0))
        }
    }

    /// Append a descendant.
    pub fn add_descendant(&mut self, node: NodeId) {
        self.nodes.push(node);
    }

    /// Remove the last node.
    pub fn remove_descendant(&mut self) -> Option<NodeId> {
        self.nodes.pop()
    }

    /// Whether this trail starts with every node of `prefix`.
    ///
    /// A trail is an extension of itself.
    pub fn is_extension_of(&self, prefix: &Trail) -> bool {
        self.nodes.starts_with(&prefix.nodes)
    }

    /// Whether the trail contains `node`.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

impl fmt::Debug for Trail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Trail")?;
        f.debug_list().entries(self.nodes.iter()).finish()
    }
}

impl From<Vec<NodeId>> for Trail {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }
}
