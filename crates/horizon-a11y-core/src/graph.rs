//! Visual node graph for Horizon A11y.
//!
//! Provides the retained-mode node graph with:
//! - Unique node identifiers via arena-based storage
//! - Ordered parent and child lists (a node may have several parents)
//! - Node naming for debugging
//! - Visibility flags
//!
//! The graph is a DAG: the same node may be reached through several parents,
//! and [`SceneGraph::insert_child`] rejects edges that would close a cycle.
//!
//! # Key Types
//!
//! - [`NodeId`] - Unique stable identifier for each node
//! - [`SceneGraph`] - The arena holding every node and its edges
//!
//! # Related Modules
//!
//! - [`crate::trail`] - Root-to-node paths through this graph
//! - [`crate::logging`] - Debug formatting for graph dumps

use std::collections::HashSet;

use slotmap::{new_key_type, SlotMap};

use crate::error::{GraphError, GraphResult};
use crate::logging::{TreeFormatOptions, TreeFormatter};

new_key_type! {
    /// A unique identifier for a node in the graph.
    ///
    /// `NodeId`s are stable handles that remain valid while the graph changes
    /// around them. They become invalid when the node is removed.
    pub struct NodeId;
}

impl NodeId {
    /// Convert the NodeId to a raw u64 value.
    ///
    /// The raw value can be converted back using [`NodeId::from_raw`].
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Create a NodeId from a raw u64 value.
    ///
    /// Note: This does not check if the node exists in any graph.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

static_assertions::assert_impl_all!(NodeId: Copy, Send, Sync, Ord, std::hash::Hash);

/// Internal data stored in the arena for each node.
struct NodeData {
    /// Human-readable name for debugging.
    name: String,
    /// Parent nodes, in the order the edges were created.
    parents: Vec<NodeId>,
    /// Child nodes, in visual order.
    children: Vec<NodeId>,
    /// Whether the node itself is visible.
    visible: bool,
}

impl NodeData {
    fn new(name: String) -> Self {
        Self {
            name,
            parents: Vec::new(),
            children: Vec::new(),
            visible: true,
        }
    }
}

/// The arena that owns every node and its parent/child edges.
///
/// Uses arena-based storage via SlotMap for stable node IDs. Edges are stored
/// on both ends, so parent and child queries are equally cheap.
pub struct SceneGraph {
    nodes: SlotMap<NodeId, NodeData>,
}

impl SceneGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Create a new, detached and visible node.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        let id = self.nodes.insert(NodeData::new(name));
        tracing::trace!(target: "horizon_a11y_core::graph", ?id, "created node");
        id
    }

    /// Remove a node that has no parents and no children.
    ///
    /// Callers are expected to detach the node first; removing an attached
    /// node would leave dangling edges.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<()> {
        let data = self.nodes.get(id).ok_or(GraphError::InvalidNodeId)?;
        if !data.parents.is_empty() || !data.children.is_empty() {
            return Err(GraphError::NodeAttached { node: id });
        }
        self.nodes.remove(id);
        tracing::trace!(target: "horizon_a11y_core::graph", ?id, "removed node");
        Ok(())
    }

    /// Check if a node exists in the graph.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate over every node ID.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys()
    }

    /// Iterate over all nodes without parents.
    pub fn root_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, data)| data.parents.is_empty())
            .map(|(id, _)| id)
    }

    /// Get the node's name.
    pub fn name(&self, id: NodeId) -> GraphResult<&str> {
        self.nodes
            .get(id)
            .map(|d| d.name.as_str())
            .ok_or(GraphError::InvalidNodeId)
    }

    /// Set the node's name.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> GraphResult<()> {
        self.nodes
            .get_mut(id)
            .map(|d| d.name = name.into())
            .ok_or(GraphError::InvalidNodeId)
    }

    /// Get the parents of a node.
    pub fn parents(&self, id: NodeId) -> GraphResult<&[NodeId]> {
        self.nodes
            .get(id)
            .map(|d| d.parents.as_slice())
            .ok_or(GraphError::InvalidNodeId)
    }

    /// Get the children of a node, in visual order.
    pub fn children(&self, id: NodeId) -> GraphResult<&[NodeId]> {
        self.nodes
            .get(id)
            .map(|d| d.children.as_slice())
            .ok_or(GraphError::InvalidNodeId)
    }

    /// Check whether `child` is a direct child of `parent`.
    pub fn has_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.nodes
            .get(parent)
            .is_some_and(|d| d.children.contains(&child))
    }

    /// Get the index of `child` among the children of `parent`.
    pub fn child_index(&self, parent: NodeId, child: NodeId) -> GraphResult<usize> {
        self.children(parent)?
            .iter()
            .position(|&c| c == child)
            .ok_or(GraphError::NotAChild { parent, child })
    }

    /// Whether the node itself is visible.
    pub fn is_visible(&self, id: NodeId) -> GraphResult<bool> {
        self.nodes
            .get(id)
            .map(|d| d.visible)
            .ok_or(GraphError::InvalidNodeId)
    }

    /// Set the node's visibility.
    ///
    /// Returns `true` if the value changed.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> GraphResult<bool> {
        let data = self.nodes.get_mut(id).ok_or(GraphError::InvalidNodeId)?;
        if data.visible == visible {
            return Ok(false);
        }
        data.visible = visible;
        Ok(true)
    }

    /// Append `child` to the children of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> GraphResult<()> {
        let len = self.children(parent)?.len();
        self.insert_child(parent, len, child)
    }

    /// Insert `child` at `index` among the children of `parent`.
    ///
    /// Fails if either node is unknown, if the edge already exists, or if
    /// `child` is `parent` itself or one of its ancestors.
    #[tracing::instrument(skip(self), target = "horizon_a11y_core::graph", level = "trace")]
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> GraphResult<()> {
        if !self.nodes.contains_key(child) {
            return Err(GraphError::InvalidNodeId);
        }
        let len = self.children(parent)?.len();
        if index > len {
            return Err(GraphError::IndexOutOfBounds { index, len });
        }
        if self.has_child(parent, child) {
            return Err(GraphError::DuplicateChild { parent, child });
        }
        if self.is_ancestor_of(child, parent)? {
            return Err(GraphError::CircularParentage { parent, child });
        }

        self.nodes[parent].children.insert(index, child);
        self.nodes[child].parents.push(parent);
        Ok(())
    }

    /// Remove `child` from the children of `parent`.
    ///
    /// Returns the index the child occupied.
    #[tracing::instrument(skip(self), target = "horizon_a11y_core::graph", level = "trace")]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> GraphResult<usize> {
        let index = self.child_index(parent, child)?;
        self.nodes[parent].children.remove(index);
        let parents = &mut self.nodes[child].parents;
        if let Some(pos) = parents.iter().position(|&p| p == parent) {
            parents.remove(pos);
        }
        Ok(index)
    }

    /// Move `child` to `index` among the children of `parent`.
    ///
    /// Returns `true` if the order changed.
    pub fn move_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> GraphResult<bool> {
        let current = self.child_index(parent, child)?;
        let len = self.nodes[parent].children.len();
        if index >= len {
            return Err(GraphError::IndexOutOfBounds { index, len });
        }
        if current == index {
            return Ok(false);
        }
        let children = &mut self.nodes[parent].children;
        let moved = children.remove(current);
        children.insert(index, moved);
        Ok(true)
    }

    /// Check if `potential_ancestor` is `id` itself or one of its ancestors.
    pub fn is_ancestor_of(&self, potential_ancestor: NodeId, id: NodeId) -> GraphResult<bool> {
        if !self.nodes.contains_key(id) {
            return Err(GraphError::InvalidNodeId);
        }
        let mut visited = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if current == potential_ancestor {
                return Ok(true);
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(data) = self.nodes.get(current) {
                stack.extend(data.parents.iter().copied());
            }
        }
        Ok(false)
    }

    /// Get every distinct ancestor of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut queue = std::collections::VecDeque::from(self.parents(id)?.to_vec());
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            result.push(current);
            if let Some(data) = self.nodes.get(current) {
                queue.extend(data.parents.iter().copied());
            }
        }
        Ok(result)
    }

    /// Perform a depth-first pre-order traversal starting from a node.
    ///
    /// Nodes reachable through several paths are visited once per path.
    pub fn depth_first_preorder(&self, id: NodeId) -> GraphResult<Vec<NodeId>> {
        let mut result = Vec::new();
        self.depth_first_preorder_recursive(id, &mut result)?;
        Ok(result)
    }

    fn depth_first_preorder_recursive(&self, id: NodeId, result: &mut Vec<NodeId>) -> GraphResult<()> {
        let data = self.nodes.get(id).ok_or(GraphError::InvalidNodeId)?;
        result.push(id);
        for &child in &data.children {
            self.depth_first_preorder_recursive(child, result)?;
        }
        Ok(())
    }

    /// Debug dump of the subtree below a node.
    pub fn dump_tree(&self, id: NodeId, options: &TreeFormatOptions) -> GraphResult<String> {
        if !self.nodes.contains_key(id) {
            return Err(GraphError::InvalidNodeId);
        }
        let formatter = TreeFormatter::new(options.clone());
        Ok(formatter.format(
            id,
            |node| {
                let data = &self.nodes[node];
                let mut label = if data.name.is_empty() {
                    "(unnamed)".to_string()
                } else {
                    data.name.clone()
                };
                if options.show_ids {
                    label.push_str(&format!(" [{node:?}]"));
                }
                if !data.visible {
                    label.push_str(" (hidden)");
                }
                label
            },
            |node| self.nodes[node].children.clone(),
        ))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> (SceneGraph, NodeId, NodeId, NodeId) {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a");
        let b = graph.create_node("b");
        let c = graph.create_node("c");
        graph.add_child(a, b).unwrap();
        graph.add_child(b, c).unwrap();
        (graph, a, b, c)
    }

    #[test]
    fn test_parent_child() {
        let (graph, a, b, c) = chain();
        assert_eq!(graph.children(a).unwrap(), &[b]);
        assert_eq!(graph.parents(c).unwrap(), &[b]);
        assert!(graph.has_child(b, c));
        assert!(!graph.has_child(a, c));
    }

    #[test]
    fn test_multiple_parents() {
        let (mut graph, a, _b, c) = chain();
        graph.add_child(a, c).unwrap();
        assert_eq!(graph.parents(c).unwrap().len(), 2);
        assert_eq!(graph.depth_first_preorder(a).unwrap().iter().filter(|&&n| n == c).count(), 2);
        assert_eq!(graph.ancestors(c).unwrap().len(), 2);
    }

    #[test]
    fn test_circular_parentage_rejected() {
        let (mut graph, a, _b, c) = chain();
        assert_eq!(
            graph.add_child(c, a),
            Err(GraphError::CircularParentage { parent: c, child: a })
        );
        assert_eq!(
            graph.add_child(a, a),
            Err(GraphError::CircularParentage { parent: a, child: a })
        );
    }

    #[test]
    fn test_duplicate_child_rejected() {
        let (mut graph, a, b, _c) = chain();
        assert_eq!(
            graph.add_child(a, b),
            Err(GraphError::DuplicateChild { parent: a, child: b })
        );
    }

    #[test]
    fn test_insert_and_move_child() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node("parent");
        let x = graph.create_node("x");
        let y = graph.create_node("y");
        let z = graph.create_node("z");
        graph.add_child(parent, x).unwrap();
        graph.add_child(parent, z).unwrap();
        graph.insert_child(parent, 1, y).unwrap();
        assert_eq!(graph.children(parent).unwrap(), &[x, y, z]);

        assert!(graph.move_child(parent, z, 0).unwrap());
        assert_eq!(graph.children(parent).unwrap(), &[z, x, y]);
        assert!(!graph.move_child(parent, z, 0).unwrap());
        assert!(matches!(
            graph.move_child(parent, z, 3),
            Err(GraphError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_remove_child() {
        let (mut graph, a, b, c) = chain();
        assert_eq!(graph.remove_child(b, c).unwrap(), 0);
        assert!(graph.parents(c).unwrap().is_empty());
        assert_eq!(
            graph.remove_child(b, c),
            Err(GraphError::NotAChild { parent: b, child: c })
        );
        assert_eq!(graph.remove_node(b), Err(GraphError::NodeAttached { node: b }));
        graph.remove_child(a, b).unwrap();
        graph.remove_node(b).unwrap();
        assert!(!graph.contains(b));
    }

    #[test]
    fn test_visibility() {
        let (mut graph, a, _b, _c) = chain();
        assert!(graph.is_visible(a).unwrap());
        assert!(graph.set_visible(a, false).unwrap());
        assert!(!graph.set_visible(a, false).unwrap());
        assert!(!graph.is_visible(a).unwrap());
    }

    #[test]
    fn test_raw_round_trip() {
        let (_graph, a, _b, _c) = chain();
        assert_eq!(NodeId::from_raw(a.as_raw()), a);
    }

    #[test]
    fn test_dump_tree() {
        let (mut graph, a, b, _c) = chain();
        graph.set_visible(b, false).unwrap();
        let output = graph.dump_tree(a, &TreeFormatOptions::minimal()).unwrap();
        assert!(output.contains("a"));
        assert!(output.contains("b (hidden)"));
        assert!(output.contains("c"));
    }
}
