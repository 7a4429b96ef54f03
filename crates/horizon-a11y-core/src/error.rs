//! Error types for the Horizon A11y node graph.

use std::fmt;

use crate::graph::NodeId;

/// Errors that can occur during node graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The node ID is invalid or the node has been removed.
    InvalidNodeId,
    /// Attempted to make a node its own child or descendant.
    CircularParentage {
        /// The would-be parent.
        parent: NodeId,
        /// The would-be child.
        child: NodeId,
    },
    /// The parent already contains the child.
    DuplicateChild {
        /// The parent node.
        parent: NodeId,
        /// The child that is already present.
        child: NodeId,
    },
    /// The node is not a child of the given parent.
    NotAChild {
        /// The parent node.
        parent: NodeId,
        /// The node that was expected among its children.
        child: NodeId,
    },
    /// The node still has parents or children and cannot be removed.
    NodeAttached {
        /// The attached node.
        node: NodeId,
    },
    /// A child index was outside the parent's child list.
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The number of children (or insertion slots) available.
        len: usize,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNodeId => write!(f, "Invalid or removed node ID"),
            Self::CircularParentage { parent, child } => {
                write!(
                    f,
                    "Cannot add {child:?} under {parent:?}: it is the node itself or one of its ancestors"
                )
            }
            Self::DuplicateChild { parent, child } => {
                write!(f, "{parent:?} already contains child {child:?}")
            }
            Self::NotAChild { parent, child } => {
                write!(f, "{child:?} is not a child of {parent:?}")
            }
            Self::NodeAttached { node } => {
                write!(f, "{node:?} still has parents or children")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "Child index {index} out of bounds (len {len})")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Result type for node graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;
