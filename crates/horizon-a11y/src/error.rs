//! Error types for the accessibility layer.

use horizon_a11y_core::{GraphError, NodeId, Trail};

use crate::display::DisplayId;
use crate::instance::InstanceId;

/// Result type alias for scene operations.
pub type SceneResult<T> = std::result::Result<T, SceneError>;

/// Errors returned by [`Scene`](crate::Scene) mutations and queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// Node graph error.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The display ID is invalid or the display has been removed.
    #[error("Invalid or removed display ID")]
    InvalidDisplay,

    /// The display does not maintain an accessibility instance tree.
    #[error("Display {display:?} is not accessible")]
    InaccessibleDisplay {
        /// The display that was asked for its tree.
        display: DisplayId,
    },

    /// The instance ID is invalid or the instance has been disposed.
    #[error("Invalid or disposed instance ID")]
    InvalidInstance,

    /// The change would make a node its own accessible ancestor.
    #[error("Placing {child:?} under {parent:?} would create an accessibility cycle")]
    Cycle {
        /// The would-be accessible parent.
        parent: NodeId,
        /// The would-be accessible child.
        child: NodeId,
    },

    /// The node is already placed by another node's accessible order.
    #[error("{node:?} is already claimed by the accessible order of {claimed_by:?}")]
    AlreadyClaimed {
        /// The node listed in the order.
        node: NodeId,
        /// The node whose order currently lists it.
        claimed_by: NodeId,
    },

    /// The same node appears more than once in an accessible order.
    #[error("{node:?} appears more than once in the accessible order")]
    DuplicateOrderEntry {
        /// The repeated node.
        node: NodeId,
    },

    /// An accessible order holds more than one natural-children placeholder.
    #[error("An accessible order may hold at most one placeholder")]
    MultiplePlaceholders,

    /// The node cannot currently receive focus.
    #[error("{node:?} is not focusable or has no accessibility instance")]
    NotFocusable {
        /// The node that was asked to take focus.
        node: NodeId,
    },
}

/// Failures reported by [`Scene::audit`](crate::Scene::audit).
///
/// Each variant describes a broken invariant; seeing one means the calling
/// code drove the scene into a state it should never reach.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    /// Walking parent and order-parent edges upward returned to a node.
    #[error("Accessibility graph cycle detected at {node:?} along {trail:?}")]
    Cycle {
        /// The node that was revisited.
        node: NodeId,
        /// The upward trail that closed the cycle.
        trail: Trail,
    },

    /// A node's membership multiset differs from a fresh recomputation.
    #[error("Display membership of {node:?} is {actual:?}, expected {expected:?}")]
    Membership {
        /// The node whose list is wrong.
        node: NodeId,
        /// The sorted expected multiset.
        expected: Vec<DisplayId>,
        /// The sorted live multiset.
        actual: Vec<DisplayId>,
    },

    /// Two children of one instance share a trail.
    #[error("Instance {parent:?} has more than one child for {trail:?}")]
    DuplicateInstance {
        /// The parent instance.
        parent: InstanceId,
        /// The duplicated trail.
        trail: Trail,
    },

    /// A display's instance tree differs from a full rebuild.
    #[error("Instance tree of {display:?} does not match a fresh rebuild")]
    InstanceTree {
        /// The display whose tree is out of sync.
        display: DisplayId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_error_is_transparent() {
        let err: SceneError = GraphError::InvalidNodeId.into();
        assert_eq!(err.to_string(), GraphError::InvalidNodeId.to_string());
    }
}
