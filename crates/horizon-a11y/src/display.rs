//! Displays: root attachment points of the node graph.

use horizon_a11y_core::NodeId;
use slotmap::new_key_type;

use crate::instance::InstanceId;

new_key_type! {
    /// A unique identifier for a display attached to a scene.
    pub struct DisplayId;
}

/// A root attachment point for the node graph.
///
/// Accessible displays own a root accessibility instance (empty trail, no
/// node) below which their instance tree is built.
#[derive(Debug, Clone)]
pub struct Display {
    pub(crate) root: NodeId,
    pub(crate) accessible: bool,
    pub(crate) root_instance: Option<InstanceId>,
}

impl Display {
    pub(crate) fn new(root: NodeId, accessible: bool) -> Self {
        Self {
            root,
            accessible,
            root_instance: None,
        }
    }

    /// The node this display is rooted at.
    #[inline]
    pub fn root_node(&self) -> NodeId {
        self.root
    }

    /// Whether this display maintains an accessibility instance tree.
    #[inline]
    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// The root accessibility instance, for accessible displays.
    #[inline]
    pub fn root_instance(&self) -> Option<InstanceId> {
        self.root_instance
    }
}
