//! Focus tracking across scene mutations.
//!
//! Every mutating [`Scene`](crate::Scene) call runs inside an operation
//! bracket. Opening a bracket returns an [`Operation`] token that records the
//! focused node; closing the outermost bracket either re-applies focus to that
//! node or drops focus if the node can no longer hold it.
//!
//! Brackets nest: an operation triggered from inside another one receives a
//! deeper token, and only the token with depth 1 resumes focus side effects.
//! While the surrounding system is dispatching focus events itself
//! ([`Scene::set_dispatching_focus_events`](crate::Scene::set_dispatching_focus_events)),
//! closing a bracket leaves focus alone.

use horizon_a11y_core::NodeId;

/// Token for an open operation bracket.
///
/// Must be handed back to the tracker that issued it.
#[must_use = "an operation must be ended to resume focus side effects"]
#[derive(Debug)]
pub struct Operation {
    focused: Option<NodeId>,
    depth: usize,
}

impl Operation {
    /// The node that held focus when the bracket opened.
    #[inline]
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Nesting depth, starting at 1 for the outermost bracket.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether this is the outermost bracket.
    #[inline]
    pub fn is_outermost(&self) -> bool {
        self.depth == 1
    }
}

/// Focus state of a scene.
#[derive(Debug, Default)]
pub(crate) struct FocusTracker {
    focused: Option<NodeId>,
    depth: usize,
    dispatching: bool,
}

impl FocusTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub(crate) fn set_focused(&mut self, node: Option<NodeId>) -> Option<NodeId> {
        std::mem::replace(&mut self.focused, node)
    }

    #[inline]
    pub(crate) fn is_dispatching(&self) -> bool {
        self.dispatching
    }

    pub(crate) fn set_dispatching(&mut self, dispatching: bool) {
        self.dispatching = dispatching;
    }

    /// Whether focus side effects are suspended by an open bracket.
    #[inline]
    pub(crate) fn blocks_side_effects(&self) -> bool {
        self.depth > 0
    }

    pub(crate) fn begin(&mut self) -> Operation {
        self.depth += 1;
        tracing::trace!(target: "horizon_a11y::focus", depth = self.depth, focused = ?self.focused, "begin operation");
        Operation {
            focused: self.focused,
            depth: self.depth,
        }
    }

    /// Close a bracket.
    ///
    /// Returns the node whose focus must be re-validated, which only happens
    /// for the outermost bracket while no focus dispatch is in progress.
    pub(crate) fn end(&mut self, op: Operation) -> Option<NodeId> {
        debug_assert_eq!(op.depth, self.depth, "operation brackets closed out of order");
        self.depth = self.depth.saturating_sub(1);
        tracing::trace!(target: "horizon_a11y::focus", depth = self.depth, "end operation");
        if !op.is_outermost() || self.dispatching {
            return None;
        }
        op.focused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_a11y_core::SceneGraph;

    #[test]
    fn test_nested_brackets_only_outermost_acts() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node("n");
        let mut tracker = FocusTracker::new();
        tracker.set_focused(Some(node));

        let outer = tracker.begin();
        assert!(tracker.blocks_side_effects());
        let inner = tracker.begin();
        assert_eq!(inner.depth(), 2);
        assert_eq!(inner.focused(), Some(node));
        assert_eq!(tracker.end(inner), None);
        assert!(tracker.blocks_side_effects());
        assert_eq!(tracker.end(outer), Some(node));
        assert!(!tracker.blocks_side_effects());
    }

    #[test]
    fn test_dispatching_suppresses_restore() {
        let mut graph = SceneGraph::new();
        let node = graph.create_node("n");
        let mut tracker = FocusTracker::new();
        tracker.set_focused(Some(node));
        tracker.set_dispatching(true);

        let op = tracker.begin();
        assert_eq!(tracker.end(op), None);
        assert!(tracker.is_dispatching());
    }

    #[test]
    fn test_unfocused_scene() {
        let mut tracker = FocusTracker::new();
        let op = tracker.begin();
        assert!(op.is_outermost());
        assert_eq!(tracker.end(op), None);
    }
}
