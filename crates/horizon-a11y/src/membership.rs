//! Display-membership tracking.
//!
//! Every node keeps a multiset of the displays it currently contributes
//! accessible content under: one entry per visual path from an accessible
//! display's root down to the node. A node only holds entries while it is
//! *eligible*: visible, accessible-visible, and with content on itself or
//! somewhere below it.
//!
//! Entries travel down visual edges only. Accessible order overrides change
//! where instances appear, not which displays a node belongs to.

use horizon_a11y_core::NodeId;

use crate::display::DisplayId;
use crate::scene::Scene;

impl Scene {
    /// Whether `node` may currently hold membership entries.
    pub(crate) fn can_have_membership(&self, node: NodeId) -> bool {
        let Some(state) = self.nodes.get(node) else {
            return false;
        };
        self.graph.is_visible(node).unwrap_or(false) && state.accessible_visible && !state.no_content_below
    }

    /// `child` was connected below `parent`.
    pub(crate) fn on_add_child(&mut self, parent: NodeId, child: NodeId) {
        if self.can_have_membership(child) {
            let displays = self.nodes[parent].displays.clone();
            self.add_memberships(child, &displays);
        }
    }

    /// `child` is about to be disconnected from `parent`.
    pub(crate) fn on_remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.can_have_membership(child) {
            let displays = self.nodes[parent].displays.clone();
            self.remove_memberships(child, &displays);
        }
    }

    /// The "content below" summary of `node` flipped.
    pub(crate) fn on_summary_change(&mut self, node: NodeId, has_content_below: bool) {
        let visible = self.graph.is_visible(node).unwrap_or(false);
        if !visible || !self.nodes[node].accessible_visible {
            return;
        }
        if has_content_below {
            self.recompute_all(node);
        } else {
            self.clear_all(node);
        }
    }

    pub(crate) fn on_visibility_change(&mut self, node: NodeId, visible: bool) {
        let state = &self.nodes[node];
        if !state.accessible_visible || state.no_content_below {
            return;
        }
        if visible {
            self.recompute_all(node);
        } else {
            self.clear_all(node);
        }
    }

    pub(crate) fn on_accessible_visibility_change(&mut self, node: NodeId, visible: bool) {
        if !self.graph.is_visible(node).unwrap_or(false) || self.nodes[node].no_content_below {
            return;
        }
        if visible {
            self.recompute_all(node);
        } else {
            self.clear_all(node);
        }
    }

    /// `display` was attached with `node` as its root.
    pub(crate) fn on_root_attached(&mut self, node: NodeId, display: DisplayId) {
        if self.displays[display].is_accessible() && self.can_have_membership(node) {
            self.add_memberships(node, &[display]);
        }
    }

    /// `display`, rooted at `node`, is about to be detached.
    pub(crate) fn on_root_detached(&mut self, node: NodeId, display: DisplayId) {
        if self.displays[display].is_accessible() && self.can_have_membership(node) {
            self.remove_memberships(node, &[display]);
        }
    }

    /// Rebuild the multiset of an eligible node whose list is empty.
    pub(crate) fn recompute_all(&mut self, node: NodeId) {
        debug_assert!(self.can_have_membership(node), "recompute on an ineligible node");
        debug_assert!(
            self.nodes[node].displays.is_empty(),
            "recompute onto a non-empty membership list"
        );

        let mut displays = Vec::new();
        for &parent in self.graph.parents(node).unwrap_or_default() {
            displays.extend_from_slice(&self.nodes[parent].displays);
        }
        displays.extend(
            self.nodes[node]
                .rooted_displays
                .iter()
                .copied()
                .filter(|&display| self.displays[display].is_accessible()),
        );
        self.add_memberships(node, &displays);
    }

    /// Drop every entry of a node that is no longer eligible.
    pub(crate) fn clear_all(&mut self, node: NodeId) {
        debug_assert!(!self.can_have_membership(node), "clear on an eligible node");
        let snapshot = self.nodes[node].displays.clone();
        self.remove_memberships(node, &snapshot);
    }

    /// Append `displays` to `node` and every eligible visual descendant.
    pub(crate) fn add_memberships(&mut self, node: NodeId, displays: &[DisplayId]) {
        if displays.is_empty() {
            return;
        }
        self.nodes[node].displays.extend_from_slice(displays);
        tracing::trace!(target: "horizon_a11y::membership", ?node, added = displays.len(), "membership added");

        for child in self.graph.children(node).unwrap_or_default().to_vec() {
            if self.can_have_membership(child) {
                self.add_memberships(child, displays);
            }
        }
        self.signals().membership_changed.emit(node);
    }

    /// Remove one occurrence of each of `displays` from `node` and every
    /// eligible visual descendant, searching from the end.
    pub(crate) fn remove_memberships(&mut self, node: NodeId, displays: &[DisplayId]) {
        if displays.is_empty() {
            return;
        }
        let list = &mut self.nodes[node].displays;
        for display in displays.iter().rev() {
            match list.iter().rposition(|d| d == display) {
                Some(index) => {
                    list.remove(index);
                }
                None => debug_assert!(false, "membership underflow for {display:?} on {node:?}"),
            }
        }
        tracing::trace!(target: "horizon_a11y::membership", ?node, removed = displays.len(), "membership removed");

        for child in self.graph.children(node).unwrap_or_default().to_vec() {
            if self.can_have_membership(child) {
                self.remove_memberships(child, displays);
            }
        }
        self.signals().membership_changed.emit(node);
    }

    /// Recompute the "no content below" summary of `node`, then of its
    /// ancestors while it keeps flipping.
    pub(crate) fn update_summary(&mut self, node: NodeId) {
        let Some(state) = self.nodes.get(node) else {
            return;
        };
        let no_content_below = state.content.is_none()
            && self
                .graph
                .children(node)
                .unwrap_or_default()
                .iter()
                .all(|&child| self.nodes.get(child).is_none_or(|c| c.no_content_below));
        if no_content_below == state.no_content_below {
            return;
        }
        self.nodes[node].no_content_below = no_content_below;
        tracing::trace!(target: "horizon_a11y::membership", ?node, no_content_below, "summary changed");
        self.on_summary_change(node, !no_content_below);

        for parent in self.graph.parents(node).unwrap_or_default().to_vec() {
            self.update_summary(parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::{AccessibleContent, AccessibleRole, Scene};

    fn label() -> Option<AccessibleContent> {
        Some(AccessibleContent::new(AccessibleRole::Label))
    }

    #[test]
    fn test_linear_chain_membership() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        scene.add_child(r, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.set_content(b, label()).unwrap();
        let display = scene.add_display(r, true).unwrap();

        assert_eq!(scene.membership(b).unwrap(), &[display]);
        assert_eq!(scene.membership(a).unwrap(), &[display]);
        assert_eq!(scene.membership(r).unwrap(), &[display]);
    }

    #[test]
    fn test_diamond_counts_each_path() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        let c = scene.create_node("c");
        let display = scene.add_display(r, true).unwrap();
        scene.set_content(c, label()).unwrap();
        scene.add_child(r, a).unwrap();
        scene.add_child(r, b).unwrap();
        scene.add_child(a, c).unwrap();
        scene.add_child(b, c).unwrap();

        assert_eq!(scene.membership(c).unwrap(), &[display, display]);

        scene.remove_child(b, c).unwrap();
        assert_eq!(scene.membership(c).unwrap(), &[display]);
        assert!(scene.membership(b).unwrap().is_empty());
    }

    #[test]
    fn test_no_content_means_no_membership() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let a = scene.create_node("a");
        scene.add_child(r, a).unwrap();
        scene.add_display(r, true).unwrap();
        assert!(scene.membership(a).unwrap().is_empty());
        assert!(scene.membership(r).unwrap().is_empty());

        scene.set_content(a, label()).unwrap();
        assert_eq!(scene.membership(a).unwrap().len(), 1);
        scene.set_content(a, None).unwrap();
        assert!(scene.membership(a).unwrap().is_empty());
    }

    #[test]
    fn test_inaccessible_display_contributes_nothing() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        scene.set_content(r, label()).unwrap();
        scene.add_display(r, false).unwrap();
        assert!(scene.membership(r).unwrap().is_empty());

        let display = scene.add_display(r, true).unwrap();
        assert_eq!(scene.membership(r).unwrap(), &[display]);
        scene.remove_display(display).unwrap();
        assert!(scene.membership(r).unwrap().is_empty());
    }

    #[test]
    fn test_empty_requests_are_noops() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        scene.set_content(r, label()).unwrap();
        let display = scene.add_display(r, true).unwrap();

        let emitted = Arc::new(AtomicUsize::new(0));
        let counter = emitted.clone();
        scene.signals().membership_changed.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        scene.add_memberships(r, &[]);
        scene.remove_memberships(r, &[]);
        assert_eq!(scene.membership(r).unwrap(), &[display]);
        assert_eq!(emitted.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_accessible_visibility_clears_subtree() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let p = scene.create_node("p");
        let n = scene.create_node("n");
        scene.add_child(r, p).unwrap();
        scene.add_child(p, n).unwrap();
        scene.set_content(n, label()).unwrap();
        let display = scene.add_display(r, true).unwrap();

        scene.set_accessible_visible(p, false).unwrap();
        assert!(scene.membership(p).unwrap().is_empty());
        assert!(scene.membership(n).unwrap().is_empty());

        scene.set_accessible_visible(p, true).unwrap();
        assert_eq!(scene.membership(n).unwrap(), &[display]);
    }

    #[test]
    fn test_membership_signal_per_node() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let n = scene.create_node("n");
        scene.add_child(r, n).unwrap();
        scene.set_content(n, label()).unwrap();

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();
        scene.signals().membership_changed.connect(move |node| sink.lock().push(*node));

        scene.add_display(r, true).unwrap();
        let seen = seen.lock();
        assert!(seen.contains(&r));
        assert!(seen.contains(&n));
    }
}
