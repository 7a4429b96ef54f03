//! The [`Scene`] facade: node graph plus accessibility state.
//!
//! A scene owns the visual [`SceneGraph`], the per-node accessibility data,
//! the attached displays and the instance trees built for accessible
//! displays. Every mutation goes through a `Scene` method, which updates the
//! display-membership tracker first and then synchronizes the instance trees,
//! all inside one operation bracket (see [`crate::focus`]).
//!
//! # Example
//!
//! ```
//! use horizon_a11y::{AccessibleContent, AccessibleRole, Scene};
//!
//! let mut scene = Scene::new();
//! let root = scene.create_node("root");
//! let panel = scene.create_node("panel");
//! let button = scene.create_node("button");
//! scene.add_child(root, panel)?;
//! scene.add_child(panel, button)?;
//! scene.set_content(button, Some(AccessibleContent::new(AccessibleRole::Button)))?;
//!
//! let display = scene.add_display(root, true)?;
//! assert_eq!(scene.membership(button)?, &[display]);
//! assert_eq!(scene.instances_for_node(button).len(), 1);
//! # Ok::<(), horizon_a11y::SceneError>(())
//! ```

use std::collections::HashSet;

use horizon_a11y_core::{NodeId, SceneGraph, Signal, TreeFormatOptions, TreeFormatter};
use slotmap::{SecondaryMap, SlotMap};
use static_assertions::assert_impl_all;

use crate::config::SceneConfig;
use crate::content::AccessibleContent;
use crate::display::{Display, DisplayId};
use crate::error::{SceneError, SceneResult};
use crate::focus::{FocusTracker, Operation};
use crate::instance::{AccessibleInstance, InstanceId, InstanceSnapshot, InstanceTree};

/// Accessibility data kept for every node.
#[derive(Debug, Clone)]
pub(crate) struct NodeState {
    pub(crate) accessible_visible: bool,
    pub(crate) focusable: bool,
    pub(crate) content: Option<AccessibleContent>,
    /// Accessible order override; `None` entries stand for the unclaimed
    /// visual children.
    pub(crate) order: Option<Vec<Option<NodeId>>>,
    /// The node whose order override lists this node.
    pub(crate) order_parent: Option<NodeId>,
    pub(crate) rooted_displays: Vec<DisplayId>,
    /// Membership multiset.
    pub(crate) displays: Vec<DisplayId>,
    /// No content on this node or anywhere below it visually.
    pub(crate) no_content_below: bool,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            accessible_visible: true,
            focusable: false,
            content: None,
            order: None,
            order_parent: None,
            rooted_displays: Vec::new(),
            displays: Vec::new(),
            no_content_below: true,
        }
    }
}

/// Notifications emitted by a scene.
///
/// Slots run synchronously while the scene is still inside the operation
/// that triggered them.
#[derive(Default)]
pub struct SceneSignals {
    /// A node's display membership multiset changed.
    pub membership_changed: Signal<NodeId>,
    /// A node was claimed by, or released from, an accessible order.
    pub order_parent_changed: Signal<NodeId>,
    /// Focus was re-applied to a node after an operation.
    pub focus_restored: Signal<NodeId>,
    /// A node lost focus because it can no longer hold it.
    pub focus_lost: Signal<NodeId>,
}

/// A node graph with synchronized accessibility instance trees.
pub struct Scene {
    pub(crate) graph: SceneGraph,
    pub(crate) nodes: SecondaryMap<NodeId, NodeState>,
    pub(crate) displays: SlotMap<DisplayId, Display>,
    pub(crate) instances: InstanceTree,
    pub(crate) focus: FocusTracker,
    config: SceneConfig,
    signals: SceneSignals,
}

assert_impl_all!(Scene: Send, Sync);

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SceneConfig::default())
    }

    /// Create an empty scene.
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            graph: SceneGraph::new(),
            nodes: SecondaryMap::new(),
            displays: SlotMap::with_key(),
            instances: InstanceTree::new(),
            focus: FocusTracker::new(),
            config,
            signals: SceneSignals::default(),
        }
    }

    /// The scene's configuration.
    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The visual node graph.
    #[inline]
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Connect to the scene's notifications.
    #[inline]
    pub fn signals(&self) -> &SceneSignals {
        &self.signals
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Create a detached, visible node without content.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.graph.create_node(name);
        self.nodes.insert(id, NodeState::default());
        id
    }

    /// Remove a node, detaching it from everything first.
    ///
    /// Its displays are removed, its own order is cleared, it is taken out of
    /// the order that claims it, and every visual edge is cut.
    #[tracing::instrument(skip(self), target = "horizon_a11y::scene", level = "trace")]
    pub fn remove_node(&mut self, node: NodeId) -> SceneResult<()> {
        self.check_node(node)?;
        let op = self.begin_operation();
        let result = self
            .detach_node(node)
            .and_then(|()| self.graph.remove_node(node).map_err(SceneError::from));
        if result.is_ok() {
            if self.focus.focused() == Some(node) {
                self.focus.set_focused(None);
            }
            self.nodes.remove(node);
        }
        self.end_operation(op);
        result
    }

    fn detach_node(&mut self, node: NodeId) -> SceneResult<()> {
        for display in self.nodes[node].rooted_displays.clone() {
            self.remove_display(display)?;
        }
        if self.nodes[node].order.is_some() {
            self.set_accessible_order(node, None)?;
        }
        if let Some(claimer) = self.nodes[node].order_parent {
            let order = self.nodes[claimer].order.clone().map(|order| {
                order
                    .into_iter()
                    .filter(|&entry| entry != Some(node))
                    .collect::<Vec<_>>()
            });
            self.set_accessible_order(claimer, order)?;
        }
        for child in self.graph.children(node)?.to_vec() {
            self.remove_child(node, child)?;
        }
        for parent in self.graph.parents(node)?.to_vec() {
            self.remove_child(parent, node)?;
        }
        Ok(())
    }

    /// Append `child` to the visual children of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let len = self.graph.children(parent)?.len();
        self.insert_child(parent, len, child)
    }

    /// Insert `child` at `index` among the visual children of `parent`.
    ///
    /// Fails with [`SceneError::Cycle`] if `child` is already an accessible
    /// or visual ancestor of `parent`.
    #[tracing::instrument(skip(self), target = "horizon_a11y::scene", level = "trace")]
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> SceneResult<()> {
        self.check_node(parent)?;
        self.check_node(child)?;
        if self.would_cycle(parent, child) {
            return Err(SceneError::Cycle { parent, child });
        }
        self.graph.insert_child(parent, index, child)?;

        let op = self.begin_operation();
        self.on_add_child(parent, child);
        self.update_summary(parent);
        if self.nodes[child].order_parent.is_none() {
            self.add_tree(&op, parent, child, None);
        }
        self.end_operation(op);
        Ok(())
    }

    /// Remove `child` from the visual children of `parent`.
    #[tracing::instrument(skip(self), target = "horizon_a11y::scene", level = "trace")]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.graph.child_index(parent, child)?;

        let op = self.begin_operation();
        self.on_remove_child(parent, child);
        if self.nodes[child].order_parent.is_none() {
            self.remove_tree(&op, parent, child, None);
        }
        let result = self.graph.remove_child(parent, child);
        self.update_summary(parent);
        self.end_operation(op);
        result.map(|_| ()).map_err(SceneError::from)
    }

    /// Move `child` to `index` among the visual children of `parent`.
    #[tracing::instrument(skip(self), target = "horizon_a11y::scene", level = "trace")]
    pub fn move_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> SceneResult<()> {
        if !self.graph.move_child(parent, child, index)? {
            return Ok(());
        }
        let op = self.begin_operation();
        self.reorder(&op, parent, None);
        self.end_operation(op);
        Ok(())
    }

    /// Replace the accessible order override of `node`.
    ///
    /// Each `Some` entry claims that node: it is placed in the accessibility
    /// tree under `node` instead of under its visual parents. A single `None`
    /// entry marks where the unclaimed visual children go; without one they
    /// follow the listed entries. An empty order is the same as no order.
    #[tracing::instrument(skip(self), target = "horizon_a11y::scene", level = "trace")]
    pub fn set_accessible_order(&mut self, node: NodeId, order: Option<Vec<Option<NodeId>>>) -> SceneResult<()> {
        self.check_node(node)?;
        let order = order.filter(|order| !order.is_empty());
        if let Some(order) = &order {
            self.validate_order(node, order)?;
        }

        let old: Vec<NodeId> = self.order_entries(node);
        let new: Vec<NodeId> = order.iter().flatten().flatten().copied().collect();
        if self.nodes[node].order == order {
            return Ok(());
        }
        self.nodes[node].order = order;

        let removed: Vec<NodeId> = old.iter().copied().filter(|n| !new.contains(n)).collect();
        let added: Vec<NodeId> = new.iter().copied().filter(|n| !old.contains(n)).collect();

        let op = self.begin_operation();
        self.order_change(&op, node, &removed, &added);
        self.end_operation(op);
        Ok(())
    }

    fn validate_order(&self, node: NodeId, order: &[Option<NodeId>]) -> SceneResult<()> {
        if order.iter().filter(|entry| entry.is_none()).count() > 1 {
            return Err(SceneError::MultiplePlaceholders);
        }
        let mut seen = HashSet::new();
        for &entry in order.iter().flatten() {
            self.check_node(entry)?;
            if !seen.insert(entry) {
                return Err(SceneError::DuplicateOrderEntry { node: entry });
            }
            if let Some(claimed_by) = self.nodes[entry].order_parent {
                if claimed_by != node {
                    return Err(SceneError::AlreadyClaimed { node: entry, claimed_by });
                }
            }
            if self.would_cycle(node, entry) {
                return Err(SceneError::Cycle { parent: node, child: entry });
            }
        }
        Ok(())
    }

    /// Set or clear the accessible content of `node`.
    ///
    /// Gaining or losing content rebuilds everything the node contributes;
    /// replacing content with other content leaves instances untouched.
    #[tracing::instrument(skip(self, content), target = "horizon_a11y::scene", level = "trace")]
    pub fn set_content(&mut self, node: NodeId, content: Option<AccessibleContent>) -> SceneResult<()> {
        self.check_node(node)?;
        let had_content = self.nodes[node].content.is_some();
        let has_content = content.is_some();
        self.nodes[node].content = content;

        let op = self.begin_operation();
        self.update_summary(node);
        if had_content != has_content {
            self.rebuild_contribution(&op, node);
        }
        self.end_operation(op);
        Ok(())
    }

    /// Show or hide `node` and its subtree.
    #[tracing::instrument(skip(self), target = "horizon_a11y::scene", level = "trace")]
    pub fn set_visible(&mut self, node: NodeId, visible: bool) -> SceneResult<()> {
        self.check_node(node)?;
        if !self.graph.set_visible(node, visible)? {
            return Ok(());
        }
        let op = self.begin_operation();
        self.on_visibility_change(node, visible);
        self.rebuild_contribution(&op, node);
        self.end_operation(op);
        Ok(())
    }

    /// Hide `node` and its subtree from assistive technology only.
    #[tracing::instrument(skip(self), target = "horizon_a11y::scene", level = "trace")]
    pub fn set_accessible_visible(&mut self, node: NodeId, visible: bool) -> SceneResult<()> {
        let state = self.state_mut(node)?;
        if state.accessible_visible == visible {
            return Ok(());
        }
        state.accessible_visible = visible;
        let op = self.begin_operation();
        self.on_accessible_visibility_change(node, visible);
        self.rebuild_contribution(&op, node);
        self.end_operation(op);
        Ok(())
    }

    /// Allow or forbid `node` to take focus.
    pub fn set_focusable(&mut self, node: NodeId, focusable: bool) -> SceneResult<()> {
        self.state_mut(node)?.focusable = focusable;
        let op = self.begin_operation();
        self.end_operation(op);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Displays
    // ------------------------------------------------------------------

    /// Attach a display rooted at `root`.
    ///
    /// Accessible displays get a root instance and a fully built instance
    /// tree.
    #[tracing::instrument(skip(self), target = "horizon_a11y::scene", level = "trace")]
    pub fn add_display(&mut self, root: NodeId, accessible: bool) -> SceneResult<DisplayId> {
        self.check_node(root)?;
        let display = self.displays.insert(Display::new(root, accessible));

        let op = self.begin_operation();
        self.nodes[root].rooted_displays.push(display);
        if accessible {
            let root_instance = self.instances.create_root(display);
            self.displays[display].root_instance = Some(root_instance);
            self.rebuild_instance_tree(&op, display);
        }
        self.on_root_attached(root, display);
        self.end_operation(op);
        Ok(display)
    }

    /// Detach a display and dispose its instance tree.
    #[tracing::instrument(skip(self), target = "horizon_a11y::scene", level = "trace")]
    pub fn remove_display(&mut self, display_id: DisplayId) -> SceneResult<()> {
        let root = self.display(display_id)?.root;

        let op = self.begin_operation();
        self.on_root_detached(root, display_id);
        if let Some(rooted) = self.nodes.get_mut(root).map(|state| &mut state.rooted_displays) {
            if let Some(index) = rooted.iter().position(|&d| d == display_id) {
                rooted.remove(index);
            }
        }
        if let Some(removed) = self.displays.remove(display_id) {
            if let Some(root_instance) = removed.root_instance {
                self.instances.dispose(root_instance);
            }
        }
        self.end_operation(op);
        Ok(())
    }

    /// Look up a display.
    pub fn display(&self, display: DisplayId) -> SceneResult<&Display> {
        self.displays.get(display).ok_or(SceneError::InvalidDisplay)
    }

    /// All attached displays.
    pub fn displays(&self) -> impl Iterator<Item = (DisplayId, &Display)> + '_ {
        self.displays.iter()
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    /// Give focus to `node`.
    ///
    /// The node must be focusable and currently have at least one instance.
    pub fn focus(&mut self, node: NodeId) -> SceneResult<()> {
        self.check_node(node)?;
        if !self.can_focus(node) {
            return Err(SceneError::NotFocusable { node });
        }
        self.focus.set_focused(Some(node));
        tracing::debug!(target: "horizon_a11y::focus", ?node, "focused");
        Ok(())
    }

    /// Clear focus, returning the node that held it.
    pub fn blur(&mut self) -> Option<NodeId> {
        self.focus.set_focused(None)
    }

    /// The focused node, if any.
    #[inline]
    pub fn focused_node(&self) -> Option<NodeId> {
        self.focus.focused()
    }

    /// Tell the scene that the surrounding system is dispatching focus
    /// events; while set, closing an operation leaves focus untouched.
    pub fn set_dispatching_focus_events(&mut self, dispatching: bool) {
        self.focus.set_dispatching(dispatching);
    }

    /// Whether the surrounding system is dispatching focus events.
    #[inline]
    pub fn is_dispatching_focus_events(&self) -> bool {
        self.focus.is_dispatching()
    }

    /// Whether focus side effects are currently suspended by an operation.
    #[inline]
    pub fn blocks_focus_side_effects(&self) -> bool {
        self.focus.blocks_side_effects()
    }

    pub(crate) fn can_focus(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|state| state.focusable) && !self.instances.for_node(node).is_empty()
    }

    pub(crate) fn begin_operation(&mut self) -> Operation {
        self.focus.begin()
    }

    pub(crate) fn end_operation(&mut self, op: Operation) {
        let outermost = op.is_outermost();
        if let Some(node) = self.focus.end(op) {
            if self.can_focus(node) {
                if self.config.restore_focus() {
                    self.focus.set_focused(Some(node));
                    tracing::trace!(target: "horizon_a11y::focus", ?node, "focus restored");
                    self.signals.focus_restored.emit(node);
                }
            } else {
                self.focus.set_focused(None);
                tracing::debug!(target: "horizon_a11y::focus", ?node, "focus lost");
                self.signals.focus_lost.emit(node);
            }
        }
        if outermost && self.config.audit_operations() {
            self.audit_or_panic();
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The display membership multiset of `node`.
    pub fn membership(&self, node: NodeId) -> SceneResult<&[DisplayId]> {
        Ok(&self.state(node)?.displays)
    }

    /// The accessible content of `node`.
    pub fn content(&self, node: NodeId) -> SceneResult<Option<&AccessibleContent>> {
        Ok(self.state(node)?.content.as_ref())
    }

    /// The accessible order override of `node`.
    pub fn accessible_order(&self, node: NodeId) -> SceneResult<Option<&[Option<NodeId>]>> {
        Ok(self.state(node)?.order.as_deref())
    }

    /// The node whose accessible order claims `node`.
    pub fn order_parent(&self, node: NodeId) -> SceneResult<Option<NodeId>> {
        Ok(self.state(node)?.order_parent)
    }

    /// Whether `node` is visible to assistive technology on its own.
    pub fn is_accessible_visible(&self, node: NodeId) -> SceneResult<bool> {
        Ok(self.state(node)?.accessible_visible)
    }

    /// Whether `node` may take focus.
    pub fn is_focusable(&self, node: NodeId) -> SceneResult<bool> {
        Ok(self.state(node)?.focusable)
    }

    /// The displays rooted directly at `node`.
    pub fn rooted_displays(&self, node: NodeId) -> SceneResult<&[DisplayId]> {
        Ok(&self.state(node)?.rooted_displays)
    }

    /// The accessible children of `node`, in order.
    pub fn effective_children(&self, node: NodeId) -> SceneResult<Vec<NodeId>> {
        self.check_node(node)?;
        Ok(self.effective_children_of(node))
    }

    /// Instances currently representing `node`.
    pub fn instances_for_node(&self, node: NodeId) -> &[InstanceId] {
        self.instances.for_node(node)
    }

    /// Look up an instance.
    pub fn instance(&self, id: InstanceId) -> Option<&AccessibleInstance> {
        self.instances.get(id)
    }

    /// The child instances of `id`, in accessible order.
    pub fn instance_children(&self, id: InstanceId) -> SceneResult<&[InstanceId]> {
        if !self.instances.contains(id) {
            return Err(SceneError::InvalidInstance);
        }
        Ok(self.instances.children(id))
    }

    /// Total number of live instances across all displays.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// The root instance of an accessible display, `None` otherwise.
    pub fn root_instance(&self, display: DisplayId) -> SceneResult<Option<InstanceId>> {
        Ok(self.display(display)?.root_instance)
    }

    /// A structural copy of a display's instance tree.
    pub fn instance_snapshot(&self, display: DisplayId) -> SceneResult<Option<InstanceSnapshot>> {
        Ok(self
            .root_instance(display)?
            .and_then(|root| self.instances.snapshot(root)))
    }

    /// Debug dump of a display's instance tree.
    pub fn dump_instances(&self, display: DisplayId, options: &TreeFormatOptions) -> SceneResult<String> {
        let Some(root) = self.root_instance(display)? else {
            return Ok(String::new());
        };
        let formatter = TreeFormatter::new(options.clone());
        Ok(formatter.format(
            root,
            |id| {
                let Some(instance) = self.instances.get(id) else {
                    return String::from("(disposed)");
                };
                let mut label = match instance.node() {
                    None => String::from("display"),
                    Some(node) => self.graph.name(node).unwrap_or("(removed)").to_string(),
                };
                if options.show_ids {
                    label.push_str(&format!(" {:?}", instance.trail()));
                }
                label
            },
            |id| self.instances.children(id).to_vec(),
        ))
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    pub(crate) fn check_node(&self, node: NodeId) -> SceneResult<()> {
        self.state(node).map(|_| ())
    }

    fn state(&self, node: NodeId) -> SceneResult<&NodeState> {
        self.nodes.get(node).ok_or(SceneError::Graph(horizon_a11y_core::GraphError::InvalidNodeId))
    }

    fn state_mut(&mut self, node: NodeId) -> SceneResult<&mut NodeState> {
        self.nodes
            .get_mut(node)
            .ok_or(SceneError::Graph(horizon_a11y_core::GraphError::InvalidNodeId))
    }

    /// Whether the node is hidden, either visually or from assistive
    /// technology only.
    pub(crate) fn is_hidden(&self, node: NodeId) -> bool {
        !self.graph.is_visible(node).unwrap_or(false) || self.nodes.get(node).is_none_or(|state| !state.accessible_visible)
    }

    pub(crate) fn order_entries(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node)
            .and_then(|state| state.order.as_ref())
            .map(|order| order.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    /// Accessible children: the order override with its placeholder expanded
    /// to the unclaimed visual children, or just the unclaimed visual
    /// children.
    pub(crate) fn effective_children_of(&self, node: NodeId) -> Vec<NodeId> {
        let natural = self
            .graph
            .children(node)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|&child| self.nodes.get(child).is_some_and(|state| state.order_parent.is_none()));
        let Some(order) = self.nodes.get(node).and_then(|state| state.order.as_ref()) else {
            return natural.collect();
        };

        let mut result = Vec::with_capacity(order.len());
        let mut placed_natural = false;
        for entry in order {
            match entry {
                Some(child) => result.push(*child),
                None => {
                    result.extend(natural.clone());
                    placed_natural = true;
                }
            }
        }
        if !placed_natural {
            result.extend(natural);
        }
        result
    }

    /// Whether making `child` an accessible or visual child of `parent`
    /// would close a cycle through visual-parent and order-parent edges.
    pub(crate) fn would_cycle(&self, parent: NodeId, child: NodeId) -> bool {
        let mut stack = vec![parent];
        let mut visited = HashSet::new();
        while let Some(node) = stack.pop() {
            if node == child {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            stack.extend_from_slice(self.graph.parents(node).unwrap_or_default());
            if let Some(order_parent) = self.nodes.get(node).and_then(|state| state.order_parent) {
                stack.push(order_parent);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::AccessibleRole;

    fn button() -> Option<AccessibleContent> {
        Some(AccessibleContent::new(AccessibleRole::Button))
    }

    #[test]
    fn test_effective_children_placeholder() {
        let mut scene = Scene::new();
        let p = scene.create_node("p");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        let x = scene.create_node("x");
        scene.add_child(p, a).unwrap();
        scene.add_child(p, b).unwrap();

        scene.set_accessible_order(p, Some(vec![Some(x), None])).unwrap();
        assert_eq!(scene.effective_children(p).unwrap(), vec![x, a, b]);

        scene.set_accessible_order(p, Some(vec![Some(b)])).unwrap();
        assert_eq!(scene.effective_children(p).unwrap(), vec![b, a]);
        assert_eq!(scene.order_parent(b).unwrap(), Some(p));
        assert_eq!(scene.order_parent(x).unwrap(), None);

        scene.set_accessible_order(p, Some(Vec::new())).unwrap();
        assert_eq!(scene.accessible_order(p).unwrap(), None);
        assert_eq!(scene.effective_children(p).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_order_validation() {
        let mut scene = Scene::new();
        let p = scene.create_node("p");
        let q = scene.create_node("q");
        let a = scene.create_node("a");

        assert_eq!(
            scene.set_accessible_order(p, Some(vec![None, None])),
            Err(SceneError::MultiplePlaceholders)
        );
        assert_eq!(
            scene.set_accessible_order(p, Some(vec![Some(a), Some(a)])),
            Err(SceneError::DuplicateOrderEntry { node: a })
        );
        assert_eq!(
            scene.set_accessible_order(p, Some(vec![Some(p)])),
            Err(SceneError::Cycle { parent: p, child: p })
        );
        scene.set_accessible_order(p, Some(vec![Some(a)])).unwrap();
        assert_eq!(
            scene.set_accessible_order(q, Some(vec![Some(a)])),
            Err(SceneError::AlreadyClaimed { node: a, claimed_by: p })
        );
    }

    #[test]
    fn test_cycle_through_order_edge_rejected() {
        let mut scene = Scene::new();
        let p = scene.create_node("p");
        let a = scene.create_node("a");
        let c = scene.create_node("c");
        scene.add_child(p, a).unwrap();
        // c is now an accessible child of a, which sits below p
        scene.set_accessible_order(a, Some(vec![Some(c)])).unwrap();
        assert_eq!(scene.add_child(c, p), Err(SceneError::Cycle { parent: c, child: p }));
        assert!(!scene.graph().has_child(c, p));
    }

    #[test]
    fn test_remove_node_detaches_everything() {
        let mut scene = Scene::new();
        let root = scene.create_node("root");
        let mid = scene.create_node("mid");
        let leaf = scene.create_node("leaf");
        let other = scene.create_node("other");
        scene.add_child(root, mid).unwrap();
        scene.add_child(mid, leaf).unwrap();
        scene.add_child(root, other).unwrap();
        scene.set_content(leaf, button()).unwrap();
        scene.set_accessible_order(other, Some(vec![Some(mid)])).unwrap();
        scene.add_display(mid, true).unwrap();

        scene.remove_node(mid).unwrap();
        assert!(!scene.graph().contains(mid));
        assert_eq!(scene.accessible_order(other).unwrap(), None);
        assert!(scene.graph().parents(leaf).unwrap().is_empty());
        assert!(scene.instances_for_node(leaf).is_empty());
        assert_eq!(scene.displays().count(), 0);
        assert!(scene.membership(leaf).unwrap().is_empty());
        assert!(scene.remove_node(mid).is_err());
    }

    #[test]
    fn test_invalid_ids() {
        let mut scene = Scene::new();
        let a = scene.create_node("a");
        let display = scene.add_display(a, false).unwrap();
        scene.remove_node(a).unwrap();
        assert!(scene.membership(a).is_err());
        assert_eq!(scene.remove_display(display), Err(SceneError::InvalidDisplay));
        assert!(matches!(scene.set_content(a, None), Err(SceneError::Graph(_))));
    }

    #[test]
    fn test_instance_children_rejects_disposed_instance() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let a = scene.create_node("a");
        scene.add_child(r, a).unwrap();
        scene
            .set_content(a, Some(AccessibleContent::new(AccessibleRole::Button)))
            .unwrap();
        let display = scene.add_display(r, true).unwrap();
        let root = scene.root_instance(display).unwrap().unwrap();
        let child = scene.instances_for_node(a)[0];
        assert_eq!(scene.instance_children(root).unwrap(), &[child]);
        assert_eq!(scene.instance_children(child).unwrap(), &[] as &[InstanceId]);

        scene.remove_child(r, a).unwrap();
        assert_eq!(scene.instance_children(child), Err(SceneError::InvalidInstance));
        assert!(scene.instance_children(root).unwrap().is_empty());

        scene.remove_display(display).unwrap();
        assert_eq!(scene.instance_children(root), Err(SceneError::InvalidInstance));
    }
}
