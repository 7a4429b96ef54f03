//! Instance-tree synchronization.
//!
//! Translates node graph edits into creations, removals and re-sorts of
//! accessibility instances. Each primitive takes the [`Operation`] of the
//! enclosing bracket; none of them open brackets of their own.
//!
//! Instances are keyed by trail. A node with content owns one instance per
//! trail reaching it from an accessible display root; a node without content
//! owns none, and its accessible descendants are hoisted into the instance of
//! the nearest content-bearing ancestor (or the display's root instance).

use horizon_a11y_core::{NodeId, PerfSpan, Trail};

use crate::display::DisplayId;
use crate::focus::Operation;
use crate::instance::{InstanceId, InstanceTree};
use crate::scene::Scene;

/// An upward search result: the instance below which the searched node's
/// content attaches, and the trail that content extends.
#[derive(Debug, Clone)]
pub(crate) struct AccessiblePath {
    /// The instance the partial trail hangs from.
    pub(crate) instance: InstanceId,
    /// The instance's trail extended by the partial trail down to the
    /// searched node.
    pub(crate) full_trail: Trail,
}

impl AccessiblePath {
    /// `is_root` marks a display root instance, whose trail is empty.
    fn new(instances: &InstanceTree, instance: InstanceId, trail: &Trail, is_root: bool) -> Self {
        let mut full_trail = instances
            .get(instance)
            .map(|i| i.trail().clone())
            .unwrap_or_default();
        // a content-bearing ancestor already ends the instance's trail
        let skip = if is_root { 0 } else { 1 };
        for &node in trail.nodes().iter().skip(skip) {
            full_trail.add_descendant(node);
        }
        Self { instance, full_trail }
    }
}

impl Scene {
    /// Find every place in the instance trees where content below `node`
    /// would be attached.
    pub(crate) fn find_accessible_paths(&self, node: NodeId) -> Vec<AccessiblePath> {
        let mut paths = Vec::new();
        let mut trail = Trail::from_node(node);
        self.collect_accessible_paths(&mut trail, &mut paths);
        tracing::trace!(target: "horizon_a11y::sync", ?node, count = paths.len(), "found accessible paths");
        paths
    }

    fn collect_accessible_paths(&self, trail: &mut Trail, paths: &mut Vec<AccessiblePath>) {
        let Some(top) = trail.root_node() else {
            return;
        };
        if self.is_hidden(top) {
            return;
        }
        let state = &self.nodes[top];

        // existing instances already stand for every valid path above
        if state.content.is_some() {
            for &instance in self.instances.for_node(top) {
                paths.push(AccessiblePath::new(&self.instances, instance, trail, false));
            }
            return;
        }

        for &display in &state.rooted_displays {
            if let Some(root_instance) = self.displays.get(display).and_then(|d| d.root_instance()) {
                paths.push(AccessiblePath::new(&self.instances, root_instance, trail, true));
            }
        }

        match state.order_parent {
            Some(order_parent) => {
                trail.add_ancestor(order_parent);
                self.collect_accessible_paths(trail, paths);
                trail.remove_ancestor();
            }
            None => {
                for &parent in self.graph.parents(top).unwrap_or_default() {
                    trail.add_ancestor(parent);
                    self.collect_accessible_paths(trail, paths);
                    trail.remove_ancestor();
                }
            }
        }
    }

    /// Build the instances for `child` below every path reaching `parent`.
    pub(crate) fn add_tree(&mut self, op: &Operation, parent: NodeId, child: NodeId, paths: Option<&[AccessiblePath]>) {
        let found;
        let paths = match paths {
            Some(paths) => paths,
            None => {
                found = self.find_accessible_paths(parent);
                found.as_slice()
            }
        };
        tracing::trace!(target: "horizon_a11y::sync", ?parent, ?child, depth = op.depth(), "add tree");

        for path in paths {
            let Some(display) = self.instances.get(path.instance).map(|i| i.display()) else {
                continue;
            };
            let mut trail = path.full_trail.clone();
            trail.add_descendant(child);
            let created = self.create_tree(&mut trail, display, path.instance);
            trail.remove_descendant();
            self.attach_instances(path.instance, &created);
        }
    }

    /// Dispose the instances for `child` below every path reaching `parent`.
    pub(crate) fn remove_tree(&mut self, op: &Operation, parent: NodeId, child: NodeId, paths: Option<&[AccessiblePath]>) {
        let found;
        let paths = match paths {
            Some(paths) => paths,
            None => {
                found = self.find_accessible_paths(parent);
                found.as_slice()
            }
        };
        tracing::trace!(target: "horizon_a11y::sync", ?parent, ?child, depth = op.depth(), "remove tree");

        for path in paths {
            let mut trail = path.full_trail.clone();
            trail.add_descendant(child);
            self.instances.remove_instances_for_trail(path.instance, &trail);
            trail.remove_descendant();
        }
    }

    /// Build the instances for the subtree at the end of `trail`.
    ///
    /// Returns the new instances the caller must attach to `parent`: the
    /// node's own instance if it was created, nothing if an instance for
    /// `trail` already existed, or the hoisted child instances if the node
    /// has no content.
    pub(crate) fn create_tree(&mut self, trail: &mut Trail, display: DisplayId, parent: InstanceId) -> Vec<InstanceId> {
        let Some(node) = trail.last_node() else {
            return Vec::new();
        };
        if self.is_hidden(node) {
            return Vec::new();
        }

        let mut reused = false;
        let own = if self.nodes[node].content.is_some() {
            match self.instances.find_child_with_trail(parent, trail) {
                Some(existing) => {
                    reused = true;
                    Some(existing)
                }
                None => Some(self.instances.create(parent, display, trail.clone())),
            }
        } else {
            None
        };

        let next_parent = own.unwrap_or(parent);
        let mut collected = Vec::new();
        for child in self.effective_children_of(node) {
            trail.add_descendant(child);
            collected.extend(self.create_tree(trail, display, next_parent));
            trail.remove_descendant();
        }

        match own {
            Some(instance) => {
                self.attach_instances(instance, &collected);
                if reused { Vec::new() } else { vec![instance] }
            }
            None => collected,
        }
    }

    /// Append a run to `parent`, re-sorting if it already had children.
    pub(crate) fn attach_instances(&mut self, parent: InstanceId, run: &[InstanceId]) {
        if run.is_empty() {
            return;
        }
        if self.instances.add_consecutive(parent, run) {
            self.sort_children(parent);
        }
    }

    /// Sort the children of `instance` into effective-children order.
    pub(crate) fn sort_children(&mut self, instance: InstanceId) {
        let Some(inst) = self.instances.get(instance) else {
            return;
        };
        if inst.children().len() < 2 {
            return;
        }
        let own_len = inst.trail().len();
        let mut trail = if inst.is_root() {
            match self.displays.get(inst.display()) {
                Some(display) => Trail::from_node(display.root_node()),
                None => return,
            }
        } else {
            inst.trail().clone()
        };

        let mut remaining = inst.children().to_vec();
        let mut ordered = Vec::with_capacity(remaining.len());
        self.child_ordering(&mut trail, own_len, &mut remaining, &mut ordered);
        debug_assert!(remaining.is_empty(), "instance children not reachable by effective order");
        ordered.append(&mut remaining);
        self.instances.set_children(instance, ordered);
    }

    /// Move the children in `remaining` into `ordered` in the order a
    /// traversal from `trail` would create them.
    fn child_ordering(
        &self,
        trail: &mut Trail,
        own_len: usize,
        remaining: &mut Vec<InstanceId>,
        ordered: &mut Vec<InstanceId>,
    ) {
        let Some(node) = trail.last_node() else {
            return;
        };
        if self.is_hidden(node) {
            return;
        }

        if trail.len() > own_len && self.nodes[node].content.is_some() {
            let found = remaining
                .iter()
                .position(|&child| self.instances.get(child).is_some_and(|i| i.trail() == &*trail));
            if let Some(index) = found {
                ordered.push(remaining.remove(index));
            }
            return;
        }

        for child in self.effective_children_of(node) {
            trail.add_descendant(child);
            self.child_ordering(trail, own_len, remaining, ordered);
            trail.remove_descendant();
        }
    }

    /// Re-sort every instance below which content of `node` is attached.
    pub(crate) fn reorder(&mut self, op: &Operation, node: NodeId, paths: Option<&[AccessiblePath]>) {
        let found;
        let paths = match paths {
            Some(paths) => paths,
            None => {
                found = self.find_accessible_paths(node);
                found.as_slice()
            }
        };
        tracing::trace!(target: "horizon_a11y::sync", ?node, depth = op.depth(), "reorder");
        for path in paths {
            self.sort_children(path.instance);
        }
    }

    /// Apply an accessible order change of `node`.
    ///
    /// Every removal completes before any addition. A node moving into or
    /// out of the order of its own visual parent keeps its trail, so its
    /// instances are reused and only the final reorder touches them.
    pub(crate) fn order_change(&mut self, op: &Operation, node: NodeId, removed: &[NodeId], added: &[NodeId]) {
        let _span = PerfSpan::new("order_change");
        let paths = self.find_accessible_paths(node);

        for &child in removed {
            if !self.graph.has_child(node, child) {
                self.remove_tree(op, node, child, Some(paths.as_slice()));
            }
            self.nodes[child].order_parent = None;
            self.signals().order_parent_changed.emit(child);
        }
        for &child in added {
            for parent in self.graph.parents(child).unwrap_or_default().to_vec() {
                if parent != node {
                    self.remove_tree(op, parent, child, None);
                }
            }
            self.nodes[child].order_parent = Some(node);
            self.signals().order_parent_changed.emit(child);
        }

        for &child in removed {
            for parent in self.graph.parents(child).unwrap_or_default().to_vec() {
                self.add_tree(op, parent, child, None);
            }
        }
        for &child in added {
            self.add_tree(op, node, child, Some(paths.as_slice()));
        }

        self.reorder(op, node, Some(paths.as_slice()));
        tracing::debug!(
            target: "horizon_a11y::sync",
            ?node,
            removed = removed.len(),
            added = added.len(),
            "accessible order changed"
        );
    }

    /// Remove everything `node` contributes and build it again.
    ///
    /// Used when the node gains or loses content or changes visibility.
    /// Displays rooted at the node are rebuilt from scratch.
    pub(crate) fn rebuild_contribution(&mut self, op: &Operation, node: NodeId) {
        let _span = PerfSpan::new("rebuild_contribution");
        let parents = match self.nodes[node].order_parent {
            Some(order_parent) => vec![order_parent],
            None => self.graph.parents(node).unwrap_or_default().to_vec(),
        };
        let parent_paths: Vec<(NodeId, Vec<AccessiblePath>)> = parents
            .into_iter()
            .map(|parent| (parent, self.find_accessible_paths(parent)))
            .collect();

        for (parent, paths) in &parent_paths {
            self.remove_tree(op, *parent, node, Some(paths.as_slice()));
        }
        for (parent, paths) in &parent_paths {
            self.add_tree(op, *parent, node, Some(paths.as_slice()));
        }

        for display in self.nodes[node].rooted_displays.clone() {
            self.rebuild_instance_tree(op, display);
        }
    }

    /// Throw away a display's instance tree and build it from its root.
    pub(crate) fn rebuild_instance_tree(&mut self, op: &Operation, display_id: DisplayId) {
        let Some((root, root_instance)) = self
            .displays
            .get(display_id)
            .and_then(|d| d.root_instance().map(|instance| (d.root_node(), instance)))
        else {
            return;
        };
        tracing::debug!(target: "horizon_a11y::sync", ?display_id, depth = op.depth(), "rebuild instance tree");

        self.instances.remove_all_children(root_instance);
        let mut trail = Trail::from_node(root);
        let created = self.create_tree(&mut trail, display_id, root_instance);
        self.attach_instances(root_instance, &created);
    }
}

#[cfg(test)]
mod tests {
    use crate::{AccessibleContent, AccessibleRole, InstanceSnapshot, Scene};
    use horizon_a11y_core::Trail;

    fn content() -> Option<AccessibleContent> {
        Some(AccessibleContent::new(AccessibleRole::Group))
    }

    fn leaf(trail: Trail) -> InstanceSnapshot {
        InstanceSnapshot {
            trail,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_paths_hoist_through_containers() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let a = scene.create_node("a");
        scene.add_child(r, a).unwrap();
        let display = scene.add_display(r, true).unwrap();

        let paths = scene.find_accessible_paths(a);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].full_trail, Trail::from_nodes([r, a]));
        assert_eq!(Some(paths[0].instance), scene.root_instance(display).unwrap());
    }

    #[test]
    fn test_paths_stop_at_content() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        scene.add_child(r, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.set_content(a, content()).unwrap();
        scene.add_display(r, true).unwrap();

        let paths = scene.find_accessible_paths(b);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].instance, scene.instances_for_node(a)[0]);
        assert_eq!(paths[0].full_trail, Trail::from_nodes([r, a, b]));
    }

    #[test]
    fn test_content_nests_instances() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        let c = scene.create_node("c");
        let display = scene.add_display(r, true).unwrap();
        scene.add_child(r, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(a, c).unwrap();
        scene.set_content(b, content()).unwrap();
        scene.set_content(c, content()).unwrap();

        let snapshot = scene.instance_snapshot(display).unwrap().unwrap();
        assert_eq!(
            snapshot.children,
            vec![leaf(Trail::from_nodes([r, a, b])), leaf(Trail::from_nodes([r, a, c]))]
        );

        // a gaining content pulls b and c below its own instance
        scene.set_content(a, content()).unwrap();
        let snapshot = scene.instance_snapshot(display).unwrap().unwrap();
        assert_eq!(
            snapshot.children,
            vec![InstanceSnapshot {
                trail: Trail::from_nodes([r, a]),
                children: vec![leaf(Trail::from_nodes([r, a, b])), leaf(Trail::from_nodes([r, a, c]))],
            }]
        );
        assert_eq!(snapshot.count(), 4);
    }

    #[test]
    fn test_insert_child_sorts_into_place() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        let c = scene.create_node("c");
        let display = scene.add_display(r, true).unwrap();
        for node in [a, b, c] {
            scene.set_content(node, content()).unwrap();
        }
        scene.add_child(r, a).unwrap();
        scene.add_child(r, c).unwrap();
        scene.insert_child(r, 1, b).unwrap();

        let snapshot = scene.instance_snapshot(display).unwrap().unwrap();
        let trails: Vec<_> = snapshot.children.iter().map(|s| s.trail.clone()).collect();
        assert_eq!(
            trails,
            vec![Trail::from_nodes([r, a]), Trail::from_nodes([r, b]), Trail::from_nodes([r, c])]
        );

        scene.move_child(r, a, 2).unwrap();
        let snapshot = scene.instance_snapshot(display).unwrap().unwrap();
        assert_eq!(snapshot.children[2].trail, Trail::from_nodes([r, a]));
    }

    #[test]
    fn test_order_moves_instances_between_parents() {
        let mut scene = Scene::new();
        let r = scene.create_node("r");
        let p = scene.create_node("p");
        let q = scene.create_node("q");
        let x = scene.create_node("x");
        scene.add_child(r, p).unwrap();
        scene.add_child(r, q).unwrap();
        scene.add_child(p, x).unwrap();
        scene.set_content(q, content()).unwrap();
        scene.set_content(x, content()).unwrap();
        let display = scene.add_display(r, true).unwrap();

        scene.set_accessible_order(q, Some(vec![Some(x)])).unwrap();
        let instances = scene.instances_for_node(x);
        assert_eq!(instances.len(), 1);
        let instance = scene.instance(instances[0]).unwrap();
        assert_eq!(instance.trail(), &Trail::from_nodes([r, q, x]));
        assert_eq!(instance.parent(), Some(scene.instances_for_node(q)[0]));

        scene.set_accessible_order(q, None).unwrap();
        let instance = scene.instance(scene.instances_for_node(x)[0]).unwrap();
        assert_eq!(instance.trail(), &Trail::from_nodes([r, p, x]));
        assert_eq!(instance.parent(), scene.root_instance(display).unwrap());
    }
}
