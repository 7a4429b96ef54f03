//! AccessKit export of display instance trees.

use accesskit::{Node, NodeId as AccessKitNodeId, Role, Tree, TreeUpdate};
use horizon_a11y_core::NodeId;

use crate::display::DisplayId;
use crate::error::{SceneError, SceneResult};
use crate::instance::InstanceId;
use crate::scene::Scene;

/// Convert an InstanceId to an AccessKit NodeId.
#[inline]
pub fn instance_to_accesskit_id(id: InstanceId) -> AccessKitNodeId {
    AccessKitNodeId(id.as_raw())
}

/// Convert an AccessKit NodeId back to an InstanceId.
#[inline]
pub fn accesskit_id_to_instance(id: AccessKitNodeId) -> InstanceId {
    InstanceId::from_raw(id.0)
}

impl Scene {
    /// Build a full AccessKit tree update for an accessible display.
    ///
    /// The display's root instance becomes a `Window` node; every other
    /// instance becomes a node described by its content. Focus points at the
    /// focused node's instance in this display, or at the root.
    #[tracing::instrument(skip(self), target = "horizon_a11y::scene", level = "trace")]
    pub fn tree_update(&self, display_id: DisplayId) -> SceneResult<TreeUpdate> {
        let data = self.display(display_id)?;
        let root = data
            .root_instance()
            .ok_or(SceneError::InaccessibleDisplay { display: display_id })?;

        let mut nodes = Vec::with_capacity(self.instance_count());
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(instance) = self.instances.get(id) else {
                continue;
            };
            let children: Vec<AccessKitNodeId> = instance.children().iter().copied().map(instance_to_accesskit_id).collect();
            let node = match instance.node() {
                None => {
                    let mut node = Node::new(Role::Window);
                    if let Ok(name) = self.graph.name(data.root_node()) {
                        if !name.is_empty() {
                            node.set_label(name);
                        }
                    }
                    node.set_children(children);
                    node
                }
                Some(scene_node) => {
                    let focusable = self.nodes.get(scene_node).is_some_and(|state| state.focusable);
                    match self.nodes.get(scene_node).and_then(|state| state.content.as_ref()) {
                        Some(content) => content.build_accesskit_node(children, focusable),
                        None => {
                            let mut node = Node::new(Role::GenericContainer);
                            node.set_children(children);
                            node
                        }
                    }
                }
            };
            nodes.push((instance_to_accesskit_id(id), node));
            // reverse so the stack pops children in order
            for &child in instance.children().iter().rev() {
                stack.push(child);
            }
        }

        let focus = self
            .focused_node()
            .and_then(|node| self.instance_in_display(node, display_id))
            .map(instance_to_accesskit_id)
            .unwrap_or_else(|| instance_to_accesskit_id(root));

        tracing::debug!(target: "horizon_a11y::scene", ?display_id, nodes = nodes.len(), "built tree update");
        Ok(TreeUpdate {
            nodes,
            tree: Some(Tree::new(instance_to_accesskit_id(root))),
            focus,
        })
    }

    /// Map an AccessKit node back to the scene node it represents.
    ///
    /// Returns `None` for root instances and stale ids.
    pub fn node_for_accesskit_id(&self, id: AccessKitNodeId) -> Option<NodeId> {
        self.instances.get(accesskit_id_to_instance(id))?.node()
    }

    fn instance_in_display(&self, node: NodeId, display: DisplayId) -> Option<InstanceId> {
        self.instances
            .for_node(node)
            .iter()
            .copied()
            .find(|&id| self.instances.get(id).is_some_and(|i| i.display() == display))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessibleContent, AccessibleRole};

    #[test]
    fn test_tree_update_structure() {
        let mut scene = Scene::new();
        let root = scene.create_node("Main");
        let ok = scene.create_node("ok");
        let cancel = scene.create_node("cancel");
        scene.add_child(root, ok).unwrap();
        scene.add_child(root, cancel).unwrap();
        scene
            .set_content(ok, Some(AccessibleContent::new(AccessibleRole::Button).with_label("OK")))
            .unwrap();
        scene
            .set_content(cancel, Some(AccessibleContent::new(AccessibleRole::Button).with_label("Cancel")))
            .unwrap();
        scene.set_focusable(cancel, true).unwrap();
        let display = scene.add_display(root, true).unwrap();
        scene.focus(cancel).unwrap();

        let update = scene.tree_update(display).unwrap();
        assert_eq!(update.nodes.len(), 3);
        let (root_id, root_node) = &update.nodes[0];
        assert_eq!(root_node.role(), Role::Window);
        assert_eq!(root_node.label(), Some("Main"));
        assert_eq!(update.tree.as_ref().map(|t| t.root), Some(*root_id));
        assert_eq!(root_node.children().len(), 2);

        let (ok_id, ok_node) = &update.nodes[1];
        assert_eq!(ok_node.label(), Some("OK"));
        assert_eq!(scene.node_for_accesskit_id(*ok_id), Some(ok));

        let cancel_id = instance_to_accesskit_id(scene.instances_for_node(cancel)[0]);
        assert_eq!(update.focus, cancel_id);
    }

    #[test]
    fn test_inaccessible_display_has_no_tree() {
        let mut scene = Scene::new();
        let root = scene.create_node("root");
        let display = scene.add_display(root, false).unwrap();
        assert_eq!(
            scene.tree_update(display).map(|_| ()),
            Err(SceneError::InaccessibleDisplay { display })
        );
    }

    #[test]
    fn test_id_round_trip() {
        let mut scene = Scene::new();
        let root = scene.create_node("root");
        let display = scene.add_display(root, true).unwrap();
        let instance = scene.root_instance(display).unwrap().unwrap();
        assert_eq!(accesskit_id_to_instance(instance_to_accesskit_id(instance)), instance);
        assert_eq!(scene.node_for_accesskit_id(instance_to_accesskit_id(instance)), None);
    }
}
