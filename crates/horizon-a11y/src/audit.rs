//! Consistency audits.
//!
//! Membership lists and instance trees are derived state: both can be
//! recomputed from the node graph alone. The audits do exactly that and diff
//! the result against the live state.

use horizon_a11y_core::{NodeId, Trail};
use slotmap::SecondaryMap;

use crate::display::DisplayId;
use crate::error::AuditError;
use crate::instance::InstanceSnapshot;
use crate::scene::Scene;

/// Depth-first walk state of a node during the cycle audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// On the current walk.
    Active,
    /// All of its ancestors are known to be cycle-free.
    Done,
}

impl Scene {
    /// Check every invariant the scene maintains.
    ///
    /// # Errors
    ///
    /// Returns the first broken invariant found.
    pub fn audit(&self) -> Result<(), AuditError> {
        let mut visits = SecondaryMap::new();
        for node in self.graph.node_ids() {
            let mut trail = Trail::from_node(node);
            self.audit_cycles_from(&mut trail, &mut visits)?;
        }
        self.audit_membership()?;
        self.audit_instances()
    }

    /// Walk every visual-parent and order-parent edge upward from `node` and
    /// fail if a walk comes back to a node already on it.
    ///
    /// Each node and edge above `node` is visited once.
    pub fn audit_cycles(&self, node: NodeId) -> Result<(), AuditError> {
        let mut trail = Trail::from_node(node);
        self.audit_cycles_from(&mut trail, &mut SecondaryMap::new())
    }

    fn audit_cycles_from(&self, trail: &mut Trail, visits: &mut SecondaryMap<NodeId, Visit>) -> Result<(), AuditError> {
        let Some(top) = trail.root_node() else {
            return Ok(());
        };
        if visits.get(top).is_some() {
            return Ok(());
        }
        visits.insert(top, Visit::Active);

        let parents = self.graph.parents(top).unwrap_or_default();
        let order_parent = self
            .nodes
            .get(top)
            .and_then(|state| state.order_parent)
            .filter(|order_parent| !parents.contains(order_parent));

        for parent in parents.iter().copied().chain(order_parent) {
            match visits.get(parent) {
                Some(Visit::Active) => {
                    let mut cycle = trail.clone();
                    cycle.add_ancestor(parent);
                    return Err(AuditError::Cycle { node: parent, trail: cycle });
                }
                Some(Visit::Done) => continue,
                None => {}
            }
            trail.add_ancestor(parent);
            let result = self.audit_cycles_from(trail, visits);
            trail.remove_ancestor();
            result?;
        }

        visits.insert(top, Visit::Done);
        Ok(())
    }

    fn audit_membership(&self) -> Result<(), AuditError> {
        let mut expected = SecondaryMap::new();
        for node in self.graph.node_ids() {
            let mut want = self.expected_membership(node, &mut expected).clone();
            let mut have = self.nodes.get(node).map(|s| s.displays.clone()).unwrap_or_default();
            want.sort();
            have.sort();
            if want != have {
                return Err(AuditError::Membership {
                    node,
                    expected: want,
                    actual: have,
                });
            }
        }
        Ok(())
    }

    fn expected_membership<'a>(
        &self,
        node: NodeId,
        memo: &'a mut SecondaryMap<NodeId, Vec<DisplayId>>,
    ) -> &'a Vec<DisplayId> {
        if !memo.contains_key(node) {
            let mut displays = Vec::new();
            if self.can_have_membership(node) {
                for &parent in self.graph.parents(node).unwrap_or_default() {
                    displays.extend_from_slice(self.expected_membership(parent, memo));
                }
                displays.extend(
                    self.nodes[node]
                        .rooted_displays
                        .iter()
                        .copied()
                        .filter(|&display| self.displays.get(display).is_some_and(|d| d.is_accessible())),
                );
            }
            memo.insert(node, displays);
        }
        &memo[node]
    }

    fn audit_instances(&self) -> Result<(), AuditError> {
        for (id, instance) in self.instances.iter() {
            let children = instance.children();
            for (i, &child) in children.iter().enumerate() {
                let Some(trail) = self.instances.get(child).map(|c| c.trail()) else {
                    continue;
                };
                let duplicate = children[i + 1..]
                    .iter()
                    .any(|&other| self.instances.get(other).is_some_and(|o| o.trail() == trail));
                if duplicate {
                    return Err(AuditError::DuplicateInstance {
                        parent: id,
                        trail: trail.clone(),
                    });
                }
            }
        }

        for (display_id, data) in self.displays.iter() {
            let Some(root_instance) = data.root_instance() else {
                continue;
            };
            let mut trail = Trail::from_node(data.root_node());
            let expected = InstanceSnapshot {
                trail: Trail::new(),
                children: self.expected_instances(&mut trail),
            };
            if self.instances.snapshot(root_instance).as_ref() != Some(&expected) {
                tracing::debug!(
                    target: "horizon_a11y::sync",
                    ?display_id,
                    ?expected,
                    actual = ?self.instances.snapshot(root_instance),
                    "instance tree mismatch"
                );
                return Err(AuditError::InstanceTree { display: display_id });
            }
        }
        Ok(())
    }

    /// The instances a fresh build from `trail` would produce.
    fn expected_instances(&self, trail: &mut Trail) -> Vec<InstanceSnapshot> {
        let Some(node) = trail.last_node() else {
            return Vec::new();
        };
        if self.is_hidden(node) {
            return Vec::new();
        }
        let mut children = Vec::new();
        for child in self.effective_children_of(node) {
            trail.add_descendant(child);
            children.extend(self.expected_instances(trail));
            trail.remove_descendant();
        }
        if self.nodes[node].content.is_some() {
            vec![InstanceSnapshot {
                trail: trail.clone(),
                children,
            }]
        } else {
            children
        }
    }

    pub(crate) fn audit_or_panic(&self) {
        if let Err(err) = self.audit() {
            tracing::error!(target: "horizon_a11y::scene", %err, "accessibility audit failed");
            panic!("accessibility audit failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::AuditError;
    use crate::{AccessibleContent, AccessibleRole, Scene, SceneConfig};

    #[test]
    fn test_audit_passes_on_consistent_scene() {
        let mut scene = Scene::with_config(SceneConfig::default().with_audit_operations(false));
        let r = scene.create_node("r");
        let a = scene.create_node("a");
        let b = scene.create_node("b");
        scene.add_child(r, a).unwrap();
        scene.add_child(r, b).unwrap();
        scene.set_content(b, Some(AccessibleContent::new(AccessibleRole::Button))).unwrap();
        scene.set_accessible_order(a, Some(vec![Some(b)])).unwrap();
        scene.add_display(r, true).unwrap();
        assert_eq!(scene.audit(), Ok(()));
    }

    #[test]
    fn test_audit_detects_membership_drift() {
        let mut scene = Scene::with_config(SceneConfig::default().with_audit_operations(false));
        let r = scene.create_node("r");
        scene.set_content(r, Some(AccessibleContent::new(AccessibleRole::Button))).unwrap();
        let display = scene.add_display(r, true).unwrap();
        scene.nodes[r].displays.push(display);
        assert!(matches!(scene.audit(), Err(AuditError::Membership { node, .. }) if node == r));
    }

    #[test]
    fn test_audit_detects_stale_instances() {
        let mut scene = Scene::with_config(SceneConfig::default().with_audit_operations(false));
        let r = scene.create_node("r");
        scene.set_content(r, Some(AccessibleContent::new(AccessibleRole::Button))).unwrap();
        let display = scene.add_display(r, true).unwrap();
        scene.nodes[r].content = None;
        assert!(matches!(scene.audit(), Err(AuditError::InstanceTree { display: d }) if d == display));
    }

    #[test]
    fn test_audit_cycles_reports_order_loop() {
        let mut scene = Scene::with_config(SceneConfig::default().with_audit_operations(false));
        let p = scene.create_node("p");
        let c = scene.create_node("c");
        scene.add_child(p, c).unwrap();
        assert_eq!(scene.audit_cycles(c), Ok(()));
        // bypasses the runtime check to build an invalid configuration
        scene.nodes[p].order_parent = Some(c);
        assert!(matches!(scene.audit_cycles(c), Err(AuditError::Cycle { node, .. }) if node == c));
    }

    #[test]
    fn test_audit_cycles_on_deep_lattice() {
        // every node sits below both nodes of the previous layer, so the
        // number of upward paths doubles per layer; the edges go straight
        // into the graph since no display needs instances here
        let mut scene = Scene::with_config(SceneConfig::default().with_audit_operations(false));
        let mut layer = [scene.create_node("top-0"), scene.create_node("top-1")];
        for depth in 0..48 {
            let next = [
                scene.create_node(format!("l{depth}-0")),
                scene.create_node(format!("l{depth}-1")),
            ];
            for &parent in &layer {
                for &child in &next {
                    scene.graph.add_child(parent, child).unwrap();
                }
            }
            layer = next;
        }

        assert_eq!(scene.audit_cycles(layer[0]), Ok(()));
        assert_eq!(scene.audit(), Ok(()));
    }
}
