//! Accessibility instances: the nodes of the secondary tree.
//!
//! Each instance wraps one [`Trail`] ending at a content-bearing node (or, for
//! a display's root instance, the empty trail). Instances live in an arena
//! owned by the scene; a parent instance owns its children, never the node.

use horizon_a11y_core::{NodeId, Trail};
use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::display::DisplayId;

new_key_type! {
    /// A unique identifier for an accessibility instance.
    pub struct InstanceId;
}

impl InstanceId {
    /// Convert the InstanceId to a raw u64 value, stable while it lives.
    #[inline]
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }

    /// Reconstruct an InstanceId from a raw value produced by [`as_raw`](Self::as_raw).
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        slotmap::KeyData::from_ffi(raw).into()
    }
}

/// One node of an accessibility instance tree.
#[derive(Debug, Clone)]
pub struct AccessibleInstance {
    parent: Option<InstanceId>,
    display: DisplayId,
    node: Option<NodeId>,
    trail: Trail,
    children: Vec<InstanceId>,
}

impl AccessibleInstance {
    /// The parent instance, `None` for a display's root instance.
    pub fn parent(&self) -> Option<InstanceId> {
        self.parent
    }

    /// The display this instance belongs to.
    pub fn display(&self) -> DisplayId {
        self.display
    }

    /// The content-bearing node at the end of the trail, `None` for a root
    /// instance.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// The full trail from the display root to this instance's node.
    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Child instances, in effective-children order.
    pub fn children(&self) -> &[InstanceId] {
        &self.children
    }

    /// Whether this is a display's root instance.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A detached copy of an instance subtree, compared structurally.
///
/// Instance ids are not part of the snapshot, so a tree rebuilt from scratch
/// compares equal to an incrementally maintained one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceSnapshot {
    /// The instance's trail.
    pub trail: Trail,
    /// Snapshots of the child instances, in order.
    pub children: Vec<InstanceSnapshot>,
}

impl InstanceSnapshot {
    /// Total number of instances in this snapshot, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(InstanceSnapshot::count).sum::<usize>()
    }
}

/// Arena of accessibility instances plus a node-to-instances index.
#[derive(Default)]
pub(crate) struct InstanceTree {
    instances: SlotMap<InstanceId, AccessibleInstance>,
    by_node: SecondaryMap<NodeId, Vec<InstanceId>>,
}

impl InstanceTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, id: InstanceId) -> Option<&AccessibleInstance> {
        self.instances.get(id)
    }

    pub(crate) fn contains(&self, id: InstanceId) -> bool {
        self.instances.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.instances.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (InstanceId, &AccessibleInstance)> {
        self.instances.iter()
    }

    pub(crate) fn children(&self, id: InstanceId) -> &[InstanceId] {
        self.instances
            .get(id)
            .map(|i| i.children.as_slice())
            .unwrap_or_default()
    }

    /// Instances currently associated with a node.
    pub(crate) fn for_node(&self, node: NodeId) -> &[InstanceId] {
        self.by_node
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn snapshot(&self, id: InstanceId) -> Option<InstanceSnapshot> {
        let instance = self.instances.get(id)?;
        Some(InstanceSnapshot {
            trail: instance.trail.clone(),
            children: instance
                .children
                .iter()
                .filter_map(|&child| self.snapshot(child))
                .collect(),
        })
    }

    /// Create a display's root instance.
    pub(crate) fn create_root(&mut self, display: DisplayId) -> InstanceId {
        self.instances.insert(AccessibleInstance {
            parent: None,
            display,
            node: None,
            trail: Trail::new(),
            children: Vec::new(),
        })
    }

    /// Create an unattached instance for `trail` whose eventual parent is
    /// `parent`. The caller attaches it with [`add_consecutive`](Self::add_consecutive).
    pub(crate) fn create(&mut self, parent: InstanceId, display: DisplayId, trail: Trail) -> InstanceId {
        let node = trail.last_node();
        let id = self.instances.insert(AccessibleInstance {
            parent: Some(parent),
            display,
            node,
            trail,
            children: Vec::new(),
        });
        if let Some(node) = node {
            match self.by_node.entry(node) {
                Some(slotmap::secondary::Entry::Occupied(mut entry)) => entry.get_mut().push(id),
                Some(slotmap::secondary::Entry::Vacant(entry)) => {
                    entry.insert(vec![id]);
                }
                None => {}
            }
        }
        tracing::trace!(target: "horizon_a11y::sync", ?id, ?parent, "created instance");
        id
    }

    /// Find the child of `parent` keyed by exactly `trail`.
    pub(crate) fn find_child_with_trail(&self, parent: InstanceId, trail: &Trail) -> Option<InstanceId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|&child| self.instances[child].trail == *trail)
    }

    /// Append a run of instances to `parent`'s children.
    ///
    /// Returns `true` if the parent already had children, in which case the
    /// caller must re-sort.
    pub(crate) fn add_consecutive(&mut self, parent: InstanceId, run: &[InstanceId]) -> bool {
        debug_assert!(
            run.iter().all(|&child| {
                let trail = &self.instances[child].trail;
                self.find_child_with_trail(parent, trail).is_none()
            }),
            "duplicate accessibility instance for an identical trail"
        );
        let Some(instance) = self.instances.get_mut(parent) else {
            return false;
        };
        let had_children = !instance.children.is_empty();
        instance.children.extend_from_slice(run);
        for &child in run {
            if let Some(child) = self.instances.get_mut(child) {
                child.parent = Some(parent);
            }
        }
        had_children
    }

    /// Replace the child order of `parent` with a permutation of its children.
    pub(crate) fn set_children(&mut self, parent: InstanceId, children: Vec<InstanceId>) {
        if let Some(instance) = self.instances.get_mut(parent) {
            debug_assert_eq!(instance.children.len(), children.len());
            instance.children = children;
        }
    }

    /// Dispose every child of `parent` whose trail extends `trail`.
    ///
    /// Returns the number of direct children removed.
    pub(crate) fn remove_instances_for_trail(&mut self, parent: InstanceId, trail: &Trail) -> usize {
        let doomed: Vec<InstanceId> = self
            .children(parent)
            .iter()
            .copied()
            .filter(|&child| self.instances[child].trail.is_extension_of(trail))
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        if let Some(instance) = self.instances.get_mut(parent) {
            instance.children.retain(|child| !doomed.contains(child));
        }
        for &child in &doomed {
            self.dispose(child);
        }
        doomed.len()
    }

    /// Dispose all children of `parent`, keeping `parent` itself.
    pub(crate) fn remove_all_children(&mut self, parent: InstanceId) {
        let children = match self.instances.get_mut(parent) {
            Some(instance) => std::mem::take(&mut instance.children),
            None => return,
        };
        for child in children {
            self.dispose(child);
        }
    }

    /// Remove an instance and its whole subtree from the arena.
    ///
    /// Does not detach it from its parent's child list.
    pub(crate) fn dispose(&mut self, id: InstanceId) {
        let Some(instance) = self.instances.remove(id) else {
            return;
        };
        if let Some(node) = instance.node {
            if let Some(list) = self.by_node.get_mut(node) {
                list.retain(|&other| other != id);
                if list.is_empty() {
                    self.by_node.remove(node);
                }
            }
        }
        tracing::trace!(target: "horizon_a11y::sync", ?id, "disposed instance");
        for child in instance.children {
            self.dispose(child);
        }
    }
}
