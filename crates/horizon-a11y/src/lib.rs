//! Accessibility-tree synchronization for retained-mode scene graphs.
//!
//! Horizon A11y keeps a tree of accessibility *instances* in step with a
//! visual node graph that is a DAG: a node may have several parents, may
//! override the order of its accessible children, and may appear under any
//! number of displays at once. Each instance stands for one [`Trail`] from a
//! display root to a node that carries [`AccessibleContent`].
//!
//! The [`Scene`] is the entry point. Every mutation first updates the
//! per-node display membership (which displays a node currently belongs to,
//! with multiplicity), then creates, disposes or re-sorts only the instances
//! the change affects.
//!
//! # Example
//!
//! ```
//! use horizon_a11y::{AccessibleContent, AccessibleRole, Scene};
//! use horizon_a11y_core::Trail;
//!
//! let mut scene = Scene::new();
//! let root = scene.create_node("root");
//! let left = scene.create_node("left");
//! let right = scene.create_node("right");
//! let shared = scene.create_node("shared");
//! scene.add_child(root, left)?;
//! scene.add_child(root, right)?;
//! scene.add_child(left, shared)?;
//! scene.add_child(right, shared)?;
//! scene.set_content(shared, Some(AccessibleContent::new(AccessibleRole::Image)))?;
//!
//! let display = scene.add_display(root, true)?;
//!
//! // One instance per path.
//! assert_eq!(scene.membership(shared)?, &[display, display]);
//! let trails: Vec<Trail> = scene
//!     .instances_for_node(shared)
//!     .iter()
//!     .filter_map(|&id| scene.instance(id))
//!     .map(|instance| instance.trail().clone())
//!     .collect();
//! assert!(trails.contains(&Trail::from_nodes([root, left, shared])));
//! assert!(trails.contains(&Trail::from_nodes([root, right, shared])));
//! # Ok::<(), horizon_a11y::SceneError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `accessibility` (default): AccessKit tree export via
//!   [`Scene::tree_update`].

mod audit;
pub mod config;
pub mod content;
pub mod display;
pub mod error;
#[cfg(feature = "accessibility")]
pub mod export;
pub mod focus;
pub mod instance;
mod membership;
pub mod role;
pub mod scene;
mod sync;

pub use config::SceneConfig;
pub use content::AccessibleContent;
pub use display::{Display, DisplayId};
pub use error::{AuditError, SceneError, SceneResult};
#[cfg(feature = "accessibility")]
pub use export::{accesskit_id_to_instance, instance_to_accesskit_id};
pub use focus::Operation;
pub use instance::{AccessibleInstance, InstanceId, InstanceSnapshot};
pub use role::AccessibleRole;
pub use scene::{Scene, SceneSignals};

pub use horizon_a11y_core::{NodeId, Trail};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AccessibleContent, AccessibleRole, DisplayId, InstanceId, NodeId, Scene, SceneConfig, SceneError,
        SceneResult, Trail,
    };
}
