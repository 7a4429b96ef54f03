//! Core systems for Horizon A11y.
//!
//! This crate provides the foundational pieces the accessibility layer is
//! built on:
//!
//! - **Node Graph**: A retained-mode DAG of nodes with ordered parents and
//!   children ([`SceneGraph`], [`NodeId`])
//! - **Trails**: Root-to-node paths that tell apart the several appearances
//!   of a node reachable through more than one parent ([`Trail`])
//! - **Signals**: Synchronous change notification ([`Signal`])
//! - **Logging**: Tracing targets and tree dump helpers
//!
//! # Example
//!
//! ```
//! use horizon_a11y_core::{SceneGraph, Trail};
//!
//! let mut graph = SceneGraph::new();
//! let root = graph.create_node("root");
//! let left = graph.create_node("left");
//! let right = graph.create_node("right");
//! let shared = graph.create_node("shared");
//!
//! graph.add_child(root, left)?;
//! graph.add_child(root, right)?;
//! graph.add_child(left, shared)?;
//! graph.add_child(right, shared)?;
//!
//! // Same node, two distinct trails.
//! let via_left = Trail::from_nodes([root, left, shared]);
//! let via_right = Trail::from_nodes([root, right, shared]);
//! assert_ne!(via_left, via_right);
//! # Ok::<(), horizon_a11y_core::GraphError>(())
//! ```

mod error;
pub mod graph;
pub mod logging;
pub mod signal;
pub mod trail;

pub use error::{GraphError, GraphResult};
pub use graph::{NodeId, SceneGraph};
pub use logging::{PerfSpan, TreeFormatOptions, TreeFormatter, TreeStyle};
pub use signal::{ConnectionId, Signal};
pub use trail::Trail;
