//! Accessible content carried by a node.
//!
//! A node either bears content (it owns an accessibility instance wherever it
//! is reachable) or is a plain container whose accessible descendants are
//! hoisted into the nearest content-bearing ancestor. The distinction is
//! `Option<AccessibleContent>` on the node rather than a separate node kind.

use crate::role::AccessibleRole;

/// The markup a node contributes to the accessibility tree.
///
/// # Example
///
/// ```
/// use horizon_a11y::{AccessibleContent, AccessibleRole};
///
/// let content = AccessibleContent::new(AccessibleRole::Button)
///     .with_label("Play")
///     .with_description("Starts the simulation");
/// assert_eq!(content.label(), Some("Play"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessibleContent {
    role: AccessibleRole,
    label: Option<String>,
    description: Option<String>,
}

impl AccessibleContent {
    /// Create content with the given role and no label.
    pub fn new(role: AccessibleRole) -> Self {
        Self {
            role,
            label: None,
            description: None,
        }
    }

    /// Set the accessible name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the accessible description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The content's role.
    pub fn role(&self) -> AccessibleRole {
        self.role
    }

    /// The accessible name, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The accessible description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Build an AccessKit node for this content.
    #[cfg(feature = "accessibility")]
    pub fn build_accesskit_node(&self, children: Vec<accesskit::NodeId>, focusable: bool) -> accesskit::Node {
        let mut node = accesskit::Node::new(self.role.to_accesskit_role());
        if let Some(label) = &self.label {
            node.set_label(label.clone());
        }
        if let Some(description) = &self.description {
            node.set_description(description.clone());
        }
        if focusable {
            node.add_action(accesskit::Action::Focus);
        }
        if !children.is_empty() {
            node.set_children(children);
        }
        node
    }
}
