//! Scene configuration.

/// Behavior switches for a [`Scene`](crate::Scene).
///
/// # Example
///
/// ```
/// use horizon_a11y::{Scene, SceneConfig};
///
/// let scene = Scene::with_config(SceneConfig::default().with_audit_operations(true));
/// assert!(scene.config().audit_operations());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneConfig {
    audit_operations: bool,
    restore_focus: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            audit_operations: cfg!(debug_assertions),
            restore_focus: true,
        }
    }
}

impl SceneConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a full [`Scene::audit`](crate::Scene::audit) after every outermost
    /// operation and panic on failure. On by default in debug builds.
    pub fn with_audit_operations(mut self, enabled: bool) -> Self {
        self.audit_operations = enabled;
        self
    }

    /// Re-apply focus to the previously focused node after each outermost
    /// operation. When off, focus is still dropped from nodes that lost
    /// their instances.
    pub fn with_restore_focus(mut self, enabled: bool) -> Self {
        self.restore_focus = enabled;
        self
    }

    /// Whether operations are audited.
    #[inline]
    pub fn audit_operations(&self) -> bool {
        self.audit_operations
    }

    /// Whether focus is re-applied after operations.
    #[inline]
    pub fn restore_focus(&self) -> bool {
        self.restore_focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.audit_operations(), cfg!(debug_assertions));
        assert!(config.restore_focus());
        let config = config.with_restore_focus(false).with_audit_operations(false);
        assert!(!config.restore_focus());
        assert!(!config.audit_operations());
    }
}
