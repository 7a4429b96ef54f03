//! Accessibility roles for content-bearing nodes.

/// The accessibility role of a node's content.
///
/// A simplified role set that maps onto AccessKit's `Role` when the
/// `accessibility` feature is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum AccessibleRole {
    /// Content with no specific role.
    #[default]
    Unknown,
    /// A generic grouping element (`div`-like).
    Group,
    /// A top-level region of the scene.
    Region,
    /// A heading.
    Heading,
    /// A paragraph of text.
    Paragraph,
    /// A static text label.
    Label,
    /// A push button.
    Button,
    /// A checkbox.
    CheckBox,
    /// A radio button.
    RadioButton,
    /// A slider over a numeric range.
    Slider,
    /// A single-line text input.
    TextInput,
    /// A hyperlink.
    Link,
    /// An image with alternative text.
    Image,
    /// A list container.
    List,
    /// An item within a list.
    ListItem,
    /// A dialog.
    Dialog,
    /// A live alert.
    Alert,
}

impl AccessibleRole {
    /// Convert to AccessKit's Role enum.
    #[cfg(feature = "accessibility")]
    pub fn to_accesskit_role(self) -> accesskit::Role {
        use accesskit::Role;

        match self {
            AccessibleRole::Unknown => Role::Unknown,
            AccessibleRole::Group => Role::Group,
            AccessibleRole::Region => Role::Region,
            AccessibleRole::Heading => Role::Heading,
            AccessibleRole::Paragraph => Role::Paragraph,
            AccessibleRole::Label => Role::Label,
            AccessibleRole::Button => Role::Button,
            AccessibleRole::CheckBox => Role::CheckBox,
            AccessibleRole::RadioButton => Role::RadioButton,
            AccessibleRole::Slider => Role::Slider,
            AccessibleRole::TextInput => Role::TextInput,
            AccessibleRole::Link => Role::Link,
            AccessibleRole::Image => Role::Image,
            AccessibleRole::List => Role::List,
            AccessibleRole::ListItem => Role::ListItem,
            AccessibleRole::Dialog => Role::Dialog,
            AccessibleRole::Alert => Role::Alert,
        }
    }
}

#[cfg(feature = "accessibility")]
impl From<AccessibleRole> for accesskit::Role {
    fn from(role: AccessibleRole) -> Self {
        role.to_accesskit_role()
    }
}

#[cfg(all(test, feature = "accessibility"))]
mod tests {
    use super::*;

    #[test]
    fn test_role_mapping() {
        assert_eq!(AccessibleRole::Button.to_accesskit_role(), accesskit::Role::Button);
        assert_eq!(accesskit::Role::from(AccessibleRole::default()), accesskit::Role::Unknown);
    }
}
