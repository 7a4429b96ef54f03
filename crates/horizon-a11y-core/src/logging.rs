//! Logging and debugging facilities for Horizon A11y.
//!
//! This module provides:
//! - Target names for the `tracing` events emitted by the workspace
//! - A generic tree formatter used for node graph and instance tree dumps
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Horizon A11y uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_a11y=trace")
//!     .init();
//! ```

use std::fmt::Write as FmtWrite;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_a11y_core";
    /// Node graph target.
    pub const GRAPH: &str = "horizon_a11y_core::graph";
    /// Signal emission target.
    pub const SIGNAL: &str = "horizon_a11y_core::signal";
    /// Scene facade target.
    pub const SCENE: &str = "horizon_a11y::scene";
    /// Display membership tracking target.
    pub const MEMBERSHIP: &str = "horizon_a11y::membership";
    /// Instance tree synchronization target.
    pub const SYNC: &str = "horizon_a11y::sync";
    /// Focus bracket target.
    pub const FOCUS: &str = "horizon_a11y::focus";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show IDs next to labels.
    pub show_ids: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self::default()
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            ..Default::default()
        }
    }
}

/// Formats any tree given a label and a children callback.
#[derive(Debug, Clone, Default)]
pub struct TreeFormatter {
    options: TreeFormatOptions,
}

impl TreeFormatter {
    /// Create a formatter with the given options.
    pub fn new(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the tree below `root`, one line per item.
    pub fn format<K, L, C>(&self, root: K, label: L, children: C) -> String
    where
        K: Copy,
        L: Fn(K) -> String,
        C: Fn(K) -> Vec<K>,
    {
        let mut output = String::new();
        self.format_into(root, 0, true, &label, &children, &mut output);
        output
    }

    fn format_into<K, L, C>(
        &self,
        item: K,
        depth: usize,
        is_last: bool,
        label: &L,
        children: &C,
        output: &mut String,
    ) where
        K: Copy,
        L: Fn(K) -> String,
        C: Fn(K) -> Vec<K>,
    {
        if let Some(max) = self.options.max_depth {
            if depth > max {
                return;
            }
        }

        output.push_str(&self.build_prefix(depth, is_last));
        writeln!(output, "{}", label(item)).expect("write to String");

        let kids = children(item);
        let count = kids.len();
        for (i, child) in kids.into_iter().enumerate() {
            self.format_into(child, depth + 1, i + 1 == count, label, children, output);
        }
    }

    /// Build the prefix string for a tree line.
    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => (
                "\u{2502}",
                "\u{251c}\u{2500}\u{2500}",
                "\u{2514}\u{2500}\u{2500}",
            ),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.options.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_a11y::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn children(n: u32) -> Vec<u32> {
        match n {
            0 => vec![1, 2],
            1 => vec![3],
            _ => vec![],
        }
    }

    #[test]
    fn test_format_hierarchy() {
        let formatter = TreeFormatter::new(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        });
        let output = formatter.format(0u32, |n| format!("n{n}"), children);
        assert_eq!(output, "n0\n+-- n1\n|  `-- n3\n`-- n2\n");
    }

    #[test]
    fn test_format_max_depth() {
        let formatter = TreeFormatter::new(TreeFormatOptions {
            max_depth: Some(1),
            ..TreeFormatOptions::minimal()
        });
        let output = formatter.format(0u32, |n| format!("n{n}"), children);
        assert!(output.contains("n1"));
        assert!(!output.contains("n3"));
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }
}
