//! ASCII tree rendering for portfolio hierarchies.

use planner_core::models::{Node, NodeData, NodeId, Tree};

const NOT_STARTED: char = '◇';
const IN_PROGRESS: char = '○';
const COMPLETE: char = '●';

/// Get the status symbol for a node's aggregate progress.
fn progress_symbol(progress: f32) -> char {
    if progress <= 0.0 {
        NOT_STARTED
    } else if progress >= 1.0 {
        COMPLETE
    } else {
        IN_PROGRESS
    }
}

/// Level-specific suffix: project prefix, owners, feature id and work package.
fn details(tree: &Tree, node: &Node) -> String {
    match &node.data {
        NodeData::Portfolio | NodeData::Program => String::new(),
        NodeData::Project { prefix, .. } if !prefix.is_empty() => format!(" [{}]", prefix),
        NodeData::Project { .. } => String::new(),
        NodeData::Area { owner_initials } | NodeData::Capability { owner_initials }
            if !owner_initials.is_empty() =>
        {
            format!(" ({})", owner_initials)
        }
        NodeData::Area { .. } | NodeData::Capability { .. } => String::new(),
        NodeData::Feature { sequence_id, .. } => match tree.work_package_of(node.id) {
            Some(package) => format!(" #{} <{}>", sequence_id, package),
            None => format!(" #{}", sequence_id),
        },
    }
}

/// Render the tree as ASCII art with progress symbols.
///
/// Example output:
/// ```text
/// Portfolio
/// └── ○ Platform
///     └── ○ Checkout [CHK]
///         └── ○ Payments (JD)
///             ├── ● Tokenize #1 <WP-1>
///             └── ◇ Refund #2
/// ```
pub fn render_tree(tree: &Tree) -> String {
    let mut output = String::new();
    render_node(&mut output, tree, tree.root(), "", true, true, None);
    output
}

/// Like [`render_tree`], with each line prefixed by its preorder number.
pub fn render_numbered(tree: &Tree) -> String {
    let mut output = String::new();
    let mut counter = 0;
    render_node(&mut output, tree, tree.root(), "", true, true, Some(&mut counter));
    output
}

/// Recursively render a node and its children.
fn render_node(
    output: &mut String,
    tree: &Tree,
    id: NodeId,
    prefix: &str,
    is_last: bool,
    is_root: bool,
    mut counter: Option<&mut usize>,
) {
    let Some(node) = tree.get(id) else {
        return;
    };

    if let Some(counter) = counter.as_deref_mut() {
        output.push_str(&format!("{:>3}  ", counter));
        *counter += 1;
    }

    if is_root {
        // Root: just the name (no branch characters)
        output.push_str(&node.name);
        output.push('\n');
    } else {
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push(progress_symbol(node.progress));
        output.push(' ');
        output.push_str(&node.name);
        output.push_str(&details(tree, node));
        output.push('\n');
    }

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let child_is_last = i == children.len() - 1;
        render_node(
            output,
            tree,
            *child,
            &child_prefix,
            child_is_last,
            false,
            counter.as_deref_mut(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_core::models::{MilestoneStatus, NodeKind};

    fn sample() -> Tree {
        let mut tree = Tree::new("Portfolio");
        let root = tree.root();
        let program = tree.add(root, NodeKind::Program, "Platform").unwrap();
        let project = tree.add(program, NodeKind::Project, "Checkout").unwrap();
        tree.add_work_package(project, "WP-1").unwrap();
        let area = tree.add(project, NodeKind::Area, "Payments").unwrap();
        let capability = tree.add(area, NodeKind::Capability, "Cards").unwrap();
        let done = tree.add(capability, NodeKind::Feature, "Tokenize").unwrap();
        tree.add_milestone(done, "Ship").unwrap();
        tree.set_milestone_statuses(done, &[MilestoneStatus::Done]).unwrap();
        tree.assign_work_package(done, Some("WP-1")).unwrap();
        tree.add(capability, NodeKind::Feature, "Refund").unwrap();
        tree.recompute_progress(root).unwrap();
        tree
    }

    #[test]
    fn test_single_root() {
        let tree = Tree::new("Portfolio");
        assert_eq!(render_tree(&tree), "Portfolio\n");
    }

    #[test]
    fn test_nested_children() {
        let output = render_tree(&sample());
        let expected = "Portfolio\n└── ○ Platform\n    └── ○ Checkout\n        └── ○ Payments\n            └── ○ Cards\n                ├── ● Tokenize #1 <WP-1>\n                └── ◇ Refund #2\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_numbered_lines() {
        let output = render_numbered(&sample());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], "  0  Portfolio");
        assert!(lines[6].starts_with("  6  "));
        assert!(lines[6].ends_with("Refund #2"));
    }
}
