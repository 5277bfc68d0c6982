#![allow(dead_code)]

use planner_core::models::{NodeId, NodeKind, Tree};

/// Portfolio → Platform (program) → Checkout (project, WP-1/WP-2)
/// → Payments (area) → Cards (capability) → three features.
pub struct Fixture {
    pub tree: Tree,
    pub root: NodeId,
    pub program: NodeId,
    pub project: NodeId,
    pub area: NodeId,
    pub capability: NodeId,
    pub features: Vec<NodeId>,
}

pub fn fixture() -> Fixture {
    let mut tree = Tree::new("Portfolio");
    let root = tree.root();
    let program = tree.add(root, NodeKind::Program, "Platform").expect("Failed to add program");
    let project = tree.add(program, NodeKind::Project, "Checkout").expect("Failed to add project");
    tree.add_work_package(project, "WP-1").expect("Failed to add work package");
    tree.add_work_package(project, "WP-2").expect("Failed to add work package");
    let area = tree.add(project, NodeKind::Area, "Payments").expect("Failed to add area");
    let capability = tree
        .add(area, NodeKind::Capability, "Cards")
        .expect("Failed to add capability");

    let mut features = Vec::new();
    for name in ["Tokenize", "Refund", "Dispute"] {
        let feature = tree
            .add(capability, NodeKind::Feature, name)
            .expect("Failed to add feature");
        for milestone in ["Design", "Build", "Ship"] {
            tree.add_milestone(feature, milestone).expect("Failed to add milestone");
        }
        features.push(feature);
    }

    Fixture {
        tree,
        root,
        program,
        project,
        area,
        capability,
        features,
    }
}

pub fn name_of(tree: &Tree, id: NodeId) -> String {
    tree.node(id).expect("Node missing").name.clone()
}

pub fn names(tree: &Tree, parent: NodeId) -> Vec<String> {
    tree.children(parent).iter().map(|c| name_of(tree, *c)).collect()
}
