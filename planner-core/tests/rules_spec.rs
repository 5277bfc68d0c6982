mod common;

use common::fixture;
use planner_core::models::*;
use planner_core::rules::*;
use speculate2::speculate;

speculate! {
    before {
        let mut f = fixture();
    }

    describe "is_descendant" {
        it "is true for every ancestor of a node" {
            let feature = f.features[0];
            for ancestor in [f.capability, f.area, f.project, f.program, f.root] {
                assert!(is_descendant(&f.tree, feature, ancestor));
            }
        }

        it "is false for nodes outside the ancestor chain" {
            assert!(!is_descendant(&f.tree, f.features[0], f.features[1]));
            assert!(!is_descendant(&f.tree, f.project, f.capability));
        }

        it "counts a node as inside its own subtree" {
            assert!(is_descendant(&f.tree, f.area, f.area));
        }

        it "follows deep program nesting" {
            let mut parent = f.program;
            let mut chain = Vec::new();
            for depth in 0..20 {
                parent = f.tree
                    .add(parent, NodeKind::Program, format!("Level {}", depth))
                    .expect("Failed to add program");
                chain.push(parent);
            }
            let deepest = *chain.last().expect("Empty chain");
            assert!(is_descendant(&f.tree, deepest, f.program));
            assert!(is_descendant(&f.tree, deepest, chain[3]));
            assert!(!is_valid_reparent(&f.tree, chain[3], deepest, HierarchyMode::Lenient));
        }
    }

    describe "hierarchy_accepts" {
        it "follows the level table" {
            assert!(hierarchy_accepts(&f.tree, f.project, NodeKind::Area, HierarchyMode::Strict));
            assert!(!hierarchy_accepts(&f.tree, f.project, NodeKind::Feature, HierarchyMode::Lenient));
            assert!(hierarchy_accepts(&f.tree, f.program, NodeKind::Program, HierarchyMode::Strict));
            assert!(hierarchy_accepts(&f.tree, f.program, NodeKind::Project, HierarchyMode::Strict));
        }

        it "lets a portfolio mix programs and projects in lenient mode" {
            assert!(hierarchy_accepts(&f.tree, f.root, NodeKind::Project, HierarchyMode::Lenient));
        }

        it "keeps portfolio children homogeneous in strict mode" {
            assert!(!hierarchy_accepts(&f.tree, f.root, NodeKind::Project, HierarchyMode::Strict));
            assert!(hierarchy_accepts(&f.tree, f.root, NodeKind::Program, HierarchyMode::Strict));
        }

        it "accepts either kind under an empty portfolio in strict mode" {
            let tree = Tree::new("Empty");
            assert!(hierarchy_accepts(&tree, tree.root(), NodeKind::Project, HierarchyMode::Strict));
            assert!(hierarchy_accepts(&tree, tree.root(), NodeKind::Program, HierarchyMode::Strict));
        }

        it "does not apply strict mode below the portfolio" {
            f.tree.add(f.program, NodeKind::Program, "Nested").expect("Failed to add program");
            assert!(hierarchy_accepts(&f.tree, f.program, NodeKind::Project, HierarchyMode::Strict));
        }

        it "rejects unknown parents" {
            assert!(!hierarchy_accepts(&f.tree, NodeId::new(), NodeKind::Program, HierarchyMode::Lenient));
        }
    }

    describe "is_valid_reparent" {
        it "allows moving a feature to another capability" {
            let other = f.tree
                .add(f.area, NodeKind::Capability, "Wallets")
                .expect("Failed to add capability");
            assert!(is_valid_reparent(&f.tree, f.features[0], other, HierarchyMode::Lenient));
        }

        it "rejects moving a node under its own descendant" {
            assert!(!is_valid_reparent(&f.tree, f.program, f.project, HierarchyMode::Lenient));
            let nested = f.tree
                .add(f.program, NodeKind::Program, "Nested")
                .expect("Failed to add program");
            assert!(!is_valid_reparent(&f.tree, f.program, nested, HierarchyMode::Lenient));
        }

        it "rejects moving a node under itself" {
            assert!(!is_valid_reparent(&f.tree, f.program, f.program, HierarchyMode::Lenient));
        }

        it "rejects reparenting the root" {
            let tree = Tree::new("Other");
            let mut second = fixture();
            let program = second.tree
                .add(second.root, NodeKind::Program, "Spare")
                .expect("Failed to add program");
            assert!(!is_valid_reparent(&second.tree, second.root, program, HierarchyMode::Lenient));
            assert!(!is_valid_reparent(&tree, tree.root(), tree.root(), HierarchyMode::Lenient));
        }

        it "rejects incompatible levels" {
            assert!(!is_valid_reparent(&f.tree, f.features[0], f.area, HierarchyMode::Lenient));
            assert!(!is_valid_reparent(&f.tree, f.area, f.program, HierarchyMode::Lenient));
        }

        it "rejects unknown nodes" {
            assert!(!is_valid_reparent(&f.tree, NodeId::new(), f.capability, HierarchyMode::Lenient));
            assert!(!is_valid_reparent(&f.tree, f.features[0], NodeId::new(), HierarchyMode::Lenient));
        }

        it "applies strict mode when moving to the portfolio" {
            assert!(!is_valid_reparent(&f.tree, f.project, f.root, HierarchyMode::Strict));
            assert!(is_valid_reparent(&f.tree, f.project, f.root, HierarchyMode::Lenient));
        }
    }

    describe "can_insert_sibling" {
        it "allows reordering among several siblings" {
            assert!(can_insert_sibling(&f.tree, f.features[0], f.features[2], HierarchyMode::Lenient));
        }

        it "rejects inserting next to itself" {
            assert!(!can_insert_sibling(&f.tree, f.features[0], f.features[0], HierarchyMode::Lenient));
        }

        it "rejects inserting around the root" {
            assert!(!can_insert_sibling(&f.tree, f.program, f.root, HierarchyMode::Lenient));
        }

        it "rejects swapping the only two siblings of a parent" {
            let spare = f.tree
                .add(f.program, NodeKind::Project, "Storefront")
                .expect("Failed to add project");
            assert!(!can_insert_sibling(&f.tree, spare, f.project, HierarchyMode::Lenient));
        }

        it "rejects a level the reference's parent does not accept" {
            assert!(!can_insert_sibling(&f.tree, f.features[0], f.capability, HierarchyMode::Lenient));
        }

        it "rejects inserting a node next to its own descendant" {
            let nested = f.tree
                .add(f.program, NodeKind::Program, "Nested")
                .expect("Failed to add program");
            assert!(!can_insert_sibling(&f.tree, f.program, nested, HierarchyMode::Lenient));
        }

        it "accepts a feature from another capability" {
            let other = f.tree
                .add(f.area, NodeKind::Capability, "Wallets")
                .expect("Failed to add capability");
            let stranger = f.tree
                .add(other, NodeKind::Feature, "Apple Pay")
                .expect("Failed to add feature");
            assert!(can_insert_sibling(&f.tree, stranger, f.features[1], HierarchyMode::Strict));
        }
    }
}
