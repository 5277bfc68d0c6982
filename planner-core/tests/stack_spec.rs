mod common;

use common::{fixture, Fixture};
use planner_core::commands::*;
use planner_core::models::*;
use planner_core::{CommandExecutionService, CommandStack, DEFAULT_UNDO_DEPTH};
use speculate2::speculate;

fn add_command(f: &mut Fixture, name: &str) -> (NodeId, Box<dyn Command>) {
    let child = f.tree.create_node(NodeKind::Feature, name);
    let command = AddChildCommand::new(&f.tree, f.capability, child);
    (child, Box::new(command))
}

speculate! {
    before {
        let mut f = fixture();
        let mut stack = CommandStack::default();
    }

    describe "command_stack" {
        it "undoes and redoes in order" {
            let (first, command) = add_command(&mut f, "First");
            stack.execute(command, &mut f.tree).expect("Execute failed");
            let (second, command) = add_command(&mut f, "Second");
            stack.execute(command, &mut f.tree).expect("Execute failed");

            stack.undo(&mut f.tree).expect("Undo failed");
            assert!(f.tree.is_attached(first));
            assert!(!f.tree.is_attached(second));

            stack.undo(&mut f.tree).expect("Undo failed");
            assert!(!f.tree.is_attached(first));
            assert!(stack.can_redo());
            assert!(!stack.can_undo());

            stack.redo(&mut f.tree).expect("Redo failed");
            assert!(f.tree.is_attached(first));
            assert!(!f.tree.is_attached(second));
            assert_eq!(stack.undo_len(), 1);
            assert_eq!(stack.redo_len(), 1);
        }

        it "keeps at most 100 commands, dropping the oldest" {
            let mut children = Vec::new();
            for i in 0..101 {
                let (child, command) = add_command(&mut f, &format!("Feature {}", i));
                stack.execute(command, &mut f.tree).expect("Execute failed");
                children.push(child);
            }
            assert_eq!(DEFAULT_UNDO_DEPTH, 100);
            assert_eq!(stack.undo_len(), 100);

            while stack.can_undo() {
                stack.undo(&mut f.tree).expect("Undo failed");
            }
            assert!(f.tree.is_attached(children[0]));
            assert!(children[1..].iter().all(|c| !f.tree.is_attached(*c)));
        }

        it "honours a custom depth" {
            let mut small = CommandStack::new(2);
            for name in ["A", "B", "C"] {
                let (_, command) = add_command(&mut f, name);
                small.execute(command, &mut f.tree).expect("Execute failed");
            }
            assert_eq!(small.undo_len(), 2);
            assert_eq!(small.max_depth(), 2);
        }

        it "clears the redo history on a fresh execute" {
            let (_, command) = add_command(&mut f, "First");
            stack.execute(command, &mut f.tree).expect("Execute failed");
            let (_, command) = add_command(&mut f, "Second");
            stack.execute(command, &mut f.tree).expect("Execute failed");
            stack.undo(&mut f.tree).expect("Undo failed");
            stack.undo(&mut f.tree).expect("Undo failed");
            assert_eq!(stack.redo_len(), 2);

            let (_, command) = add_command(&mut f, "Third");
            stack.execute(command, &mut f.tree).expect("Execute failed");

            assert!(!stack.can_redo());
            assert_eq!(stack.undo_len(), 1);
        }

        it "treats undo and redo on empty histories as no-ops" {
            stack.undo(&mut f.tree).expect("Undo failed");
            stack.redo(&mut f.tree).expect("Redo failed");
            assert_eq!(f.tree.children(f.capability).len(), 3);
        }

        it "peeks at the next descriptions" {
            assert_eq!(stack.peek_undo_description(), None);

            let (_, command) = add_command(&mut f, "First");
            stack.execute(command, &mut f.tree).expect("Execute failed");
            assert_eq!(stack.peek_undo_description().as_deref(), Some("Add feature 'First'"));
            assert_eq!(stack.peek_redo_description(), None);

            stack.undo(&mut f.tree).expect("Undo failed");
            assert_eq!(stack.peek_undo_description(), None);
            assert_eq!(stack.peek_redo_description().as_deref(), Some("Add feature 'First'"));
        }

        it "does not record a failing command" {
            let command = PasteNodeCommand::new(&f.tree, f.area, NodeId::new(), true);
            let result = stack.execute(Box::new(command), &mut f.tree);

            assert!(result.is_err());
            assert!(!stack.can_undo());
        }

        it "counts discarded commands once" {
            let mut small = CommandStack::new(1);
            for name in ["A", "B"] {
                let (_, command) = add_command(&mut f, name);
                small.execute(command, &mut f.tree).expect("Execute failed");
            }
            small.undo(&mut f.tree).expect("Undo failed");
            let (_, command) = add_command(&mut f, "C");
            small.execute(command, &mut f.tree).expect("Execute failed");

            assert_eq!(small.take_dropped(), 2);
            assert_eq!(small.take_dropped(), 0);
        }

        it "lists the nodes its commands refer to" {
            let (child, command) = add_command(&mut f, "First");
            stack.execute(command, &mut f.tree).expect("Execute failed");
            stack.undo(&mut f.tree).expect("Undo failed");

            let referenced = stack.referenced_nodes();
            assert!(referenced.contains(&child));
            assert!(referenced.contains(&f.capability));
        }

        it "clears both histories" {
            let (_, command) = add_command(&mut f, "First");
            stack.execute(command, &mut f.tree).expect("Execute failed");
            let (_, command) = add_command(&mut f, "Second");
            stack.execute(command, &mut f.tree).expect("Execute failed");
            stack.undo(&mut f.tree).expect("Undo failed");

            stack.clear();

            assert!(!stack.can_undo());
            assert!(!stack.can_redo());
        }
    }

    describe "command_execution_service" {
        it "marks the document dirty and publishes undo state" {
            let mut service = CommandExecutionService::default();
            let child = f.tree.create_node(NodeKind::Feature, "First");

            service
                .execute(AddChildCommand::new(&f.tree, f.capability, child), &mut f.tree)
                .expect("Execute failed");

            let state = service.state();
            assert!(state.dirty);
            assert!(state.undo_available);
            assert!(!state.redo_available);
            assert_eq!(state.next_undo_description, "Add feature 'First'");
            assert_eq!(state.next_redo_description, "");
        }

        it "swaps availability on undo and redo" {
            let mut service = CommandExecutionService::default();
            let child = f.tree.create_node(NodeKind::Feature, "First");
            service
                .execute(AddChildCommand::new(&f.tree, f.capability, child), &mut f.tree)
                .expect("Execute failed");

            service.undo(&mut f.tree).expect("Undo failed");
            assert!(!service.state().undo_available);
            assert!(service.state().redo_available);
            assert_eq!(service.state().next_undo_description, "");
            assert_eq!(service.state().next_redo_description, "Add feature 'First'");

            service.redo(&mut f.tree).expect("Redo failed");
            assert!(service.state().undo_available);
            assert!(!service.state().redo_available);
            assert!(f.tree.is_attached(child));
        }

        it "ignores undo when nothing is available" {
            let mut service = CommandExecutionService::default();
            service.undo(&mut f.tree).expect("Undo failed");
            service.redo(&mut f.tree).expect("Redo failed");
            assert!(!service.state().dirty);
        }

        it "marks the document dirty even when the command changed nothing" {
            let mut service = CommandExecutionService::default();
            service
                .execute(DeleteNodeCommand::new(&f.tree, f.root), &mut f.tree)
                .expect("Execute failed");
            assert!(service.state().dirty);
        }

        it "clears the dirty flag on save and everything on reset" {
            let mut service = CommandExecutionService::default();
            let child = f.tree.create_node(NodeKind::Feature, "First");
            service
                .execute(AddChildCommand::new(&f.tree, f.capability, child), &mut f.tree)
                .expect("Execute failed");

            service.mark_saved();
            assert!(!service.state().dirty);
            assert!(service.state().undo_available);

            service.reset();
            assert_eq!(service.state(), &planner_core::EditorState::default());
            assert!(!service.stack().can_undo());
        }
    }
}
