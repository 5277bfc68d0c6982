//! A small portfolio used by `rplan demo` and `rplan shell --sample`.

use planner_core::models::{MilestoneStatus, NodeKind, Tree};
use planner_core::TreeError;

const MILESTONES: [&str; 3] = ["Design", "Build", "Ship"];

pub fn sample_tree() -> Result<Tree, TreeError> {
    let mut tree = Tree::new("Rocket Portfolio");
    let root = tree.root();

    let platform = tree.add(root, NodeKind::Program, "Platform")?;
    let checkout = tree.add(platform, NodeKind::Project, "Checkout")?;
    tree.add_work_package(checkout, "WP-1")?;
    tree.add_work_package(checkout, "WP-2")?;

    let payments = tree.add(checkout, NodeKind::Area, "Payments")?;
    let cards = tree.add(payments, NodeKind::Capability, "Cards")?;
    let wallets = tree.add(payments, NodeKind::Capability, "Wallets")?;

    let features = [
        (cards, "Tokenize", [MilestoneStatus::Done, MilestoneStatus::Done, MilestoneStatus::InProgress], Some("WP-1")),
        (cards, "Refund", [MilestoneStatus::Done, MilestoneStatus::NotStarted, MilestoneStatus::NotStarted], Some("WP-2")),
        (wallets, "Apple Pay", [MilestoneStatus::InProgress, MilestoneStatus::NotStarted, MilestoneStatus::NotStarted], None),
    ];
    for (capability, name, statuses, work_package) in features {
        let feature = tree.add(capability, NodeKind::Feature, name)?;
        for milestone in MILESTONES {
            tree.add_milestone(feature, milestone)?;
        }
        tree.set_milestone_statuses(feature, &statuses)?;
        tree.assign_work_package(feature, work_package)?;
    }

    let growth = tree.add(root, NodeKind::Program, "Growth")?;
    let onboarding = tree.add(growth, NodeKind::Project, "Onboarding")?;
    let signup = tree.add(onboarding, NodeKind::Area, "Signup")?;
    tree.add(signup, NodeKind::Capability, "Referrals")?;

    tree.recompute_progress(root)?;
    tree.drain_events();
    Ok(tree)
}
