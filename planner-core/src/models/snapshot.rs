use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::node::{MilestoneStatus, NodeData, NodeId, NodeKind};
use super::tree::Tree;
use crate::error::TreeError;

/// Immutable capture of a node's editable fields at one instant.
///
/// Two snapshots (before and after an edit dialog) fully describe an
/// [`crate::commands::EditNodeCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub name: String,
    pub fields: SnapshotFields,
}

/// Level-specific part of a [`NodeSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotFields {
    /// `Portfolio` and `Program` only carry a name.
    Container,
    Project {
        prefix: String,
    },
    /// `Area` and `Capability`.
    Owned {
        owner_initials: String,
    },
    Feature {
        milestone_statuses: Vec<MilestoneStatus>,
        /// `None` means the feature is in no work package.
        work_package: Option<String>,
    },
}

impl SnapshotFields {
    fn label(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Project { .. } => "project",
            Self::Owned { .. } => "owned",
            Self::Feature { .. } => "feature",
        }
    }

    fn fits(&self, kind: NodeKind) -> bool {
        matches!(
            (self, kind),
            (Self::Container, NodeKind::Portfolio | NodeKind::Program)
                | (Self::Project { .. }, NodeKind::Project)
                | (Self::Owned { .. }, NodeKind::Area | NodeKind::Capability)
                | (Self::Feature { .. }, NodeKind::Feature)
        )
    }
}

/// One field that differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotChange {
    Name,
    Prefix,
    OwnerInitials,
    MilestoneStatus(usize),
    WorkPackage,
    /// The snapshots belong to different levels.
    Kind,
}

impl NodeSnapshot {
    pub fn capture(tree: &Tree, id: NodeId) -> Result<Self, TreeError> {
        let node = tree.node(id)?;
        let fields = match &node.data {
            NodeData::Portfolio | NodeData::Program => SnapshotFields::Container,
            NodeData::Project { prefix, .. } => SnapshotFields::Project {
                prefix: prefix.clone(),
            },
            NodeData::Area { owner_initials } | NodeData::Capability { owner_initials } => {
                SnapshotFields::Owned {
                    owner_initials: owner_initials.clone(),
                }
            }
            NodeData::Feature { milestones, .. } => SnapshotFields::Feature {
                milestone_statuses: milestones.iter().map(|m| m.status).collect(),
                work_package: tree.work_package_of(id),
            },
        };
        Ok(Self {
            name: node.name.clone(),
            fields,
        })
    }

    /// Write every captured field back onto `id`.
    ///
    /// For features this also reconciles work-package membership in the
    /// owning project.
    pub fn apply(&self, tree: &mut Tree, id: NodeId) -> Result<(), TreeError> {
        let node = tree.node_mut(id)?;
        let kind = node.kind();
        if !self.fields.fits(kind) {
            return Err(TreeError::SnapshotMismatch {
                node: id,
                kind,
                snapshot: self.fields.label(),
            });
        }

        node.name = self.name.clone();
        node.updated_at = Utc::now();
        match (&mut node.data, &self.fields) {
            (NodeData::Project { prefix, .. }, SnapshotFields::Project { prefix: captured }) => {
                *prefix = captured.clone();
            }
            (
                NodeData::Area { owner_initials } | NodeData::Capability { owner_initials },
                SnapshotFields::Owned {
                    owner_initials: captured,
                },
            ) => {
                *owner_initials = captured.clone();
            }
            _ => {}
        }

        if let SnapshotFields::Feature {
            milestone_statuses,
            work_package,
        } = &self.fields
        {
            tree.set_milestone_statuses(id, milestone_statuses)?;
            tree.assign_work_package(id, work_package.as_deref())?;
        }
        Ok(())
    }

    /// Fields of `other` that differ from `self`. Empty when the edit changed nothing.
    pub fn diff(&self, other: &NodeSnapshot) -> Vec<SnapshotChange> {
        let mut changes = Vec::new();
        if self.name != other.name {
            changes.push(SnapshotChange::Name);
        }
        match (&self.fields, &other.fields) {
            (SnapshotFields::Container, SnapshotFields::Container) => {}
            (SnapshotFields::Project { prefix: a }, SnapshotFields::Project { prefix: b }) => {
                if a != b {
                    changes.push(SnapshotChange::Prefix);
                }
            }
            (
                SnapshotFields::Owned { owner_initials: a },
                SnapshotFields::Owned { owner_initials: b },
            ) => {
                if a != b {
                    changes.push(SnapshotChange::OwnerInitials);
                }
            }
            (
                SnapshotFields::Feature {
                    milestone_statuses: a_statuses,
                    work_package: a_package,
                },
                SnapshotFields::Feature {
                    milestone_statuses: b_statuses,
                    work_package: b_package,
                },
            ) => {
                let longest = a_statuses.len().max(b_statuses.len());
                for index in 0..longest {
                    if a_statuses.get(index) != b_statuses.get(index) {
                        changes.push(SnapshotChange::MilestoneStatus(index));
                    }
                }
                if a_package != b_package {
                    changes.push(SnapshotChange::WorkPackage);
                }
            }
            _ => changes.push(SnapshotChange::Kind),
        }
        changes
    }

    pub fn is_unchanged_from(&self, other: &NodeSnapshot) -> bool {
        self.diff(other).is_empty()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the prefix. No effect on non-project snapshots.
    pub fn with_prefix(mut self, value: impl Into<String>) -> Self {
        if let SnapshotFields::Project { prefix } = &mut self.fields {
            *prefix = value.into();
        }
        self
    }

    /// Replace the owner initials. No effect on snapshots without owners.
    pub fn with_owner_initials(mut self, value: impl Into<String>) -> Self {
        if let SnapshotFields::Owned { owner_initials } = &mut self.fields {
            *owner_initials = value.into();
        }
        self
    }

    /// Replace one milestone status. Out-of-range indices are ignored.
    pub fn with_milestone_status(mut self, index: usize, status: MilestoneStatus) -> Self {
        if let SnapshotFields::Feature {
            milestone_statuses, ..
        } = &mut self.fields
        {
            if let Some(slot) = milestone_statuses.get_mut(index) {
                *slot = status;
            }
        }
        self
    }

    pub fn with_work_package(mut self, value: Option<&str>) -> Self {
        if let SnapshotFields::Feature { work_package, .. } = &mut self.fields {
            *work_package = value.map(str::to_string);
        }
        self
    }
}
