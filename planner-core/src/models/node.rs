use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a node inside a [`super::Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The six levels of a portfolio hierarchy, outermost first.
///
/// - `Portfolio`: the root container
/// - `Program`: a nestable sub-container
/// - `Project`: holds work packages and a short prefix code
/// - `Area`, `Capability`: owned breakdown levels
/// - `Feature`: the leaf work item with milestones
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Portfolio,
    Program,
    Project,
    Area,
    Capability,
    Feature,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        Self::Portfolio,
        Self::Program,
        Self::Project,
        Self::Area,
        Self::Capability,
        Self::Feature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portfolio => "portfolio",
            Self::Program => "program",
            Self::Project => "project",
            Self::Area => "area",
            Self::Capability => "capability",
            Self::Feature => "feature",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "portfolio" => Some(Self::Portfolio),
            "program" => Some(Self::Program),
            "project" => Some(Self::Project),
            "area" => Some(Self::Area),
            "capability" => Some(Self::Capability),
            "feature" => Some(Self::Feature),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Feature)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of a single milestone on a feature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Contribution of this status to aggregate progress, in `0.0..=1.0`.
    pub fn score(&self) -> f32 {
        match self {
            Self::NotStarted => 0.0,
            Self::InProgress => 0.5,
            Self::Done => 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Milestone {
    pub name: String,
    pub status: MilestoneStatus,
}

impl Milestone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: MilestoneStatus::NotStarted,
        }
    }
}

/// A named bucket of features, held by a `Project` node.
///
/// Membership is by feature sequence id, so a feature belongs to at most
/// one work package of its owning project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkPackage {
    pub name: String,
    pub feature_ids: Vec<u32>,
}

impl WorkPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            feature_ids: Vec::new(),
        }
    }

    pub fn contains(&self, sequence_id: u32) -> bool {
        self.feature_ids.contains(&sequence_id)
    }
}

/// Fields that only exist on some levels. The variant fixes the node's kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeData {
    Portfolio,
    Program,
    Project {
        prefix: String,
        work_packages: Vec<WorkPackage>,
    },
    Area {
        owner_initials: String,
    },
    Capability {
        owner_initials: String,
    },
    Feature {
        sequence_id: u32,
        milestones: Vec<Milestone>,
    },
}

impl NodeData {
    /// Blank data for a freshly created node. Features get `sequence_id` 0
    /// until the tree allocates one.
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Portfolio => Self::Portfolio,
            NodeKind::Program => Self::Program,
            NodeKind::Project => Self::Project {
                prefix: String::new(),
                work_packages: Vec::new(),
            },
            NodeKind::Area => Self::Area {
                owner_initials: String::new(),
            },
            NodeKind::Capability => Self::Capability {
                owner_initials: String::new(),
            },
            NodeKind::Feature => Self::Feature {
                sequence_id: 0,
                milestones: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Portfolio => NodeKind::Portfolio,
            Self::Program => NodeKind::Program,
            Self::Project { .. } => NodeKind::Project,
            Self::Area { .. } => NodeKind::Area,
            Self::Capability { .. } => NodeKind::Capability,
            Self::Feature { .. } => NodeKind::Feature,
        }
    }
}

/// A single element of the hierarchy.
///
/// Structure (`parent`, `children`) is only changed through [`super::Tree`],
/// which keeps both directions consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub data: NodeData,
    /// Aggregate completion in `0.0..=1.0`, refreshed by `Tree::recompute_progress`.
    pub progress: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, data: NodeData) -> Self {
        let now = Utc::now();
        Self {
            id: NodeId::new(),
            name: name.into(),
            data,
            progress: 0.0,
            created_at: now,
            updated_at: now,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn prefix(&self) -> Option<&str> {
        match &self.data {
            NodeData::Project { prefix, .. } => Some(prefix),
            _ => None,
        }
    }

    pub fn owner_initials(&self) -> Option<&str> {
        match &self.data {
            NodeData::Area { owner_initials } | NodeData::Capability { owner_initials } => {
                Some(owner_initials)
            }
            _ => None,
        }
    }

    pub fn sequence_id(&self) -> Option<u32> {
        match &self.data {
            NodeData::Feature { sequence_id, .. } => Some(*sequence_id),
            _ => None,
        }
    }

    pub fn milestones(&self) -> &[Milestone] {
        match &self.data {
            NodeData::Feature { milestones, .. } => milestones,
            _ => &[],
        }
    }

    pub fn work_packages(&self) -> &[WorkPackage] {
        match &self.data {
            NodeData::Project { work_packages, .. } => work_packages,
            _ => &[],
        }
    }
}
