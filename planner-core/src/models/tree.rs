use std::collections::{HashMap, HashSet};

use chrono::Utc;

use super::node::{Milestone, MilestoneStatus, Node, NodeData, NodeId, NodeKind, WorkPackage};
use crate::error::TreeError;
use crate::move_index;

/// Change notifications for tree observers (tree display, canvas).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    /// Children of the carried node were added, removed or reordered.
    StructureChanged(NodeId),
    /// Fields of the carried node changed in place.
    NodeUpdated(NodeId),
}

/// Arena holding every node of one document.
///
/// Parent links are ids, never owning references. Nodes detached by delete
/// or cut stay in the arena so they can be re-attached by undo or pasted.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_sequence_id: u32,
    events: Vec<TreeEvent>,
}

impl Tree {
    /// Create a tree holding a single `Portfolio` root.
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = Node::new(root_name, NodeData::Portfolio);
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            nodes,
            root: root_id,
            next_sequence_id: 1,
            events: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(&id).ok_or(TreeError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.nodes.get_mut(&id).ok_or(TreeError::NodeNotFound(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Children in display order; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|c| *c == child)
    }

    /// Walk `id`'s parent chain, nearest ancestor first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).any(|a| a == self.root)
    }

    /// Preorder listing of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        if !self.contains(id) {
            return result;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// All `Feature` nodes in the subtree rooted at `id`, in preorder.
    pub fn features_in(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.kind(*n) == Some(NodeKind::Feature))
            .collect()
    }

    /// Sequence ids of every feature reachable from the root.
    pub fn sequence_ids(&self) -> HashSet<u32> {
        self.features_in(self.root)
            .into_iter()
            .filter_map(|n| self.get(n).and_then(Node::sequence_id))
            .collect()
    }

    // ============================================================
    // Construction
    // ============================================================

    /// Create a detached node. Features receive a fresh sequence id.
    pub fn create_node(&mut self, kind: NodeKind, name: impl Into<String>) -> NodeId {
        let mut data = NodeData::empty(kind);
        if let NodeData::Feature { sequence_id, .. } = &mut data {
            *sequence_id = self.allocate_sequence_id();
        }
        let node = Node::new(name, data);
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Create a node and append it under `parent` without going through a command.
    ///
    /// Intended for seeding a document before editing starts.
    pub fn add(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        self.node(parent)?;
        let id = self.create_node(kind, name);
        self.append_child(parent, id)?;
        Ok(id)
    }

    pub fn allocate_sequence_id(&mut self) -> u32 {
        let id = self.next_sequence_id;
        self.next_sequence_id += 1;
        id
    }

    // ============================================================
    // Structure
    // ============================================================

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.attach(parent, child, None).map(|_| ())
    }

    /// Insert `child` under `parent` at the clamped `requested` index.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        requested: isize,
    ) -> Result<usize, TreeError> {
        self.attach(parent, child, Some(requested))
    }

    fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        requested: Option<isize>,
    ) -> Result<usize, TreeError> {
        self.node(parent)?;
        let child_node = self.node_mut(child)?;
        if child_node.parent.is_some() || child == parent {
            return Err(TreeError::AlreadyAttached(child));
        }
        child_node.parent = Some(parent);

        let siblings = &mut self.node_mut(parent)?.children;
        let index = match requested {
            Some(requested) => move_index::insert_at(siblings, child, requested),
            None => {
                siblings.push(child);
                siblings.len() - 1
            }
        };
        Ok(index)
    }

    /// Detach `child` from `parent`, returning the index it occupied.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<usize, TreeError> {
        let index = self
            .index_of(parent, child)
            .ok_or(TreeError::NotAChild { parent, child })?;
        self.node_mut(parent)?.children.remove(index);
        self.node_mut(child)?.parent = None;
        Ok(index)
    }

    /// Produce an independent copy of `id` and its whole subtree.
    ///
    /// The copy is detached and every node in it has a new id.
    pub fn deep_clone(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        let source = self.node(id)?.clone();
        let mut copy = Node::new(source.name, source.data);
        copy.progress = source.progress;
        let copy_id = copy.id;
        self.nodes.insert(copy_id, copy);

        for child in source.children {
            let child_copy = self.deep_clone(child)?;
            self.append_child(copy_id, child_copy)?;
        }
        Ok(copy_id)
    }

    /// Drop every node that is neither attached nor part of a detached
    /// subtree containing one of `referenced`. Returns how many were freed.
    pub fn purge_unreachable(&mut self, referenced: &HashSet<NodeId>) -> usize {
        let tops: Vec<NodeId> = referenced
            .iter()
            .filter(|id| self.contains(**id))
            .map(|id| self.ancestors(*id).last().unwrap_or(*id))
            .chain(std::iter::once(self.root))
            .collect();
        let mut live = HashSet::new();
        for top in tops {
            if !live.contains(&top) {
                live.extend(self.descendants(top));
            }
        }

        let before = self.nodes.len();
        self.nodes.retain(|id, _| live.contains(id));
        before - self.nodes.len()
    }

    /// Number of nodes held by the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Give every feature under `id` a fresh sequence id.
    ///
    /// Work packages of projects inside the same subtree are remapped so
    /// their membership follows the renumbered features.
    pub fn resequence(&mut self, id: NodeId) -> Result<HashMap<u32, u32>, TreeError> {
        let mut mapping = HashMap::new();
        for feature in self.features_in(id) {
            let fresh = self.allocate_sequence_id();
            if let NodeData::Feature { sequence_id, .. } = &mut self.node_mut(feature)?.data {
                mapping.insert(*sequence_id, fresh);
                *sequence_id = fresh;
            }
        }

        let projects: Vec<NodeId> = self
            .descendants(id)
            .into_iter()
            .filter(|n| self.kind(*n) == Some(NodeKind::Project))
            .collect();
        for project in projects {
            if let NodeData::Project { work_packages, .. } = &mut self.node_mut(project)?.data {
                for package in work_packages.iter_mut() {
                    package.feature_ids = package
                        .feature_ids
                        .iter()
                        .filter_map(|old| mapping.get(old).copied())
                        .collect();
                }
            }
        }
        Ok(mapping)
    }

    // ============================================================
    // Fields
    // ============================================================

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        node.name = name.into();
        node.updated_at = Utc::now();
        Ok(())
    }

    pub fn add_milestone(&mut self, feature: NodeId, name: impl Into<String>) -> Result<(), TreeError> {
        let node = self.node_mut(feature)?;
        let kind = node.kind();
        match &mut node.data {
            NodeData::Feature { milestones, .. } => {
                milestones.push(Milestone::new(name));
                Ok(())
            }
            _ => Err(TreeError::WrongKind {
                node: feature,
                expected: NodeKind::Feature,
                actual: kind,
            }),
        }
    }

    /// Overwrite milestone statuses positionally. Extra entries on either side are ignored.
    pub fn set_milestone_statuses(
        &mut self,
        feature: NodeId,
        statuses: &[MilestoneStatus],
    ) -> Result<(), TreeError> {
        let node = self.node_mut(feature)?;
        if let NodeData::Feature { milestones, .. } = &mut node.data {
            for (milestone, status) in milestones.iter_mut().zip(statuses) {
                milestone.status = *status;
            }
            node.updated_at = Utc::now();
        }
        Ok(())
    }

    pub fn add_work_package(&mut self, project: NodeId, name: impl Into<String>) -> Result<(), TreeError> {
        let node = self.node_mut(project)?;
        let kind = node.kind();
        match &mut node.data {
            NodeData::Project { work_packages, .. } => {
                work_packages.push(WorkPackage::new(name));
                Ok(())
            }
            _ => Err(TreeError::WrongKind {
                node: project,
                expected: NodeKind::Project,
                actual: kind,
            }),
        }
    }

    /// The nearest `Project` ancestor of `id`.
    pub fn owning_project(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|a| self.kind(*a) == Some(NodeKind::Project))
    }

    /// Name of the work package that currently lists `feature`, if any.
    pub fn work_package_of(&self, feature: NodeId) -> Option<String> {
        let sequence_id = self.get(feature)?.sequence_id()?;
        let project = self.owning_project(feature)?;
        self.get(project)?
            .work_packages()
            .iter()
            .find(|wp| wp.contains(sequence_id))
            .map(|wp| wp.name.clone())
    }

    /// Move `feature` into the work package called `target`, or out of all of them for `None`.
    ///
    /// Features without an owning project, and target names the project does
    /// not define, leave membership empty.
    pub fn assign_work_package(
        &mut self,
        feature: NodeId,
        target: Option<&str>,
    ) -> Result<(), TreeError> {
        let Some(sequence_id) = self.node(feature)?.sequence_id() else {
            return Ok(());
        };
        let Some(project) = self.owning_project(feature) else {
            return Ok(());
        };
        if let NodeData::Project { work_packages, .. } = &mut self.node_mut(project)?.data {
            for package in work_packages.iter_mut() {
                package.feature_ids.retain(|id| *id != sequence_id);
            }
            if let Some(target) = target {
                if let Some(package) = work_packages.iter_mut().find(|wp| wp.name == target) {
                    package.feature_ids.push(sequence_id);
                }
            }
        }
        Ok(())
    }

    // ============================================================
    // Progress
    // ============================================================

    /// Recompute aggregate progress for the subtree rooted at `id`.
    ///
    /// Features average their milestone scores; containers average their
    /// children. Empty nodes count as zero.
    pub fn recompute_progress(&mut self, id: NodeId) -> Result<f32, TreeError> {
        let node = self.node(id)?;
        let children = node.children.clone();
        let leaf_score = match &node.data {
            NodeData::Feature { milestones, .. } => {
                Some(mean(milestones.iter().map(|m| m.status.score())))
            }
            _ => None,
        };
        let progress = match leaf_score {
            Some(score) => score,
            None => {
                let mut scores = Vec::with_capacity(children.len());
                for child in children {
                    scores.push(self.recompute_progress(child)?);
                }
                mean(scores.into_iter())
            }
        };
        self.node_mut(id)?.progress = progress;
        Ok(progress)
    }

    /// Refresh stored progress on `id` and each of its ancestors without
    /// descending into the subtree.
    pub fn refresh_progress_from(&mut self, id: NodeId) -> Result<(), TreeError> {
        let chain: Vec<NodeId> = std::iter::once(id).chain(self.ancestors(id)).collect();
        for current in chain {
            let node = self.node(current)?;
            let progress = match &node.data {
                NodeData::Feature { milestones, .. } => {
                    mean(milestones.iter().map(|m| m.status.score()))
                }
                _ => mean(
                    node.children
                        .iter()
                        .filter_map(|c| self.get(*c))
                        .map(|c| c.progress),
                ),
            };
            self.node_mut(current)?.progress = progress;
        }
        Ok(())
    }

    // ============================================================
    // Notifications
    // ============================================================

    pub fn notify(&mut self, event: TreeEvent) {
        self.events.push(event);
    }

    /// Take all notifications queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

/// Iterator over a node's parent chain.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
