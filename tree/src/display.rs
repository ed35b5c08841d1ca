//! The displayed hierarchy: a view model mirroring the domain tree.
//!
//! The display tree has its own storage and its own per-row UI state
//! (expanded/collapsed), but the same ids and the same child order as the
//! [`ItemTree`](crate::ItemTree). It performs no structural validation of
//! its own; [`AssemblyModel`](crate::AssemblyModel) validates against the
//! domain tree first and then replays the same edit here.

use std::collections::HashMap;

use crate::position::insert_at;
use crate::view::TreeView;
use crate::{ItemId, Position, TreeError, TreeResult};

#[derive(Debug, Clone)]
struct DisplayNode {
    label: String,
    is_group: bool,
    fused: bool,
    expanded: bool,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
}

impl DisplayNode {
    fn new(label: &str, is_group: bool) -> Self {
        Self {
            label: label.to_owned(),
            is_group,
            fused: false,
            expanded: true,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// A visible row of the flattened tree list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub id: ItemId,
    pub depth: usize,
    pub label: String,
    pub is_group: bool,
    pub fused: bool,
    pub expanded: bool,
    pub child_count: usize,
}

/// View-side mirror of the domain tree.
#[derive(Debug, Clone)]
pub struct DisplayTree {
    nodes: HashMap<ItemId, DisplayNode>,
    root: ItemId,
    /// Bumped on every refresh request.
    revision: u64,
    refresh_pending: bool,
}

impl DisplayTree {
    pub fn new(root: ItemId, label: &str) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(root, DisplayNode::new(label, true));
        Self {
            nodes,
            root,
            revision: 0,
            refresh_pending: false,
        }
    }

    /// Label shown for `id`.
    pub fn label(&self, id: ItemId) -> Option<&str> {
        self.nodes.get(&id).map(|n| n.label.as_str())
    }

    pub fn is_expanded(&self, id: ItemId) -> Option<bool> {
        self.nodes.get(&id).map(|n| n.expanded)
    }

    /// Expands or collapses a row. Pure UI state, not recorded in history.
    pub fn set_expanded(&mut self, id: ItemId, expanded: bool) -> TreeResult {
        self.node_mut(id)?.expanded = expanded;
        Ok(())
    }

    /// Flattens the visible part of the tree into rows, depth-first.
    ///
    /// The root itself is not shown; its children (the stations) are the
    /// rows at depth 0. Children of collapsed groups are skipped.
    pub fn rows(&self) -> Vec<DisplayRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<(usize, ItemId)> = self
            .nodes
            .get(&self.root)
            .map(|root| root.children.iter().rev().map(|&c| (0, c)).collect())
            .unwrap_or_default();

        while let Some((depth, id)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            rows.push(DisplayRow {
                id,
                depth,
                label: node.label.clone(),
                is_group: node.is_group,
                fused: node.fused,
                expanded: node.expanded,
                child_count: node.children.len(),
            });
            if node.expanded {
                stack.extend(node.children.iter().rev().map(|&c| (depth + 1, c)));
            }
        }
        rows
    }

    /// Number of refresh requests so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns whether a refresh was requested since the last call, and
    /// clears the flag.
    pub fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh_pending)
    }

    fn node(&self, id: ItemId) -> TreeResult<&DisplayNode> {
        self.nodes.get(&id).ok_or(TreeError::NotFound(id))
    }

    fn node_mut(&mut self, id: ItemId) -> TreeResult<&mut DisplayNode> {
        self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))
    }
}

impl TreeView for DisplayTree {
    fn root(&self) -> ItemId {
        self.root
    }

    fn contains(&self, id: ItemId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn children_of(&self, id: ItemId) -> TreeResult<&[ItemId]> {
        self.node(id).map(|n| n.children.as_slice())
    }

    fn name_of(&self, id: ItemId) -> TreeResult<&str> {
        self.node(id).map(|n| n.label.as_str())
    }

    fn fused_of(&self, id: ItemId) -> TreeResult<bool> {
        self.node(id).map(|n| n.fused)
    }

    fn reparent(&mut self, id: ItemId, parent: ItemId, position: Position) -> TreeResult {
        let old_parent = self.node(id)?.parent;
        self.node(parent)?;

        // Resolve against the sibling list as it will be once `id` is out.
        let mut siblings = self.node(parent)?.children.clone();
        siblings.retain(|&c| c != id);
        insert_at(&mut siblings, id, position, parent)?;

        if let Some(old) = old_parent {
            self.node_mut(old)?.children.retain(|&c| c != id);
        }
        self.node_mut(parent)?.children = siblings;
        self.node_mut(id)?.parent = Some(parent);
        Ok(())
    }

    fn create_node(
        &mut self,
        id: ItemId,
        name: &str,
        is_group: bool,
        parent: ItemId,
        position: Position,
    ) -> TreeResult {
        if self.nodes.contains_key(&id) {
            return Err(TreeError::DuplicateId(id));
        }
        let parent_node = self.node_mut(parent)?;
        insert_at(&mut parent_node.children, id, position, parent)?;

        let mut node = DisplayNode::new(name, is_group);
        node.parent = Some(parent);
        self.nodes.insert(id, node);
        Ok(())
    }

    fn destroy_node(&mut self, id: ItemId) -> TreeResult {
        if !self.node(id)?.children.is_empty() {
            return Err(TreeError::NotEmpty(id));
        }
        if let Some(node) = self.nodes.remove(&id)
            && let Some(parent) = node.parent
            && let Some(parent) = self.nodes.get_mut(&parent)
        {
            parent.children.retain(|&c| c != id);
        }
        Ok(())
    }

    fn rename_node(&mut self, id: ItemId, name: &str) -> TreeResult {
        self.node_mut(id)?.label = name.to_owned();
        Ok(())
    }

    fn set_fused(&mut self, id: ItemId, fused: bool) -> TreeResult {
        self.node_mut(id)?.fused = fused;
        Ok(())
    }

    fn request_refresh(&mut self) {
        self.revision += 1;
        self.refresh_pending = true;
    }
}
