//! The structural surface shared by the domain tree and the display tree.

use crate::{ItemId, Position, TreeResult};

/// Structural operations every mirrored tree supports.
///
/// Both [`ItemTree`](crate::ItemTree) and [`DisplayTree`](crate::DisplayTree)
/// implement this, which lets [`AssemblyModel`](crate::AssemblyModel) run
/// one closure per edit against both trees in a fixed order.
///
/// Implementations mutate only after every check passed; an `Err` means the
/// tree is unchanged.
pub trait TreeView {
    /// Identifier of the root node.
    fn root(&self) -> ItemId;

    /// Returns `true` if a node with this id exists.
    fn contains(&self, id: ItemId) -> bool;

    /// Children of `id` in sibling order.
    fn children_of(&self, id: ItemId) -> TreeResult<&[ItemId]>;

    /// Display name of `id`.
    fn name_of(&self, id: ItemId) -> TreeResult<&str>;

    /// Fused flag of `id`.
    fn fused_of(&self, id: ItemId) -> TreeResult<bool>;

    /// Moves `id` under `parent` at `position`.
    fn reparent(&mut self, id: ItemId, parent: ItemId, position: Position) -> TreeResult;

    /// Creates a node under `parent` at `position`.
    fn create_node(
        &mut self,
        id: ItemId,
        name: &str,
        is_group: bool,
        parent: ItemId,
        position: Position,
    ) -> TreeResult;

    /// Removes a childless node.
    fn destroy_node(&mut self, id: ItemId) -> TreeResult;

    /// Changes the display name of `id`.
    fn rename_node(&mut self, id: ItemId, name: &str) -> TreeResult;

    /// Sets the fused flag of `id`.
    fn set_fused(&mut self, id: ItemId, fused: bool) -> TreeResult;

    /// Asks the view to redraw. Advisory.
    fn request_refresh(&mut self) {}
}

/// Depth-first (pre-order) listing of every node below the root.
///
/// Each entry is `(depth, id)` with the root's children at depth 0.
pub fn depth_first(view: &dyn TreeView) -> Vec<(usize, ItemId)> {
    let mut out = Vec::new();
    let mut stack: Vec<(usize, ItemId)> = Vec::new();
    if let Ok(children) = view.children_of(view.root()) {
        stack.extend(children.iter().rev().map(|&c| (0, c)));
    }
    while let Some((depth, id)) = stack.pop() {
        out.push((depth, id));
        if let Ok(children) = view.children_of(id) {
            stack.extend(children.iter().rev().map(|&c| (depth + 1, c)));
        }
    }
    out
}

/// One row of a [`TreeSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub depth: usize,
    pub id: ItemId,
    pub name: String,
    pub fused: bool,
}

/// Everything observable about a tree's structure: order, nesting, names
/// and fused flags.
///
/// Two views are mirrored exactly when their snapshots are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub root_name: String,
    pub rows: Vec<SnapshotRow>,
}

impl TreeSnapshot {
    /// Captures the current state of `view`.
    pub fn capture(view: &dyn TreeView) -> Self {
        let rows = depth_first(view)
            .into_iter()
            .map(|(depth, id)| SnapshotRow {
                depth,
                id,
                name: view.name_of(id).unwrap_or_default().to_owned(),
                fused: view.fused_of(id).unwrap_or_default(),
            })
            .collect();
        Self {
            root_name: view.name_of(view.root()).unwrap_or_default().to_owned(),
            rows,
        }
    }

    /// Ids in depth-first order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.rows.iter().map(|r| r.id).collect()
    }
}
