//! The authoritative domain tree.
//!
//! Items live in an arena keyed by [`ItemId`], so lookup by id is a single
//! hash probe. Parent and child links are kept consistent by the functions
//! in this module: every mutation updates the child's `parent` and the
//! parent's `children` together.

use std::collections::HashMap;

use crate::position::insert_at;
use crate::view::TreeView;
use crate::{Item, ItemId, Position, TreeError, TreeResult};

/// Domain hierarchy of components, groups and stations.
///
/// Invariants:
/// - exactly one root, which is a group and has no parent;
/// - every other item has exactly one parent, and appears exactly once in
///   that parent's `children`;
/// - only groups have children;
/// - only groups sit directly under the root (stations).
#[derive(Debug, Clone)]
pub struct ItemTree {
    items: HashMap<ItemId, Item>,
    root: ItemId,
}

impl ItemTree {
    /// Creates a tree holding only the root group.
    pub fn new(root: ItemId, root_name: impl Into<String>) -> Self {
        let mut items = HashMap::new();
        items.insert(root, Item::new(root, root_name, true));
        Self { items, root }
    }

    pub fn root(&self) -> ItemId {
        self.root
    }

    /// Looks up an item by id.
    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Number of items, root included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the tree holds only the root.
    pub fn is_empty(&self) -> bool {
        self.items.len() == 1
    }

    pub fn children_of(&self, id: ItemId) -> TreeResult<&[ItemId]> {
        self.get(id).map(|item| item.children.as_slice())
    }

    pub fn parent_of(&self, id: ItemId) -> Option<ItemId> {
        self.items.get(&id).and_then(|item| item.parent)
    }

    /// Index of `id` among its siblings.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        let (_, siblings) = self.siblings_of(id)?;
        siblings.iter().position(|&c| c == id)
    }

    /// Current parent and index-free position of `id`.
    pub fn position_of(&self, id: ItemId) -> Option<(ItemId, Position)> {
        let (parent, siblings) = self.siblings_of(id)?;
        let position = Position::of(siblings, id)?;
        Some((parent, position))
    }

    /// Parent of `id` and the parent's ordered children.
    fn siblings_of(&self, id: ItemId) -> Option<(ItemId, &[ItemId])> {
        let parent = self.parent_of(id)?;
        let item = self.items.get(&parent)?;
        Some((parent, item.children.as_slice()))
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor_of(&self, ancestor: ItemId, node: ItemId) -> bool {
        let mut current = node;
        while let Some(parent) = self.parent_of(current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Returns `true` if `id` already sits under `parent` at `position`.
    pub fn is_at(&self, id: ItemId, parent: ItemId, position: Position) -> bool {
        self.siblings_of(id)
            .is_some_and(|(p, siblings)| p == parent && position.is_current(siblings, id))
    }

    /// Checks that `id` may be placed under `parent` at `position`.
    ///
    /// Walks the ancestors of `parent`, so moving a node into its own
    /// subtree is caught here rather than halfway through a mutation.
    pub fn check_move(&self, id: ItemId, parent: ItemId, position: Position) -> TreeResult {
        let item = self.get(id)?;
        if id == self.root {
            return Err(TreeError::RootImmutable("moved"));
        }
        if parent == id || self.is_ancestor_of(id, parent) {
            return Err(TreeError::CycleDetected {
                item: id,
                target: parent,
            });
        }
        self.check_placement(item.is_group, id, parent, position)
    }

    /// Checks that a new item could be created under `parent` at `position`.
    pub fn check_create(
        &self,
        id: ItemId,
        is_group: bool,
        parent: ItemId,
        position: Position,
    ) -> TreeResult {
        if self.contains(id) {
            return Err(TreeError::DuplicateId(id));
        }
        self.check_placement(is_group, id, parent, position)
    }

    /// Checks that `id` can be destroyed: an existing, empty, non-root group.
    pub fn check_destroy(&self, id: ItemId) -> TreeResult {
        let item = self.get(id)?;
        if id == self.root {
            return Err(TreeError::RootImmutable("deleted"));
        }
        if !item.is_group {
            return Err(TreeError::NotAGroup(id));
        }
        if !item.children.is_empty() {
            return Err(TreeError::NotEmpty(id));
        }
        Ok(())
    }

    fn check_placement(
        &self,
        is_group: bool,
        id: ItemId,
        parent: ItemId,
        position: Position,
    ) -> TreeResult {
        let parent_item = self.get(parent)?;
        if !parent_item.is_group {
            return Err(TreeError::NotAGroup(parent));
        }
        if parent == self.root && !is_group {
            return Err(TreeError::TopLevelRequiresGroup(id));
        }
        if let Some(neighbour) = position.neighbour() {
            if neighbour == id {
                return Err(TreeError::NeighbourIsSelf(id));
            }
            if !parent_item.children.contains(&neighbour) {
                return Err(TreeError::NeighbourNotSibling { neighbour, parent });
            }
        }
        Ok(())
    }

    fn get(&self, id: ItemId) -> TreeResult<&Item> {
        self.items.get(&id).ok_or(TreeError::NotFound(id))
    }

    fn get_mut(&mut self, id: ItemId) -> TreeResult<&mut Item> {
        self.items.get_mut(&id).ok_or(TreeError::NotFound(id))
    }

    /// Removes `id` from its parent's children, leaving it parentless.
    fn detach(&mut self, id: ItemId) {
        let Some(parent) = self
            .items
            .get_mut(&id)
            .and_then(|item| item.parent.take())
        else {
            return;
        };
        if let Some(parent) = self.items.get_mut(&parent) {
            parent.children.retain(|&c| c != id);
        }
    }

    /// Inserts a detached `id` under `parent` at `position`.
    fn attach(&mut self, id: ItemId, parent: ItemId, position: Position) -> TreeResult {
        let parent_item = self.get_mut(parent)?;
        insert_at(&mut parent_item.children, id, position, parent)?;
        self.get_mut(id)?.parent = Some(parent);
        Ok(())
    }
}

impl TreeView for ItemTree {
    fn root(&self) -> ItemId {
        self.root
    }

    fn contains(&self, id: ItemId) -> bool {
        ItemTree::contains(self, id)
    }

    fn children_of(&self, id: ItemId) -> TreeResult<&[ItemId]> {
        ItemTree::children_of(self, id)
    }

    fn name_of(&self, id: ItemId) -> TreeResult<&str> {
        self.get(id).map(|item| item.name.as_str())
    }

    fn fused_of(&self, id: ItemId) -> TreeResult<bool> {
        self.get(id).map(|item| item.is_fused())
    }

    fn reparent(&mut self, id: ItemId, parent: ItemId, position: Position) -> TreeResult {
        self.check_move(id, parent, position)?;
        self.detach(id);
        self.attach(id, parent, position)
    }

    fn create_node(
        &mut self,
        id: ItemId,
        name: &str,
        is_group: bool,
        parent: ItemId,
        position: Position,
    ) -> TreeResult {
        self.check_create(id, is_group, parent, position)?;
        self.items.insert(id, Item::new(id, name, is_group));
        self.attach(id, parent, position)
    }

    fn destroy_node(&mut self, id: ItemId) -> TreeResult {
        self.check_destroy(id)?;
        self.detach(id);
        self.items.remove(&id);
        Ok(())
    }

    fn rename_node(&mut self, id: ItemId, name: &str) -> TreeResult {
        self.get_mut(id)?.name = name.to_owned();
        Ok(())
    }

    fn set_fused(&mut self, id: ItemId, fused: bool) -> TreeResult {
        let item = self.get_mut(id)?;
        if !item.is_group {
            return Err(TreeError::NotAGroup(id));
        }
        item.is_fused = fused;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: ItemId = ItemId::new(0);

    fn id(raw: u64) -> ItemId {
        ItemId::new(raw)
    }

    /// Root{ S1{ c3, c4 }, S2{} }
    fn sample() -> ItemTree {
        let mut tree = ItemTree::new(ROOT, "Assembly");
        for (raw, name, is_group, parent) in [
            (1, "S1", true, ROOT),
            (2, "S2", true, ROOT),
            (3, "c3", false, id(1)),
            (4, "c4", false, id(1)),
        ] {
            tree.create_node(id(raw), name, is_group, parent, Position::AtEnd)
                .unwrap();
        }
        tree
    }

    #[test]
    fn create_links_parent_and_child() {
        let tree = sample();
        assert_eq!(tree.parent_of(id(3)), Some(id(1)));
        assert_eq!(tree.children_of(id(1)).unwrap(), &[id(3), id(4)]);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn create_duplicate_fails() {
        let mut tree = sample();
        let err = tree
            .create_node(id(3), "again", false, id(2), Position::AtEnd)
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicateId(id(3)));
    }

    #[test]
    fn component_cannot_be_a_station() {
        let mut tree = sample();
        let err = tree
            .create_node(id(9), "loose", false, ROOT, Position::AtEnd)
            .unwrap_err();
        assert_eq!(err, TreeError::TopLevelRequiresGroup(id(9)));
        assert_eq!(
            tree.reparent(id(3), ROOT, Position::AtEnd),
            Err(TreeError::TopLevelRequiresGroup(id(3)))
        );
    }

    #[test]
    fn components_cannot_have_children() {
        let mut tree = sample();
        assert_eq!(
            tree.reparent(id(4), id(3), Position::AtEnd),
            Err(TreeError::NotAGroup(id(3)))
        );
    }

    #[test]
    fn reparent_moves_between_groups() {
        let mut tree = sample();
        tree.reparent(id(3), id(2), Position::AtStart).unwrap();

        assert_eq!(tree.parent_of(id(3)), Some(id(2)));
        assert_eq!(tree.children_of(id(1)).unwrap(), &[id(4)]);
        assert_eq!(tree.children_of(id(2)).unwrap(), &[id(3)]);
    }

    #[test]
    fn reparent_within_same_parent_reorders() {
        let mut tree = sample();
        tree.reparent(id(3), id(1), Position::After(id(4))).unwrap();
        assert_eq!(tree.children_of(id(1)).unwrap(), &[id(4), id(3)]);
    }

    #[test]
    fn reparent_into_descendant_is_rejected() {
        let mut tree = sample();
        tree.create_node(id(5), "sub", true, id(1), Position::AtEnd)
            .unwrap();

        let err = tree.reparent(id(1), id(5), Position::AtEnd).unwrap_err();
        assert_eq!(
            err,
            TreeError::CycleDetected {
                item: id(1),
                target: id(5),
            }
        );
        assert_eq!(tree.children_of(ROOT).unwrap(), &[id(1), id(2)]);
        assert_eq!(tree.parent_of(id(5)), Some(id(1)));
    }

    #[test]
    fn reparent_into_self_is_rejected() {
        let mut tree = sample();
        assert!(matches!(
            tree.reparent(id(1), id(1), Position::AtEnd),
            Err(TreeError::CycleDetected { .. })
        ));
    }

    #[test]
    fn reparent_after_self_is_rejected() {
        let mut tree = sample();
        assert_eq!(
            tree.reparent(id(3), id(1), Position::After(id(3))),
            Err(TreeError::NeighbourIsSelf(id(3)))
        );
    }

    #[test]
    fn reparent_with_foreign_neighbour_is_rejected() {
        let mut tree = sample();
        let err = tree
            .reparent(id(3), id(2), Position::After(id(4)))
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::NeighbourNotSibling {
                neighbour: id(4),
                parent: id(2),
            }
        );
        assert_eq!(tree.parent_of(id(3)), Some(id(1)));
    }

    #[test]
    fn root_cannot_move_or_be_destroyed() {
        let mut tree = sample();
        assert_eq!(
            tree.reparent(ROOT, id(1), Position::AtEnd),
            Err(TreeError::RootImmutable("moved"))
        );
        assert_eq!(
            tree.destroy_node(ROOT),
            Err(TreeError::RootImmutable("deleted"))
        );
    }

    #[test]
    fn destroy_requires_empty_group() {
        let mut tree = sample();
        assert_eq!(tree.destroy_node(id(1)), Err(TreeError::NotEmpty(id(1))));
        assert_eq!(tree.destroy_node(id(3)), Err(TreeError::NotAGroup(id(3))));

        tree.destroy_node(id(2)).unwrap();
        assert!(!tree.contains(id(2)));
        assert_eq!(tree.children_of(ROOT).unwrap(), &[id(1)]);
    }

    #[test]
    fn position_of_reports_previous_sibling() {
        let tree = sample();
        assert_eq!(tree.position_of(id(3)), Some((id(1), Position::AtStart)));
        assert_eq!(tree.position_of(id(4)), Some((id(1), Position::After(id(3)))));
        assert_eq!(tree.position_of(ROOT), None);
        assert_eq!(tree.index_of(id(4)), Some(1));
    }

    #[test]
    fn is_ancestor_of_walks_up() {
        let tree = sample();
        assert!(tree.is_ancestor_of(ROOT, id(3)));
        assert!(tree.is_ancestor_of(id(1), id(3)));
        assert!(!tree.is_ancestor_of(id(2), id(3)));
        assert!(!tree.is_ancestor_of(id(3), id(3)));
    }

    #[test]
    fn is_at_matches_current_place() {
        let tree = sample();
        assert!(tree.is_at(id(4), id(1), Position::AtEnd));
        assert!(tree.is_at(id(4), id(1), Position::After(id(3))));
        assert!(!tree.is_at(id(4), id(2), Position::AtEnd));
    }

    #[test]
    fn sibling_queries_on_root_and_missing_items_are_empty() {
        let tree = sample();
        let missing = id(99);
        assert_eq!(tree.index_of(ROOT), None);
        assert_eq!(tree.index_of(missing), None);
        assert_eq!(tree.position_of(missing), None);
        assert!(!tree.is_at(ROOT, ROOT, Position::AtStart));
        assert!(!tree.is_at(missing, id(1), Position::AtEnd));
    }

    #[test]
    fn fuse_only_groups() {
        let mut tree = sample();
        tree.set_fused(id(1), true).unwrap();
        assert!(tree.find(id(1)).unwrap().is_fused());
        assert_eq!(tree.set_fused(id(3), true), Err(TreeError::NotAGroup(id(3))));
    }
}
