//! The editable assembly: domain tree and display tree behind one surface.
//!
//! Every structural operation goes through [`AssemblyModel::mutate`], which
//! runs the same edit against the domain tree, then the display tree, then
//! requests a display refresh. The domain tree validates first; if it
//! rejects the edit neither tree has changed.

use assembly_core::abstract_editor::Editable;

use crate::view::{TreeSnapshot, TreeView, depth_first};
use crate::{
    DisplayTree, ItemId, ItemIdAllocator, ItemState, ItemTree, Position, TreeError, TreeResult,
};

/// Id of the root item in every new model.
pub const ROOT_ID: ItemId = ItemId::new(0);

/// Target of every assembly command.
#[derive(Debug, Clone)]
pub struct AssemblyModel {
    domain: ItemTree,
    display: DisplayTree,
    ids: ItemIdAllocator,
}

impl Editable for AssemblyModel {}

impl AssemblyModel {
    /// Creates a model holding only the root group.
    pub fn new(root_name: &str) -> Self {
        let mut ids = ItemIdAllocator::new();
        ids.reserve(ROOT_ID);
        Self {
            domain: ItemTree::new(ROOT_ID, root_name),
            display: DisplayTree::new(ROOT_ID, root_name),
            ids,
        }
    }

    /// The authoritative tree.
    pub fn domain(&self) -> &ItemTree {
        &self.domain
    }

    /// The displayed tree.
    pub fn display(&self) -> &DisplayTree {
        &self.display
    }

    /// Mutable access to the display tree, for UI-only state such as
    /// expanded rows. Structure must change through the model.
    pub fn display_mut(&mut self) -> &mut DisplayTree {
        &mut self.display
    }

    pub fn root(&self) -> ItemId {
        self.domain.root()
    }

    /// Returns a fresh id for a new item.
    pub fn allocate_id(&mut self) -> ItemId {
        self.ids.allocate()
    }

    /// Current state of `id`, for use as a command operand.
    pub fn capture(&self, id: ItemId) -> TreeResult<ItemState> {
        ItemState::capture(&self.domain, id)
    }

    /// Returns `true` if both trees have the same ids, order, nesting, names
    /// and fused flags.
    pub fn is_mirrored(&self) -> bool {
        TreeSnapshot::capture(&self.domain) == TreeSnapshot::capture(&self.display)
    }

    /// Structure of the domain tree.
    pub fn structure_snapshot(&self) -> TreeSnapshot {
        TreeSnapshot::capture(&self.domain)
    }

    /// Resolves a user selection to the ids that should move together.
    ///
    /// The result is in document order and drops items whose ancestor is
    /// also selected, since they travel with it.
    pub fn selection(&self, ids: &[ItemId]) -> TreeResult<Vec<ItemId>> {
        for &id in ids {
            if id == self.root() {
                return Err(TreeError::RootImmutable("moved"));
            }
            if !self.domain.contains(id) {
                return Err(TreeError::NotFound(id));
            }
        }
        let ordered: Vec<ItemId> = depth_first(&self.domain)
            .into_iter()
            .map(|(_, id)| id)
            .filter(|id| ids.contains(id))
            .collect();
        Ok(ordered
            .iter()
            .copied()
            .filter(|&id| !ordered.iter().any(|&a| self.domain.is_ancestor_of(a, id)))
            .collect())
    }

    /// Places every item at its state's parent and neighbour, in order.
    ///
    /// Later entries may name items placed by earlier ones as their
    /// neighbour. With more than one entry the whole list is first replayed
    /// on a copy of the domain tree, so a rejection never leaves half of the
    /// items moved.
    pub fn move_items(&mut self, states: &[ItemState]) -> TreeResult {
        if let [_, _, ..] = states {
            let mut scratch = self.domain.clone();
            for state in states {
                scratch.reparent(state.id, state.parent, state.neighbour)?;
            }
        }
        for state in states {
            let (id, parent, neighbour) = (state.id, state.parent, state.neighbour);
            self.mutate(|tree| tree.reparent(id, parent, neighbour))?;
        }
        Ok(())
    }

    /// Changes the display name of an item. Surrounding whitespace is
    /// trimmed and the result must not be empty.
    pub fn rename(&mut self, id: ItemId, name: &str) -> TreeResult {
        let name = name.trim();
        if name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        if id == self.root() {
            return Err(TreeError::RootImmutable("renamed"));
        }
        if !self.domain.contains(id) {
            return Err(TreeError::NotFound(id));
        }
        self.mutate(|tree| tree.rename_node(id, name))
    }

    /// Creates a group with a caller-chosen id.
    pub fn create_group(
        &mut self,
        id: ItemId,
        name: &str,
        parent: ItemId,
        position: Position,
        fused: bool,
    ) -> TreeResult {
        self.domain.check_create(id, true, parent, position)?;
        self.ids.reserve(id);
        self.mutate(|tree| {
            tree.create_node(id, name, true, parent, position)?;
            if fused {
                tree.set_fused(id, true)?;
            }
            Ok(())
        })
    }

    /// Deletes an empty, non-root group.
    pub fn destroy_group(&mut self, id: ItemId) -> TreeResult {
        self.domain.check_destroy(id)?;
        self.mutate(|tree| tree.destroy_node(id))
    }

    pub fn set_fused(&mut self, id: ItemId, fused: bool) -> TreeResult {
        if id == self.root() {
            return Err(TreeError::RootImmutable("fused"));
        }
        let item = self.domain.find(id).ok_or(TreeError::NotFound(id))?;
        if !item.is_group() {
            return Err(TreeError::NotAGroup(id));
        }
        self.mutate(|tree| tree.set_fused(id, fused))
    }

    /// Adds a component coming from an importer. Not undoable.
    pub fn import_component(
        &mut self,
        name: &str,
        parent: ItemId,
        position: Position,
    ) -> TreeResult<ItemId> {
        let id = self.allocate_id();
        self.import_item(id, name, false, parent, position)?;
        Ok(id)
    }

    /// Adds a group coming from an importer. Not undoable.
    pub fn import_group(
        &mut self,
        name: &str,
        parent: ItemId,
        position: Position,
    ) -> TreeResult<ItemId> {
        let id = self.allocate_id();
        self.import_item(id, name, true, parent, position)?;
        Ok(id)
    }

    /// Adds an item whose id was assigned outside the model.
    pub fn import_item(
        &mut self,
        id: ItemId,
        name: &str,
        is_group: bool,
        parent: ItemId,
        position: Position,
    ) -> TreeResult {
        self.domain.check_create(id, is_group, parent, position)?;
        self.ids.reserve(id);
        log::trace!("Importing {id} '{name}' under {parent}");
        self.mutate(|tree| tree.create_node(id, name, is_group, parent, position))
    }

    /// Runs `op` against the domain tree, then the display tree, then
    /// requests a refresh.
    fn mutate(&mut self, op: impl Fn(&mut dyn TreeView) -> TreeResult) -> TreeResult {
        let domain: &mut dyn TreeView = &mut self.domain;
        op(domain)?;
        let display: &mut dyn TreeView = &mut self.display;
        if let Err(err) = op(display) {
            log::error!("Display tree rejected an edit the domain tree accepted: {err}");
            return Err(err);
        }
        self.display.request_refresh();
        debug_assert!(self.is_mirrored(), "domain and display trees diverged");
        Ok(())
    }
}

impl Default for AssemblyModel {
    fn default() -> Self {
        Self::new("Assembly")
    }
}
