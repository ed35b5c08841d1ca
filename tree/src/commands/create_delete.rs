use assembly_core::abstract_editor::{Command, CommandResult};

use crate::{AssemblyModel, ItemId, ItemState, Position, TreeError, TreeResult};

/// Which way a [`CreateOrDeleteCommand`] goes when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply creates the group, revert deletes it.
    Create,
    /// Apply deletes the group, revert recreates it.
    Delete,
}

/// Creates or deletes one group.
///
/// Deletion only succeeds on an empty group; a group with children is
/// rejected without touching the tree. The fused flag is recorded so that
/// undoing a delete brings the group back exactly as it was.
#[derive(Debug, Clone)]
pub struct CreateOrDeleteCommand {
    direction: Direction,
    state: ItemState,
    fused: bool,
}

impl CreateOrDeleteCommand {
    /// Creates a new, empty group named `name` under `parent` at `position`.
    ///
    /// The group's id is allocated now, so every redo recreates the same id.
    pub fn create_group(
        model: &mut AssemblyModel,
        name: &str,
        parent: ItemId,
        position: Position,
    ) -> TreeResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        let id = model.allocate_id();
        Ok(Self {
            direction: Direction::Create,
            state: ItemState::new(id, name, parent, position),
            fused: false,
        })
    }

    /// Deletes the group `id`.
    ///
    /// Emptiness is checked when the command is applied, so the command can
    /// follow moves that empty the group inside the same
    /// [`CommandGroup`](assembly_core::abstract_editor::CommandGroup).
    pub fn delete_group(model: &AssemblyModel, id: ItemId) -> TreeResult<Self> {
        if id == model.root() {
            return Err(TreeError::RootImmutable("deleted"));
        }
        let item = model.domain().find(id).ok_or(TreeError::NotFound(id))?;
        if !item.is_group() {
            return Err(TreeError::NotAGroup(id));
        }
        Ok(Self {
            direction: Direction::Delete,
            state: model.capture(id)?,
            fused: item.is_fused(),
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Id of the group created or deleted.
    pub fn id(&self) -> ItemId {
        self.state.id
    }

    pub fn state(&self) -> &ItemState {
        &self.state
    }

    fn construct(&self, model: &mut AssemblyModel) -> CommandResult {
        let state = &self.state;
        model.create_group(state.id, &state.name, state.parent, state.neighbour, self.fused)?;
        Ok(())
    }

    fn destroy(&self, model: &mut AssemblyModel) -> CommandResult {
        model.destroy_group(self.state.id)?;
        Ok(())
    }
}

impl Command<AssemblyModel> for CreateOrDeleteCommand {
    fn apply(&mut self, model: &mut AssemblyModel) -> CommandResult {
        match self.direction {
            Direction::Create => self.construct(model),
            Direction::Delete => self.destroy(model),
        }
    }

    fn revert(&mut self, model: &mut AssemblyModel) -> CommandResult {
        match self.direction {
            Direction::Create => self.destroy(model),
            Direction::Delete => self.construct(model),
        }
    }

    fn description(&self) -> &str {
        match self.direction {
            Direction::Create => "Create group",
            Direction::Delete => "Delete group",
        }
    }
}
