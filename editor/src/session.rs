//! One open project: the assembly, its history and the gestures that edit
//! it.

use std::cell::RefCell;
use std::rc::Rc;

use assembly_core::abstract_editor::{Command, CommandError, UndoService};
use assembly_tree::commands::{
    CreateOrDeleteCommand, FuseCommand, MoveCommand, RenameCommand, group_items, ungroup,
};
use assembly_tree::{AssemblyModel, ItemId, Position, TreeError, TreeView, depth_first};
use thiserror::Error;

use crate::project::ProjectConfig;

/// Why a gesture did not change the assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The edit was refused before anything changed.
    #[error(transparent)]
    Tree(#[from] TreeError),
    /// The command failed while applying, undoing or redoing.
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("no item named '{0}'")]
    UnknownItem(String),
}

pub type SessionResult<T = ()> = Result<T, SessionError>;

/// What the history observer last reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStatus {
    /// Description of the command at the cursor, `None` at the start.
    pub current: Option<String>,
    /// Number of history transitions seen.
    pub transitions: u64,
}

/// Editing state of one open project.
///
/// Owns the [`AssemblyModel`] and its [`UndoService`]; both live exactly as
/// long as the project is open. Gestures build commands from the current
/// state and submit them to the history, which applies them.
pub struct ProjectSession {
    name: String,
    model: AssemblyModel,
    history: UndoService<AssemblyModel>,
    status: Rc<RefCell<HistoryStatus>>,
}

impl ProjectSession {
    /// Opens a project, building its assembly from the seed layout.
    pub fn open(config: &ProjectConfig) -> SessionResult<Self> {
        let model = config.build_model()?;
        Ok(Self::with_model(
            config.project.name.clone(),
            model,
            config.history.max_undo,
        ))
    }

    /// Opens a session over an already built assembly.
    pub fn with_model(name: String, model: AssemblyModel, max_undo: usize) -> Self {
        let status = Rc::new(RefCell::new(HistoryStatus::default()));
        let mut history = UndoService::new(max_undo);
        let sink = Rc::clone(&status);
        history.set_observer(move |current| {
            let mut status = sink.borrow_mut();
            status.current = current.map(|c| c.description().to_owned());
            status.transitions += 1;
        });
        log::info!("Opened project '{name}'");
        Self {
            name,
            model,
            history,
            status,
        }
    }

    /// Replaces the open project. History is cleared.
    pub fn switch_project(&mut self, config: &ProjectConfig) -> SessionResult {
        let model = config.build_model()?;
        log::info!("Switching project '{}' -> '{}'", self.name, config.project.name);
        self.name = config.project.name.clone();
        self.model = model;
        self.history.reset();
        self.history.mark_saved();
        *self.status.borrow_mut() = HistoryStatus::default();
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &AssemblyModel {
        &self.model
    }

    /// Mutable access for UI-only display state (expanded rows).
    pub fn display_mut(&mut self) -> &mut assembly_tree::DisplayTree {
        self.model.display_mut()
    }

    pub fn history(&self) -> &UndoService<AssemblyModel> {
        &self.history
    }

    pub fn status(&self) -> HistoryStatus {
        self.status.borrow().clone()
    }

    /// Finds an item by display name (first match in document order).
    pub fn find_by_name(&self, name: &str) -> SessionResult<ItemId> {
        let tree = self.model.domain();
        if tree.name_of(tree.root()).is_ok_and(|n| n == name) {
            return Ok(tree.root());
        }
        depth_first(tree)
            .into_iter()
            .map(|(_, id)| id)
            .find(|&id| tree.name_of(id).is_ok_and(|n| n == name))
            .ok_or_else(|| SessionError::UnknownItem(name.to_owned()))
    }

    /// Moves the items as one block under `parent` at `position`.
    ///
    /// Returns `Ok(false)` if they are already there.
    pub fn move_items(
        &mut self,
        ids: &[ItemId],
        parent: ItemId,
        position: Position,
    ) -> SessionResult<bool> {
        match rejected(MoveCommand::from_targets(&self.model, ids, parent, position))? {
            Some(cmd) => self.submit(Box::new(cmd)).map(|()| true),
            None => Ok(false),
        }
    }

    /// Renames an item. Returns `Ok(false)` if the name is unchanged.
    pub fn rename(&mut self, id: ItemId, name: &str) -> SessionResult<bool> {
        match rejected(RenameCommand::capture(&self.model, id, name))? {
            Some(cmd) => self.submit(Box::new(cmd)).map(|()| true),
            None => Ok(false),
        }
    }

    /// Creates an empty group and returns its id.
    pub fn create_group(
        &mut self,
        name: &str,
        parent: ItemId,
        position: Position,
    ) -> SessionResult<ItemId> {
        let cmd = rejected(CreateOrDeleteCommand::create_group(
            &mut self.model,
            name,
            parent,
            position,
        ))?;
        let id = cmd.id();
        self.submit(Box::new(cmd))?;
        Ok(id)
    }

    /// Wraps the selection into a new group named `name`.
    pub fn group_selection(&mut self, ids: &[ItemId], name: &str) -> SessionResult {
        let cmd = rejected(group_items(&mut self.model, ids, name))?;
        self.submit(Box::new(cmd))
    }

    /// Moves a group's children out and deletes it.
    pub fn ungroup(&mut self, id: ItemId) -> SessionResult {
        let cmd = rejected(ungroup(&self.model, id))?;
        self.submit(Box::new(cmd))
    }

    /// Deletes an empty group.
    pub fn delete_group(&mut self, id: ItemId) -> SessionResult {
        let cmd = rejected(CreateOrDeleteCommand::delete_group(&self.model, id))?;
        self.submit(Box::new(cmd))
    }

    pub fn toggle_fuse(&mut self, id: ItemId) -> SessionResult {
        let cmd = rejected(FuseCommand::toggle(&self.model, id))?;
        self.submit(Box::new(cmd))
    }

    /// Returns `Ok(false)` if there was nothing to undo.
    pub fn undo(&mut self) -> SessionResult<bool> {
        Ok(self.history.undo(&mut self.model)?)
    }

    /// Returns `Ok(false)` if there was nothing to redo.
    pub fn redo(&mut self) -> SessionResult<bool> {
        Ok(self.history.redo(&mut self.model)?)
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    fn submit(&mut self, command: Box<dyn Command<AssemblyModel>>) -> SessionResult {
        let description = command.description().to_owned();
        match self.history.add_command(command, &mut self.model) {
            Ok(()) => {
                log::info!("{description}");
                Ok(())
            }
            Err(e) => {
                log::warn!("{description} rejected: {e}");
                Err(e.into())
            }
        }
    }
}

/// Logs a refused gesture before handing the error back.
fn rejected<T>(result: Result<T, TreeError>) -> SessionResult<T> {
    result.map_err(|e| {
        log::warn!("Edit rejected: {e}");
        SessionError::from(e)
    })
}
