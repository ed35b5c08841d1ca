//! Reversible structural edits of an [`AssemblyModel`](crate::AssemblyModel).
//!
//! Each command stores only value snapshots ([`ItemState`](crate::ItemState),
//! names, flags) and reaches the tree through the model's mutation
//! functions, so both trees change together on apply, undo and redo.
//!
//! Builders read the model to capture the "before" side of an edit. They
//! return `Ok(None)` where the edit would change nothing; such edits are
//! not recorded.

mod create_delete;
mod fuse;
mod grouping;
mod move_items;
mod rename;

pub use create_delete::{CreateOrDeleteCommand, Direction};
pub use fuse::FuseCommand;
pub use grouping::{group_items, ungroup};
pub use move_items::MoveCommand;
pub use rename::RenameCommand;

use assembly_core::abstract_editor::CommandGroup;

use crate::AssemblyModel;

/// A composite of assembly commands, undone and redone as one step.
pub type AssemblyGroup = CommandGroup<AssemblyModel>;
