//! Reversible editing framework.
//!
//! This module provides the foundational traits and types for an
//! undo/redo-capable editor. It knows nothing about the assembly tree, so
//! the tree crate can implement concrete commands against its own model.
//!
//! - [`Editable`] — marker trait for types that commands operate on
//! - [`Command`] — a reversible edit (Command pattern)
//! - [`CommandGroup`] — composite command undone and redone as one step
//! - [`UndoService`] — linear, bounded history with a cursor and observer
//!
//! # History model
//!
//! The history is a single line of commands. Undo moves the cursor back,
//! redo moves it forward, and adding a command after undoing throws the
//! redo branch away. Every transition calls the observer installed with
//! [`UndoService::set_observer`] exactly once, passing the command now at
//! the cursor.
//!
//! # Content vs non-content commands
//!
//! Commands can return `false` from [`Command::modifies_content`] to mark
//! UI-state changes that are undoable but do not affect
//! [`UndoService::has_unsaved_changes`].

mod command;
mod group;
mod history;

pub use command::{AsAny, Command, CommandError, CommandResult, Editable};
pub use group::CommandGroup;
pub use history::{CommandObserver, DEFAULT_MAX_UNDO, UndoService};
