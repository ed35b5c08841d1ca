//! Editable targets and reversible commands.
//!
//! This module defines the core abstractions for the undo/redo engine:
//!
//! - [`Editable`] — marker trait for types that commands operate on
//! - [`Command`] — a reversible edit operation (Command pattern)
//! - [`CommandError`] / [`CommandResult`] — error handling for commands
//!
//! Commands are self-contained: each implementation stores the value
//! snapshots it needs (identifiers, old/new names, old/new positions) and
//! never holds references into the target, so a recorded command stays
//! replayable for as long as it lives in the history.

use std::any::Any;

use thiserror::Error;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. Used by
/// [`UndoService::current_as_mut`](super::UndoService::current_as_mut) to
/// reach the concrete command at the history cursor.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Marker trait for types that serve as command targets.
///
/// Implement this on the model that commands mutate, e.g. the assembly
/// model holding both the domain tree and the display tree.
///
/// # Example
///
/// ```ignore
/// struct MyModel { /* ... */ }
/// impl Editable for MyModel {}
/// ```
pub trait Editable: 'static {}

/// Error type for command execution failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A node referenced by the command no longer exists.
    ///
    /// This is an internal-consistency failure: it only happens when the
    /// target was mutated behind the history's back.
    #[error("target not found: {0}")]
    TargetNotFound(String),
    /// The target is in an invalid state for this command.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The edit was rejected by a pre-check before anything was mutated.
    ///
    /// The message is meant to be shown to the user.
    #[error("rejected: {0}")]
    Rejected(String),
    /// A custom error with a description.
    #[error("{0}")]
    Custom(String),
}

impl CommandError {
    /// Returns `true` if the error is a user-facing rejection rather than an
    /// internal failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Result type for command operations.
pub type CommandResult<T = ()> = Result<T, CommandError>;

/// A reversible command.
///
/// Commands capture enough state to redo ([`apply`](Self::apply)) and undo
/// ([`revert`](Self::revert)) a single logical edit. `apply` followed by
/// `revert` must leave the target exactly as it was, and `revert` followed
/// by `apply` must reproduce the state of the original `apply`.
///
/// A command must either fully succeed or fail before mutating the target.
/// Implementations validate their preconditions first and only then mutate.
///
/// # Object Safety
///
/// This trait is dyn-compatible so that different command types can be
/// stored in a single [`UndoService`](super::UndoService) history as
/// `Box<dyn Command<T>>`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct Rename {
///     id: ItemId,
///     old: String,
///     new: String,
/// }
///
/// impl Command<Model> for Rename {
///     fn apply(&mut self, model: &mut Model) -> CommandResult {
///         model.rename(self.id, &self.new)
///     }
///
///     fn revert(&mut self, model: &mut Model) -> CommandResult {
///         model.rename(self.id, &self.old)
///     }
///
///     fn description(&self) -> &str {
///         "Rename"
///     }
/// }
/// ```
pub trait Command<T: Editable>: std::fmt::Debug + AsAny + Send {
    /// Applies the command to the target (forward / redo direction).
    fn apply(&mut self, target: &mut T) -> CommandResult;

    /// Reverses the command (undo direction).
    ///
    /// Must restore the target to the state before [`apply`](Self::apply)
    /// was called.
    fn revert(&mut self, target: &mut T) -> CommandResult;

    /// A short, human-readable description for display in the history.
    ///
    /// Examples: `"Move 3 items"`, `"Rename item"`, `"Group items"`.
    fn description(&self) -> &str;

    /// Whether this command changes document content.
    ///
    /// Commands returning `false` are undoable like any other but do not
    /// move the save point tracked by the history.
    ///
    /// Default: `true`.
    fn modifies_content(&self) -> bool {
        true
    }
}
