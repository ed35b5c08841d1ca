//! Composite command executing an ordered list of children as one step.

use std::fmt;

use super::command::{Command, CommandResult, Editable};

/// A composite [`Command`] that undoes and redoes its children atomically.
///
/// Children are applied in insertion order and reverted in reverse
/// insertion order, so a multi-step gesture such as "create a group, then
/// move the selection into it" is a single history entry.
///
/// A group can be built incrementally while it already sits in the
/// history: [`push_applied`](Self::push_applied) executes only the new child
/// and never re-runs the ones before it.
///
/// If a child fails during [`apply`](Command::apply) or
/// [`revert`](Command::revert), the children already processed in that pass
/// are rolled back in the opposite direction and the error is returned, so
/// the target is left as it was before the call.
pub struct CommandGroup<T: Editable> {
    description: String,
    children: Vec<Box<dyn Command<T>>>,
}

impl<T: Editable> CommandGroup<T> {
    /// Creates an empty group with the given history description.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            children: Vec::new(),
        }
    }

    /// Appends a child without executing it.
    ///
    /// The child runs the next time the whole group is applied.
    pub fn push(&mut self, child: Box<dyn Command<T>>) {
        self.children.push(child);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, child: Box<dyn Command<T>>) -> Self {
        self.push(child);
        self
    }

    /// Applies `child` to the target and appends it.
    ///
    /// Used when the group is already applied (e.g. it is the current
    /// history entry) and the gesture grows by one more step. If the child
    /// fails it is not appended.
    pub fn push_applied(
        &mut self,
        mut child: Box<dyn Command<T>>,
        target: &mut T,
    ) -> CommandResult {
        child.apply(target)?;
        self.children.push(child);
        Ok(())
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child descriptions in execution order.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|c| c.description())
    }
}

impl<T: Editable> fmt::Debug for CommandGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandGroup")
            .field("description", &self.description)
            .field("children", &self.children)
            .finish()
    }
}

impl<T: Editable> Command<T> for CommandGroup<T> {
    fn apply(&mut self, target: &mut T) -> CommandResult {
        for i in 0..self.children.len() {
            if let Err(e) = self.children[i].apply(target) {
                for done in self.children[..i].iter_mut().rev() {
                    if let Err(rollback) = done.revert(target) {
                        log::error!("Rollback of '{}' failed: {rollback}", done.description());
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn revert(&mut self, target: &mut T) -> CommandResult {
        let len = self.children.len();
        for i in (0..len).rev() {
            if let Err(e) = self.children[i].revert(target) {
                for done in self.children[i + 1..].iter_mut() {
                    if let Err(rollback) = done.apply(target) {
                        log::error!("Rollback of '{}' failed: {rollback}", done.description());
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn modifies_content(&self) -> bool {
        self.children.iter().any(|c| c.modifies_content())
    }
}
