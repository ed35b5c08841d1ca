//! Undo/redo command history.
//!
//! [`UndoService`] owns a single linear history of [`Command`] trait objects
//! with a cursor marking the most recently applied entry. Adding a command
//! after undoing discards the redo branch; there is no branching history.

use std::collections::VecDeque;
use std::fmt;

use super::command::{Command, CommandError, CommandResult, Editable};
use super::group::CommandGroup;

/// Default maximum number of history entries.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Callback invoked after every history transition.
///
/// Receives the command now at the cursor, or `None` when the cursor is
/// back before the first entry (nothing left to undo).
pub type CommandObserver<T> = Box<dyn FnMut(Option<&dyn Command<T>>)>;

/// Owns the command history of one open project.
///
/// The history is a bounded [`VecDeque`]. `cursor` counts the applied
/// entries: entries `[0, cursor)` can be undone, entries `[cursor, len)` can
/// be redone, and `cursor == 0` is the "nothing done yet" position. When the
/// history grows past `max_undo`, the oldest entry is dropped from the front
/// and can no longer be undone.
///
/// # Example
///
/// ```ignore
/// let mut undo = UndoService::new(50);
/// let mut model = AssemblyModel::new("Assembly");
///
/// // Execute and record a command
/// undo.add_command(Box::new(my_command), &mut model)?;
///
/// // Undo the last command
/// undo.undo(&mut model)?;
///
/// // Redo it
/// undo.redo(&mut model)?;
/// ```
pub struct UndoService<T: Editable> {
    entries: VecDeque<Box<dyn Command<T>>>,
    cursor: usize,
    max_undo: usize,
    /// Cursor value at the last save.
    ///
    /// `None` if never saved or the save point is unreachable (its entry was
    /// dropped by the bound, or the branch holding it was discarded).
    save_point: Option<usize>,
    observer: Option<CommandObserver<T>>,
}

impl<T: Editable> UndoService<T> {
    /// Creates an empty history with the given maximum length.
    ///
    /// When the history exceeds `max_undo` entries, the oldest is dropped.
    /// A bound of zero is raised to one so the latest edit stays undoable.
    pub fn new(max_undo: usize) -> Self {
        if max_undo == 0 {
            log::warn!("History bound of 0 raised to 1");
        }
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            max_undo: max_undo.max(1),
            save_point: Some(0),
            observer: None,
        }
    }

    /// Installs the observer called after every add/undo/redo transition.
    ///
    /// Replaces any previously installed observer.
    pub fn set_observer(
        &mut self,
        observer: impl FnMut(Option<&dyn Command<T>>) + 'static,
    ) {
        self.observer = Some(Box::new(observer));
    }

    /// Removes the observer.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Applies `command` to the target and records it after the cursor.
    ///
    /// On success every entry after the cursor (the redo branch) is
    /// discarded, the command becomes the current entry, and the oldest
    /// entry is dropped if the bound is exceeded.
    ///
    /// If the command fails it was rejected before mutating anything: it is
    /// not recorded, the redo branch is kept and the observer is not called.
    pub fn add_command(
        &mut self,
        mut command: Box<dyn Command<T>>,
        target: &mut T,
    ) -> CommandResult {
        if let Err(e) = command.apply(target) {
            log::debug!("Command '{}' rejected: {e}", command.description());
            return Err(e);
        }

        self.discard_redo_branch();

        log::debug!("Recorded '{}'", command.description());
        self.entries.push_back(command);
        self.cursor += 1;
        self.enforce_bound();

        notify(&mut self.observer, entry_at(&self.entries, self.cursor));
        Ok(())
    }

    /// Reverts the current entry and moves the cursor back by one.
    ///
    /// Returns `Ok(false)` without doing anything if there is nothing to
    /// undo. If the revert fails the cursor stays where it was.
    pub fn undo(&mut self, target: &mut T) -> CommandResult<bool> {
        if self.cursor == 0 {
            return Ok(false);
        }

        let command = &mut self.entries[self.cursor - 1];
        if let Err(e) = command.revert(target) {
            log::error!("Undo of '{}' failed: {e}", command.description());
            return Err(e);
        }
        self.cursor -= 1;

        notify(&mut self.observer, entry_at(&self.entries, self.cursor));
        Ok(true)
    }

    /// Re-applies the entry after the cursor and advances the cursor.
    ///
    /// Returns `Ok(false)` without doing anything if there is nothing to
    /// redo. If the apply fails the cursor stays where it was.
    pub fn redo(&mut self, target: &mut T) -> CommandResult<bool> {
        if self.cursor == self.entries.len() {
            return Ok(false);
        }

        let command = &mut self.entries[self.cursor];
        if let Err(e) = command.apply(target) {
            log::error!("Redo of '{}' failed: {e}", command.description());
            return Err(e);
        }
        self.cursor += 1;

        notify(&mut self.observer, entry_at(&self.entries, self.cursor));
        Ok(true)
    }

    /// Applies `child` and appends it to the [`CommandGroup`] at the cursor.
    ///
    /// Lets a gesture grow a history entry after it was recorded, so the
    /// whole gesture still undoes in one step. Earlier children are not
    /// re-executed. The redo branch is discarded because the state it was
    /// recorded against no longer exists.
    pub fn extend_current_group(
        &mut self,
        child: Box<dyn Command<T>>,
        target: &mut T,
    ) -> CommandResult {
        let modifies = child.modifies_content();
        let Some(group) = self.current_as_mut::<CommandGroup<T>>() else {
            return Err(CommandError::InvalidState(
                "current history entry is not a command group".into(),
            ));
        };
        group.push_applied(child, target)?;

        self.discard_redo_branch();
        if modifies && self.save_point == Some(self.cursor) {
            self.save_point = None;
        }

        notify(&mut self.observer, entry_at(&self.entries, self.cursor));
        Ok(())
    }

    /// Returns the command at the cursor, or `None` at the start position.
    pub fn current(&self) -> Option<&dyn Command<T>> {
        entry_at(&self.entries, self.cursor)
    }

    /// Downcasts the command at the cursor to a concrete type.
    pub fn current_as_mut<C: Command<T>>(&mut self) -> Option<&mut C> {
        let index = self.cursor.checked_sub(1)?;
        let entry = self.entries.get_mut(index)?;
        (**entry).as_any_mut().downcast_mut::<C>()
    }

    /// Returns `true` if there are entries that can be undone.
    pub fn has_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns `true` if there are entries that can be redone.
    pub fn has_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Returns an iterator over undo descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.entries
            .range(..self.cursor)
            .rev()
            .map(|c| c.description())
    }

    /// Returns an iterator over redo descriptions, next to redo first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.entries.range(self.cursor..).map(|c| c.description())
    }

    /// Number of entries that can be undone.
    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    /// Number of entries that can be redone.
    pub fn redo_count(&self) -> usize {
        self.entries.len() - self.cursor
    }

    /// Total number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the maximum history length.
    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Records the current state as the saved state.
    pub fn mark_saved(&mut self) {
        self.save_point = Some(self.cursor);
    }

    /// Returns `true` if the target differs from the last saved state.
    ///
    /// Entries whose command does not
    /// [modify content](Command::modifies_content) are ignored, so undoing
    /// or redoing them never makes the document dirty.
    pub fn has_unsaved_changes(&self) -> bool {
        let Some(save) = self.save_point else {
            return true;
        };
        let (from, to) = if save <= self.cursor {
            (save, self.cursor)
        } else {
            (self.cursor, save)
        };
        self.entries
            .range(from..to)
            .any(|c| c.modifies_content())
    }

    /// Clears the whole history and returns to the start position.
    ///
    /// Used when switching projects. If the target was at the saved state it
    /// stays so; otherwise the save point is lost.
    pub fn reset(&mut self) {
        let clean = !self.has_unsaved_changes();
        self.entries.clear();
        self.cursor = 0;
        self.save_point = clean.then_some(0);
        log::debug!("History reset");
    }

    fn discard_redo_branch(&mut self) {
        if self.cursor < self.entries.len() {
            log::debug!(
                "Discarding {} redo entries",
                self.entries.len() - self.cursor
            );
            self.entries.truncate(self.cursor);
        }
        if let Some(save) = self.save_point
            && save > self.cursor
        {
            self.save_point = None;
        }
    }

    fn enforce_bound(&mut self) {
        while self.entries.len() > self.max_undo {
            self.entries.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
            self.save_point = match self.save_point {
                Some(0) | None => None,
                Some(save) => Some(save - 1),
            };
        }
    }
}

/// The entry just before `cursor`, i.e. the one an undo would revert.
fn entry_at<T: Editable>(
    entries: &VecDeque<Box<dyn Command<T>>>,
    cursor: usize,
) -> Option<&dyn Command<T>> {
    let index = cursor.checked_sub(1)?;
    entries.get(index).map(|c| &**c)
}

fn notify<T: Editable>(
    observer: &mut Option<CommandObserver<T>>,
    current: Option<&dyn Command<T>>,
) {
    if let Some(observer) = observer.as_mut() {
        observer(current);
    }
}

impl<T: Editable> Default for UndoService<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl<T: Editable> fmt::Debug for UndoService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoService")
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("max_undo", &self.max_undo)
            .field("save_point", &self.save_point)
            .field("has_observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rstest::rstest;

    use super::*;

    struct Counter {
        value: i32,
    }

    impl Editable for Counter {}

    #[derive(Debug)]
    struct Add {
        amount: i32,
    }

    impl Command<Counter> for Add {
        fn apply(&mut self, target: &mut Counter) -> CommandResult {
            target.value += self.amount;
            Ok(())
        }

        fn revert(&mut self, target: &mut Counter) -> CommandResult {
            target.value -= self.amount;
            Ok(())
        }

        fn description(&self) -> &str {
            "Add"
        }
    }

    #[derive(Debug)]
    struct FailingCommand;

    impl Command<Counter> for FailingCommand {
        fn apply(&mut self, _target: &mut Counter) -> CommandResult {
            Err(CommandError::Rejected("always fails".into()))
        }

        fn revert(&mut self, _target: &mut Counter) -> CommandResult {
            Err(CommandError::Rejected("always fails".into()))
        }

        fn description(&self) -> &str {
            "Failing"
        }
    }

    /// Selection-like command: undoable, but not a document change.
    #[derive(Debug)]
    struct Select;

    impl Command<Counter> for Select {
        fn apply(&mut self, _target: &mut Counter) -> CommandResult {
            Ok(())
        }

        fn revert(&mut self, _target: &mut Counter) -> CommandResult {
            Ok(())
        }

        fn description(&self) -> &str {
            "Select"
        }

        fn modifies_content(&self) -> bool {
            false
        }
    }

    fn add(amount: i32) -> Box<dyn Command<Counter>> {
        Box::new(Add { amount })
    }

    #[test]
    fn add_command_applies_and_records() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(add(5), &mut counter).unwrap();

        assert_eq!(counter.value, 5);
        assert_eq!(undo.undo_count(), 1);
        assert_eq!(undo.redo_count(), 0);
        assert!(undo.has_undo());
        assert!(!undo.has_redo());
    }

    #[test]
    fn undo_reverts_and_moves_cursor_back() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(add(5), &mut counter).unwrap();
        assert!(undo.undo(&mut counter).unwrap());

        assert_eq!(counter.value, 0);
        assert_eq!(undo.undo_count(), 0);
        assert_eq!(undo.redo_count(), 1);
        assert!(undo.current().is_none());
    }

    #[test]
    fn redo_reapplies_and_moves_cursor_forward() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(add(5), &mut counter).unwrap();
        undo.undo(&mut counter).unwrap();
        assert!(undo.redo(&mut counter).unwrap());

        assert_eq!(counter.value, 5);
        assert_eq!(undo.undo_count(), 1);
        assert_eq!(undo.redo_count(), 0);
    }

    #[test]
    fn add_after_undo_discards_redo_branch() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(add(1), &mut counter).unwrap();
        undo.add_command(add(2), &mut counter).unwrap();
        undo.undo(&mut counter).unwrap();
        undo.add_command(add(10), &mut counter).unwrap();

        assert!(!undo.has_redo());
        assert_eq!(undo.len(), 2);
        assert_eq!(counter.value, 11);

        assert!(undo.undo(&mut counter).unwrap());
        assert!(undo.undo(&mut counter).unwrap());
        assert!(!undo.undo(&mut counter).unwrap());
        assert_eq!(counter.value, 0);
    }

    #[test]
    fn undo_at_start_is_a_no_op() {
        let mut undo = UndoService::<Counter>::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 3 };

        assert!(!undo.undo(&mut counter).unwrap());
        assert_eq!(counter.value, 3);
        assert!(!undo.has_undo());
    }

    #[test]
    fn redo_at_end_is_a_no_op() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(add(1), &mut counter).unwrap();
        assert!(!undo.redo(&mut counter).unwrap());
        assert_eq!(counter.value, 1);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(10)]
    fn bound_drops_oldest_entries(#[case] bound: usize) {
        let mut undo = UndoService::new(bound);
        let mut counter = Counter { value: 0 };

        for _ in 0..bound + 5 {
            undo.add_command(add(1), &mut counter).unwrap();
        }

        assert_eq!(undo.len(), bound);
        assert_eq!(counter.value, (bound + 5) as i32);

        while undo.undo(&mut counter).unwrap() {}
        // The five oldest additions are no longer reachable.
        assert_eq!(counter.value, 5);
    }

    #[test]
    fn zero_bound_still_keeps_the_latest_edit() {
        let mut undo = UndoService::new(0);
        let mut counter = Counter { value: 0 };
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        undo.set_observer(move |current| {
            sink.borrow_mut()
                .push(current.map(|c| c.description().to_owned()));
        });

        undo.add_command(add(1), &mut counter).unwrap();
        undo.add_command(add(2), &mut counter).unwrap();
        assert_eq!(undo.max_undo(), 1);
        assert_eq!(undo.len(), 1);
        // The observer sees the command just applied, never the sentinel.
        assert_eq!(*seen.borrow(), vec![Some("Add".to_owned()); 2]);

        assert!(undo.undo(&mut counter).unwrap());
        assert_eq!(counter.value, 1);
        assert!(!undo.has_undo());
    }

    #[test]
    fn n_adds_then_n_undos_restore_the_start() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 42 };

        for amount in [3, -7, 11, 2] {
            undo.add_command(add(amount), &mut counter).unwrap();
        }
        for _ in 0..4 {
            undo.undo(&mut counter).unwrap();
        }
        assert_eq!(counter.value, 42);
    }

    #[test]
    fn failed_add_is_not_recorded_and_keeps_redo() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(add(1), &mut counter).unwrap();
        undo.undo(&mut counter).unwrap();

        let err = undo
            .add_command(Box::new(FailingCommand), &mut counter)
            .unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(undo.len(), 1);
        assert!(undo.has_redo());
    }

    #[test]
    fn observer_sees_every_transition() {
        let seen: Rc<RefCell<Vec<Option<String>>>> = Rc::default();
        let sink = seen.clone();

        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        undo.set_observer(move |current| {
            sink.borrow_mut()
                .push(current.map(|c| c.description().to_owned()));
        });
        let mut counter = Counter { value: 0 };

        undo.add_command(add(1), &mut counter).unwrap();
        undo.add_command(Box::new(Select), &mut counter).unwrap();
        undo.undo(&mut counter).unwrap();
        undo.undo(&mut counter).unwrap();
        undo.undo(&mut counter).unwrap(); // no-op, not reported
        undo.redo(&mut counter).unwrap();

        let seen = seen.borrow();
        assert_eq!(
            *seen,
            vec![
                Some("Add".to_owned()),
                Some("Select".to_owned()),
                Some("Add".to_owned()),
                None,
                Some("Add".to_owned()),
            ]
        );
    }

    #[test]
    fn observer_not_called_for_rejected_command() {
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();

        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        undo.set_observer(move |_| *sink.borrow_mut() += 1);
        let mut counter = Counter { value: 0 };

        let _ = undo.add_command(Box::new(FailingCommand), &mut counter);
        assert_eq!(*calls.borrow(), 0);

        undo.clear_observer();
        undo.add_command(add(1), &mut counter).unwrap();
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn descriptions() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        assert_eq!(undo.undo_descriptions().count(), 0);
        assert_eq!(undo.redo_descriptions().count(), 0);

        undo.add_command(add(1), &mut counter).unwrap();
        undo.add_command(Box::new(Select), &mut counter).unwrap();

        let undos: Vec<&str> = undo.undo_descriptions().collect();
        assert_eq!(undos, vec!["Select", "Add"]);

        undo.undo(&mut counter).unwrap();
        undo.undo(&mut counter).unwrap();

        let redos: Vec<&str> = undo.redo_descriptions().collect();
        assert_eq!(redos, vec!["Add", "Select"]);
    }

    #[test]
    fn reset_returns_to_start() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(add(1), &mut counter).unwrap();
        undo.add_command(add(2), &mut counter).unwrap();
        undo.undo(&mut counter).unwrap();
        undo.reset();

        assert!(undo.is_empty());
        assert!(!undo.has_undo());
        assert!(!undo.has_redo());
        assert!(undo.current().is_none());
    }

    #[test]
    fn extend_current_group_applies_only_new_child() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        let group = CommandGroup::new("Gesture").with(add(1));
        undo.add_command(Box::new(group), &mut counter).unwrap();
        undo.extend_current_group(add(10), &mut counter).unwrap();
        undo.extend_current_group(add(100), &mut counter).unwrap();

        assert_eq!(counter.value, 111);
        assert_eq!(undo.len(), 1);

        undo.undo(&mut counter).unwrap();
        assert_eq!(counter.value, 0);
        undo.redo(&mut counter).unwrap();
        assert_eq!(counter.value, 111);
    }

    #[test]
    fn extend_current_group_requires_a_group() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        assert!(undo.extend_current_group(add(1), &mut counter).is_err());
        undo.add_command(add(1), &mut counter).unwrap();
        let err = undo.extend_current_group(add(1), &mut counter).unwrap_err();
        assert!(matches!(err, CommandError::InvalidState(_)));
        assert_eq!(counter.value, 1);
    }

    #[test]
    fn current_as_mut_downcasts() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        assert!(undo.current_as_mut::<Add>().is_none());
        undo.add_command(add(4), &mut counter).unwrap();
        assert_eq!(undo.current_as_mut::<Add>().unwrap().amount, 4);
        assert!(undo.current_as_mut::<Select>().is_none());
    }

    #[test]
    fn no_unsaved_changes_on_fresh_history() {
        let undo = UndoService::<Counter>::new(DEFAULT_MAX_UNDO);
        assert!(!undo.has_unsaved_changes());
    }

    #[test]
    fn unsaved_until_back_at_save_point() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(add(1), &mut counter).unwrap();
        undo.mark_saved();
        assert!(!undo.has_unsaved_changes());

        undo.add_command(add(2), &mut counter).unwrap();
        assert!(undo.has_unsaved_changes());
        undo.undo(&mut counter).unwrap();
        assert!(!undo.has_unsaved_changes());
        undo.undo(&mut counter).unwrap();
        assert!(undo.has_unsaved_changes());
        undo.redo(&mut counter).unwrap();
        assert!(!undo.has_unsaved_changes());
    }

    #[test]
    fn save_lost_when_branch_discarded() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(add(1), &mut counter).unwrap();
        undo.mark_saved();
        undo.undo(&mut counter).unwrap();
        undo.add_command(add(5), &mut counter).unwrap();

        assert!(undo.has_unsaved_changes());
        undo.undo(&mut counter).unwrap();
        assert!(undo.has_unsaved_changes());
    }

    #[test]
    fn save_lost_when_bound_drops_it() {
        let mut undo = UndoService::new(2);
        let mut counter = Counter { value: 0 };

        undo.mark_saved();
        for _ in 0..3 {
            undo.add_command(add(1), &mut counter).unwrap();
        }
        while undo.undo(&mut counter).unwrap() {}
        assert!(undo.has_unsaved_changes());
    }

    #[test]
    fn non_content_commands_do_not_dirty() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(Box::new(Select), &mut counter).unwrap();
        assert!(!undo.has_unsaved_changes());
        undo.undo(&mut counter).unwrap();
        assert!(!undo.has_unsaved_changes());
    }

    #[test]
    fn reset_keeps_clean_state() {
        let mut undo = UndoService::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        undo.add_command(add(1), &mut counter).unwrap();
        undo.mark_saved();
        undo.reset();
        assert!(!undo.has_unsaved_changes());

        undo.add_command(add(1), &mut counter).unwrap();
        undo.reset();
        assert!(undo.has_unsaved_changes());
    }

    #[test]
    fn debug_impl() {
        let undo = UndoService::<Counter>::new(7);
        let debug = format!("{undo:?}");
        assert!(debug.contains("UndoService"));
        assert!(debug.contains("max_undo: 7"));
    }
}
