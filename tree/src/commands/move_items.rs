use assembly_core::abstract_editor::{Command, CommandResult};

use crate::{AssemblyModel, ItemId, ItemState, Position, TreeResult};

/// Moves one or more items, each from an old to a new [`ItemState`].
///
/// Both apply and revert walk the list front to back. A new state may name
/// an item placed by an earlier entry as its neighbour; old states are
/// captured in document order, so an old neighbour that also moved is
/// restored before it is needed.
#[derive(Debug, Clone)]
pub struct MoveCommand {
    moves: Vec<(ItemState, ItemState)>,
    description: String,
}

impl MoveCommand {
    /// Wraps explicit `(old, new)` pairs.
    pub fn new(moves: Vec<(ItemState, ItemState)>) -> Self {
        let description = match moves.len() {
            1 => "Move item".to_owned(),
            n => format!("Move {n} items"),
        };
        Self { moves, description }
    }

    /// Moves the selected items as one block under `parent` at `position`.
    ///
    /// The selection is put in document order and nested items are dropped
    /// (they move with their ancestor). The first item goes to `position`,
    /// every other item right after the one before it.
    ///
    /// Returns `Ok(None)` for an empty selection or when the block already
    /// sits exactly there.
    pub fn from_targets(
        model: &AssemblyModel,
        ids: &[ItemId],
        parent: ItemId,
        position: Position,
    ) -> TreeResult<Option<Self>> {
        let selection = model.selection(ids)?;
        if selection.is_empty() {
            return Ok(None);
        }

        // "After x" with x in the selection means wherever x sits now.
        let mut position = position;
        while let Position::After(anchor) = position
            && selection.contains(&anchor)
        {
            let siblings = model.domain().children_of(parent)?;
            match Position::of(siblings, anchor) {
                Some(p) => position = p,
                None => break,
            }
        }

        let mut moves = Vec::with_capacity(selection.len());
        let mut neighbour = position;
        for &id in &selection {
            let old = model.capture(id)?;
            let new = old.moved_to(parent, neighbour);
            moves.push((old, new));
            neighbour = Position::After(id);
        }

        if is_in_place(model, &moves, position) {
            log::debug!("Move of {} item(s) is a no-op", moves.len());
            return Ok(None);
        }
        Ok(Some(Self::new(moves)))
    }

    /// Number of items moved.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The `(old, new)` state pairs in application order.
    pub fn moves(&self) -> &[(ItemState, ItemState)] {
        &self.moves
    }
}

/// Returns `true` if every item of the chain already sits at its new state.
fn is_in_place(model: &AssemblyModel, moves: &[(ItemState, ItemState)], position: Position) -> bool {
    let tree = model.domain();
    let chained = moves
        .iter()
        .skip(1)
        .all(|(_, new)| tree.is_at(new.id, new.parent, new.neighbour));
    let (Some((_, first)), Some((_, last))) = (moves.first(), moves.last()) else {
        return true;
    };
    let anchored = match position {
        // The block is at the end when its last item is.
        Position::AtEnd => tree.is_at(last.id, last.parent, Position::AtEnd),
        _ => tree.is_at(first.id, first.parent, first.neighbour),
    };
    chained && anchored
}

impl Command<AssemblyModel> for MoveCommand {
    fn apply(&mut self, model: &mut AssemblyModel) -> CommandResult {
        let targets: Vec<ItemState> = self.moves.iter().map(|(_, new)| new.clone()).collect();
        model.move_items(&targets)?;
        Ok(())
    }

    fn revert(&mut self, model: &mut AssemblyModel) -> CommandResult {
        let targets: Vec<ItemState> = self.moves.iter().map(|(old, _)| old.clone()).collect();
        model.move_items(&targets)?;
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
