//! Index-free sibling positions.
//!
//! Numeric sibling indices shift whenever something is inserted or removed
//! elsewhere in the parent, so history entries never store them. They store
//! a [`Position`] instead, which is resolved to an index only at the moment
//! a node is inserted.

use crate::{ItemId, TreeError, TreeResult};

/// Where a node goes among its new siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// First child; there is no preceding sibling.
    AtStart,
    /// Immediately after the given sibling.
    After(ItemId),
    /// After all current siblings.
    AtEnd,
}

impl Position {
    /// Describes where `id` currently sits in `siblings`.
    ///
    /// Returns [`AtStart`](Self::AtStart) for the first child and
    /// [`After`](Self::After) the preceding sibling otherwise. Never returns
    /// [`AtEnd`](Self::AtEnd): a captured position must stay correct after
    /// more siblings are appended.
    pub fn of(siblings: &[ItemId], id: ItemId) -> Option<Self> {
        let index = siblings.iter().position(|&s| s == id)?;
        Some(match index {
            0 => Self::AtStart,
            i => Self::After(siblings[i - 1]),
        })
    }

    /// Resolves this position to an insertion index in `siblings`.
    ///
    /// `parent` is only used for the error when the neighbour is not among
    /// the siblings.
    pub fn resolve(self, siblings: &[ItemId], parent: ItemId) -> TreeResult<usize> {
        match self {
            Self::AtStart => Ok(0),
            Self::AtEnd => Ok(siblings.len()),
            Self::After(neighbour) => siblings
                .iter()
                .position(|&s| s == neighbour)
                .map(|i| i + 1)
                .ok_or(TreeError::NeighbourNotSibling { neighbour, parent }),
        }
    }

    /// Returns the neighbour id for [`After`](Self::After).
    pub fn neighbour(self) -> Option<ItemId> {
        match self {
            Self::After(id) => Some(id),
            _ => None,
        }
    }

    /// Returns `true` if inserting at this position would leave `id` exactly
    /// where it already is in `siblings`.
    pub fn is_current(self, siblings: &[ItemId], id: ItemId) -> bool {
        let Some(index) = siblings.iter().position(|&s| s == id) else {
            return false;
        };
        match self {
            Self::AtStart => index == 0,
            Self::AtEnd => index + 1 == siblings.len(),
            Self::After(neighbour) => index > 0 && siblings[index - 1] == neighbour,
        }
    }
}

/// Inserts `id` into `siblings` at `position`.
pub(crate) fn insert_at(
    siblings: &mut Vec<ItemId>,
    id: ItemId,
    position: Position,
    parent: ItemId,
) -> TreeResult {
    let index = position.resolve(siblings, parent)?;
    siblings.insert(index, id);
    Ok(())
}
