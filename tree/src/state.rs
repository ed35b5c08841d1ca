use crate::{ItemId, ItemTree, Position, TreeError, TreeResult};

/// Snapshot of one item's place in the tree.
///
/// Refers to other items only by id, so it stays valid in history no matter
/// how many siblings are inserted or removed in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemState {
    pub id: ItemId,
    pub name: String,
    pub parent: ItemId,
    pub neighbour: Position,
}

impl ItemState {
    pub fn new(id: ItemId, name: impl Into<String>, parent: ItemId, neighbour: Position) -> Self {
        Self {
            id,
            name: name.into(),
            parent,
            neighbour,
        }
    }

    /// Reads where `id` currently sits in `tree`.
    ///
    /// The root has no position and yields [`TreeError::RootImmutable`].
    pub fn capture(tree: &ItemTree, id: ItemId) -> TreeResult<Self> {
        let item = tree.find(id).ok_or(TreeError::NotFound(id))?;
        let (parent, neighbour) = tree
            .position_of(id)
            .ok_or(TreeError::RootImmutable("moved"))?;
        Ok(Self::new(id, item.name(), parent, neighbour))
    }

    /// Same item and name, placed somewhere else.
    pub fn moved_to(&self, parent: ItemId, neighbour: Position) -> Self {
        Self {
            parent,
            neighbour,
            ..self.clone()
        }
    }
}
