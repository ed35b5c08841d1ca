use assembly_core::abstract_editor::CommandError;
use thiserror::Error;

use crate::ItemId;

/// Structural edit failures.
///
/// Every variant except [`NotFound`](Self::NotFound) is a rejected edit
/// detected before anything was mutated; the message is user-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("item {0} not found")]
    NotFound(ItemId),
    #[error("cannot move {item} into its own descendant {target}")]
    CycleDetected { item: ItemId, target: ItemId },
    #[error("{0} is not a group")]
    NotAGroup(ItemId),
    #[error("group {0} still has children and cannot be deleted")]
    NotEmpty(ItemId),
    #[error("{neighbour} is not a child of {parent}")]
    NeighbourNotSibling { neighbour: ItemId, parent: ItemId },
    #[error("{0} cannot be placed after itself")]
    NeighbourIsSelf(ItemId),
    #[error("only groups can be stations; {0} is not a group")]
    TopLevelRequiresGroup(ItemId),
    #[error("name must not be empty")]
    EmptyName,
    #[error("item {0} already exists")]
    DuplicateId(ItemId),
    #[error("the root item cannot be {0}")]
    RootImmutable(&'static str),
    #[error("nothing selected")]
    EmptySelection,
}

pub type TreeResult<T = ()> = Result<T, TreeError>;

impl From<TreeError> for CommandError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NotFound(_) => CommandError::TargetNotFound(err.to_string()),
            other => CommandError::Rejected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_item_is_internal_failure() {
        let err: CommandError = TreeError::NotFound(ItemId::new(9)).into();
        assert_eq!(err, CommandError::TargetNotFound("item #9 not found".into()));
    }

    #[test]
    fn structural_errors_are_rejections() {
        let err: CommandError = TreeError::CycleDetected {
            item: ItemId::new(1),
            target: ItemId::new(2),
        }
        .into();
        assert!(err.is_rejection());
        assert_eq!(
            err.to_string(),
            "rejected: cannot move #1 into its own descendant #2"
        );
    }
}
