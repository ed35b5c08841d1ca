//! Multi-step gestures recorded as one history entry.

use crate::commands::{AssemblyGroup, CreateOrDeleteCommand, MoveCommand};
use crate::{AssemblyModel, ItemId, Position, TreeError, TreeResult};

/// Wraps the selected items into a new group.
///
/// The group is created where the first selected item (in document order)
/// sits, and the selection then moves into it as one block. Undo removes
/// the items from the group and deletes it in a single step.
pub fn group_items(
    model: &mut AssemblyModel,
    ids: &[ItemId],
    name: &str,
) -> TreeResult<AssemblyGroup> {
    let selection = model.selection(ids)?;
    let first = *selection.first().ok_or(TreeError::EmptySelection)?;
    let (parent, position) = model
        .domain()
        .position_of(first)
        .ok_or(TreeError::RootImmutable("grouped"))?;

    let create = CreateOrDeleteCommand::create_group(model, name, parent, position)?;
    let group_id = create.id();
    let mut group = AssemblyGroup::new("Group items").with(Box::new(create));

    // The new group does not exist yet, so the block can never be in place.
    if let Some(moves) = MoveCommand::from_targets(model, &selection, group_id, Position::AtStart)? {
        group.push(Box::new(moves));
    }
    Ok(group)
}

/// Dissolves a group: its children move out to just after it, then the
/// empty group is deleted.
pub fn ungroup(model: &AssemblyModel, id: ItemId) -> TreeResult<AssemblyGroup> {
    let delete = CreateOrDeleteCommand::delete_group(model, id)?;
    let parent = delete.state().parent;
    let children = model.domain().children_of(id)?.to_vec();

    let mut group = AssemblyGroup::new("Ungroup");
    if let Some(moves) = MoveCommand::from_targets(model, &children, parent, Position::After(id))? {
        group.push(Box::new(moves));
    }
    group.push(Box::new(delete));
    Ok(group)
}

#[cfg(test)]
mod tests {
    use assembly_core::abstract_editor::Command;

    use super::*;
    use crate::ROOT_ID;

    /// Root{ S1{ x, y, z } }
    fn line() -> (AssemblyModel, ItemId, [ItemId; 3]) {
        let mut model = AssemblyModel::new("Line");
        let s1 = model.import_group("S1", ROOT_ID, Position::AtEnd).unwrap();
        let x = model.import_component("x", s1, Position::AtEnd).unwrap();
        let y = model.import_component("y", s1, Position::AtEnd).unwrap();
        let z = model.import_component("z", s1, Position::AtEnd).unwrap();
        (model, s1, [x, y, z])
    }

    #[test]
    fn group_items_creates_group_at_first_item() {
        let (mut model, s1, [x, y, z]) = line();
        let before = model.structure_snapshot();

        let mut cmd = group_items(&mut model, &[z, y], "Sub").unwrap();
        assert_eq!(
            cmd.descriptions().collect::<Vec<_>>(),
            ["Create group", "Move 2 items"]
        );
        cmd.apply(&mut model).unwrap();

        let children = model.domain().children_of(s1).unwrap().to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], x);
        let g = children[1];
        assert_eq!(model.domain().children_of(g).unwrap(), &[y, z]);
        assert!(model.is_mirrored());

        cmd.revert(&mut model).unwrap();
        assert_eq!(model.structure_snapshot(), before);
    }

    #[test]
    fn ungroup_restores_children_in_place() {
        let (mut model, s1, [x, y, z]) = line();
        let mut grouping = group_items(&mut model, &[x, y], "Sub").unwrap();
        grouping.apply(&mut model).unwrap();
        let g = model.domain().children_of(s1).unwrap()[0];
        let grouped = model.structure_snapshot();

        let mut cmd = ungroup(&model, g).unwrap();
        cmd.apply(&mut model).unwrap();
        assert_eq!(model.domain().children_of(s1).unwrap(), &[x, y, z]);
        assert!(!model.domain().contains(g));

        cmd.revert(&mut model).unwrap();
        assert_eq!(model.structure_snapshot(), grouped);
    }

    #[test]
    fn ungroup_station_of_components_is_rejected() {
        let (mut model, s1, _) = line();
        let before = model.structure_snapshot();
        let mut cmd = ungroup(&model, s1).unwrap();
        let err = cmd.apply(&mut model).unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(model.structure_snapshot(), before);
    }

    #[test]
    fn empty_selection_cannot_be_grouped() {
        let (mut model, ..) = line();
        assert_eq!(
            group_items(&mut model, &[], "G").unwrap_err(),
            TreeError::EmptySelection
        );
    }
}
