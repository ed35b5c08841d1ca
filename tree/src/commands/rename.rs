use assembly_core::abstract_editor::{Command, CommandResult};

use crate::{AssemblyModel, ItemId, TreeError, TreeResult};

/// Changes the display name of one item.
#[derive(Debug, Clone)]
pub struct RenameCommand {
    id: ItemId,
    old: String,
    new: String,
}

impl RenameCommand {
    /// Builds a rename of `id` to `name`.
    ///
    /// An empty (or all-whitespace) name is rejected here, before any
    /// command exists; the caller keeps showing the old name. Returns
    /// `Ok(None)` if the name does not change.
    pub fn capture(model: &AssemblyModel, id: ItemId, name: &str) -> TreeResult<Option<Self>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TreeError::EmptyName);
        }
        if id == model.root() {
            return Err(TreeError::RootImmutable("renamed"));
        }
        let item = model.domain().find(id).ok_or(TreeError::NotFound(id))?;
        if item.name() == name {
            return Ok(None);
        }
        Ok(Some(Self {
            id,
            old: item.name().to_owned(),
            new: name.to_owned(),
        }))
    }
}

impl Command<AssemblyModel> for RenameCommand {
    fn apply(&mut self, model: &mut AssemblyModel) -> CommandResult {
        model.rename(self.id, &self.new)?;
        Ok(())
    }

    fn revert(&mut self, model: &mut AssemblyModel) -> CommandResult {
        model.rename(self.id, &self.old)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Rename item"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Position, ROOT_ID};

    #[test]
    fn rename_round_trip() {
        let mut model = AssemblyModel::new("Line");
        let s1 = model.import_group("S1", ROOT_ID, Position::AtEnd).unwrap();

        let mut cmd = RenameCommand::capture(&model, s1, " Welding ")
            .unwrap()
            .unwrap();
        cmd.apply(&mut model).unwrap();
        assert_eq!(model.domain().find(s1).unwrap().name(), "Welding");
        assert_eq!(model.display().label(s1), Some("Welding"));

        cmd.revert(&mut model).unwrap();
        assert_eq!(model.display().label(s1), Some("S1"));
    }

    #[test]
    fn empty_or_unchanged_names_build_nothing() {
        let mut model = AssemblyModel::new("Line");
        let s1 = model.import_group("S1", ROOT_ID, Position::AtEnd).unwrap();

        assert_eq!(
            RenameCommand::capture(&model, s1, "  ").unwrap_err(),
            TreeError::EmptyName
        );
        assert!(RenameCommand::capture(&model, s1, "S1").unwrap().is_none());
    }
}
