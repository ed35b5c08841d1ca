use assembly_core::abstract_editor::{Command, CommandResult};

use crate::{AssemblyModel, ItemId, TreeError, TreeResult};

/// Flips the fused flag of a group.
#[derive(Debug, Clone)]
pub struct FuseCommand {
    id: ItemId,
    was_fused: bool,
}

impl FuseCommand {
    /// Builds a toggle of the group's current fused flag.
    pub fn toggle(model: &AssemblyModel, id: ItemId) -> TreeResult<Self> {
        if id == model.root() {
            return Err(TreeError::RootImmutable("fused"));
        }
        let item = model.domain().find(id).ok_or(TreeError::NotFound(id))?;
        if !item.is_group() {
            return Err(TreeError::NotAGroup(id));
        }
        Ok(Self {
            id,
            was_fused: item.is_fused(),
        })
    }
}

impl Command<AssemblyModel> for FuseCommand {
    fn apply(&mut self, model: &mut AssemblyModel) -> CommandResult {
        model.set_fused(self.id, !self.was_fused)?;
        Ok(())
    }

    fn revert(&mut self, model: &mut AssemblyModel) -> CommandResult {
        model.set_fused(self.id, self.was_fused)?;
        Ok(())
    }

    fn description(&self) -> &str {
        if self.was_fused {
            "Unfuse group"
        } else {
            "Fuse group"
        }
    }
}
