use std::path::{Path, PathBuf};

use assembly_core::abstract_editor::DEFAULT_MAX_UNDO;
use assembly_tree::{AssemblyModel, ItemId, Position, TreeResult};
use serde::Deserialize;
use thiserror::Error;

/// Top-level project configuration loaded from `project.toml`.
///
/// ```toml
/// [project]
/// name = "Gearbox"
///
/// [history]
/// max_undo = 200
///
/// [[station]]
/// name = "Housing"
/// components = ["Case", "Bearing"]
///
/// [[station.group]]
/// name = "Shaft"
/// fused = true
/// components = ["Spindle", "Key"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectInfo,
    #[serde(default)]
    pub history: HistoryConfig,
    /// Seed layout, one entry per station in order.
    #[serde(default)]
    pub station: Vec<GroupConfig>,
}

/// General project information.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undoable steps kept.
    #[serde(default = "default_max_undo")]
    pub max_undo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
        }
    }
}

fn default_max_undo() -> usize {
    DEFAULT_MAX_UNDO
}

/// A station or a nested group of the seed layout.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default)]
    pub fused: bool,
    /// Components, placed before any sub-groups.
    #[serde(default)]
    pub components: Vec<String>,
    #[serde(default)]
    pub group: Vec<GroupConfig>,
}

/// Failure to read or parse a project file.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("loading {} did not finish: {reason}", path.display())]
    Aborted { path: PathBuf, reason: String },
}

impl ProjectConfig {
    /// Parses a project from TOML text. `path` is only used for errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ProjectError> {
        toml::from_str(content).map_err(|source| ProjectError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// An empty project named "Untitled".
    pub fn untitled() -> Self {
        Self {
            project: ProjectInfo {
                name: "Untitled".into(),
            },
            history: HistoryConfig::default(),
            station: Vec::new(),
        }
    }

    /// Builds the assembly described by the seed layout.
    ///
    /// Seeding is an import: nothing is recorded in any history.
    pub fn build_model(&self) -> TreeResult<AssemblyModel> {
        let mut model = AssemblyModel::new(&self.project.name);
        let root = model.root();
        for station in &self.station {
            import_group(&mut model, station, root)?;
        }
        log::info!(
            "Built assembly '{}': {} stations, {} items",
            self.project.name,
            self.station.len(),
            model.domain().len() - 1
        );
        Ok(model)
    }
}

fn import_group(model: &mut AssemblyModel, config: &GroupConfig, parent: ItemId) -> TreeResult {
    let id = model.import_group(&config.name, parent, Position::AtEnd)?;
    if config.fused {
        model.set_fused(id, true)?;
    }
    for component in &config.components {
        model.import_component(component, id, Position::AtEnd)?;
    }
    for group in &config.group {
        import_group(model, group, id)?;
    }
    Ok(())
}

/// Load a project config from a TOML file.
pub fn load_project(path: &Path) -> Result<ProjectConfig, ProjectError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.to_owned(),
        source,
    })?;
    ProjectConfig::parse(&content, path)
}

/// Load project config, falling back to a default if the file doesn't exist
/// or cannot be parsed.
pub fn load_or_default(path: &Path) -> ProjectConfig {
    or_default(load_project(path))
}

/// Unwraps a load result, logging the failure and using
/// [`ProjectConfig::untitled`] instead.
pub fn or_default(result: Result<ProjectConfig, ProjectError>) -> ProjectConfig {
    match result {
        Ok(config) => {
            log::info!(
                "Loaded project: {} ({} stations)",
                config.project.name,
                config.station.len()
            );
            config
        }
        Err(e) => {
            log::warn!("No usable project file ({e}), using defaults");
            ProjectConfig::untitled()
        }
    }
}
