//! Configuration handling for bookdb
//!
//! Configuration is stored in `.bookdb/config.toml` (project) and
//! `~/.config/bookdb/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DEFAULT_FLOAT_TOLERANCE;

/// Name of the per-project directory
pub const PROJECT_DIR: &str = ".bookdb";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Required resource not found: {}", .0.display())]
    MissingResource(PathBuf),
}

/// Spreadsheet mirror settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Directory of per-tab CSV exports, relative to the project root
    pub source: Option<PathBuf>,

    /// Header rows at the top of every tab
    pub frozen_rows: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            source: None,
            frozen_rows: 1,
        }
    }
}

/// Diff engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Relative tolerance for float attributes; 0 means exact
    pub float_tolerance: f64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            float_tolerance: DEFAULT_FLOAT_TOLERANCE,
        }
    }
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Record root, relative to the project root
    pub db_root: PathBuf,

    /// Field-label replacement table, relative to `.bookdb/`
    pub replacements: PathBuf,

    pub sheet: SheetConfig,

    pub diff: DiffConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            db_root: PathBuf::from("book-data"),
            replacements: PathBuf::from("replacements.csv"),
            sheet: SheetConfig::default(),
            diff: DiffConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Rejects values no store can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_root must not be empty".to_string()));
        }
        if !self.diff.float_tolerance.is_finite() || self.diff.float_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "diff.float_tolerance must be a non-negative number, got {}",
                self.diff.float_tolerance
            )));
        }
        Ok(())
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from default locations
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let (project, project_root) = Self::load_project()?;

        Ok(Self {
            project,
            global,
            project_root,
        })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "bookdb", "bookdb").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Finds and loads project configuration
    fn load_project() -> Result<(ProjectConfig, Option<PathBuf>)> {
        match Self::find_project_root() {
            Some(root) => {
                let config = Self::load_project_config(&root)?;
                Ok((config, Some(root)))
            }
            None => Ok((ProjectConfig::default(), None)),
        }
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = project_root.join(PROJECT_DIR).join("config.toml");

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;
        config.validate().context("Invalid project config")?;
        Ok(config)
    }

    /// Finds the project root by looking for a `.bookdb/` directory
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Walks up from `start` looking for a `.bookdb/` directory
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns true if we're in a bookdb project
    pub fn is_in_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a bookdb project. Run 'bookdb init' first."))
    }

    /// Absolute record root
    pub fn db_root(&self) -> Result<PathBuf> {
        Ok(self.require_project_root()?.join(&self.project.db_root))
    }

    /// Absolute path of the replacement table
    pub fn replacements_path(&self) -> Result<PathBuf> {
        Ok(self
            .require_project_root()?
            .join(PROJECT_DIR)
            .join(&self.project.replacements))
    }

    /// Absolute CSV export directory, if one is configured
    pub fn sheet_source_dir(&self) -> Result<Option<PathBuf>> {
        let root = self.require_project_root()?;
        Ok(self.project.sheet.source.as_ref().map(|dir| root.join(dir)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert_eq!(config.project.db_root, PathBuf::from("book-data"));
        assert_eq!(config.project.sheet.frozen_rows, 1);
        assert_eq!(config.project.diff.float_tolerance, DEFAULT_FLOAT_TOLERANCE);
        assert_eq!(config.global.default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
db_root = "data"

[sheet]
source = "exports"
frozen_rows = 2

[diff]
float_tolerance = 0.001
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.db_root, PathBuf::from("data"));
        assert_eq!(config.replacements, PathBuf::from("replacements.csv"));
        assert_eq!(config.sheet.source, Some(PathBuf::from("exports")));
        assert_eq!(config.sheet.frozen_rows, 2);
        assert_eq!(config.diff.float_tolerance, 0.001);
    }

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str("default_format = \"json\"\n").unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn rejects_negative_tolerance() {
        let mut config = ProjectConfig::default();
        config.diff.float_tolerance = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn find_project_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(PROJECT_DIR)).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }

    #[test]
    fn config_not_in_project() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert!(!config.is_in_project());
        assert!(config.require_project_root().is_err());
        assert!(config.db_root().is_err());
    }

    #[test]
    fn paths_resolve_against_project_root() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: Some(PathBuf::from("/tmp/shelf")),
        };

        assert_eq!(config.db_root().unwrap(), PathBuf::from("/tmp/shelf/book-data"));
        assert_eq!(
            config.replacements_path().unwrap(),
            PathBuf::from("/tmp/shelf/.bookdb/replacements.csv")
        );
        assert_eq!(config.sheet_source_dir().unwrap(), None);
    }
}
