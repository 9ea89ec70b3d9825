use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

const CONFIG_DIR: &str = "todotxt";
const CONFIG_FILE: &str = "config.toml";

/// File locations loaded from `<config_dir>/todotxt/config.toml`.
///
/// Relative file names resolve against `todo_dir`; absolute ones are used as is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TodoConfig {
    /// Directory holding the task files.
    pub todo_dir: PathBuf,
    /// Active task list.
    pub todo_file: PathBuf,
    /// Archive of completed tasks.
    pub done_file: PathBuf,
    /// Log that `report` appends to.
    pub report_file: PathBuf,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            todo_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            todo_file: PathBuf::from("todo.txt"),
            done_file: PathBuf::from("done.txt"),
            report_file: PathBuf::from("report.txt"),
        }
    }
}

impl TodoConfig {
    /// Default config location, if the platform has a config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from `explicit` or the default location.
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or fails validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            return Self::from_path(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load and validate a specific file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or fails validation.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the todo and/or done file, then re-validate.
    ///
    /// # Errors
    /// Returns an error if the result points both files at the same path.
    pub fn with_overrides(mut self, todo_file: Option<PathBuf>, done_file: Option<PathBuf>) -> Result<Self> {
        if let Some(todo_file) = todo_file {
            self.todo_file = todo_file;
        }
        if let Some(done_file) = done_file {
            self.done_file = done_file;
        }
        self.validate()?;
        Ok(self)
    }

    /// Resolved path of the active task list.
    #[must_use]
    pub fn todo_path(&self) -> PathBuf {
        self.todo_dir.join(&self.todo_file)
    }

    /// Resolved path of the done file.
    #[must_use]
    pub fn done_path(&self) -> PathBuf {
        self.todo_dir.join(&self.done_file)
    }

    /// Resolved path of the report log.
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.todo_dir.join(&self.report_file)
    }

    fn validate(&self) -> Result<()> {
        if self.todo_path() == self.done_path() {
            bail!("todo_file and done_file must differ");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_keys_fall_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "todo_dir = \"/srv/tasks\"\n")?;

        let config = TodoConfig::from_path(&path)?;
        assert_eq!(config.todo_path(), PathBuf::from("/srv/tasks/todo.txt"));
        assert_eq!(config.done_path(), PathBuf::from("/srv/tasks/done.txt"));
        assert_eq!(config.report_path(), PathBuf::from("/srv/tasks/report.txt"));
        Ok(())
    }

    #[test]
    fn absolute_file_names_ignore_todo_dir() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "todo_dir = \"/srv/tasks\"\ndone_file = \"/archive/done.txt\"\n")?;

        let config = TodoConfig::from_path(&path)?;
        assert_eq!(config.done_path(), PathBuf::from("/archive/done.txt"));
        Ok(())
    }

    #[test]
    fn identical_todo_and_done_files_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "todo_file = \"tasks.txt\"\ndone_file = \"tasks.txt\"\n")?;

        let err = TodoConfig::from_path(&path).err().map(|err| err.to_string());
        assert_eq!(err.as_deref(), Some("todo_file and done_file must differ"));
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "todo_flie = \"typo.txt\"\n")?;

        assert!(TodoConfig::from_path(&path).is_err());
        Ok(())
    }

    #[test]
    fn explicit_missing_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        assert!(TodoConfig::load(Some(dir.path().join("absent.toml").as_path())).is_err());
        Ok(())
    }

    #[test]
    fn overrides_replace_files_and_revalidate() -> Result<()> {
        let config = TodoConfig::default().with_overrides(Some(PathBuf::from("/tmp/a.txt")), None)?;
        assert_eq!(config.todo_path(), PathBuf::from("/tmp/a.txt"));
        assert!(
            config
                .with_overrides(None, Some(PathBuf::from("/tmp/a.txt")))
                .is_err()
        );
        Ok(())
    }
}
