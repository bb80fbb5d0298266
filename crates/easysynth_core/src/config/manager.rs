//! Loading and saving `settings.toml`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid settings document: {0}")]
    Document(#[from] toml_edit::TomlError),

    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Replace `path` with `content` through a sibling temp file and a rename.
pub(crate) fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)
}

/// Owns the application settings and the file they live in.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Nothing is read until `load` or `load_or_create`.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory only until `save` or `update_section`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }
        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load the file, or write a default one if there is none.
    ///
    /// A file with unknown tables, missing tables or missing keys is
    /// rewritten in full so it always lists every setting.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            self.settings = Settings::default();
            self.save()?;
            tracing::info!("Wrote default settings to {}", self.config_path.display());
            return Ok(());
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;

        if self.is_incomplete(&content)? {
            tracing::info!("Completing settings file {}", self.config_path.display());
            self.save()?;
        }
        Ok(())
    }

    /// Create the state and logs folders.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        fs::create_dir_all(self.state_folder())?;
        fs::create_dir_all(self.logs_folder())?;
        Ok(())
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    pub fn state_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.state_folder)
    }

    /// Whether the on-disk text differs in shape from the full settings.
    fn is_incomplete(&self, content: &str) -> ConfigResult<bool> {
        let on_disk: DocumentMut = content.parse()?;

        let unknown_table = on_disk
            .iter()
            .any(|(key, _)| ConfigSection::from_table_name(key).is_none());
        if unknown_table {
            return Ok(true);
        }

        for section in ConfigSection::all() {
            let Some(table) = on_disk.get(section.table_name()).and_then(Item::as_table) else {
                return Ok(true);
            };
            let full: DocumentMut = self.section_toml(*section)?.parse()?;
            if table.len() != full.as_table().len() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Rewrite the whole file from the in-memory settings.
    pub fn save(&self) -> ConfigResult<()> {
        let mut output = String::from("# EasySynth settings\n");

        for section in ConfigSection::all() {
            output.push_str(&format!(
                "\n{}\n[{}]\n{}",
                section.comment(),
                section.table_name(),
                self.section_toml(*section)?
            ));
        }

        atomic_write(&self.config_path, &output)?;
        Ok(())
    }

    /// Rewrite one table, leaving the rest of the file untouched.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let mut doc = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?.parse::<DocumentMut>()?
        } else {
            DocumentMut::new()
        };

        let table: DocumentMut = self.section_toml(section)?.parse()?;
        doc[section.table_name()] = Item::Table(table.as_table().clone());

        atomic_write(&self.config_path, &doc.to_string())?;
        tracing::debug!("Updated [{}] in {}", section.table_name(), self.config_path.display());
        Ok(())
    }

    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        let text = match section {
            ConfigSection::Paths => toml::to_string_pretty(&self.settings.paths)?,
            ConfigSection::Logging => toml::to_string_pretty(&self.settings.logging)?,
            ConfigSection::Batch => toml::to_string_pretty(&self.settings.batch)?,
            ConfigSection::Renderer => toml::to_string_pretty(&self.settings.renderer)?,
        };
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_default_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".easysynth").join("settings.toml");

        let mut manager = ConfigManager::new(&path);
        manager.load_or_create().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        for table in ["[paths]", "[logging]", "[batch]", "[renderer]"] {
            assert!(content.contains(table), "missing {}", table);
        }
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn partial_file_is_completed_and_kept() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[paths]\ncontent_root = \"Shooter/Content\"\n").unwrap();

        let mut manager = ConfigManager::new(&path);
        manager.load_or_create().unwrap();

        assert_eq!(manager.settings().paths.content_root, "Shooter/Content");
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Shooter/Content"));
        assert!(content.contains("settle_delay_ms"));
    }

    #[test]
    fn complete_file_is_not_rewritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        ConfigManager::new(&path).save().unwrap();

        let mut text = fs::read_to_string(&path).unwrap();
        text.push_str("# hand-written note\n");
        fs::write(&path, &text).unwrap();

        ConfigManager::new(&path).load_or_create().unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("hand-written note"));
    }

    #[test]
    fn load_requires_file() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("absent.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn update_section_touches_one_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&path);
        manager.load_or_create().unwrap();

        manager.settings_mut().batch.settle_delay_ms = 0;
        manager.settings_mut().renderer.program = "unreal-cmd".to_string();
        manager.update_section(ConfigSection::Batch).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("settle_delay_ms = 0"));
        assert!(!content.contains("unreal-cmd"));
    }

    #[test]
    fn saved_settings_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&path);
        manager.settings_mut().logging.show_timestamps = false;
        manager.settings_mut().renderer.extra_args = vec!["-game".to_string()];
        manager.save().unwrap();

        let mut reloaded = ConfigManager::new(&path);
        reloaded.load().unwrap();
        assert!(!reloaded.settings().logging.show_timestamps);
        assert_eq!(reloaded.settings().renderer.extra_args, ["-game"]);
    }
}
