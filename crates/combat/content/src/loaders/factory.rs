//! Content factory for loading everything the engine needs at startup.

use std::path::{Path, PathBuf};

use combat_core::{BehaviorProfile, CombatSettings};

use crate::loaders::{LoadResult, MessageCatalog, ProfileLoader, SettingsLoader, read_file};

/// Loads combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── ai.txt          behavior profiles (required)
/// ├── combat.toml     engine settings (optional, defaults otherwise)
/// ├── combatai.msg    taunt catalog (required)
/// └── badwords.txt    language filter word list (optional)
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load_profiles(&self) -> LoadResult<Vec<BehaviorProfile>> {
        ProfileLoader::load(&self.data_dir.join("ai.txt"))
    }

    /// Settings from `combat.toml`, or defaults when the file is absent.
    pub fn load_settings(&self) -> LoadResult<CombatSettings> {
        let path = self.data_dir.join("combat.toml");
        if !path.exists() {
            tracing::info!("{} not found, using default settings", path.display());
            return Ok(CombatSettings::default());
        }
        SettingsLoader::load(&path)
    }

    pub fn load_messages(&self) -> LoadResult<MessageCatalog> {
        let catalog = MessageCatalog::load(&self.data_dir.join("combatai.msg"))?;
        let bad_words = self.data_dir.join("badwords.txt");
        if !bad_words.exists() {
            return Ok(catalog);
        }
        let words = read_file(&bad_words)?;
        Ok(catalog.with_bad_words(words.lines().map(str::to_string)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_settings().unwrap(), CombatSettings::default());
        assert!(factory.load_profiles().is_err());
    }

    #[test]
    fn bundled_data_loads() {
        let factory = ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        let profiles = factory.load_profiles().unwrap();
        assert!(profiles.len() >= 4);
        assert!(factory.load_messages().unwrap().len() > 10);
        factory.load_settings().unwrap();
    }
}
