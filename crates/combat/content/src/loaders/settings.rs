//! Engine settings loader.

use std::path::Path;

use combat_core::CombatSettings;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`CombatSettings`] from TOML. Absent keys keep their defaults.
pub struct SettingsLoader;

impl SettingsLoader {
    pub fn load(path: &Path) -> LoadResult<CombatSettings> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(source: &str) -> LoadResult<CombatSettings> {
        let settings: CombatSettings = toml::from_str(source)
            .map_err(|e| anyhow::anyhow!("Failed to parse settings TOML: {}", e))?;

        if settings.max_attack_attempts == 0 {
            anyhow::bail!("max_attack_attempts must be at least 1");
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use combat_core::Difficulty;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = SettingsLoader::parse("difficulty = \"hard\"\ntaunts = false\n").unwrap();
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert!(!settings.taunts);
        assert_eq!(
            settings.max_attack_attempts,
            CombatSettings::DEFAULT_MAX_ATTACK_ATTEMPTS
        );
    }

    #[test]
    fn zero_attempt_cap_is_rejected() {
        assert!(SettingsLoader::parse("max_attack_attempts = 0").is_err());
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        assert!(SettingsLoader::parse("difficulty = \"nightmare\"").is_err());
    }
}
