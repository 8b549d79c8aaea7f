//! Skirmish configuration read from the environment.
use std::env;
use std::path::PathBuf;

use combat_core::Difficulty;

/// Settings for one skirmish run.
#[derive(Clone, Debug)]
pub struct SkirmishConfig {
    /// Directory holding `ai.txt`, `combat.toml` and `combatai.msg`.
    pub data_dir: PathBuf,
    /// Rounds fought before the encounter is called off.
    pub max_rounds: u32,
    /// Replaces the game seed from `combat.toml` when set.
    pub seed: Option<u64>,
    /// Replaces the difficulty from `combat.toml` when set.
    pub difficulty: Option<Difficulty>,
    /// Log file name inside the log directory. Stderr only when unset.
    pub log_file: Option<String>,
}

impl SkirmishConfig {
    pub const DEFAULT_MAX_ROUNDS: u32 = 30;

    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SKIRMISH_DATA_DIR` - Content directory (default: bundled content)
    /// - `SKIRMISH_MAX_ROUNDS` - Round cap (default: 30)
    /// - `SKIRMISH_SEED` - Game seed override
    /// - `SKIRMISH_DIFFICULTY` - `easy`, `normal` or `hard`
    /// - `SKIRMISH_LOG_FILE` - Also write logs to this file
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("SKIRMISH_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(rounds) = read_env::<u32>("SKIRMISH_MAX_ROUNDS") {
            config.max_rounds = rounds.max(1);
        }
        config.seed = read_env("SKIRMISH_SEED");
        config.difficulty = env::var("SKIRMISH_DIFFICULTY")
            .ok()
            .and_then(|value| parse_difficulty(&value));
        config.log_file = env::var("SKIRMISH_LOG_FILE")
            .ok()
            .filter(|name| !name.is_empty());

        config
    }
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../combat/content/data"
            )),
            max_rounds: Self::DEFAULT_MAX_ROUNDS,
            seed: None,
            difficulty: None,
            log_file: None,
        }
    }
}

fn parse_difficulty(value: &str) -> Option<Difficulty> {
    match value.trim().parse() {
        Ok(difficulty) => Some(difficulty),
        Err(_) => {
            tracing::warn!("unknown difficulty '{}', keeping the configured one", value);
            None
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_names_are_case_insensitive() {
        assert_eq!(parse_difficulty("HARD"), Some(Difficulty::Hard));
        assert_eq!(parse_difficulty(" easy "), Some(Difficulty::Easy));
        assert_eq!(parse_difficulty("nightmare"), None);
    }

    #[test]
    fn defaults_point_at_bundled_content() {
        let config = SkirmishConfig::default();
        assert!(config.data_dir.join("ai.txt").exists());
        assert_eq!(config.max_rounds, SkirmishConfig::DEFAULT_MAX_ROUNDS);
    }
}
