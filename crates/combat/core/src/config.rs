/// Compile-time limits of the combat planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombatConfig;

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Upper bound on combatants in one encounter.
    pub const MAX_ROSTER: usize = 128;
    /// Favourite drug prototypes per profile.
    pub const MAX_PRIMARY_DESIRES: usize = 3;
    /// Candidates gathered by the attacker scan.
    pub const MAX_ATTACKER_CANDIDATES: usize = 4;
    /// Alternate tiles produced by friendly-fire retargeting.
    pub const MAX_RETARGET_TILES: usize = 32;

    // ===== planner tuning =====
    /// Action points charged for swallowing a drug or reloading.
    pub const ITEM_USE_AP: u32 = 2;
    /// Intelligence spent per friendly-fire retargeting round.
    pub const RETARGET_INTELLIGENCE_COST: i32 = 2;
    /// Minimum intelligence to use healing items.
    pub const MIN_ITEM_INTELLIGENCE: i32 = 3;
    /// Scores this close are compared by item value instead.
    pub const WEAPON_SCORE_BAND: i32 = 5;
    /// Party members stay this close to the player under `stay_close`.
    pub const STAY_CLOSE_DISTANCE: u32 = 5;
    /// Snipers keep at least this much distance.
    pub const SNIPE_DISTANCE: u32 = 10;
    /// Distance kept from a friendly corpse with an unseen killer.
    pub const CORPSE_AVOID_DISTANCE: u32 = 10;
    /// Extra search radius beyond perception when scanning for loot.
    pub const ENVIRONMENT_SEARCH_BONUS: i32 = 5;
    /// Below this intelligence the secondary mode is always in play.
    pub const AREA_ATTACK_INTELLIGENCE: i32 = 6;
    /// Within this range the secondary mode is always in play.
    pub const AREA_ATTACK_DISTANCE: u32 = 10;
}

/// Game difficulty; gates called-shot intelligence.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Intelligence needed before a combatant aims for body parts.
    pub const fn called_shot_intelligence(self) -> i32 {
        match self {
            Self::Easy => 7,
            Self::Normal => 5,
            Self::Hard => 3,
        }
    }
}

/// Process-wide switches read by every decision cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatSettings {
    pub difficulty: Difficulty,
    /// Taunts are emitted at all.
    pub taunts: bool,
    /// Never put words in the player's mouth.
    pub silence_player: bool,
    /// Renderers should censor taunt text.
    pub language_filter: bool,
    /// Hard cap on attack attempts per decision cycle.
    pub max_attack_attempts: u32,
    /// Base seed for every planner roll.
    pub game_seed: u64,
}

impl CombatSettings {
    pub const DEFAULT_MAX_ATTACK_ATTEMPTS: u32 = 10;
    pub const DEFAULT_GAME_SEED: u64 = 0x5EED_F00D;

    pub fn new() -> Self {
        Self {
            difficulty: Difficulty::default(),
            taunts: true,
            silence_player: true,
            language_filter: false,
            max_attack_attempts: Self::DEFAULT_MAX_ATTACK_ATTEMPTS,
            game_seed: Self::DEFAULT_GAME_SEED,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, game_seed: u64) -> Self {
        self.game_seed = game_seed;
        self
    }

    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self::new()
    }
}
