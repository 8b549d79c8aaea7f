//! Skirmish: two sandbox squads fight it out under the combat planner.
//!
//! Loads behavior profiles, engine settings and the taunt catalog from a
//! content directory, drops raiders and mole rats onto a hex map, and runs
//! rounds until one side is gone or the round cap is hit. Every decision
//! is logged.
//!
//! ```bash
//! RUST_LOG=combat_ai=debug SKIRMISH_SEED=7 cargo run -p skirmish
//! ```
mod config;

use anyhow::{Context, Result};
use combat_ai::{AiContext, BehaviorRegistry, Encounter};
use combat_content::{ContentFactory, MessageCatalog};
use combat_core::{
    BodyType, CombatantId, CombatantOracle, CombatantState, PcgRng, ProfileId, TauntEvent,
    TauntSink, TeamId,
};
use combat_sandbox::{GridWorld, presets};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::SkirmishConfig;

const RAIDERS: TeamId = TeamId(1);
const MOLE_RATS: TeamId = TeamId(2);

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SkirmishConfig::from_env();
    let _guard = setup_logging(config.log_file.as_deref())?;

    let factory = ContentFactory::new(&config.data_dir);
    let profiles = factory
        .load_profiles()
        .with_context(|| format!("loading profiles from {}", config.data_dir.display()))?;
    let registry = BehaviorRegistry::new(profiles)?;
    let catalog = factory.load_messages()?;
    let mut settings = factory.load_settings()?;
    if let Some(seed) = config.seed {
        settings = settings.with_seed(seed);
    }
    if let Some(difficulty) = config.difficulty {
        settings = settings.with_difficulty(difficulty);
    }

    tracing::info!(
        "{} profiles, {} messages, difficulty {}, seed {}",
        registry.len(),
        catalog.len(),
        settings.difficulty,
        settings.game_seed
    );

    let mut world = battlefield();
    let sink = CatalogSink { catalog: &catalog };
    let mut encounter = Encounter::new(AiContext::new(&registry, &settings, &PcgRng, &sink));
    encounter.begin(world.combatant_ids());
    encounter.setup_team_combat(&mut world, RAIDERS, MOLE_RATS);

    for round in 1..=config.max_rounds {
        tracing::info!("round {}", round);
        for report in encounter.run_round(&mut world) {
            tracing::info!(
                "{} -> {:?}: {} attacks, {} steps, {} doses, {}",
                report.combatant,
                report.target,
                report.attacks,
                report.steps,
                report.doses,
                report.morale
            );
        }

        let (raiders, rats) = (world.survivors(RAIDERS), world.survivors(MOLE_RATS));
        if raiders == 0 || rats == 0 {
            tracing::info!("fight decided after {} rounds", round);
            break;
        }
    }

    for id in world.combatant_ids() {
        if let Some(state) = world.combatant(id) {
            tracing::info!("{} ({}): {}/{} hp", id, state.team, state.hp.current, state.hp.maximum);
        }
    }
    encounter.finish(&mut world);
    Ok(())
}

/// Two raiders on the west edge, two mole rats to the east.
fn battlefield() -> GridWorld {
    let mut world = GridWorld::new(24, 16);
    let squads = [
        (1, RAIDERS, 10, (4, 6)),
        (2, RAIDERS, 11, (2, 8)),
        (3, MOLE_RATS, 20, (12, 6)),
        (4, MOLE_RATS, 20, (13, 8)),
    ];
    for (id, team, profile, (q, r)) in squads {
        let tile = world.tile(q, r);
        world.add_combatant(CombatantState::new(
            CombatantId(id),
            team,
            ProfileId(profile),
            tile,
        ));
    }

    world.equip(CombatantId(1), presets::knife());
    world.give(CombatantId(1), presets::stimpak());
    world.equip(CombatantId(2), presets::rifle());
    world.give(CombatantId(2), presets::rifle_ammo());
    for rat in [CombatantId(3), CombatantId(4)] {
        if let Some(state) = world.combatant_mut(rat) {
            state.body = BodyType::Quadruped;
        }
        world.equip(rat, presets::claws());
    }
    world
}

/// Logs taunts as catalog text.
struct CatalogSink<'a> {
    catalog: &'a MessageCatalog,
}

impl TauntSink for CatalogSink<'_> {
    fn taunt(&self, event: TauntEvent) {
        match self.catalog.render(&event) {
            Some(text) => tracing::info!("{}: \"{}\"", event.speaker, text),
            None => tracing::warn!("{} has no text for message {}", event.speaker, event.message_id),
        }
    }
}

/// Logs to stderr, and to a file under the platform cache directory when
/// `log_file` is set. The returned guard flushes the file on drop.
fn setup_logging(log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let mut guard = None;
    let mut log_path = None;
    let file_layer = match log_file {
        Some(name) => {
            let dir = directories::ProjectDirs::from("", "", "skirmish")
                .map(|dirs| dirs.cache_dir().join("logs"))
                .unwrap_or_else(|| std::env::temp_dir().join("skirmish"));
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let (writer, worker) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, name));
            guard = Some(worker);
            log_path = Some(dir.join(name));
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_path {
        tracing::info!("Log file: {}", path.display());
    }
    Ok(guard)
}
