use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::id::IdGenerator;
use crate::model::*;
use crate::scenario::Scenario;
use crate::sim::{
    ActionResolver, ArbiterReport, CollapseArbiter, Engine, EventGenerator, GenerationOutcome,
    GeneratorInput, ManualClock, Resolution, ScriptedRandom, TickContext,
};

// ---------------------------------------------------------------------------
// Single-system helpers
// ---------------------------------------------------------------------------

/// Run one generator tick at `now` with a fixed chaos level and scripted rolls.
pub fn generate(
    generator: &EventGenerator,
    scenario: &Scenario,
    chaos_level: u8,
    now: SimTime,
    rolls: &[f64],
) -> GenerationOutcome {
    let mut rng = ScriptedRandom::new(rolls.iter().copied());
    let mut ids = IdGenerator::starting_from(1_000);
    let mut ctx = TickContext::new(&mut rng, &mut ids, now, chaos_level);
    let input = GeneratorInput {
        countries: scenario.countries(),
        player_id: scenario.player_id(),
        history: scenario.history(),
    };
    generator.tick(&input, &mut ctx)
}

/// Resolve one action against a country map with scripted rolls.
pub fn resolve(
    resolver: &mut ActionResolver,
    action: &PlayerAction,
    countries: &BTreeMap<CountryId, Country>,
    player_id: Option<&str>,
    rolls: &[f64],
) -> Resolution {
    let mut rng = ScriptedRandom::new(rolls.iter().copied());
    let mut ids = IdGenerator::new();
    let mut ctx = TickContext::new(&mut rng, &mut ids, action.timestamp, 0);
    resolver.execute(action, countries, player_id, &mut ctx)
}

/// Run the collapse arbiter once. Unscripted rolls miss every chance.
pub fn arbitrate(
    arbiter: &CollapseArbiter,
    countries: &mut BTreeMap<CountryId, Country>,
    player_id: Option<&str>,
    rolls: &[f64],
) -> ArbiterReport {
    let mut rng = ScriptedRandom::new(rolls.iter().copied()).with_fallback(0.999);
    let mut ids = IdGenerator::new();
    let mut ctx = TickContext::new(&mut rng, &mut ids, SimTime::ZERO, 0);
    arbiter.tick(countries, player_id, &mut ctx)
}

// ---------------------------------------------------------------------------
// Engine helpers
// ---------------------------------------------------------------------------

/// Engine over `world` driven by a manual clock and the given random source.
pub fn scripted_engine(
    world: WorldState,
    config: EngineConfig,
    rng: ScriptedRandom,
) -> Result<(Engine, ManualClock), EngineError> {
    let clock = ManualClock::new();
    let engine = Engine::new(world, config)?
        .with_rng(Box::new(rng))
        .with_clock(Box::new(clock.clone()));
    Ok((engine, clock))
}

/// Past event aimed at `target`, stamped `secs` seconds into the run.
pub fn past_event(id: u64, kind: EventKind, target: &str, secs: u64) -> GameEvent {
    GameEvent {
        id,
        kind,
        category: EventCategory::Warning,
        title: format!("{kind} in {target}"),
        effects: Vec::new(),
        deltas: Vec::new(),
        timestamp: SimTime::from_secs(secs),
        triggered_by_player: false,
        targeted_country_id: Some(target.to_string()),
        chaos_level_at_creation: 0,
        action: None,
        caused_by: None,
    }
}

// ---------------------------------------------------------------------------
// Composite scenarios
// ---------------------------------------------------------------------------

/// A superpower player bordering a weak neighbour, a stable regional helper,
/// and a distant grudge-holder.
pub fn crisis_scenario() -> Scenario {
    let mut s = Scenario::new();
    s.player("PLY")
        .gdp(20_000.0)
        .military(80.0)
        .power(PowerLevel::Superpower);
    s.country("WEK").stability(20.0).gdp(1_500.0).military(10.0);
    s.country("HLP")
        .stability(75.0)
        .gdp(8_000.0)
        .debt(60.0)
        .power(PowerLevel::Regional);
    s.country("GRD").karma(55.0).stability(50.0);
    s.border("PLY", "WEK").border("WEK", "HLP");
    s
}
