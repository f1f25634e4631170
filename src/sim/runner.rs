use std::collections::{BTreeMap, VecDeque};

use super::actions::ActionResolver;
use super::chaos;
use super::clock::{Clock, SystemClock};
use super::collapse::{CollapseArbiter, RebellionPolicy};
use super::context::TickContext;
use super::diplomacy::{self, Advice, AdvisorContext, AdvisorRotation, DiplomaticAdvisor};
use super::economy;
use super::events::{EventGenerator, GeneratorInput};
use super::history::RecentHistory;
use super::random::{RandomSource, SeededRandom};
use super::scheduler::{EventScheduler, PauseWindow};
use crate::config::EngineConfig;
use crate::error::{EngineError, RosterError};
use crate::model::{
    ActionRecord, CountryId, GameEvent, PlayerAction, SimTime, WorldState, apply_deltas,
};
use crate::roster;

/// Everything one call to [`Engine::tick`] did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: u64,
    pub now: SimTime,
    pub chaos_level: u8,
    /// Generation was suspended by the pause window.
    pub paused: bool,
    pub actions: Vec<ActionRecord>,
    /// Events created this tick, in log order.
    pub events: Vec<GameEvent>,
    /// GDP booked per country when the economy ran this tick.
    pub growth: Option<BTreeMap<CountryId, f64>>,
    pub upkeep: f64,
    /// Event released by the scheduler this tick.
    pub delivered: Option<GameEvent>,
}

/// Single-writer driver for the whole simulation.
///
/// The host calls [`tick`](Self::tick) periodically. External mutation
/// sources (the host, the diplomatic advisor) go through
/// [`queue_action`](Self::queue_action) and are applied at the start of the
/// next tick. Each tick works on a copy of the country map and swaps it into
/// the world at the end.
///
/// The world's event log is the host's to drain. Generation and chaos read a
/// separate bounded [`RecentHistory`] the engine maintains itself.
pub struct Engine {
    world: WorldState,
    config: EngineConfig,
    rng: Box<dyn RandomSource>,
    clock: Box<dyn Clock>,
    generator: EventGenerator,
    resolver: ActionResolver,
    arbiter: CollapseArbiter,
    scheduler: EventScheduler,
    pause: PauseWindow,
    rotation: AdvisorRotation,
    recent: RecentHistory,
    pending: VecDeque<PlayerAction>,
    ticks: u64,
    last_chaos: u8,
    running: bool,
}

impl Engine {
    pub fn new(world: WorldState, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        if let Some(player) = world.player_id().filter(|p| world.country(p).is_none()) {
            return Err(RosterError::UnknownPlayer(player.to_string()).into());
        }
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(SeededRandom::from_os()),
        };
        let recent = RecentHistory::seeded(config.generator.protection_window_ms, &world.events);
        Ok(Self {
            generator: EventGenerator::new(config.generator.clone()),
            resolver: ActionResolver::new(config.actions.clone()),
            arbiter: CollapseArbiter::new(config.collapse.clone()),
            scheduler: EventScheduler::new(config.scheduler.clone()),
            world,
            config,
            rng,
            clock: Box::new(SystemClock::new()),
            pause: PauseWindow::new(),
            rotation: AdvisorRotation::new(),
            recent,
            pending: VecDeque::new(),
            ticks: 0,
            last_chaos: 0,
            running: true,
        })
    }

    /// Build an engine from the host's JSON roster.
    pub fn from_roster(
        json: &str,
        player_id: Option<&str>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let world = roster::world_from_roster(json, player_id)?;
        Self::new(world, config)
    }

    pub fn with_rng(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_rebellion_policy(mut self, policy: Box<dyn RebellionPolicy>) -> Self {
        self.arbiter = CollapseArbiter::new(self.config.collapse.clone()).with_policy(policy);
        self
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn into_world(self) -> WorldState {
        self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn resolver(&self) -> &ActionResolver {
        &self.resolver
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// Chaos level computed by the most recent tick.
    pub fn chaos_level(&self) -> u8 {
        self.last_chaos
    }

    pub fn pending_actions(&self) -> usize {
        self.pending.len()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// What generation and chaos currently remember, oldest first.
    pub fn recent_history(&self) -> &[GameEvent] {
        self.recent.as_slice()
    }

    /// Hand the world's event log to the host. Narrative memory is unaffected.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.world.drain_events()
    }

    pub fn drain_action_log(&mut self) -> Vec<ActionRecord> {
        self.world.drain_action_log()
    }

    /// Queue an action for the next tick.
    pub fn queue_action(&mut self, action: PlayerAction) {
        tracing::debug!(
            kind = %action.kind,
            source = %action.source_country_id,
            target = ?action.target_country_id,
            "action queued"
        );
        self.pending.push_back(action);
    }

    /// Consult the advisor for the next country in the rotation. A returned
    /// suggestion is queued as an action; everything else is informational.
    pub fn consult_advisor(&mut self, advisor: &mut dyn DiplomaticAdvisor) -> Option<Advice> {
        let player_id = self.world.player_id.clone();
        let country = self
            .rotation
            .next(&self.world.countries, player_id.as_deref())?;
        let context = AdvisorContext {
            relation_to_player: player_id
                .as_deref()
                .map_or(0.0, |p| country.relation_with(p)),
            player_id,
            chaos_level: self.last_chaos,
            now: self.clock.now(),
        };
        let advice = diplomacy::consult(advisor, country, &context);
        if let Some(action) = advice.suggestion.clone() {
            self.queue_action(action);
        }
        Some(advice)
    }

    /// Stop the driver: pending actions and queued deliveries are discarded
    /// and later ticks do nothing.
    pub fn shutdown(&mut self) {
        self.running = false;
        self.pending.clear();
        self.scheduler.clear();
        tracing::info!(ticks = self.ticks, "engine shut down");
    }

    /// Advance the simulation by one step.
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now();
        if !self.running {
            return TickReport {
                tick: self.ticks,
                now,
                chaos_level: self.last_chaos,
                ..TickReport::default()
            };
        }
        self.ticks += 1;

        let mut report = TickReport {
            tick: self.ticks,
            now,
            ..TickReport::default()
        };
        self.recent.prune(now);
        let mut countries = self.world.countries.clone();
        let mut ids = self.world.id_gen.clone();
        let player_id = self.world.player_id.clone();
        let player = player_id.as_deref();

        // Player and advisor actions
        while let Some(action) = self.pending.pop_front() {
            let mut ctx = TickContext::new(self.rng.as_mut(), &mut ids, now, self.last_chaos);
            let resolution = self.resolver.execute(&action, &countries, player, &mut ctx);
            countries = resolution.countries;
            self.world.log_action(resolution.record.clone());
            report.actions.push(resolution.record);
            self.record_event(resolution.event, &mut report);
        }

        let window_start = now.minus_millis(self.config.generator.protection_window_ms);
        let chaos_level = chaos::compute(&countries, &self.recent.since(window_start));
        report.chaos_level = chaos_level;

        report.paused = self
            .pause
            .check(now, self.rng.as_mut(), &self.config.scheduler);
        if !report.paused {
            let mut ctx = TickContext::new(self.rng.as_mut(), &mut ids, now, chaos_level);
            let input = GeneratorInput {
                countries: &countries,
                player_id: player,
                history: self.recent.as_slice(),
            };
            let outcome = self.generator.tick(&input, &mut ctx);
            for event in outcome.into_events() {
                apply_deltas(&mut countries, &event);
                self.record_event(event, &mut report);
            }
        }

        let mut ctx = TickContext::new(self.rng.as_mut(), &mut ids, now, chaos_level);
        let arbitration = self.arbiter.tick(&mut countries, player, &mut ctx);
        report.upkeep = arbitration.upkeep;
        for event in arbitration.events {
            self.record_event(event, &mut report);
        }

        if self.ticks % self.config.economy.update_every_ticks == 0 {
            report.growth = Some(economy::apply_growth(&mut countries, player));
        }

        self.world.countries = countries;
        self.world.id_gen = ids;
        self.last_chaos = chaos_level;

        let critical = self
            .world
            .any_country_at_or_below(self.config.scheduler.critical_stability);
        report.delivered = self.scheduler.poll(now, critical);
        self.world.debug_check_invariants();

        tracing::debug!(
            tick = self.ticks,
            chaos = chaos_level,
            paused = report.paused,
            actions = report.actions.len(),
            events = report.events.len(),
            queued = self.scheduler.len(),
            "tick complete"
        );
        report
    }

    fn record_event(&mut self, event: GameEvent, report: &mut TickReport) {
        self.world.log_event(event.clone());
        self.recent.push(event.clone());
        self.scheduler.enqueue(event.clone());
        report.events.push(event);
    }
}
