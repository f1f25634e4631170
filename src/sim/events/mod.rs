//! Adaptive world-event generation.
//!
//! Each call to [`EventGenerator::tick`] walks a fixed decision ladder:
//!
//! 1. Past the safety-valve chaos level, emit one stabilising event aimed at
//!    the least stable country and stop.
//! 2. Roll whether anything happens this tick at all.
//! 3. Collect the temporal-protection set from recent history.
//! 4. Roll negative vs positive, with the negative share rising with chaos.
//! 5. Pick a target: a hostile act against a great-power player, a karma
//!    grudge, or a random eligible country.
//! 6. Pick a template that does not contradict the target's last two events.
//! 7. Build the event, scaling `karma_*` templates by the target's karma.
//! 8. Spread severe negative events to linked countries as contagion.
//!
//! Generated events are returned unapplied; the engine applies their deltas.

pub mod catalog;
pub mod coherence;
pub mod contagion;
pub mod targeting;

use std::collections::{BTreeMap, BTreeSet};

use catalog::TemplateDef;

use super::context::TickContext;
use super::random::RandomSource;
use crate::config::GeneratorConfig;
use crate::model::{Country, CountryId, GameEvent, PowerLevel};

/// Everything the generator reads for one tick.
pub struct GeneratorInput<'a> {
    pub countries: &'a BTreeMap<CountryId, Country>,
    pub player_id: Option<&'a str>,
    /// Full event log, oldest first.
    pub history: &'a [GameEvent],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutcome {
    pub main: Option<GameEvent>,
    pub contagion: Vec<GameEvent>,
}

impl GenerationOutcome {
    fn nothing() -> Self {
        Self::default()
    }

    fn single(event: GameEvent) -> Self {
        Self {
            main: Some(event),
            contagion: Vec::new(),
        }
    }

    /// Main event first, then contagion.
    pub fn into_events(self) -> Vec<GameEvent> {
        self.main.into_iter().chain(self.contagion).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_none() && self.contagion.is_empty()
    }
}

pub struct EventGenerator {
    config: GeneratorConfig,
}

impl EventGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Probability that a generated event is negative at `chaos_level`.
    pub fn negative_probability(&self, chaos_level: u8) -> f64 {
        (self.config.negative_base + f64::from(chaos_level) / 200.0).min(self.config.negative_cap)
    }

    pub fn tick(&self, input: &GeneratorInput, ctx: &mut TickContext) -> GenerationOutcome {
        if ctx.chaos_level > self.config.safety_valve_chaos {
            return self.safety_valve(input, ctx);
        }

        if !ctx.rng.chance(self.config.event_chance) {
            return GenerationOutcome::nothing();
        }

        let since = ctx.now.minus_millis(self.config.protection_window_ms);
        let protected = targeting::protected_set(input.history, since);

        if ctx.rng.chance(self.negative_probability(ctx.chaos_level)) {
            self.negative(input, &protected, ctx)
        } else {
            self.positive(input, &protected, ctx)
        }
    }

    fn safety_valve(&self, input: &GeneratorInput, ctx: &mut TickContext) -> GenerationOutcome {
        let Some(target) = targeting::least_stable(input.countries) else {
            return GenerationOutcome::nothing();
        };
        let def = &catalog::STABILIZING[ctx.rng.pick_index(catalog::STABILIZING.len())];
        tracing::debug!(
            chaos = ctx.chaos_level,
            target = %target.id,
            kind = %def.kind,
            "safety valve engaged"
        );
        GenerationOutcome::single(catalog::build(def, target, ctx))
    }

    fn negative(
        &self,
        input: &GeneratorInput,
        protected: &BTreeSet<CountryId>,
        ctx: &mut TickContext,
    ) -> GenerationOutcome {
        if let Some(player) = self.hostile_act_target(input, protected, ctx.rng) {
            if let Some(event) = self.instantiate(catalog::HOSTILE, player, input, ctx) {
                tracing::info!(player = %player.id, kind = %event.kind, "hostile act against player");
                return self.with_contagion(event, input, ctx);
            }
        }

        let Some(target) = targeting::pick_negative_target(
            input.countries,
            input.player_id,
            protected,
            &self.config,
            ctx.rng,
        ) else {
            return GenerationOutcome::nothing();
        };
        match self.instantiate(catalog::NEGATIVE, target, input, ctx) {
            Some(event) => self.with_contagion(event, input, ctx),
            None => GenerationOutcome::nothing(),
        }
    }

    fn positive(
        &self,
        input: &GeneratorInput,
        protected: &BTreeSet<CountryId>,
        ctx: &mut TickContext,
    ) -> GenerationOutcome {
        let Some(target) =
            targeting::pick_positive_target(input.countries, protected, &self.config, ctx.rng)
        else {
            return GenerationOutcome::nothing();
        };
        self.instantiate(catalog::POSITIVE, target, input, ctx)
            .map(GenerationOutcome::single)
            .unwrap_or_default()
    }

    /// The player's country when it qualifies for, and rolls, a hostile act.
    fn hostile_act_target<'a>(
        &self,
        input: &GeneratorInput<'a>,
        protected: &BTreeSet<CountryId>,
        rng: &mut dyn RandomSource,
    ) -> Option<&'a Country> {
        let player = input.countries.get(input.player_id?)?;
        let designated = player.power_level == PowerLevel::Superpower
            || self.config.designated_powers.contains(&player.id);
        if !designated || protected.contains(&player.id) {
            return None;
        }
        rng.chance(self.config.hostile_act_chance).then_some(player)
    }

    /// Uniform pick among templates coherent with the target's recent events.
    fn instantiate(
        &self,
        table: &'static [TemplateDef],
        target: &Country,
        input: &GeneratorInput,
        ctx: &mut TickContext,
    ) -> Option<GameEvent> {
        let recent = coherence::recent_kinds(input.history, &target.id);
        let allowed: Vec<&TemplateDef> = table
            .iter()
            .filter(|t| coherence::is_coherent(t.kind, &recent))
            .collect();
        if allowed.is_empty() {
            tracing::debug!(target = %target.id, "no coherent template available");
            return None;
        }
        let def = allowed[ctx.rng.pick_index(allowed.len())];
        Some(catalog::build(def, target, ctx))
    }

    fn with_contagion(
        &self,
        event: GameEvent,
        input: &GeneratorInput,
        ctx: &mut TickContext,
    ) -> GenerationOutcome {
        let contagion = contagion::propagate(&event, input.countries, &self.config, ctx);
        GenerationOutcome {
            main: Some(event),
            contagion: contagion.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdGenerator;
    use crate::model::{EventKind, Polarity, SimTime};
    use crate::sim::random::{ScriptedRandom, SeededRandom};

    fn roster(countries: Vec<Country>) -> BTreeMap<CountryId, Country> {
        countries.into_iter().map(|c| (c.id.clone(), c)).collect()
    }

    fn run(
        generator: &EventGenerator,
        countries: &BTreeMap<CountryId, Country>,
        player: Option<&str>,
        history: &[GameEvent],
        chaos: u8,
        rng: &mut dyn RandomSource,
    ) -> GenerationOutcome {
        let mut ids = IdGenerator::new();
        let mut ctx = TickContext::new(rng, &mut ids, SimTime::from_minutes(30), chaos);
        let input = GeneratorInput {
            countries,
            player_id: player,
            history,
        };
        generator.tick(&input, &mut ctx)
    }

    fn three_countries() -> BTreeMap<CountryId, Country> {
        let mut a = Country::new("AAA", "Aland");
        a.stability = 40.0;
        let mut b = Country::new("BBB", "Bland");
        b.stability = 12.0;
        let c = Country::new("CCC", "Cland");
        roster(vec![a, b, c])
    }

    #[test]
    fn negative_probability_is_capped() {
        let g = EventGenerator::new(GeneratorConfig::default());
        assert!((g.negative_probability(0) - 0.4).abs() < 1e-12);
        assert!((g.negative_probability(40) - 0.6).abs() < 1e-12);
        assert_eq!(g.negative_probability(75), 0.7);
    }

    #[test]
    fn safety_valve_helps_least_stable() {
        let g = EventGenerator::new(GeneratorConfig::default());
        let all = three_countries();
        let mut rng = ScriptedRandom::constant(0.99);
        let out = run(&g, &all, None, &[], 80, &mut rng);
        let ev = out.main.unwrap();
        assert_eq!(ev.targeted_country_id.as_deref(), Some("BBB"));
        assert_eq!(ev.kind.polarity(), Polarity::Positive);
        assert!(out.contagion.is_empty());
    }

    #[test]
    fn safety_valve_passes_over_sovereign_countries() {
        let g = EventGenerator::new(GeneratorConfig::default());
        let mut all = three_countries();
        let mut neutral = Country::new("NEU", "Neutralia");
        neutral.sovereign = true;
        neutral.stability = 3.0;
        all.insert(neutral.id.clone(), neutral);
        let mut rng = ScriptedRandom::constant(0.99);
        let out = run(&g, &all, None, &[], 90, &mut rng);
        assert_eq!(out.main.unwrap().targeted_country_id.as_deref(), Some("BBB"));
    }

    #[test]
    fn high_chaos_never_negative() {
        let g = EventGenerator::new(GeneratorConfig::default());
        let all = three_countries();
        let mut rng = SeededRandom::new(3);
        for chaos in 76..=100 {
            let out = run(&g, &all, None, &[], chaos, &mut rng);
            for ev in out.into_events() {
                assert_ne!(ev.kind.polarity(), Polarity::Negative);
            }
        }
    }

    #[test]
    fn quiet_roll_produces_nothing() {
        let g = EventGenerator::new(GeneratorConfig::default());
        let mut rng = ScriptedRandom::new([0.6]);
        assert!(run(&g, &three_countries(), None, &[], 10, &mut rng).is_empty());
    }

    #[test]
    fn negative_branch_builds_first_template() {
        let g = EventGenerator::new(GeneratorConfig::default());
        // occur, negative, target pick (first eligible), template pick (first)
        let mut rng = ScriptedRandom::new([0.0, 0.0, 0.0, 0.0]).with_fallback(0.0);
        let out = run(&g, &three_countries(), None, &[], 0, &mut rng);
        let ev = out.main.unwrap();
        assert_eq!(ev.kind, EventKind::EconomicCrisis);
        assert_eq!(ev.targeted_country_id.as_deref(), Some("AAA"));
        assert!(out.contagion.is_empty());
    }

    #[test]
    fn positive_branch_prefers_unprotected() {
        let g = EventGenerator::new(GeneratorConfig::default());
        let all = three_countries();
        let history = vec![catalog_event(EventKind::Drought, "AAA", SimTime::from_minutes(28))];
        // occur, positive (0.9 > 0.4), prefer unprotected, pick first open, template first
        let mut rng = ScriptedRandom::new([0.0, 0.9, 0.0, 0.0, 0.0]);
        let ev = run(&g, &all, None, &history, 0, &mut rng).main.unwrap();
        assert_eq!(ev.targeted_country_id.as_deref(), Some("BBB"));
        assert_eq!(ev.kind, EventKind::EconomicBoom);
    }

    #[test]
    fn contradicting_templates_are_skipped() {
        let g = EventGenerator::new(GeneratorConfig::default());
        let all = roster(vec![Country::new("AAA", "Aland")]);
        let history = vec![catalog_event(EventKind::EconomicCrisis, "AAA", SimTime::ZERO)];
        // positive, template index 0 of the filtered table
        let mut rng = ScriptedRandom::new([0.0, 0.9, 0.0, 0.0, 0.0]);
        let ev = run(&g, &all, None, &history, 0, &mut rng).main.unwrap();
        assert_eq!(ev.kind, EventKind::TradeSurge);
    }

    #[test]
    fn superpower_player_draws_hostile_acts() {
        let g = EventGenerator::new(GeneratorConfig::default());
        let mut player = Country::new("PLY", "Player");
        player.power_level = PowerLevel::Superpower;
        let all = roster(vec![player, Country::new("AAA", "Aland")]);
        // occur, negative, hostile roll, template
        let mut rng = ScriptedRandom::new([0.0, 0.0, 0.1, 0.0]);
        let ev = run(&g, &all, Some("PLY"), &[], 0, &mut rng).main.unwrap();
        assert!(ev.kind.is_hostile_act());
        assert_eq!(ev.targeted_country_id.as_deref(), Some("PLY"));
    }

    #[test]
    fn protected_player_escapes_hostile_acts() {
        let g = EventGenerator::new(GeneratorConfig::default());
        let mut player = Country::new("PLY", "Player");
        player.power_level = PowerLevel::Superpower;
        let all = roster(vec![player, Country::new("AAA", "Aland")]);
        let history = vec![catalog_event(EventKind::Drought, "PLY", SimTime::from_minutes(29))];
        let mut rng = ScriptedRandom::constant(0.0);
        let ev = run(&g, &all, Some("PLY"), &history, 0, &mut rng).main.unwrap();
        assert!(!ev.kind.is_hostile_act());
        assert_eq!(ev.targeted_country_id.as_deref(), Some("AAA"));
    }

    #[test]
    fn severe_negative_event_spreads() {
        let mut cfg = GeneratorConfig::default();
        cfg.contagion_trigger = -5.0;
        let g = EventGenerator::new(cfg);
        let mut a = Country::new("AAA", "Aland");
        a.neighbors.push("BBB".to_string());
        let all = roster(vec![a, Country::new("BBB", "Bland")]);
        let mut rng = ScriptedRandom::constant(0.0);
        let out = run(&g, &all, None, &[], 0, &mut rng);
        let main = out.main.unwrap();
        assert_eq!(out.contagion.len(), 1);
        assert_eq!(out.contagion[0].caused_by, Some(main.id));
        assert!(out.contagion[0].delta_for("BBB").is_some());
    }

    fn catalog_event(kind: EventKind, target: &str, at: SimTime) -> GameEvent {
        let mut rng = ScriptedRandom::constant(0.0);
        let mut ids = IdGenerator::starting_from(900);
        let mut ctx = TickContext::new(&mut rng, &mut ids, at, 0);
        let mut country = Country::new(target, target);
        country.karma_score = 0.0;
        catalog::build(catalog::lookup(kind).unwrap(), &country, &mut ctx)
    }
}
