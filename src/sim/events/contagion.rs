use std::collections::BTreeMap;

use crate::config::GeneratorConfig;
use crate::model::{Country, CountryDelta, CountryId, EventCategory, EventKind, GameEvent, PowerLevel};
use crate::sim::TickContext;

const NEIGHBOR_BONUS: f64 = 0.05;
const TRADE_BONUS: f64 = 0.05;
const BLOC_BONUS: f64 = 0.03;
const ALLY_DISCOUNT: f64 = 0.05;
const SUPERPOWER_DAMPING: f64 = 0.5;
const MAJOR_DAMPING: f64 = 0.7;

/// Share of the primary effects that reaches `other`, or `None` when the two
/// countries are not linked by border, strong trade or bloc.
pub fn spread_fraction(origin: &Country, other: &Country, base: f64) -> Option<f64> {
    let neighbor = origin.is_neighbor_of(other);
    let trade = origin.has_strong_trade_with(other);
    let bloc = origin.shares_block_with(other);
    if !(neighbor || trade || bloc) {
        return None;
    }

    let mut fraction = base;
    if neighbor {
        fraction += NEIGHBOR_BONUS;
    }
    if trade {
        fraction += TRADE_BONUS;
    }
    if bloc {
        fraction += BLOC_BONUS;
    }
    if origin.is_allied_with(other) {
        fraction -= ALLY_DISCOUNT;
    }
    fraction = fraction.max(0.0);
    fraction *= match other.power_level {
        PowerLevel::Superpower => SUPERPOWER_DAMPING,
        PowerLevel::Major => MAJOR_DAMPING,
        PowerLevel::Regional | PowerLevel::Minor => 1.0,
    };
    Some(fraction)
}

/// Propagate a severe event to the countries linked to its target.
///
/// Fires only when the primary stability delta is at or below the contagion
/// trigger. Sovereign countries are shielded. Returns a single auxiliary
/// event carrying one scaled delta per affected country.
pub fn propagate(
    primary: &GameEvent,
    countries: &BTreeMap<CountryId, Country>,
    config: &GeneratorConfig,
    ctx: &mut TickContext,
) -> Option<GameEvent> {
    let delta = primary.primary_delta()?;
    if delta.stability > config.contagion_trigger {
        return None;
    }
    let origin = countries.get(&delta.country_id)?;

    let base = ctx.rng.range(config.contagion_min, config.contagion_max);
    let deltas: Vec<CountryDelta> = countries
        .values()
        .filter(|c| c.id != origin.id && !c.sovereign)
        .filter_map(|c| {
            let fraction = spread_fraction(origin, c, base)?;
            let scaled = delta.scaled_for(&c.id, fraction);
            (!scaled.is_empty()).then_some(scaled)
        })
        .collect();
    if deltas.is_empty() {
        return None;
    }

    tracing::debug!(
        cause = primary.id,
        origin = %origin.id,
        spread_to = deltas.len(),
        base,
        "contagion spreading"
    );

    Some(GameEvent {
        id: ctx.next_id(),
        kind: EventKind::Contagion,
        category: EventCategory::Warning,
        title: format!("Shockwaves from {}", primary.title),
        effects: deltas
            .iter()
            .map(|d| format!("{} feels the fallout", d.country_id))
            .collect(),
        deltas,
        timestamp: ctx.now,
        triggered_by_player: primary.triggered_by_player,
        targeted_country_id: None,
        chaos_level_at_creation: ctx.chaos_level,
        action: None,
        caused_by: Some(primary.id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdGenerator;
    use crate::model::SimTime;
    use crate::sim::random::ScriptedRandom;

    fn roster(countries: Vec<Country>) -> BTreeMap<CountryId, Country> {
        countries.into_iter().map(|c| (c.id.clone(), c)).collect()
    }

    fn primary(stability: f64) -> GameEvent {
        GameEvent {
            id: 11,
            kind: EventKind::CurrencyCollapse,
            category: EventCategory::Error,
            title: "Currency collapse in Origin".to_string(),
            effects: Vec::new(),
            deltas: vec![CountryDelta::new("ORG").stability(stability).economy(-10.0)],
            timestamp: SimTime::ZERO,
            triggered_by_player: false,
            targeted_country_id: Some("ORG".to_string()),
            chaos_level_at_creation: 0,
            action: None,
            caused_by: None,
        }
    }

    fn linked_world() -> BTreeMap<CountryId, Country> {
        let mut origin = Country::new("ORG", "Origin");
        origin.neighbors = vec!["NBR".to_string(), "SUP".to_string()];
        origin.trade_partners.insert("TRD".to_string(), 80.0);
        origin.alliances.push("NBR".to_string());
        origin.geopolitical_block = "east".to_string();
        let mut bloc = Country::new("BLC", "Bloc");
        bloc.geopolitical_block = "east".to_string();
        let mut sup = Country::new("SUP", "Super");
        sup.power_level = PowerLevel::Superpower;
        let mut sov = Country::new("SOV", "Shielded");
        sov.neighbors.push("ORG".to_string());
        sov.sovereign = true;
        roster(vec![
            origin,
            Country::new("NBR", "Neighbor"),
            Country::new("TRD", "Trader"),
            Country::new("FAR", "Faraway"),
            bloc,
            sup,
            sov,
        ])
    }

    #[test]
    fn fraction_adjustments() {
        let all = linked_world();
        let org = &all["ORG"];
        // neighbor + ally: 0.10 + 0.05 - 0.05
        assert!((spread_fraction(org, &all["NBR"], 0.10).unwrap() - 0.10).abs() < 1e-12);
        assert!((spread_fraction(org, &all["TRD"], 0.10).unwrap() - 0.15).abs() < 1e-12);
        assert!((spread_fraction(org, &all["BLC"], 0.10).unwrap() - 0.13).abs() < 1e-12);
        assert!((spread_fraction(org, &all["SUP"], 0.10).unwrap() - 0.075).abs() < 1e-12);
        assert!(spread_fraction(org, &all["FAR"], 0.10).is_none());
    }

    #[test]
    fn severe_event_spreads_to_linked_countries() {
        let all = linked_world();
        let mut rng = ScriptedRandom::constant(0.0);
        let mut ids = IdGenerator::starting_from(50);
        let mut ctx = TickContext::new(&mut rng, &mut ids, SimTime::ZERO, 20);
        let ev = propagate(&primary(-20.0), &all, &GeneratorConfig::default(), &mut ctx).unwrap();

        assert_eq!(ev.kind, EventKind::Contagion);
        assert_eq!(ev.caused_by, Some(11));
        assert_eq!(ev.id, 50);
        let hit: Vec<&str> = ev.deltas.iter().map(|d| d.country_id.as_str()).collect();
        assert_eq!(hit, vec!["BLC", "NBR", "SUP", "TRD"]);
        let trd = ev.delta_for("TRD").unwrap();
        assert!((trd.stability - (-20.0 * 0.15)).abs() < 1e-9);
        assert!((trd.economy - (-10.0 * 0.15)).abs() < 1e-9);
    }

    #[test]
    fn mild_event_does_not_spread() {
        let all = linked_world();
        let mut rng = ScriptedRandom::constant(0.0);
        let mut ids = IdGenerator::new();
        let mut ctx = TickContext::new(&mut rng, &mut ids, SimTime::ZERO, 0);
        assert!(propagate(&primary(-14.9), &all, &GeneratorConfig::default(), &mut ctx).is_none());
        assert_eq!(ids.peek(), 1);
    }
}
