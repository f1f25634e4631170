use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::action::ActionRecord;
use super::country::{Country, CountryId};
use super::event::GameEvent;
use super::timestamp::SimTime;
use crate::id::IdGenerator;

/// Complete simulation state: the roster plus the append-only event and
/// action logs.
///
/// Countries are created once and never removed; conquest only flags them as
/// owned. The engine replaces the whole value each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldState {
    pub countries: BTreeMap<CountryId, Country>,
    pub player_id: Option<CountryId>,
    pub events: Vec<GameEvent>,
    pub action_log: Vec<ActionRecord>,
    pub id_gen: IdGenerator,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_countries(countries: Vec<Country>, player_id: Option<&str>) -> Self {
        let mut world = Self::new();
        for c in countries {
            world.countries.insert(c.id.clone(), c);
        }
        world.player_id = player_id.map(str::to_string);
        world
    }

    pub fn insert_country(&mut self, country: Country) {
        self.countries.insert(country.id.clone(), country);
    }

    pub fn country(&self, id: &str) -> Option<&Country> {
        self.countries.get(id)
    }

    pub fn country_mut(&mut self, id: &str) -> Option<&mut Country> {
        self.countries.get_mut(id)
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    pub fn player(&self) -> Option<&Country> {
        self.player_id().and_then(|id| self.countries.get(id))
    }

    /// Territories currently owned by `owner`.
    pub fn territories_of(&self, owner: &str) -> Vec<&Country> {
        self.countries
            .values()
            .filter(|c| c.owner_id.as_deref() == Some(owner))
            .collect()
    }

    pub fn territory_count(&self, owner: &str) -> usize {
        self.countries
            .values()
            .filter(|c| c.owner_id.as_deref() == Some(owner))
            .count()
    }

    /// Events stamped at or after `since`, oldest first.
    ///
    /// The log is append-only with non-decreasing timestamps, so this scans
    /// backwards and stops at the first older entry.
    pub fn events_since(&self, since: SimTime) -> Vec<&GameEvent> {
        let mut recent: Vec<&GameEvent> = self
            .events
            .iter()
            .rev()
            .take_while(|e| e.timestamp >= since)
            .collect();
        recent.reverse();
        recent
    }

    /// Apply an event's per-country deltas through the clamping mutators.
    pub fn apply_event(&mut self, event: &GameEvent) {
        apply_deltas(&mut self.countries, event);
    }

    /// Append an already-applied event to the log.
    pub fn log_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn log_action(&mut self, record: ActionRecord) {
        self.action_log.push(record);
    }

    /// Hand the accumulated event log to the host.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_action_log(&mut self) -> Vec<ActionRecord> {
        std::mem::take(&mut self.action_log)
    }

    pub fn any_country_at_or_below(&self, stability: f64) -> bool {
        self.countries.values().any(|c| c.stability <= stability)
    }

    /// Fail loudly in debug builds if a bounded value escaped its range.
    pub fn debug_check_invariants(&self) {
        if cfg!(debug_assertions) {
            for c in self.countries.values() {
                debug_assert!(
                    c.within_bounds(),
                    "country {} out of bounds: stability={} debt={} karma={} gdp={} sovereign={} owner={:?}",
                    c.id,
                    c.stability,
                    c.debt_ratio(),
                    c.karma_score,
                    c.gdp(),
                    c.sovereign,
                    c.owner_id
                );
            }
        }
    }
}

/// Apply an event's deltas to a country map. Deltas naming unknown
/// countries are skipped.
pub fn apply_deltas(countries: &mut BTreeMap<CountryId, Country>, event: &GameEvent) {
    for delta in &event.deltas {
        let Some(country) = countries.get_mut(&delta.country_id) else {
            tracing::warn!(
                event_id = event.id,
                country = %delta.country_id,
                "event delta for unknown country skipped"
            );
            continue;
        };
        country.adjust_stability(delta.stability);
        country.adjust_gdp_percent(delta.economy);
        country.adjust_population_percent(delta.population);
        country.adjust_debt(delta.debt);
        if let Some(res) = &delta.resource {
            country.add_reserve(&res.resource, res.amount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CountryDelta, EventCategory, EventKind};

    fn event_at(id: u64, secs: u64, deltas: Vec<CountryDelta>) -> GameEvent {
        GameEvent {
            id,
            kind: EventKind::CivilUnrest,
            category: EventCategory::Warning,
            title: "Unrest".to_string(),
            effects: Vec::new(),
            deltas,
            timestamp: SimTime::from_secs(secs),
            triggered_by_player: false,
            targeted_country_id: Some("AAA".to_string()),
            chaos_level_at_creation: 0,
            action: None,
            caused_by: None,
        }
    }

    fn world() -> WorldState {
        WorldState::from_countries(
            vec![Country::new("AAA", "Aland"), Country::new("BBB", "Bland")],
            Some("BBB"),
        )
    }

    #[test]
    fn apply_event_clamps_through_mutators() {
        let mut w = world();
        let ev = event_at(
            1,
            0,
            vec![
                CountryDelta::new("AAA")
                    .stability(-500.0)
                    .debt(900.0)
                    .resource("oil", 10.0),
                CountryDelta::new("ZZZ").stability(-5.0),
            ],
        );
        w.apply_event(&ev);
        let a = w.country("AAA").unwrap();
        assert_eq!(a.stability, 0.0);
        assert_eq!(a.debt_ratio(), 300.0);
        assert_eq!(a.economy.reserves["oil"], 10.0);
    }

    #[test]
    fn events_since_returns_window_oldest_first() {
        let mut w = world();
        for (id, secs) in [(1, 10), (2, 200), (3, 400), (4, 500)] {
            w.log_event(event_at(id, secs, Vec::new()));
        }
        let recent: Vec<u64> = w
            .events_since(SimTime::from_secs(300))
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(recent, vec![3, 4]);
    }

    #[test]
    fn territories_follow_owner() {
        let mut w = world();
        w.country_mut("AAA").unwrap().annex("BBB");
        assert_eq!(w.territory_count("BBB"), 1);
        assert_eq!(w.territories_of("BBB")[0].id, "AAA");
        assert_eq!(w.player().unwrap().id, "BBB");
    }

    #[test]
    fn drain_hands_over_log() {
        let mut w = world();
        w.log_event(event_at(1, 0, Vec::new()));
        assert_eq!(w.drain_events().len(), 1);
        assert!(w.events.is_empty());
    }
}
