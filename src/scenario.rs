use std::collections::BTreeMap;

use crate::id::IdGenerator;
use crate::model::*;

/// Typed reference to a country in a [`Scenario`], enabling chained field mutation.
///
/// Created by [`Scenario::country`] (creation) or [`Scenario::country_mut`] (mutation).
/// Call [`.id()`](CountryRef::id) to terminate the chain and extract the country id.
pub struct CountryRef<'a> {
    country: &'a mut Country,
}

impl<'a> CountryRef<'a> {
    pub fn name(self, v: &str) -> Self { self.country.name = v.to_string(); self }
    pub fn stability(self, v: f64) -> Self { self.country.stability = v; self }
    pub fn gdp(self, v: f64) -> Self { self.country.economy.gdp = v; self }
    pub fn debt(self, v: f64) -> Self { self.country.economy.debt_ratio = v; self }
    pub fn population(self, v: u64) -> Self { self.country.population = v; self }
    pub fn military(self, v: f64) -> Self { self.country.military_strength = v; self }
    pub fn karma(self, v: f64) -> Self { self.country.karma_score = v; self }
    pub fn power(self, v: PowerLevel) -> Self { self.country.power_level = v; self }
    pub fn sovereign(self) -> Self { self.country.sovereign = true; self }
    pub fn ideology(self, v: &str) -> Self { self.country.ideology = v.to_string(); self }
    pub fn block(self, v: &str) -> Self { self.country.geopolitical_block = v.to_string(); self }

    /// Mark as a territory of `owner` without touching karma.
    pub fn owned_by(self, owner: &str) -> Self {
        self.country.owner_id = Some(owner.to_string());
        self.country.sovereign = false;
        self
    }

    pub fn resources(self, v: &[&str]) -> Self {
        self.country.economy.resources = v.iter().map(|r| r.to_string()).collect();
        self
    }

    /// One-way relation from this country towards `other`.
    pub fn relation(self, other: &str, v: f64) -> Self {
        self.country.diplomatic_relations.insert(other.to_string(), v);
        self
    }

    /// Escape hatch: apply an arbitrary closure to the country.
    pub fn with(self, f: impl FnOnce(&mut Country)) -> Self { f(&mut *self.country); self }

    /// Terminate the chain and return the country id.
    pub fn id(self) -> CountryId { self.country.id.clone() }
}

/// Fluent builder for test worlds.
///
/// Countries start from [`Country::new`] defaults: stability 60, GDP 1000,
/// debt 40, military 20, minor power, no links. Link helpers are symmetric.
#[derive(Default)]
pub struct Scenario {
    countries: BTreeMap<CountryId, Country>,
    player: Option<CountryId>,
    history: Vec<GameEvent>,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a country named after its id, or reopen it if it already exists.
    pub fn country(&mut self, id: &str) -> CountryRef<'_> {
        let country = self
            .countries
            .entry(id.to_string())
            .or_insert_with(|| Country::new(id, id));
        CountryRef { country }
    }

    pub fn country_mut(&mut self, id: &str) -> CountryRef<'_> {
        self.country(id)
    }

    /// Add the player's country and mark it as the player.
    pub fn player(&mut self, id: &str) -> CountryRef<'_> {
        self.player = Some(id.to_string());
        self.country(id)
    }

    pub fn border(&mut self, a: &str, b: &str) -> &mut Self {
        self.country(a).with(|c| c.neighbors.push(b.to_string()));
        self.country(b).with(|c| c.neighbors.push(a.to_string()));
        self
    }

    pub fn alliance(&mut self, a: &str, b: &str) -> &mut Self {
        self.country(a).with(|c| c.alliances.push(b.to_string()));
        self.country(b).with(|c| c.alliances.push(a.to_string()));
        self
    }

    pub fn trade(&mut self, a: &str, b: &str, strength: f64) -> &mut Self {
        self.country(a)
            .with(|c| { c.trade_partners.insert(b.to_string(), strength); });
        self.country(b)
            .with(|c| { c.trade_partners.insert(a.to_string(), strength); });
        self
    }

    /// Append a past event to the world's history.
    pub fn event(&mut self, event: GameEvent) -> &mut Self {
        self.history.push(event);
        self
    }

    pub fn countries(&self) -> &BTreeMap<CountryId, Country> {
        &self.countries
    }

    pub fn player_id(&self) -> Option<&str> {
        self.player.as_deref()
    }

    pub fn history(&self) -> &[GameEvent] {
        &self.history
    }

    pub fn into_countries(self) -> BTreeMap<CountryId, Country> {
        self.countries
    }

    /// Finish into a world whose id sequence continues after the history.
    pub fn build(self) -> WorldState {
        let next_id = self.history.iter().map(|e| e.id + 1).max().unwrap_or(1);
        WorldState {
            countries: self.countries,
            player_id: self.player,
            events: self.history,
            action_log: Vec::new(),
            id_gen: IdGenerator::starting_from(next_id),
        }
    }
}
