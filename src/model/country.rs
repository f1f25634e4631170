use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type CountryId = String;

pub const STABILITY_MIN: f64 = 0.0;
pub const STABILITY_MAX: f64 = 100.0;
pub const DEBT_MIN: f64 = 0.0;
pub const DEBT_MAX: f64 = 300.0;
pub const KARMA_MIN: f64 = 0.0;
pub const KARMA_MAX: f64 = 100.0;
pub const RELATION_MIN: f64 = -100.0;
pub const RELATION_MAX: f64 = 100.0;
pub const GDP_FLOOR: f64 = 100.0;

/// Trade links at or above this strength count as "strong" for contagion.
pub const STRONG_TRADE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PowerLevel {
    Superpower,
    Major,
    Regional,
    #[default]
    Minor,
}

string_enum!(PowerLevel {
    Superpower => "superpower",
    Major => "major",
    Regional => "regional",
    Minor => "minor",
});

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Economy {
    pub gdp: f64,
    #[serde(default)]
    pub debt_ratio: f64,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub production: BTreeMap<String, f64>,
    #[serde(default)]
    pub reserves: BTreeMap<String, f64>,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            gdp: 1_000.0,
            debt_ratio: 40.0,
            resources: Vec::new(),
            production: BTreeMap::new(),
            reserves: BTreeMap::new(),
        }
    }
}

/// A nation-state on the roster.
///
/// Bounded fields are only changed through the mutators below, which clamp on
/// every write: stability in `[0, 100]`, debt ratio in `[0, 300]`, karma in
/// `[0, 100]`, relations in `[-100, 100]`, GDP floored at [`GDP_FLOOR`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    #[serde(default)]
    pub leader: String,
    #[serde(default)]
    pub ideology: String,
    #[serde(default)]
    pub economy: Economy,
    #[serde(default)]
    pub population: u64,
    pub stability: f64,
    #[serde(default)]
    pub legal_system: String,
    /// Protected status: a sovereign country can be neither targeted by
    /// destabilising events nor annexed. Never set together with `owner_id`.
    #[serde(default)]
    pub sovereign: bool,
    #[serde(default)]
    pub owner_id: Option<CountryId>,
    #[serde(default)]
    pub neighbors: Vec<CountryId>,
    #[serde(default)]
    pub alliances: Vec<CountryId>,
    #[serde(default)]
    pub diplomatic_relations: BTreeMap<CountryId, f64>,
    /// Trade link strength per partner, `0..=100`.
    #[serde(default)]
    pub trade_partners: BTreeMap<CountryId, f64>,
    #[serde(default)]
    pub military_strength: f64,
    #[serde(default)]
    pub power_level: PowerLevel,
    #[serde(default)]
    pub karma_score: f64,
    #[serde(default)]
    pub geopolitical_block: String,
}

impl Country {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            leader: String::new(),
            ideology: String::new(),
            economy: Economy::default(),
            population: 1_000_000,
            stability: 60.0,
            legal_system: String::new(),
            sovereign: false,
            owner_id: None,
            neighbors: Vec::new(),
            alliances: Vec::new(),
            diplomatic_relations: BTreeMap::new(),
            trade_partners: BTreeMap::new(),
            military_strength: 20.0,
            power_level: PowerLevel::Minor,
            karma_score: 0.0,
            geopolitical_block: String::new(),
        }
    }

    // -- Queries --

    pub fn gdp(&self) -> f64 {
        self.economy.gdp
    }

    pub fn debt_ratio(&self) -> f64 {
        self.economy.debt_ratio
    }

    pub fn is_owned(&self) -> bool {
        self.owner_id.is_some()
    }

    /// True for the player's own country and every territory it owns.
    pub fn is_controlled_by(&self, player_id: &str) -> bool {
        self.id == player_id || self.owner_id.as_deref() == Some(player_id)
    }

    pub fn is_neighbor_of(&self, other: &Country) -> bool {
        self.neighbors.contains(&other.id) || other.neighbors.contains(&self.id)
    }

    pub fn is_allied_with(&self, other: &Country) -> bool {
        self.alliances.contains(&other.id) || other.alliances.contains(&self.id)
    }

    pub fn shares_block_with(&self, other: &Country) -> bool {
        !self.geopolitical_block.is_empty() && self.geopolitical_block == other.geopolitical_block
    }

    pub fn trade_strength_with(&self, other: &Country) -> f64 {
        let forward = self.trade_partners.get(&other.id).copied().unwrap_or(0.0);
        let backward = other.trade_partners.get(&self.id).copied().unwrap_or(0.0);
        forward.max(backward)
    }

    pub fn has_strong_trade_with(&self, other: &Country) -> bool {
        self.trade_strength_with(other) >= STRONG_TRADE_THRESHOLD
    }

    pub fn relation_with(&self, other_id: &str) -> f64 {
        self.diplomatic_relations
            .get(other_id)
            .copied()
            .unwrap_or(0.0)
    }

    /// Mean of all diplomatic relation values; 0 with no relations.
    pub fn average_relation(&self) -> f64 {
        if self.diplomatic_relations.is_empty() {
            return 0.0;
        }
        self.diplomatic_relations.values().sum::<f64>() / self.diplomatic_relations.len() as f64
    }

    // -- Clamped mutators --

    pub fn set_stability(&mut self, value: f64) {
        self.stability = value.clamp(STABILITY_MIN, STABILITY_MAX);
    }

    pub fn adjust_stability(&mut self, delta: f64) {
        self.set_stability(self.stability + delta);
    }

    pub fn set_debt_ratio(&mut self, value: f64) {
        self.economy.debt_ratio = value.clamp(DEBT_MIN, DEBT_MAX);
    }

    pub fn adjust_debt(&mut self, delta: f64) {
        self.set_debt_ratio(self.economy.debt_ratio + delta);
    }

    pub fn set_gdp(&mut self, value: f64) {
        self.economy.gdp = value.max(GDP_FLOOR);
    }

    pub fn adjust_gdp(&mut self, delta: f64) {
        self.set_gdp(self.economy.gdp + delta);
    }

    /// Scale GDP by a percentage, e.g. `-4.0` shrinks it by 4 %.
    pub fn adjust_gdp_percent(&mut self, percent: f64) {
        self.set_gdp(self.economy.gdp * (1.0 + percent / 100.0));
    }

    pub fn adjust_population_percent(&mut self, percent: f64) {
        let next = self.population as f64 * (1.0 + percent / 100.0);
        self.population = next.max(0.0).round() as u64;
    }

    pub fn adjust_military(&mut self, factor: f64) {
        self.military_strength = (self.military_strength * factor).max(0.0);
    }

    pub fn add_karma(&mut self, delta: f64) {
        self.karma_score = (self.karma_score + delta).clamp(KARMA_MIN, KARMA_MAX);
    }

    pub fn adjust_relation(&mut self, other_id: &str, delta: f64) {
        let current = self.relation_with(other_id);
        self.diplomatic_relations.insert(
            other_id.to_string(),
            (current + delta).clamp(RELATION_MIN, RELATION_MAX),
        );
    }

    pub fn add_reserve(&mut self, resource: &str, amount: f64) {
        let entry = self
            .economy
            .reserves
            .entry(resource.to_string())
            .or_insert(0.0);
        *entry = (*entry + amount).max(0.0);
    }

    /// Transfer ownership to `owner`. Karma resets only when the country goes
    /// from unowned to owned; a change of owner keeps the score.
    pub fn annex(&mut self, owner: &str) {
        if self.owner_id.is_none() {
            self.karma_score = 0.0;
        }
        self.owner_id = Some(owner.to_string());
        self.sovereign = false;
    }

    /// Drop ownership. Karma is untouched.
    pub fn release(&mut self) {
        self.owner_id = None;
    }

    /// Clamp every bounded field and resolve an owner/sovereign conflict in
    /// favour of ownership. Used when loading external rosters.
    pub fn normalize(&mut self) {
        self.set_stability(self.stability);
        self.set_debt_ratio(self.economy.debt_ratio);
        self.set_gdp(self.economy.gdp);
        self.karma_score = self.karma_score.clamp(KARMA_MIN, KARMA_MAX);
        for value in self.diplomatic_relations.values_mut() {
            *value = value.clamp(RELATION_MIN, RELATION_MAX);
        }
        if self.owner_id.is_some() {
            self.sovereign = false;
        }
    }

    /// Whether every bounded field is inside its range.
    pub fn within_bounds(&self) -> bool {
        (STABILITY_MIN..=STABILITY_MAX).contains(&self.stability)
            && (DEBT_MIN..=DEBT_MAX).contains(&self.economy.debt_ratio)
            && (KARMA_MIN..=KARMA_MAX).contains(&self.karma_score)
            && self.economy.gdp >= GDP_FLOOR
            && !(self.sovereign && self.owner_id.is_some())
    }
}
