use std::collections::BTreeMap;

use crate::model::{Country, CountryId, PowerLevel};

const BASE_GROWTH: f64 = 0.01;
const STABILITY_WEIGHT: f64 = 0.03;
const RESOURCE_STEP: f64 = 0.003;
const RESOURCE_CAP: f64 = 0.02;
const DEBT_PENALTY_THRESHOLD: f64 = 60.0;
const DEBT_PENALTY_WEIGHT: f64 = 0.02;
const DIPLOMATIC_WEIGHT: f64 = 0.015;
const DIPLOMATIC_MIN: f64 = -0.01;
const DIPLOMATIC_MAX: f64 = 0.015;
const SUPERPOWER_BONUS: f64 = 0.005;
const MAJOR_BONUS: f64 = 0.003;
const MAINTENANCE_PER_TERRITORY: f64 = 0.002;
const TERRITORY_FACTOR: f64 = 0.34;

pub const MIN_GROWTH: f64 = -0.02;
pub const MAX_GROWTH: f64 = 0.05;

/// Individual contributions to a country's growth rate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GrowthFactors {
    pub stability: f64,
    pub resources: f64,
    pub debt_penalty: f64,
    pub diplomatic: f64,
    pub power_bonus: f64,
    pub maintenance_penalty: f64,
    /// 0.34 for an owned territory, 1.0 otherwise.
    pub territory_multiplier: f64,
}

impl GrowthFactors {
    /// Combined per-update rate, clamped to `[MIN_GROWTH, MAX_GROWTH]`.
    pub fn rate(&self) -> f64 {
        let raw = BASE_GROWTH + self.stability + self.resources - self.debt_penalty
            + self.diplomatic
            + self.power_bonus
            - self.maintenance_penalty;
        (raw * self.territory_multiplier).clamp(MIN_GROWTH, MAX_GROWTH)
    }
}

pub fn growth_factors(
    country: &Country,
    countries: &BTreeMap<CountryId, Country>,
    player_id: Option<&str>,
) -> GrowthFactors {
    let power_bonus = match country.power_level {
        PowerLevel::Superpower => SUPERPOWER_BONUS,
        PowerLevel::Major => MAJOR_BONUS,
        PowerLevel::Regional | PowerLevel::Minor => 0.0,
    };

    let maintenance_penalty = match player_id {
        Some(player) if country.id == player => {
            let owned = countries
                .values()
                .filter(|c| c.owner_id.as_deref() == Some(player))
                .count();
            owned as f64 * MAINTENANCE_PER_TERRITORY
        }
        _ => 0.0,
    };

    GrowthFactors {
        stability: country.stability / 100.0 * STABILITY_WEIGHT,
        resources: (country.economy.resources.len() as f64 * RESOURCE_STEP).min(RESOURCE_CAP),
        debt_penalty: ((country.debt_ratio() - DEBT_PENALTY_THRESHOLD) / 100.0
            * DEBT_PENALTY_WEIGHT)
            .max(0.0),
        diplomatic: (country.average_relation() / 100.0 * DIPLOMATIC_WEIGHT)
            .clamp(DIPLOMATIC_MIN, DIPLOMATIC_MAX),
        power_bonus,
        maintenance_penalty,
        territory_multiplier: if country.is_owned() {
            TERRITORY_FACTOR
        } else {
            1.0
        },
    }
}

/// Per-update GDP growth rate for `country`.
pub fn growth(
    country: &Country,
    countries: &BTreeMap<CountryId, Country>,
    player_id: Option<&str>,
) -> f64 {
    growth_factors(country, countries, player_id).rate()
}

/// Apply one growth update to every country. Returns the GDP change booked
/// against each country.
///
/// Rates are computed from the pre-update snapshot. A territory's positive
/// delta is credited in full to its owner; losses stay with the territory.
pub fn apply_growth(
    countries: &mut BTreeMap<CountryId, Country>,
    player_id: Option<&str>,
) -> BTreeMap<CountryId, f64> {
    let planned: Vec<(CountryId, Option<CountryId>, f64)> = countries
        .values()
        .map(|c| {
            let delta = (c.gdp() * growth(c, countries, player_id)).round();
            (c.id.clone(), c.owner_id.clone(), delta)
        })
        .collect();

    let mut booked: BTreeMap<CountryId, f64> = BTreeMap::new();
    for (id, owner, delta) in planned {
        let recipient = match owner {
            Some(owner) if delta > 0.0 && countries.contains_key(&owner) => owner,
            _ => id,
        };
        if let Some(country) = countries.get_mut(&recipient) {
            country.adjust_gdp(delta);
            *booked.entry(recipient).or_insert(0.0) += delta;
        }
    }

    tracing::debug!(countries = booked.len(), "economic update applied");
    booked
}
