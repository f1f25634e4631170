use std::collections::BTreeMap;

use crate::model::{Country, CountryId, GameEvent};

/// Stability below which a non-sovereign country counts as "in crisis".
pub const CRISIS_STABILITY: f64 = 30.0;

/// Global instability scalar in `[0, 100]`.
///
/// `recent_events` should hold the events of the last five minutes. An empty
/// roster yields 0.
pub fn compute(countries: &BTreeMap<CountryId, Country>, recent_events: &[&GameEvent]) -> u8 {
    let total = countries.len();
    if total == 0 {
        return 0;
    }

    let avg_stability = countries.values().map(|c| c.stability).sum::<f64>() / total as f64;
    let in_crisis = countries
        .values()
        .filter(|c| c.stability < CRISIS_STABILITY && !c.sovereign)
        .count();
    let crisis_ratio = in_crisis as f64 / total as f64;
    let negative_events = recent_events.iter().filter(|e| e.is_negative()).count();
    let collapsed = countries.values().filter(|c| c.stability <= 0.0).count();

    let level = 0.3 * (100.0 - avg_stability)
        + 0.3 * (crisis_ratio * 200.0).min(100.0)
        + 0.2 * (negative_events as f64 * 15.0).min(100.0)
        + 0.2 * (collapsed as f64 * 25.0).min(100.0);

    level.round().clamp(0.0, 100.0) as u8
}
