use std::collections::{BTreeMap, BTreeSet};

use crate::config::GeneratorConfig;
use crate::model::{Country, CountryId, EventKind, GameEvent, PowerLevel, SimTime};
use crate::sim::random::RandomSource;

/// Countries targeted by any event other than mutual aid since `since`.
///
/// Protection is advisory: pickers avoid these countries only while an
/// alternative exists.
pub fn protected_set(history: &[GameEvent], since: SimTime) -> BTreeSet<CountryId> {
    history
        .iter()
        .rev()
        .take_while(|e| e.timestamp >= since)
        .filter(|e| e.kind != EventKind::MutualAid)
        .filter_map(|e| e.targeted_country_id.clone())
        .collect()
}

/// Ordinary negative events never hit sovereign countries, superpowers, or
/// the player's own capital. Territories the player owns remain fair game.
pub fn is_negative_eligible(country: &Country, player_id: Option<&str>) -> bool {
    !country.sovereign
        && country.power_level != PowerLevel::Superpower
        && player_id != Some(country.id.as_str())
}

/// Stabilizing relief goes to independent, non-sovereign countries. Annexed
/// territories are their owner's responsibility.
pub fn is_relief_eligible(country: &Country) -> bool {
    !country.sovereign && !country.is_owned()
}

/// Least stable relief-eligible country. Ties go to the lowest id.
pub fn least_stable(countries: &BTreeMap<CountryId, Country>) -> Option<&Country> {
    countries
        .values()
        .filter(|c| is_relief_eligible(c))
        .min_by(|a, b| a.stability.total_cmp(&b.stability))
}

/// Uniform pick from `pool`, skipping protected countries when possible.
pub fn pick_preferring_unprotected<'a>(
    pool: &[&'a Country],
    protected: &BTreeSet<CountryId>,
    rng: &mut dyn RandomSource,
) -> Option<&'a Country> {
    if pool.is_empty() {
        return None;
    }
    let open: Vec<&Country> = pool
        .iter()
        .copied()
        .filter(|c| !protected.contains(&c.id))
        .collect();
    let candidates = if open.is_empty() { pool.to_vec() } else { open };
    Some(candidates[rng.pick_index(candidates.len())])
}

/// Target for a negative event.
///
/// With probability `karma_target_bias`, countries carrying a grudge above
/// the karma threshold are picked weighted by their score. Otherwise a random
/// eligible country is picked, preferring unprotected ones.
pub fn pick_negative_target<'a>(
    countries: &'a BTreeMap<CountryId, Country>,
    player_id: Option<&str>,
    protected: &BTreeSet<CountryId>,
    config: &GeneratorConfig,
    rng: &mut dyn RandomSource,
) -> Option<&'a Country> {
    let grudges: Vec<&Country> = countries
        .values()
        .filter(|c| {
            c.karma_score > config.karma_target_threshold
                && !c.sovereign
                && player_id != Some(c.id.as_str())
                && !protected.contains(&c.id)
        })
        .collect();
    if !grudges.is_empty() && rng.chance(config.karma_target_bias) {
        let weights: Vec<f64> = grudges.iter().map(|c| c.karma_score).collect();
        return Some(grudges[rng.pick_weighted(&weights)]);
    }

    let eligible: Vec<&Country> = countries
        .values()
        .filter(|c| is_negative_eligible(c, player_id))
        .collect();
    pick_preferring_unprotected(&eligible, protected, rng)
}

/// Target for a positive event: usually a country outside the protection set.
pub fn pick_positive_target<'a>(
    countries: &'a BTreeMap<CountryId, Country>,
    protected: &BTreeSet<CountryId>,
    config: &GeneratorConfig,
    rng: &mut dyn RandomSource,
) -> Option<&'a Country> {
    let all: Vec<&Country> = countries.values().collect();
    if all.is_empty() {
        return None;
    }
    if rng.chance(config.karma_target_bias) {
        return pick_preferring_unprotected(&all, protected, rng);
    }
    Some(all[rng.pick_index(all.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventCategory;
    use crate::sim::random::ScriptedRandom;

    fn roster(countries: Vec<Country>) -> BTreeMap<CountryId, Country> {
        countries.into_iter().map(|c| (c.id.clone(), c)).collect()
    }

    fn hit(kind: EventKind, target: &str, secs: u64) -> GameEvent {
        GameEvent {
            id: secs,
            kind,
            category: EventCategory::Warning,
            title: String::new(),
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

    #[test]
    fn protected_set_skips_old_and_mutual_aid() {
        let history = vec![
            hit(EventKind::Drought, "OLD", 10),
            hit(EventKind::MutualAid, "AID", 400),
            hit(EventKind::CivilUnrest, "NEW", 500),
        ];
        let set = protected_set(&history, SimTime::from_secs(300));
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["NEW".to_string()]);
    }

    #[test]
    fn negative_eligibility_excludes_protected_classes() {
        let mut sov = Country::new("SOV", "Sovereign");
        sov.sovereign = true;
        let mut sup = Country::new("SUP", "Super");
        sup.power_level = PowerLevel::Superpower;
        let mut ter = Country::new("TER", "Territory");
        ter.annex("PLY");
        assert!(!is_negative_eligible(&sov, None));
        assert!(!is_negative_eligible(&sup, None));
        assert!(!is_negative_eligible(&Country::new("PLY", "Player"), Some("PLY")));
        assert!(is_negative_eligible(&ter, Some("PLY")));
    }

    #[test]
    fn protection_is_advisory() {
        let all = roster(vec![Country::new("AAA", "Aland")]);
        let protected: BTreeSet<CountryId> = ["AAA".to_string()].into_iter().collect();
        let mut rng = ScriptedRandom::constant(0.0);
        let picked = pick_negative_target(&all, None, &protected, &GeneratorConfig::default(), &mut rng);
        assert_eq!(picked.unwrap().id, "AAA");
    }

    #[test]
    fn unprotected_country_preferred() {
        let all = roster(vec![Country::new("AAA", "Aland"), Country::new("BBB", "Bland")]);
        let protected: BTreeSet<CountryId> = ["AAA".to_string()].into_iter().collect();
        let mut rng = ScriptedRandom::constant(0.0);
        let picked = pick_negative_target(&all, None, &protected, &GeneratorConfig::default(), &mut rng);
        assert_eq!(picked.unwrap().id, "BBB");
    }

    #[test]
    fn grudges_draw_negative_events() {
        let mut grudge = Country::new("GRD", "Grudge");
        grudge.karma_score = 60.0;
        grudge.power_level = PowerLevel::Superpower;
        let all = roster(vec![Country::new("AAA", "Aland"), grudge]);
        // 0.1 < 0.7 bias, then weighted pick over a single candidate
        let mut rng = ScriptedRandom::new([0.1, 0.9]);
        let picked = pick_negative_target(
            &all,
            None,
            &BTreeSet::new(),
            &GeneratorConfig::default(),
            &mut rng,
        );
        assert_eq!(picked.unwrap().id, "GRD");
    }

    #[test]
    fn grudge_roll_can_fall_through() {
        let mut grudge = Country::new("GRD", "Grudge");
        grudge.karma_score = 60.0;
        grudge.power_level = PowerLevel::Superpower;
        let all = roster(vec![Country::new("AAA", "Aland"), grudge]);
        let mut rng = ScriptedRandom::new([0.8, 0.0]);
        let picked = pick_negative_target(
            &all,
            None,
            &BTreeSet::new(),
            &GeneratorConfig::default(),
            &mut rng,
        );
        assert_eq!(picked.unwrap().id, "AAA");
    }

    #[test]
    fn no_eligible_target_yields_none() {
        let mut sov = Country::new("SOV", "Sovereign");
        sov.sovereign = true;
        let all = roster(vec![sov]);
        let mut rng = ScriptedRandom::constant(0.0);
        assert!(
            pick_negative_target(&all, None, &BTreeSet::new(), &GeneratorConfig::default(), &mut rng)
                .is_none()
        );
    }

    #[test]
    fn least_stable_breaks_ties_by_id() {
        let mut a = Country::new("AAA", "Aland");
        a.stability = 10.0;
        let mut b = Country::new("BBB", "Bland");
        b.stability = 10.0;
        let all = roster(vec![b, a]);
        assert_eq!(least_stable(&all).unwrap().id, "AAA");
    }

    #[test]
    fn least_stable_skips_sovereigns_and_territories() {
        let mut sov = Country::new("SOV", "Sovereign");
        sov.sovereign = true;
        sov.stability = 2.0;
        let mut ter = Country::new("TER", "Territory");
        ter.annex("PLY");
        ter.stability = 4.0;
        let mut weak = Country::new("WEK", "Weak");
        weak.stability = 30.0;
        let all = roster(vec![sov, ter, weak, Country::new("PLY", "Player")]);
        assert_eq!(least_stable(&all).unwrap().id, "WEK");

        let only_protected = roster(vec![all["SOV"].clone(), all["TER"].clone()]);
        assert!(least_stable(&only_protected).is_none());
    }
}
