//! Karma: how much hostility each country has received from the player.
//!
//! Scores live on [`Country::karma_score`] and are recomputed from actions
//! only; nothing caches them. Conquest resets a score through
//! [`Country::annex`].

use std::collections::BTreeMap;

use crate::model::{ActionKind, Country, CountryId, PlayerAction};

/// Karma points an action of this kind adds to its target.
pub fn severity(kind: ActionKind) -> i32 {
    kind.severity()
}

/// Record `action` against its target's karma score.
///
/// Returns the new score, or `None` when the action has no distinct target
/// or the target is unknown.
pub fn record(countries: &mut BTreeMap<CountryId, Country>, action: &PlayerAction) -> Option<f64> {
    let target_id = action.distinct_target()?;
    let target = countries.get_mut(target_id)?;
    let before = target.karma_score;
    target.add_karma(f64::from(severity(action.kind)));
    tracing::debug!(
        target = %target_id,
        kind = %action.kind,
        before,
        after = target.karma_score,
        "karma recorded"
    );
    Some(target.karma_score)
}

/// Countries whose karma exceeds `threshold`, highest first.
pub fn grudges(countries: &BTreeMap<CountryId, Country>, threshold: f64) -> Vec<&Country> {
    let mut list: Vec<&Country> = countries
        .values()
        .filter(|c| c.karma_score > threshold)
        .collect();
    list.sort_by(|a, b| b.karma_score.total_cmp(&a.karma_score));
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SimTime;

    fn pair() -> BTreeMap<CountryId, Country> {
        [Country::new("AAA", "Aland"), Country::new("BBB", "Bland")]
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect()
    }

    fn action(kind: ActionKind, target: Option<&str>) -> PlayerAction {
        PlayerAction::new(kind, "AAA", target, SimTime::ZERO)
    }

    #[test]
    fn hostile_actions_accumulate() {
        let mut all = pair();
        record(&mut all, &action(ActionKind::MilitaryAction, Some("BBB")));
        record(&mut all, &action(ActionKind::Espionage, Some("BBB")));
        assert_eq!(all["BBB"].karma_score, 14.0);
        assert_eq!(all["AAA"].karma_score, 0.0);
    }

    #[test]
    fn friendly_actions_never_go_negative() {
        let mut all = pair();
        let score = record(&mut all, &action(ActionKind::DiplomaticAlliance, Some("BBB")));
        assert_eq!(score, Some(0.0));
    }

    #[test]
    fn score_saturates_at_max() {
        let mut all = pair();
        for _ in 0..20 {
            record(&mut all, &action(ActionKind::BiologicalWarfare, Some("BBB")));
        }
        assert_eq!(all["BBB"].karma_score, 100.0);
    }

    #[test]
    fn self_and_untargeted_actions_are_ignored() {
        let mut all = pair();
        assert!(record(&mut all, &action(ActionKind::MilitaryAction, Some("AAA"))).is_none());
        assert!(record(&mut all, &action(ActionKind::EconomicInvestment, None)).is_none());
        assert!(record(&mut all, &action(ActionKind::MilitaryAction, Some("ZZZ"))).is_none());
        assert_eq!(all["AAA"].karma_score, 0.0);
    }

    #[test]
    fn grudges_sorted_descending() {
        let mut all = pair();
        all.get_mut("AAA").unwrap().karma_score = 40.0;
        all.get_mut("BBB").unwrap().karma_score = 80.0;
        let ids: Vec<&str> = grudges(&all, 30.0).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["BBB", "AAA"]);
    }
}
