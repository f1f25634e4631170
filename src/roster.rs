//! Loading the static country roster.
//!
//! The roster is an opaque JSON array of countries supplied by the host. It
//! is read once when the engine is built.

use std::collections::BTreeSet;

use crate::error::RosterError;
use crate::model::{Country, WorldState};

/// Parse and normalise a roster.
///
/// Out-of-range values are clamped with a warning. A country that is both
/// sovereign and owned, or that names an owner missing from the roster, is
/// rejected outright.
pub fn load_roster(json: &str) -> Result<Vec<Country>, RosterError> {
    let mut countries: Vec<Country> = serde_json::from_str(json)?;
    if countries.is_empty() {
        return Err(RosterError::Empty);
    }

    let mut seen = BTreeSet::new();
    for c in &countries {
        if !seen.insert(c.id.clone()) {
            return Err(RosterError::DuplicateId(c.id.clone()));
        }
        if c.sovereign && c.owner_id.is_some() {
            return Err(RosterError::OwnedSovereign(c.id.clone()));
        }
    }
    for c in &countries {
        if let Some(owner) = c.owner_id.as_ref().filter(|o| !seen.contains(*o)) {
            return Err(RosterError::UnknownOwner {
                country: c.id.clone(),
                owner: owner.clone(),
            });
        }
    }

    for c in &mut countries {
        if !c.within_bounds() {
            tracing::warn!(country = %c.id, "roster entry out of bounds, clamping");
        }
        c.normalize();
    }
    Ok(countries)
}

/// Build the initial world from a roster and the player's country id.
pub fn world_from_roster(json: &str, player_id: Option<&str>) -> Result<WorldState, RosterError> {
    let countries = load_roster(json)?;
    if let Some(player) = player_id.filter(|p| !countries.iter().any(|c| c.id == *p)) {
        return Err(RosterError::UnknownPlayer(player.to_string()));
    }
    tracing::info!(countries = countries.len(), player = ?player_id, "roster loaded");
    Ok(WorldState::from_countries(countries, player_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"[
        {"id": "USA", "name": "United States", "stability": 72,
         "economy": {"gdp": 25000, "debt_ratio": 120, "resources": ["oil", "grain"]},
         "power_level": "superpower", "military_strength": 95, "geopolitical_block": "western",
         "neighbors": ["MEX"]},
        {"id": "MEX", "name": "Mexico", "stability": 130,
         "economy": {"gdp": 1400, "debt_ratio": -4},
         "neighbors": ["USA"]}
    ]"#;

    #[test]
    fn loads_and_clamps() {
        let countries = load_roster(ROSTER).unwrap();
        assert_eq!(countries.len(), 2);
        let mex = &countries[1];
        assert_eq!(mex.stability, 100.0);
        assert_eq!(mex.debt_ratio(), 0.0);
        assert_eq!(countries[0].economy.resources.len(), 2);
    }

    #[test]
    fn rejects_duplicates() {
        let json = r#"[{"id":"A","name":"A","stability":50,"economy":{"gdp":500}},
                       {"id":"A","name":"B","stability":50,"economy":{"gdp":500}}]"#;
        assert!(matches!(load_roster(json), Err(RosterError::DuplicateId(id)) if id == "A"));
    }

    #[test]
    fn rejects_owned_sovereign() {
        let json = r#"[{"id":"A","name":"A","stability":50,"economy":{"gdp":500}},
                       {"id":"B","name":"B","stability":50,"economy":{"gdp":500},
                        "sovereign":true,"owner_id":"A"}]"#;
        assert!(matches!(load_roster(json), Err(RosterError::OwnedSovereign(_))));
    }

    #[test]
    fn rejects_unknown_owner_and_player() {
        let json = r#"[{"id":"B","name":"B","stability":50,"economy":{"gdp":500},"owner_id":"Q"}]"#;
        assert!(matches!(load_roster(json), Err(RosterError::UnknownOwner { .. })));
        assert!(matches!(
            world_from_roster(ROSTER, Some("FRA")),
            Err(RosterError::UnknownPlayer(_))
        ));
    }

    #[test]
    fn empty_roster_is_an_error() {
        assert!(matches!(load_roster("[]"), Err(RosterError::Empty)));
    }

    #[test]
    fn builds_world_with_player() {
        let world = world_from_roster(ROSTER, Some("USA")).unwrap();
        assert_eq!(world.player_id(), Some("USA"));
        assert_eq!(world.countries.len(), 2);
    }
}
