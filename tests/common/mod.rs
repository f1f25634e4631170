#![allow(dead_code)]

use nation_sim::model::*;
use nation_sim::scenario::Scenario;

/// Small host roster in the JSON shape the engine loads at start-up.
pub const ROSTER_JSON: &str = r#"[
    {
        "id": "USA", "name": "United States", "stability": 72,
        "economy": {"gdp": 25000, "debt_ratio": 120, "resources": ["oil", "grain"]},
        "military_strength": 95, "power_level": "superpower",
        "neighbors": ["MEX"], "geopolitical_block": "west"
    },
    {
        "id": "MEX", "name": "Mexico", "stability": 48,
        "economy": {"gdp": 1400, "debt_ratio": 55},
        "military_strength": 30, "power_level": "regional",
        "neighbors": ["USA"], "trade_partners": {"USA": 80}
    },
    {
        "id": "CHE", "name": "Switzerland", "stability": 90, "sovereign": true,
        "economy": {"gdp": 800, "debt_ratio": 30}
    },
    {
        "id": "ATL", "name": "Atlantis", "stability": 140,
        "economy": {"gdp": 50, "debt_ratio": 400}
    }
]"#;

/// Two plain countries with the player on `PLY`.
pub fn two_country_world() -> WorldState {
    let mut s = Scenario::new();
    s.player("PLY").gdp(5_000.0);
    s.country("BBB");
    s.build()
}

/// `n` collapsed, unowned countries and no player.
pub fn collapsed_world(n: usize) -> WorldState {
    let mut s = Scenario::new();
    for i in 0..n {
        s.country(&format!("C{i}")).stability(0.0);
    }
    s.build()
}

pub fn assert_world_bounded(world: &WorldState) {
    for c in world.countries.values() {
        assert!(c.within_bounds(), "{} out of bounds: {c:?}", c.id);
        assert!(c.gdp() >= 0.0);
    }
}
