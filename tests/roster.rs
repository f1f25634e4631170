mod common;

use nation_sim::error::{EngineError, RosterError};
use nation_sim::model::*;
use nation_sim::{Engine, EngineConfig};

#[test]
fn engine_boots_from_host_roster() {
    let engine = Engine::from_roster(common::ROSTER_JSON, Some("USA"), EngineConfig::seeded(1))
        .ok()
        .unwrap();
    let world = engine.world();

    assert_eq!(world.countries.len(), 4);
    assert_eq!(world.player_id(), Some("USA"));
    assert_eq!(world.player().unwrap().power_level, PowerLevel::Superpower);
    assert!(world.country("CHE").unwrap().sovereign);
    assert_eq!(world.country("MEX").unwrap().trade_partners.get("USA"), Some(&80.0));
    assert!(engine.is_running());
    assert_eq!(engine.tick_count(), 0);
}

#[test]
fn out_of_range_entries_are_clamped() {
    let engine = Engine::from_roster(common::ROSTER_JSON, None, EngineConfig::seeded(1))
        .ok()
        .unwrap();
    let atl = engine.world().country("ATL").unwrap();

    assert_eq!(atl.stability, 100.0);
    assert_eq!(atl.debt_ratio(), 300.0);
    assert_eq!(atl.gdp(), 100.0);
    common::assert_world_bounded(engine.world());
}

#[test]
fn unknown_player_is_rejected() {
    let err = Engine::from_roster(common::ROSTER_JSON, Some("XYZ"), EngineConfig::default())
        .err()
        .unwrap();

    assert!(matches!(
        err,
        EngineError::Roster(RosterError::UnknownPlayer(ref id)) if id == "XYZ"
    ));
}

#[test]
fn malformed_roster_is_rejected() {
    let err = Engine::from_roster("[{\"id\": 3}]", None, EngineConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, EngineError::Roster(RosterError::Json(_))));
    assert!(err.to_string().starts_with("malformed roster"));
}
