mod common;

use proptest::prelude::*;

use nation_sim::config::{GeneratorConfig, SchedulerConfig};
use nation_sim::model::*;
use nation_sim::sim::{Clock, EventGenerator, EventScheduler, ManualClock};
use nation_sim::testutil::{crisis_scenario, generate, past_event};
use nation_sim::{Engine, EngineConfig};

fn arb_kind() -> impl Strategy<Value = ActionKind> {
    (0..ActionKind::ALL.len()).prop_map(|i| ActionKind::ALL[i])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn countries_stay_bounded_under_any_action_sequence(
        seed in any::<u64>(),
        plan in prop::collection::vec((arb_kind(), 0usize..4, 0u64..900), 1..40),
    ) {
        let world = crisis_scenario().build();
        let ids: Vec<CountryId> = world.countries.keys().cloned().collect();
        let clock = ManualClock::new();
        let mut engine = Engine::new(world, EngineConfig::seeded(seed))
            .unwrap()
            .with_clock(Box::new(clock.clone()));

        for (kind, target, secs) in plan {
            clock.advance_secs(secs);
            engine.queue_action(PlayerAction::new(kind, "PLY", Some(ids[target].as_str()), clock.now()));
            let report = engine.tick();
            prop_assert!(report.chaos_level <= 100);
            for c in engine.world().countries.values() {
                prop_assert!(c.within_bounds(), "{} out of bounds after {kind}: {c:?}", c.id);
            }
        }
    }

    #[test]
    fn high_chaos_never_generates_negative_events(
        chaos in 76u8..=100,
        rolls in prop::collection::vec(0.0f64..1.0, 8),
    ) {
        let out = generate(
            &EventGenerator::new(GeneratorConfig::default()),
            &crisis_scenario(),
            chaos,
            SimTime::ZERO,
            &rolls,
        );
        for event in out.into_events() {
            prop_assert!(!event.is_negative(), "{} at chaos {chaos}", event.kind);
        }
    }

    #[test]
    fn scheduler_releases_in_order_and_respects_interval(
        count in 1usize..20,
        steps in prop::collection::vec(0u64..6_000, 1..80),
    ) {
        let mut scheduler = EventScheduler::new(SchedulerConfig::default());
        for id in 1..=count as u64 {
            scheduler.enqueue(past_event(id, EventKind::Drought, "AAA", 0));
        }

        let mut now = SimTime::ZERO;
        let mut last: Option<(u64, SimTime)> = None;
        for step in steps {
            now = now.plus_millis(step);
            let required = scheduler.interval(false);
            if let Some(event) = scheduler.poll(now, false) {
                if let Some((prev_id, prev_at)) = last {
                    prop_assert_eq!(event.id, prev_id + 1);
                    prop_assert!(now.since(prev_at) >= required);
                } else {
                    prop_assert_eq!(event.id, 1);
                }
                last = Some((event.id, now));
            }
        }
        prop_assert_eq!(scheduler.dropped(), 0);
    }
}

#[test]
fn long_seeded_run_keeps_world_consistent() {
    let clock = ManualClock::new();
    let mut engine = Engine::new(common::two_country_world(), EngineConfig::seeded(7))
        .unwrap()
        .with_clock(Box::new(clock.clone()));
    let mut drained = Vec::new();
    for tick in 1..=500 {
        clock.advance_secs(2);
        engine.tick();
        if tick % 50 == 0 {
            drained.extend(engine.drain_events());
        }
    }
    common::assert_world_bounded(engine.world());
    assert_eq!(engine.tick_count(), 500);
    assert!(engine.world().events.is_empty());
    assert!(drained.windows(2).all(|w| w[0].id < w[1].id));

    let window_start = clock.now().minus_millis(5 * 60 * 1000);
    let recent = engine.recent_history();
    assert!(recent.len() < drained.len());
    let stale = recent.iter().filter(|e| e.timestamp < window_start).count();
    assert!(stale <= 2 * engine.world().countries.len());
}
