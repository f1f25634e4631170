//! The slice of the event log the generator and the chaos meter read.
//!
//! The world log belongs to the host and may be drained at any time. The
//! engine keeps its own copy of what it still needs: every event inside the
//! protection window, plus the latest events that targeted each country so
//! narrative coherence survives a quiet stretch.

use std::collections::BTreeMap;

use crate::model::{GameEvent, SimTime};
use crate::sim::events::coherence::COHERENCE_DEPTH;

#[derive(Debug, Clone)]
pub struct RecentHistory {
    window_ms: u64,
    events: Vec<GameEvent>,
}

impl RecentHistory {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            events: Vec::new(),
        }
    }

    /// Start from an existing log, pruned relative to its newest event.
    pub fn seeded(window_ms: u64, log: &[GameEvent]) -> Self {
        let mut history = Self::new(window_ms);
        history.events.extend(log.iter().cloned());
        if let Some(newest) = log.iter().map(|e| e.timestamp).max() {
            history.prune(newest);
        }
        history
    }

    /// Events are expected in id order, which is also timestamp order.
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drop everything that is both outside the window ending at `now` and
    /// older than each of its target's latest coherence entries.
    pub fn prune(&mut self, now: SimTime) {
        let since = now.minus_millis(self.window_ms);
        let keep: Vec<bool> = {
            let mut per_target: BTreeMap<&str, usize> = BTreeMap::new();
            let mut keep: Vec<bool> = self
                .events
                .iter()
                .rev()
                .map(|event| {
                    let coherent = match event.targeted_country_id.as_deref() {
                        Some(target) => {
                            let seen = per_target.entry(target).or_insert(0);
                            *seen += 1;
                            *seen <= COHERENCE_DEPTH
                        }
                        None => false,
                    };
                    coherent || event.timestamp >= since
                })
                .collect();
            keep.reverse();
            keep
        };
        let before = self.events.len();
        let mut flags = keep.into_iter();
        self.events.retain(|_| flags.next().unwrap_or(true));
        let dropped = before - self.events.len();
        if dropped > 0 {
            tracing::trace!(dropped, kept = self.events.len(), "recent history pruned");
        }
    }

    /// Oldest first.
    pub fn as_slice(&self) -> &[GameEvent] {
        &self.events
    }

    /// Events at or after `since`, oldest first.
    pub fn since(&self, since: SimTime) -> Vec<&GameEvent> {
        let start = self.events.partition_point(|e| e.timestamp < since);
        self.events[start..].iter().collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;
    use crate::testutil::past_event;

    const WINDOW_MS: u64 = 5 * 60 * 1000;

    #[test]
    fn keeps_window_and_latest_per_country() {
        let mut history = RecentHistory::new(WINDOW_MS);
        history.push(past_event(1, EventKind::Drought, "AAA", 0));
        history.push(past_event(2, EventKind::CivilUnrest, "AAA", 10));
        history.push(past_event(3, EventKind::EconomicCrisis, "AAA", 20));
        history.push(past_event(4, EventKind::CropFailure, "BBB", 30));
        history.push(past_event(5, EventKind::TradeSurge, "CCC", 900));

        history.prune(SimTime::from_secs(1_000));

        let ids: Vec<u64> = history.as_slice().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 4, 5]);
        let recent: Vec<u64> = history
            .since(SimTime::from_secs(700))
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(recent, vec![5]);
    }

    #[test]
    fn stays_bounded_over_a_long_run() {
        let mut history = RecentHistory::new(WINDOW_MS);
        let targets = ["AAA", "BBB", "CCC"];
        for id in 1..=5_000u64 {
            let secs = id * 10;
            history.push(past_event(id, EventKind::Drought, targets[id as usize % 3], secs));
            history.prune(SimTime::from_secs(secs));
        }
        // 31 events fit a five minute window at one per ten seconds
        assert!(history.len() <= 31 + targets.len() * COHERENCE_DEPTH);
        assert_eq!(history.as_slice().last().map(|e| e.id), Some(5_000));
    }

    #[test]
    fn seeding_prunes_against_newest_entry() {
        let log = vec![
            past_event(1, EventKind::Drought, "AAA", 0),
            past_event(2, EventKind::Drought, "AAA", 10),
            past_event(3, EventKind::Drought, "AAA", 20),
            past_event(4, EventKind::Drought, "AAA", 2_000),
        ];
        let history = RecentHistory::seeded(WINDOW_MS, &log);
        let ids: Vec<u64> = history.as_slice().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 4]);
    }
}
