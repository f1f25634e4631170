//! Throttled event delivery and the generation pause window.

use std::collections::VecDeque;

use super::random::RandomSource;
use crate::config::SchedulerConfig;
use crate::model::{GameEvent, SimTime};

/// Bounded FIFO that releases at most one event per throttle interval.
///
/// The interval is measured from the previous delivery, so producers may
/// enqueue faster than the queue drains. On overflow the oldest entry is
/// dropped.
#[derive(Debug, Clone)]
pub struct EventScheduler {
    config: SchedulerConfig,
    queue: VecDeque<GameEvent>,
    last_delivery: Option<SimTime>,
    delivered: u64,
    dropped: u64,
}

impl EventScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            queue: VecDeque::with_capacity(config.capacity),
            config,
            last_delivery: None,
            delivered: 0,
            dropped: 0,
        }
    }

    pub fn enqueue(&mut self, event: GameEvent) {
        if self.queue.len() >= self.config.capacity {
            if let Some(oldest) = self.queue.pop_front() {
                self.dropped += 1;
                tracing::warn!(
                    event_id = oldest.id,
                    kind = %oldest.kind,
                    capacity = self.config.capacity,
                    "delivery queue full, dropping oldest event"
                );
            }
        }
        self.queue.push_back(event);
    }

    /// Current throttle interval in milliseconds.
    pub fn interval(&self, critical: bool) -> u64 {
        if critical {
            self.config.critical_interval_ms
        } else if self.delivered < self.config.ramp_events {
            self.config.ramp_interval_ms
        } else {
            self.config.steady_interval_ms
        }
    }

    /// Release the next event if the interval since the last delivery has
    /// elapsed. The first delivery is immediate.
    pub fn poll(&mut self, now: SimTime, critical: bool) -> Option<GameEvent> {
        if let Some(last) = self.last_delivery {
            if now.since(last) < self.interval(critical) {
                return None;
            }
        }
        let event = self.queue.pop_front()?;
        self.last_delivery = Some(now);
        self.delivered += 1;
        Some(event)
    }

    /// Earliest time the next queued event may be released, if any is queued.
    pub fn next_release_at(&self, critical: bool) -> Option<SimTime> {
        if self.queue.is_empty() {
            return None;
        }
        Some(match self.last_delivery {
            Some(last) => last.plus_millis(self.interval(critical)),
            None => SimTime::ZERO,
        })
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Drop every queued event. Delivery counters are kept.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

/// Suspends event generation for a bounded random stretch.
///
/// A new pause may only open once the minimum gap since the previous pause
/// ended has elapsed. Delivery of queued events is not affected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseWindow {
    until: Option<SimTime>,
}

impl PauseWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// End of the current or most recent pause.
    pub fn until(&self) -> Option<SimTime> {
        self.until
    }

    pub fn is_paused(&self, now: SimTime) -> bool {
        self.until.is_some_and(|end| now < end)
    }

    /// Whether generation is paused at `now`, possibly opening a new pause.
    /// Rolls only when no pause is active and the gap is satisfied.
    pub fn check(
        &mut self,
        now: SimTime,
        rng: &mut dyn RandomSource,
        config: &SchedulerConfig,
    ) -> bool {
        if self.is_paused(now) {
            return true;
        }
        let gap_ok = self
            .until
            .is_none_or(|end| now.since(end) >= config.pause_min_gap_ms);
        if !gap_ok || !rng.chance(config.pause_chance) {
            return false;
        }
        let span = rng.range(config.pause_min_ms as f64, config.pause_max_ms as f64);
        let end = now.plus_millis(span.round() as u64);
        self.until = Some(end);
        tracing::debug!(
            start = now.millis(),
            end = end.millis(),
            "event generation paused"
        );
        true
    }
}
