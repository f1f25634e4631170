use super::random::RandomSource;
use crate::id::IdGenerator;
use crate::model::SimTime;

/// Per-tick services handed to every system that creates events.
///
/// Bundled so systems share one RNG and one id sequence without each
/// signature growing a parameter list.
pub struct TickContext<'a> {
    pub rng: &'a mut dyn RandomSource,
    pub ids: &'a mut IdGenerator,
    pub now: SimTime,
    /// Chaos level computed at the start of the tick.
    pub chaos_level: u8,
}

impl<'a> TickContext<'a> {
    pub fn new(
        rng: &'a mut dyn RandomSource,
        ids: &'a mut IdGenerator,
        now: SimTime,
        chaos_level: u8,
    ) -> Self {
        Self {
            rng,
            ids,
            now,
            chaos_level,
        }
    }

    pub fn next_id(&mut self) -> u64 {
        self.ids.next_id()
    }
}
