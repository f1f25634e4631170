#[macro_use]
mod macros;

pub mod action;
pub mod country;
pub mod event;
pub mod timestamp;
pub mod world;

pub use action::{ActionKind, ActionRecord, PlayerAction};
pub use country::{Country, CountryId, Economy, PowerLevel};
pub use event::{CountryDelta, EventCategory, EventKind, GameEvent, Polarity, ResourceDelta};
pub use timestamp::SimTime;
pub use world::{WorldState, apply_deltas};
