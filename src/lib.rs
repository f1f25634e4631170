//! Nation-state simulation engine.
//!
//! A roster of countries evolves under player actions and procedurally
//! generated world events. The host drives [`sim::Engine::tick`]; everything
//! else (event generation, action resolution, collapse arbitration, growth,
//! throttled delivery) runs inside that call on a single thread.

pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod roster;
pub mod scenario;
pub mod sim;
pub mod testutil;

pub use config::EngineConfig;
pub use error::{ActionError, BridgeError, ConfigError, EngineError, RosterError};
pub use id::IdGenerator;
pub use model::{
    ActionKind, ActionRecord, Country, CountryDelta, CountryId, EventCategory, EventKind,
    GameEvent, PlayerAction, PowerLevel, SimTime, WorldState,
};
pub use sim::{Engine, TickReport};
