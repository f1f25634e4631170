pub mod actions;
pub mod chaos;
pub mod clock;
pub mod collapse;
mod context;
pub mod diplomacy;
pub mod economy;
pub mod events;
pub mod history;
pub mod karma;
pub mod random;
mod runner;
pub mod scheduler;

pub use actions::{ActionResolver, Resolution};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collapse::{ArbiterReport, CollapseArbiter, LowStabilityRebellion, RebellionPolicy};
pub use context::TickContext;
pub use diplomacy::{Advice, AdvisorContext, AdvisorRotation, DiplomaticAdvisor};
pub use events::{EventGenerator, GenerationOutcome, GeneratorInput};
pub use history::RecentHistory;
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use runner::{Engine, TickReport};
pub use scheduler::{EventScheduler, PauseWindow};
