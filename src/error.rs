use thiserror::Error;

use crate::model::ActionKind;

/// Why an action was refused. Never crosses the tick boundary: the resolver
/// turns it into a failure event and leaves the world untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("unknown country {0}")]
    UnknownCountry(String),
    #[error("{0} requires a target other than the acting country")]
    MissingTarget(ActionKind),
    #[error("insufficient funds: required {required:.0}, ceiling {ceiling:.0}")]
    InsufficientFunds { required: f64, ceiling: f64 },
    #[error("{target} is too stable to conquer (stability {stability:.0}, max {max:.0})")]
    TargetTooStable {
        target: String,
        stability: f64,
        max: f64,
    },
    #[error("{0} is sovereign")]
    SovereignTarget(String),
    #[error("{0} is already owned")]
    AlreadyOwned(String),
    #[error("{0} is not allowed to emit debt")]
    NotPrivileged(String),
    #[error("debt emission on cooldown for another {remaining_ms} ms")]
    CooldownActive { remaining_ms: u64 },
}

/// Failure reported by the diplomatic AI collaborator. Replaced by a
/// deterministic fallback at the bridge.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("advisor unavailable: {0}")]
    Unavailable(String),
    #[error("advisor timed out after {0} ms")]
    Timeout(u64),
    #[error("malformed advisor response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("malformed roster: {0}")]
    Json(#[from] serde_json::Error),
    #[error("roster is empty")]
    Empty,
    #[error("duplicate country id {0}")]
    DuplicateId(String),
    #[error("country {0} is both sovereign and owned")]
    OwnedSovereign(String),
    #[error("country {country} is owned by unknown country {owner}")]
    UnknownOwner { country: String, owner: String },
    #[error("player country {0} is not on the roster")]
    UnknownPlayer(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure constructing an [`Engine`](crate::sim::Engine).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
