//! Boundary to the diplomatic AI collaborator.
//!
//! The collaborator is optional and untrusted. Its failures are replaced with
//! a deterministic fallback here, and only its action suggestion re-enters
//! the engine, through the action queue.

use std::collections::BTreeMap;

use crate::error::BridgeError;
use crate::model::{Country, CountryId, PlayerAction, SimTime};

/// What the advisor is told about the moment it is consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorContext {
    pub player_id: Option<CountryId>,
    pub chaos_level: u8,
    /// The advised country's relation towards the player, 0 without a player.
    pub relation_to_player: f64,
    pub now: SimTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Advice {
    pub message: String,
    pub suggestion: Option<PlayerAction>,
    /// Mood the advisor reports. Informational only; never applied.
    pub relation_delta: f64,
}

/// A diplomatic AI speaking for one country at a time.
pub trait DiplomaticAdvisor {
    fn advise(&mut self, country: &Country, context: &AdvisorContext) -> Result<Advice, BridgeError>;
}

/// Deterministic stand-in used whenever the collaborator fails.
pub fn fallback_advice(country: &Country, context: &AdvisorContext) -> Advice {
    let message = if context.relation_to_player < -20.0 {
        format!("{} has no comment at this time.", country.name)
    } else if context.chaos_level > 60 {
        format!("{} urges restraint while the world is in turmoil.", country.name)
    } else {
        format!("{} acknowledges your message.", country.name)
    };
    Advice {
        message,
        suggestion: None,
        relation_delta: 0.0,
    }
}

/// Ask `advisor` on behalf of `country`, recovering from any failure.
///
/// A suggestion whose source is not the advised country is discarded.
pub fn consult(
    advisor: &mut dyn DiplomaticAdvisor,
    country: &Country,
    context: &AdvisorContext,
) -> Advice {
    match advisor.advise(country, context) {
        Ok(mut advice) => {
            let foreign = advice
                .suggestion
                .as_ref()
                .is_some_and(|s| s.source_country_id != country.id);
            if foreign {
                tracing::warn!(
                    country = %country.id,
                    "advisor suggested an action for another country, discarding"
                );
                advice.suggestion = None;
            }
            advice
        }
        Err(err) => {
            tracing::warn!(country = %country.id, error = %err, "advisor failed, using fallback");
            fallback_advice(country, context)
        }
    }
}

/// Round-robin over the countries the advisor may speak for: unowned and not
/// the player.
#[derive(Debug, Clone, Default)]
pub struct AdvisorRotation {
    last: Option<CountryId>,
}

impl AdvisorRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next eligible country after the previously returned one, wrapping
    /// around in id order.
    pub fn next<'a>(
        &mut self,
        countries: &'a BTreeMap<CountryId, Country>,
        player_id: Option<&str>,
    ) -> Option<&'a Country> {
        let eligible = |c: &&Country| !c.is_owned() && player_id != Some(c.id.as_str());
        let after = self
            .last
            .as_ref()
            .and_then(|last| {
                countries
                    .values()
                    .filter(eligible)
                    .find(|c| c.id.as_str() > last.as_str())
            });
        let picked = after.or_else(|| countries.values().find(eligible))?;
        self.last = Some(picked.id.clone());
        Some(picked)
    }
}
