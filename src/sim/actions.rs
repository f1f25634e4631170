use std::collections::BTreeMap;

use super::context::TickContext;
use super::karma;
use crate::config::ActionConfig;
use crate::error::ActionError;
use crate::model::country::GDP_FLOOR;
use crate::model::{
    ActionKind, ActionRecord, Country, CountryDelta, CountryId, EventCategory, EventKind,
    GameEvent, PlayerAction, SimTime,
};

const MILITARY_RATIO_WEIGHT: f64 = 0.6;
const MILITARY_MIN_CHANCE: f64 = 0.3;
const MILITARY_MAX_CHANCE: f64 = 0.9;
const MAX_KARMA_RESISTANCE: f64 = 20.0;
const CONQUERED_STABILITY: f64 = 35.0;
const CONQUERED_DEBT_INCREASE: f64 = 20.0;
const TRADE_LINK_STEP: f64 = 20.0;
const MAX_TRADE_LINK: f64 = 100.0;

/// Result of resolving one action: the next country snapshot plus the audit
/// trail. On a validation error `countries` equals the input snapshot.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub success: bool,
    pub countries: BTreeMap<CountryId, Country>,
    pub event: GameEvent,
    pub record: ActionRecord,
    pub error: Option<ActionError>,
}

struct Outcome {
    success: bool,
    narrative: Vec<String>,
}

impl Outcome {
    fn succeeded(narrative: impl Into<String>) -> Self {
        Self {
            success: true,
            narrative: vec![narrative.into()],
        }
    }

    fn failed(narrative: impl Into<String>) -> Self {
        Self {
            success: false,
            narrative: vec![narrative.into()],
        }
    }
}

/// `gdp + gdp * (200 - debt) / 100`: the most a country can commit to one action.
pub fn affordability_ceiling(country: &Country) -> f64 {
    let gdp = country.gdp();
    gdp + gdp * (200.0 - country.debt_ratio()) / 100.0
}

/// Charge `cost` against GDP down to its floor. The remainder is financed by
/// raising the debt ratio in proportion to GDP before the charge.
pub fn spend(country: &mut Country, cost: f64) {
    if cost <= 0.0 {
        return;
    }
    let gdp = country.gdp();
    let payable = (gdp - GDP_FLOOR).max(0.0);
    if cost <= payable {
        country.set_gdp(gdp - cost);
    } else {
        let overdraft = cost - payable;
        country.adjust_debt(overdraft / gdp * 100.0);
        country.set_gdp(GDP_FLOOR);
    }
}

/// `sourceMilitary / (targetMilitary + 10)`.
pub fn force_ratio(source: &Country, target: &Country) -> f64 {
    source.military_strength / (target.military_strength + 10.0)
}

/// Chance that a military action succeeds, from the pre-action snapshot.
pub fn military_success_chance(source: &Country, target: &Country) -> f64 {
    let resistance = (target.karma_score / 2.0).min(MAX_KARMA_RESISTANCE);
    (force_ratio(source, target) * MILITARY_RATIO_WEIGHT - resistance / 100.0)
        .clamp(MILITARY_MIN_CHANCE, MILITARY_MAX_CHANCE)
}

/// Fixed success chance for covert and high-risk actions; `None` means the
/// action resolves deterministically.
fn fixed_success_chance(kind: ActionKind) -> Option<f64> {
    match kind {
        ActionKind::Geoengineering => Some(0.85),
        ActionKind::BiologicalWarfare => Some(0.8),
        ActionKind::CyberAttack => Some(0.7),
        ActionKind::MasonicInfluence => Some(0.6),
        ActionKind::Espionage => Some(0.75),
        ActionKind::MediaManipulation => Some(0.8),
        ActionKind::TechnologyTheft => Some(0.65),
        _ => None,
    }
}

/// Change between two snapshots of one country, in event-delta units.
fn diff(before: &Country, after: &Country) -> CountryDelta {
    let percent = |b: f64, a: f64| if b > 0.0 { (a / b - 1.0) * 100.0 } else { 0.0 };
    CountryDelta::new(&after.id)
        .stability(after.stability - before.stability)
        .economy(percent(before.gdp(), after.gdp()))
        .population(percent(before.population as f64, after.population as f64))
        .debt(after.debt_ratio() - before.debt_ratio())
}

fn country_mut<'a>(
    countries: &'a mut BTreeMap<CountryId, Country>,
    id: &str,
) -> Result<&'a mut Country, ActionError> {
    countries
        .get_mut(id)
        .ok_or_else(|| ActionError::UnknownCountry(id.to_string()))
}

fn relate(countries: &mut BTreeMap<CountryId, Country>, a: &str, b: &str, delta: f64) {
    if let Some(c) = countries.get_mut(a) {
        c.adjust_relation(b, delta);
    }
    if let Some(c) = countries.get_mut(b) {
        c.adjust_relation(a, delta);
    }
}

/// Validates and executes player actions.
///
/// Owns the debt-emission cooldown clock per country.
#[derive(Debug, Clone, Default)]
pub struct ActionResolver {
    config: ActionConfig,
    last_debt_emission: BTreeMap<CountryId, SimTime>,
}

impl ActionResolver {
    pub fn new(config: ActionConfig) -> Self {
        Self {
            config,
            last_debt_emission: BTreeMap::new(),
        }
    }

    /// When `country` last emitted debt, if ever.
    pub fn last_debt_emission(&self, country: &str) -> Option<SimTime> {
        self.last_debt_emission.get(country).copied()
    }

    /// Resolve `action` against `countries`. Never fails: validation errors
    /// become a failure event and leave the snapshot untouched.
    pub fn execute(
        &mut self,
        action: &PlayerAction,
        countries: &BTreeMap<CountryId, Country>,
        player_id: Option<&str>,
        ctx: &mut TickContext,
    ) -> Resolution {
        let triggered_by_player = player_id == Some(action.source_country_id.as_str());
        match self.try_execute(action, countries, ctx) {
            Ok((next, cost, outcome)) => {
                tracing::info!(
                    kind = %action.kind,
                    source = %action.source_country_id,
                    target = ?action.distinct_target(),
                    cost,
                    success = outcome.success,
                    "action resolved"
                );
                let deltas: Vec<CountryDelta> = [Some(action.source_country_id.as_str()), action.distinct_target()]
                    .into_iter()
                    .flatten()
                    .filter_map(|id| Some(diff(countries.get(id)?, next.get(id)?)))
                    .filter(|d| !d.is_empty())
                    .collect();
                let category = if outcome.success {
                    EventCategory::Success
                } else {
                    EventCategory::Warning
                };
                let event = self.audit_event(action, category, outcome.success, outcome.narrative, deltas, triggered_by_player, ctx);
                let record = Self::record(action, cost, outcome.success, ctx);
                Resolution {
                    success: outcome.success,
                    countries: next,
                    event,
                    record,
                    error: None,
                }
            }
            Err(err) => {
                tracing::info!(
                    kind = %action.kind,
                    source = %action.source_country_id,
                    error = %err,
                    "action rejected"
                );
                let event = self.audit_event(
                    action,
                    EventCategory::Error,
                    false,
                    vec![err.to_string()],
                    Vec::new(),
                    triggered_by_player,
                    ctx,
                );
                let record = Self::record(action, action.cost, false, ctx);
                Resolution {
                    success: false,
                    countries: countries.clone(),
                    event,
                    record,
                    error: Some(err),
                }
            }
        }
    }

    fn try_execute(
        &mut self,
        action: &PlayerAction,
        countries: &BTreeMap<CountryId, Country>,
        ctx: &mut TickContext,
    ) -> Result<(BTreeMap<CountryId, Country>, f64, Outcome), ActionError> {
        let source = countries
            .get(&action.source_country_id)
            .ok_or_else(|| ActionError::UnknownCountry(action.source_country_id.clone()))?;
        let target = match action.distinct_target() {
            Some(id) => Some(
                countries
                    .get(id)
                    .ok_or_else(|| ActionError::UnknownCountry(id.to_string()))?,
            ),
            None => None,
        };
        if !action.kind.is_internal() && target.is_none() {
            return Err(ActionError::MissingTarget(action.kind));
        }

        let cost = self.validate(action, source, target, ctx.now)?;
        let ceiling = affordability_ceiling(source);
        if cost > ceiling {
            return Err(ActionError::InsufficientFunds {
                required: cost,
                ceiling,
            });
        }

        let mut next = countries.clone();
        karma::record(&mut next, action);
        spend(country_mut(&mut next, &source.id)?, cost);
        let outcome = self.apply(action.kind, source, target, cost, &mut next, ctx)?;
        Ok((next, cost, outcome))
    }

    /// Kind-specific preconditions. Returns the cost to charge.
    fn validate(
        &self,
        action: &PlayerAction,
        source: &Country,
        target: Option<&Country>,
        now: SimTime,
    ) -> Result<f64, ActionError> {
        let cost = action.cost.max(0.0);
        match (action.kind, target) {
            (ActionKind::SpecialConquest, Some(target)) => {
                if target.sovereign {
                    return Err(ActionError::SovereignTarget(target.id.clone()));
                }
                if target.is_owned() {
                    return Err(ActionError::AlreadyOwned(target.id.clone()));
                }
                if target.stability > self.config.conquest_max_stability {
                    return Err(ActionError::TargetTooStable {
                        target: target.id.clone(),
                        stability: target.stability,
                        max: self.config.conquest_max_stability,
                    });
                }
                Ok(cost.max(target.gdp() * self.config.conquest_gdp_factor))
            }
            (ActionKind::DebtEmission, _) => {
                if !self.config.debt_emission_privileged.contains(&source.id) {
                    return Err(ActionError::NotPrivileged(source.id.clone()));
                }
                if let Some(last) = self.last_debt_emission(&source.id) {
                    let elapsed = now.since(last);
                    if elapsed < self.config.debt_emission_cooldown_ms {
                        return Err(ActionError::CooldownActive {
                            remaining_ms: self.config.debt_emission_cooldown_ms - elapsed,
                        });
                    }
                }
                Ok(cost)
            }
            _ => Ok(cost),
        }
    }

    /// Apply the kind's effect. `source` and `target` are pre-action snapshots;
    /// all writes go to `next`.
    fn apply(
        &mut self,
        kind: ActionKind,
        source: &Country,
        target: Option<&Country>,
        cost: f64,
        next: &mut BTreeMap<CountryId, Country>,
        ctx: &mut TickContext,
    ) -> Result<Outcome, ActionError> {
        let src = source.id.as_str();

        let Some(target) = target else {
            return self.apply_internal(kind, src, next, ctx.now);
        };
        let tgt = target.id.as_str();

        if kind == ActionKind::MilitaryAction {
            return Self::military(source, target, next, ctx);
        }
        if kind == ActionKind::RegimeChange {
            let chance = (0.6 - target.stability / 200.0).clamp(0.15, 0.6);
            if !ctx.rng.chance(chance) {
                country_mut(next, src)?.adjust_stability(-6.0);
                relate(next, src, tgt, -30.0);
                return Ok(Outcome::failed(format!("Plot against {} exposed", target.name)));
            }
            let t = country_mut(next, tgt)?;
            t.adjust_stability(-25.0);
            t.ideology = source.ideology.clone();
            t.adjust_relation(src, 20.0);
            return Ok(Outcome::succeeded(format!("Government of {} replaced", target.name)));
        }
        if let Some(chance) = fixed_success_chance(kind) {
            if !ctx.rng.chance(chance) {
                country_mut(next, src)?.adjust_stability(-2.0);
                relate(next, src, tgt, -15.0);
                return Ok(Outcome::failed(format!("Operation against {} exposed", target.name)));
            }
        }

        let outcome = match kind {
            ActionKind::Geoengineering => {
                let t = country_mut(next, tgt)?;
                t.adjust_stability(-12.0);
                t.adjust_gdp_percent(-6.0);
                t.add_reserve("water", -20.0);
                Outcome::succeeded(format!("Weather patterns over {} disrupted", target.name))
            }
            ActionKind::BiologicalWarfare => {
                let t = country_mut(next, tgt)?;
                t.adjust_stability(-20.0);
                t.adjust_population_percent(-2.0);
                t.adjust_gdp_percent(-5.0);
                country_mut(next, src)?.adjust_stability(-5.0);
                relate(next, src, tgt, -40.0);
                Outcome::succeeded(format!("Epidemic sweeps {}", target.name))
            }
            ActionKind::SpecialConquest => {
                let t = country_mut(next, tgt)?;
                t.annex(src);
                t.set_stability(CONQUERED_STABILITY);
                t.adjust_debt(CONQUERED_DEBT_INCREASE);
                tracing::info!(target = %tgt, owner = %src, "territory conquered");
                Outcome::succeeded(format!("{} annexed by {}", target.name, source.name))
            }
            ActionKind::EconomicSanction => {
                let t = country_mut(next, tgt)?;
                t.adjust_gdp_percent(-4.0);
                t.adjust_stability(-5.0);
                country_mut(next, src)?.adjust_gdp_percent(-1.0);
                relate(next, src, tgt, -15.0);
                Outcome::succeeded(format!("Sanctions imposed on {}", target.name))
            }
            ActionKind::CyberAttack => {
                let t = country_mut(next, tgt)?;
                t.adjust_gdp_percent(-3.0);
                t.adjust_stability(-4.0);
                Outcome::succeeded(format!("Networks in {} crippled", target.name))
            }
            ActionKind::MasonicInfluence => {
                let t = country_mut(next, tgt)?;
                t.adjust_stability(-6.0);
                t.adjust_relation(src, 10.0);
                Outcome::succeeded(format!("Elites in {} quietly swayed", target.name))
            }
            ActionKind::TradeEmbargo => {
                let t = country_mut(next, tgt)?;
                t.adjust_gdp_percent(-3.0);
                t.adjust_stability(-2.0);
                t.trade_partners.remove(src);
                let s = country_mut(next, src)?;
                s.adjust_gdp_percent(-1.0);
                s.trade_partners.remove(tgt);
                relate(next, src, tgt, -10.0);
                Outcome::succeeded(format!("Embargo declared on {}", target.name))
            }
            ActionKind::Espionage => {
                country_mut(next, src)?.adjust_military(1.05);
                country_mut(next, tgt)?.adjust_stability(-2.0);
                Outcome::succeeded(format!("Secrets stolen from {}", target.name))
            }
            ActionKind::MediaManipulation => {
                country_mut(next, tgt)?.adjust_stability(-4.0);
                Outcome::succeeded(format!("Disinformation floods {}", target.name))
            }
            ActionKind::TechnologyTheft => {
                country_mut(next, src)?.adjust_gdp_percent(2.0);
                country_mut(next, tgt)?.adjust_gdp_percent(-1.0);
                Outcome::succeeded(format!("Blueprints lifted from {}", target.name))
            }
            ActionKind::DiplomaticMessage => {
                relate(next, src, tgt, 5.0);
                Outcome::succeeded(format!("Message delivered to {}", target.name))
            }
            ActionKind::TradeAgreement => {
                for (a, b) in [(src, tgt), (tgt, src)] {
                    let c = country_mut(next, a)?;
                    let link = c.trade_partners.entry(b.to_string()).or_insert(0.0);
                    *link = (*link + TRADE_LINK_STEP).min(MAX_TRADE_LINK);
                    c.adjust_gdp_percent(1.0);
                }
                relate(next, src, tgt, 10.0);
                Outcome::succeeded(format!("Trade agreement signed with {}", target.name))
            }
            ActionKind::EconomicAid => {
                let t = country_mut(next, tgt)?;
                t.adjust_gdp(cost);
                t.adjust_stability(4.0);
                relate(next, src, tgt, 15.0);
                Outcome::succeeded(format!("Aid package sent to {}", target.name))
            }
            ActionKind::DiplomaticAlliance => {
                if target.relation_with(src) < 0.0 {
                    relate(next, src, tgt, -5.0);
                    return Ok(Outcome::failed(format!("{} rejects the alliance", target.name)));
                }
                for (a, b) in [(src, tgt), (tgt, src)] {
                    let c = country_mut(next, a)?;
                    if !c.alliances.iter().any(|x| x == b) {
                        c.alliances.push(b.to_string());
                    }
                }
                relate(next, src, tgt, 20.0);
                Outcome::succeeded(format!("Alliance formed with {}", target.name))
            }
            _ => return self.apply_internal(kind, src, next, ctx.now),
        };
        Ok(outcome)
    }

    fn military(
        source: &Country,
        target: &Country,
        next: &mut BTreeMap<CountryId, Country>,
        ctx: &mut TickContext,
    ) -> Result<Outcome, ActionError> {
        let ratio = force_ratio(source, target);
        let chance = military_success_chance(source, target);
        let (src, tgt) = (source.id.as_str(), target.id.as_str());
        relate(next, src, tgt, -30.0);

        if ctx.rng.chance(chance) {
            let t = country_mut(next, tgt)?;
            t.adjust_stability(-(ratio * 8.0).clamp(5.0, 30.0));
            t.adjust_gdp_percent(-3.0);
            t.adjust_military(0.85);
            let s = country_mut(next, src)?;
            s.adjust_stability(-2.0);
            s.adjust_military(0.95);
            Ok(Outcome::succeeded(format!(
                "Offensive against {} succeeds ({:.0}% odds)",
                target.name,
                chance * 100.0
            )))
        } else {
            let s = country_mut(next, src)?;
            s.adjust_stability(-(10.0 / ratio.max(0.1)).clamp(3.0, 20.0));
            s.adjust_military(0.85);
            Ok(Outcome::failed(format!(
                "Offensive against {} repelled ({:.0}% odds)",
                target.name,
                chance * 100.0
            )))
        }
    }

    fn apply_internal(
        &mut self,
        kind: ActionKind,
        src: &str,
        next: &mut BTreeMap<CountryId, Country>,
        now: SimTime,
    ) -> Result<Outcome, ActionError> {
        let s = country_mut(next, src)?;
        let outcome = match kind {
            ActionKind::EconomicInvestment => {
                s.adjust_stability(3.0);
                s.adjust_gdp_percent(4.0);
                s.adjust_debt(-2.0);
                Outcome::succeeded("Infrastructure investment approved")
            }
            ActionKind::SocialReform => {
                s.adjust_stability(8.0);
                s.adjust_gdp_percent(-1.0);
                Outcome::succeeded("Social reforms enacted")
            }
            ActionKind::MilitaryBuildup => {
                s.adjust_military(1.15);
                s.adjust_stability(1.0);
                s.adjust_debt(3.0);
                Outcome::succeeded("Armed forces expanded")
            }
            ActionKind::DebtEmission => {
                s.adjust_gdp_percent(self.config.debt_emission_gdp_percent);
                s.adjust_debt(self.config.debt_emission_debt_increase);
                self.last_debt_emission.insert(src.to_string(), now);
                Outcome::succeeded("Sovereign bonds issued")
            }
            other => return Err(ActionError::MissingTarget(other)),
        };
        Ok(outcome)
    }

    #[allow(clippy::too_many_arguments)]
    fn audit_event(
        &self,
        action: &PlayerAction,
        category: EventCategory,
        success: bool,
        effects: Vec<String>,
        deltas: Vec<CountryDelta>,
        triggered_by_player: bool,
        ctx: &mut TickContext,
    ) -> GameEvent {
        let verdict = if success { "succeeded" } else { "failed" };
        let title = match action.distinct_target() {
            Some(target) => format!("{} by {} against {} {verdict}", action.kind, action.source_country_id, target),
            None => format!("{} by {} {verdict}", action.kind, action.source_country_id),
        };
        GameEvent {
            id: ctx.next_id(),
            kind: EventKind::ActionResult,
            category,
            title,
            effects,
            deltas,
            timestamp: ctx.now,
            triggered_by_player,
            targeted_country_id: Some(
                action
                    .distinct_target()
                    .unwrap_or(&action.source_country_id)
                    .to_string(),
            ),
            chaos_level_at_creation: ctx.chaos_level,
            action: Some(action.kind),
            caused_by: None,
        }
    }

    fn record(action: &PlayerAction, cost: f64, success: bool, ctx: &mut TickContext) -> ActionRecord {
        ActionRecord {
            id: ctx.next_id(),
            kind: action.kind,
            source: action.source_country_id.clone(),
            target: action.distinct_target().map(str::to_string),
            cost,
            success,
            timestamp: action.timestamp,
            severity: action.kind.severity(),
        }
    }
}
