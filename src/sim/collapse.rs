//! Per-tick collapse arbitration.
//!
//! Four sequential passes over the country map: mutual aid rescues critical
//! countries, collapsed unallied countries fall to the player, restless
//! territories rebel, and the player pays upkeep on what it holds.

use std::collections::{BTreeMap, BTreeSet};

use super::context::TickContext;
use crate::config::CollapseConfig;
use crate::model::{Country, CountryDelta, CountryId, EventCategory, EventKind, GameEvent};

const AID_TRANSFER_HELPER_SHARE: f64 = 0.05;
const AID_TRANSFER_RECEIVER_CAP: f64 = 0.30;
const AID_HELPER_COST_SHARE: f64 = 0.7;
const AID_MIN_BOOST: f64 = 5.0;
const AID_MAX_BOOST: f64 = 15.0;
const AID_DEBT_RELIEF: f64 = 5.0;
const AID_GOODWILL: f64 = 10.0;

/// Decides whether an owned territory breaks away this tick.
pub trait RebellionPolicy {
    /// Probability in `[0, 1]` that `territory` revolts this tick.
    fn rebellion_chance(&self, territory: &Country, config: &CollapseConfig) -> f64;
}

/// Territories below the rebellion threshold revolt with a chance that grows
/// by a fixed step per missing stability point.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowStabilityRebellion;

impl RebellionPolicy for LowStabilityRebellion {
    fn rebellion_chance(&self, territory: &Country, config: &CollapseConfig) -> f64 {
        if territory.stability >= config.rebellion_threshold {
            return 0.0;
        }
        let missing = config.rebellion_threshold - territory.stability;
        (config.rebellion_base_chance + config.rebellion_chance_per_point * missing)
            .min(config.rebellion_max_chance)
    }
}

/// What one arbiter tick did.
#[derive(Debug, Clone, Default)]
pub struct ArbiterReport {
    pub events: Vec<GameEvent>,
    pub rescued: Vec<CountryId>,
    pub annexed: Vec<CountryId>,
    pub freed: Vec<CountryId>,
    /// Treasury upkeep charged to the player.
    pub upkeep: f64,
}

pub struct CollapseArbiter {
    config: CollapseConfig,
    policy: Box<dyn RebellionPolicy>,
}

impl CollapseArbiter {
    pub fn new(config: CollapseConfig) -> Self {
        Self {
            config,
            policy: Box::new(LowStabilityRebellion),
        }
    }

    pub fn with_policy(mut self, policy: Box<dyn RebellionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &CollapseConfig {
        &self.config
    }

    /// Run every pass in order. Events in the report describe changes already
    /// written to `countries`; they must not be applied again.
    pub fn tick(
        &self,
        countries: &mut BTreeMap<CountryId, Country>,
        player_id: Option<&str>,
        ctx: &mut TickContext,
    ) -> ArbiterReport {
        let mut report = ArbiterReport::default();
        self.mutual_aid(countries, player_id, ctx, &mut report);
        if let Some(player) = player_id {
            self.conquest(countries, player, ctx, &mut report);
        }
        self.rebellion(countries, ctx, &mut report);
        if let Some(player) = player_id {
            report.upkeep = self.maintenance(countries, player);
        }
        report
    }

    fn needs_aid(&self, country: &Country, player_id: Option<&str>) -> bool {
        !country.is_owned()
            && !country.sovereign
            && player_id != Some(country.id.as_str())
            && country.stability <= self.config.aid_receiver_max_stability
    }

    fn can_help(&self, helper: &Country, receiver: &Country, player_id: Option<&str>) -> bool {
        helper.id != receiver.id
            && (helper.is_neighbor_of(receiver) || helper.shares_block_with(receiver))
            && helper.stability >= self.config.aid_helper_min_stability
            && helper.gdp() >= self.config.aid_helper_min_gdp
            && helper.debt_ratio() < self.config.aid_helper_max_debt
            && !player_id.is_some_and(|p| helper.is_controlled_by(p))
    }

    /// Each critical country is rescued by at most one helper, and each helper
    /// gives at most once per tick.
    fn mutual_aid(
        &self,
        countries: &mut BTreeMap<CountryId, Country>,
        player_id: Option<&str>,
        ctx: &mut TickContext,
        report: &mut ArbiterReport,
    ) {
        let receivers: Vec<CountryId> = countries
            .values()
            .filter(|c| self.needs_aid(c, player_id))
            .map(|c| c.id.clone())
            .collect();
        let mut spent: BTreeSet<CountryId> = BTreeSet::new();

        for receiver_id in receivers {
            let Some(receiver) = countries.get(&receiver_id) else {
                continue;
            };
            let helper = countries
                .values()
                .filter(|h| !spent.contains(&h.id) && self.can_help(h, receiver, player_id))
                .max_by(|a, b| {
                    let score = |c: &Country| c.gdp() * c.stability / 100.0;
                    score(a).total_cmp(&score(b))
                });
            let Some(helper) = helper else {
                continue;
            };

            let transfer = (helper.gdp() * AID_TRANSFER_HELPER_SHARE)
                .min(receiver.gdp() * AID_TRANSFER_RECEIVER_CAP);
            let helper_cost = transfer * AID_HELPER_COST_SHARE;
            let helper_id = helper.id.clone();
            let helper_name = helper.name.clone();
            let receiver_name = receiver.name.clone();
            let receiver_gdp = receiver.gdp();
            let helper_gdp = helper.gdp();
            let boost = ctx.rng.range(AID_MIN_BOOST, AID_MAX_BOOST);

            let Some(r) = countries.get_mut(&receiver_id) else {
                continue;
            };
            let stability_before = r.stability;
            r.set_stability((r.stability + boost).min(self.config.aid_stability_cap));
            r.adjust_gdp(transfer);
            r.adjust_debt(-AID_DEBT_RELIEF);
            r.adjust_relation(&helper_id, AID_GOODWILL);
            let gained = r.stability - stability_before;

            if let Some(h) = countries.get_mut(&helper_id) {
                h.adjust_gdp(-helper_cost);
            }
            spent.insert(helper_id.clone());

            tracing::info!(
                receiver = %receiver_id,
                helper = %helper_id,
                transfer,
                gained,
                "mutual aid"
            );
            report.events.push(GameEvent {
                id: ctx.next_id(),
                kind: EventKind::MutualAid,
                category: EventCategory::Success,
                title: format!("{helper_name} rescues {receiver_name}"),
                effects: vec![
                    format!("{helper_name} transfers {transfer:.0} to {receiver_name}"),
                    format!("Stability in {receiver_name} recovers by {gained:.0}"),
                ],
                deltas: vec![
                    CountryDelta::new(&receiver_id)
                        .stability(gained)
                        .economy(transfer / receiver_gdp * 100.0)
                        .debt(-AID_DEBT_RELIEF),
                    CountryDelta::new(&helper_id).economy(-helper_cost / helper_gdp * 100.0),
                ],
                timestamp: ctx.now,
                triggered_by_player: false,
                targeted_country_id: Some(receiver_id.clone()),
                chaos_level_at_creation: ctx.chaos_level,
                action: None,
                caused_by: None,
            });
            report.rescued.push(receiver_id);
        }
    }

    /// Collapsed countries with no alliance in either direction fall to the
    /// player.
    fn conquest(
        &self,
        countries: &mut BTreeMap<CountryId, Country>,
        player: &str,
        ctx: &mut TickContext,
        report: &mut ArbiterReport,
    ) {
        let fallen: Vec<CountryId> = countries
            .values()
            .filter(|c| {
                c.stability <= 0.0
                    && !c.is_owned()
                    && !c.sovereign
                    && c.id != player
                    && c.alliances.is_empty()
                    && !countries.values().any(|o| o.alliances.contains(&c.id))
            })
            .map(|c| c.id.clone())
            .collect();

        for id in fallen {
            let Some(c) = countries.get_mut(&id) else {
                continue;
            };
            c.annex(player);
            c.set_stability(self.config.conquest_stability);
            tracing::info!(country = %id, owner = %player, "collapsed country annexed");
            report.events.push(GameEvent {
                id: ctx.next_id(),
                kind: EventKind::Conquest,
                category: EventCategory::Info,
                title: format!("{} falls under {player} administration", c.name),
                effects: vec![format!("{} collapses and is annexed", c.name)],
                deltas: vec![CountryDelta::new(&id).stability(self.config.conquest_stability)],
                timestamp: ctx.now,
                triggered_by_player: false,
                targeted_country_id: Some(id.clone()),
                chaos_level_at_creation: ctx.chaos_level,
                action: None,
                caused_by: None,
            });
            report.annexed.push(id);
        }
    }

    fn rebellion(
        &self,
        countries: &mut BTreeMap<CountryId, Country>,
        ctx: &mut TickContext,
        report: &mut ArbiterReport,
    ) {
        let owned: Vec<CountryId> = countries
            .values()
            .filter(|c| c.is_owned())
            .map(|c| c.id.clone())
            .collect();

        for id in owned {
            let Some(c) = countries.get_mut(&id) else {
                continue;
            };
            let chance = self.policy.rebellion_chance(c, &self.config);
            if chance <= 0.0 || !ctx.rng.chance(chance) {
                continue;
            }
            let former_owner = c.owner_id.clone().unwrap_or_default();
            let stability_before = c.stability;
            c.release();
            c.set_stability(self.config.rebellion_freed_stability);
            tracing::info!(country = %id, owner = %former_owner, chance, "territory rebelled");
            report.events.push(GameEvent {
                id: ctx.next_id(),
                kind: EventKind::Rebellion,
                category: EventCategory::Warning,
                title: format!("{} throws off {former_owner} rule", c.name),
                effects: vec![format!("{} declares independence", c.name)],
                deltas: vec![CountryDelta::new(&id).stability(c.stability - stability_before)],
                timestamp: ctx.now,
                triggered_by_player: false,
                targeted_country_id: Some(id.clone()),
                chaos_level_at_creation: ctx.chaos_level,
                action: None,
                caused_by: None,
            });
            report.freed.push(id);
        }
    }

    /// Charge the player's treasury for its territories. Returns the upkeep.
    fn maintenance(&self, countries: &mut BTreeMap<CountryId, Country>, player: &str) -> f64 {
        let (count, territory_gdp) = countries
            .values()
            .filter(|c| c.owner_id.as_deref() == Some(player))
            .fold((0usize, 0.0), |(n, gdp), c| (n + 1, gdp + c.gdp()));
        if count == 0 {
            return 0.0;
        }
        let upkeep = count as f64 * self.config.upkeep_per_territory
            + territory_gdp * self.config.upkeep_gdp_fraction;
        if let Some(p) = countries.get_mut(player) {
            p.adjust_gdp(-upkeep);
        }
        tracing::debug!(player, territories = count, upkeep, "territory upkeep");
        upkeep
    }
}

impl Default for CollapseArbiter {
    fn default() -> Self {
        Self::new(CollapseConfig::default())
    }
}
