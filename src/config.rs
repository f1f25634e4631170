//! Engine tuning knobs.
//!
//! Every section deserializes with `#[serde(default)]`, so a host config file
//! only needs the fields it overrides.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::timestamp::{MILLIS_PER_HOUR, MILLIS_PER_MINUTE, MILLIS_PER_SECOND};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,
    pub generator: GeneratorConfig,
    pub scheduler: SchedulerConfig,
    pub collapse: CollapseConfig,
    pub economy: EconomyConfig,
    pub actions: ActionConfig,
}

impl EngineConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let probabilities = [
            ("generator.event_chance", self.generator.event_chance),
            ("generator.negative_cap", self.generator.negative_cap),
            ("generator.karma_target_bias", self.generator.karma_target_bias),
            ("generator.hostile_act_chance", self.generator.hostile_act_chance),
            ("scheduler.pause_chance", self.scheduler.pause_chance),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("{name} must be in [0, 1], got {p}")));
            }
        }
        if self.generator.contagion_min > self.generator.contagion_max {
            return Err(ConfigError::Invalid(
                "generator.contagion_min exceeds contagion_max".to_string(),
            ));
        }
        if self.scheduler.pause_min_ms > self.scheduler.pause_max_ms {
            return Err(ConfigError::Invalid(
                "scheduler.pause_min_ms exceeds pause_max_ms".to_string(),
            ));
        }
        if self.scheduler.capacity == 0 {
            return Err(ConfigError::Invalid("scheduler.capacity must be > 0".to_string()));
        }
        if self.economy.update_every_ticks == 0 {
            return Err(ConfigError::Invalid(
                "economy.update_every_ticks must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Probability that a tick produces an event at all.
    pub event_chance: f64,
    /// Chaos level above which only stabilising events are produced.
    pub safety_valve_chaos: u8,
    /// Look-back window for temporal protection and the chaos meter.
    pub protection_window_ms: u64,
    pub negative_base: f64,
    pub negative_cap: f64,
    /// Countries above this karma are preferred targets for negative events.
    pub karma_target_threshold: f64,
    /// Probability of preferring the karma/protection-filtered pool.
    pub karma_target_bias: f64,
    pub hostile_act_chance: f64,
    /// Player countries that draw hostile acts. A superpower player always qualifies.
    pub designated_powers: Vec<String>,
    /// Primary stability delta at or below which contagion fires.
    pub contagion_trigger: f64,
    pub contagion_min: f64,
    pub contagion_max: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            event_chance: 0.6,
            safety_valve_chaos: 75,
            protection_window_ms: 5 * MILLIS_PER_MINUTE,
            negative_base: 0.4,
            negative_cap: 0.7,
            karma_target_threshold: 30.0,
            karma_target_bias: 0.7,
            hostile_act_chance: 0.4,
            designated_powers: Vec::new(),
            contagion_trigger: -15.0,
            contagion_min: 0.10,
            contagion_max: 0.25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub steady_interval_ms: u64,
    pub ramp_interval_ms: u64,
    /// Deliveries that use the ramp interval before settling to steady.
    pub ramp_events: u64,
    pub critical_interval_ms: u64,
    /// A country at or below this stability switches to the critical interval.
    pub critical_stability: f64,
    /// Queue bound; the oldest entry is dropped on overflow.
    pub capacity: usize,
    /// Per-tick chance of opening a generation pause.
    pub pause_chance: f64,
    pub pause_min_ms: u64,
    pub pause_max_ms: u64,
    /// Minimum gap between the end of one pause and the start of the next.
    pub pause_min_gap_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            steady_interval_ms: 10 * MILLIS_PER_SECOND,
            ramp_interval_ms: 4 * MILLIS_PER_SECOND,
            ramp_events: 20,
            critical_interval_ms: 2_500,
            critical_stability: 10.0,
            capacity: 64,
            pause_chance: 0.05,
            pause_min_ms: 30 * MILLIS_PER_SECOND,
            pause_max_ms: 90 * MILLIS_PER_SECOND,
            pause_min_gap_ms: 10 * MILLIS_PER_MINUTE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollapseConfig {
    pub aid_receiver_max_stability: f64,
    pub aid_helper_min_stability: f64,
    pub aid_helper_min_gdp: f64,
    pub aid_helper_max_debt: f64,
    pub aid_stability_cap: f64,
    pub conquest_stability: f64,
    pub rebellion_threshold: f64,
    pub rebellion_base_chance: f64,
    pub rebellion_chance_per_point: f64,
    pub rebellion_max_chance: f64,
    pub rebellion_freed_stability: f64,
    /// Flat treasury upkeep per owned territory per tick.
    pub upkeep_per_territory: f64,
    /// Additional upkeep as a fraction of total territory GDP per tick.
    pub upkeep_gdp_fraction: f64,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            aid_receiver_max_stability: 25.0,
            aid_helper_min_stability: 60.0,
            aid_helper_min_gdp: 1_000.0,
            aid_helper_max_debt: 120.0,
            aid_stability_cap: 85.0,
            conquest_stability: 30.0,
            rebellion_threshold: 15.0,
            rebellion_base_chance: 0.10,
            rebellion_chance_per_point: 0.02,
            rebellion_max_chance: 0.5,
            rebellion_freed_stability: 25.0,
            upkeep_per_territory: 5.0,
            upkeep_gdp_fraction: 0.002,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// GDP growth is applied once every this many ticks.
    pub update_every_ticks: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            update_every_ticks: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// The only countries allowed to use `debt_emission`.
    pub debt_emission_privileged: Vec<String>,
    pub debt_emission_cooldown_ms: u64,
    pub debt_emission_gdp_percent: f64,
    pub debt_emission_debt_increase: f64,
    pub conquest_max_stability: f64,
    pub conquest_gdp_factor: f64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            debt_emission_privileged: vec!["USA".to_string(), "CHN".to_string()],
            debt_emission_cooldown_ms: 3 * MILLIS_PER_HOUR,
            debt_emission_gdp_percent: 10.0,
            debt_emission_debt_increase: 15.0,
            conquest_max_stability: 20.0,
            conquest_gdp_factor: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.generator.event_chance, 0.6);
        assert_eq!(config.scheduler.steady_interval_ms, 10_000);
        assert_eq!(config.actions.debt_emission_cooldown_ms, 10_800_000);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            EngineConfig::from_json(r#"{"seed": 9, "scheduler": {"steady_interval_ms": 500}}"#)
                .unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.scheduler.steady_interval_ms, 500);
        assert_eq!(config.scheduler.ramp_events, 20);
        assert_eq!(config.generator.safety_valve_chaos, 75);
    }

    #[test]
    fn out_of_range_probability_rejected() {
        let err = EngineConfig::from_json(r#"{"generator": {"event_chance": 1.5}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
