use serde::{Deserialize, Serialize};

use super::action::ActionKind;
use super::country::CountryId;
use super::timestamp::SimTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EventCategory {
    Info,
    Warning,
    Error,
    Success,
}

string_enum!(EventCategory {
    Info => "info",
    Warning => "warning",
    Error => "error",
    Success => "success",
});

/// Whether an event hurts or helps the countries it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Negative,
    Positive,
    Neutral,
}

/// Closed catalogue of everything the engine can emit.
///
/// Generator templates, hostile acts against the player, safety-valve
/// stabilisers, and the system events raised by contagion, the collapse
/// arbiter and the action resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EventKind {
    // Negative templates
    EconomicCrisis,
    PoliticalScandal,
    GeneralStrike,
    CivilUnrest,
    Earthquake,
    PandemicOutbreak,
    CyberAttackWave,
    CurrencyCollapse,
    BankingCrisis,
    CropFailure,
    TerroristAttack,
    MassProtests,
    CorruptionScandal,
    EnergyShortage,
    RefugeeCrisis,
    BorderSkirmish,
    GovernmentCollapse,
    Hyperinflation,
    SupplyChainDisruption,
    Drought,
    IndustrialAccident,
    SeparatistMovement,
    KarmaRetaliation,
    KarmaBoycott,
    KarmaInsurgency,
    // Hostile acts aimed at the player
    HostileSanctions,
    HostileProxyInsurgency,
    HostileDiplomaticExpulsion,
    HostileCyberRetaliation,
    // Positive templates
    EconomicBoom,
    ResourceDiscovery,
    TechnologicalBreakthrough,
    TradeSurge,
    DiplomaticBreakthrough,
    CulturalRenaissance,
    InfrastructureCompletion,
    ForeignInvestment,
    BumperHarvest,
    TourismBoom,
    AntiCorruptionDrive,
    PeaceAccord,
    EnergyIndependence,
    MedicalAdvance,
    EducationReform,
    StockMarketRally,
    SpaceProgramSuccess,
    NationalUnity,
    KarmaSympathy,
    KarmaReconciliation,
    // Safety valve
    InternationalRelief,
    StabilizationPackage,
    // System events
    Contagion,
    MutualAid,
    Conquest,
    Rebellion,
    ActionResult,
}

string_enum!(EventKind {
    EconomicCrisis => "economic_crisis",
    PoliticalScandal => "political_scandal",
    GeneralStrike => "general_strike",
    CivilUnrest => "civil_unrest",
    Earthquake => "earthquake",
    PandemicOutbreak => "pandemic_outbreak",
    CyberAttackWave => "cyber_attack_wave",
    CurrencyCollapse => "currency_collapse",
    BankingCrisis => "banking_crisis",
    CropFailure => "crop_failure",
    TerroristAttack => "terrorist_attack",
    MassProtests => "mass_protests",
    CorruptionScandal => "corruption_scandal",
    EnergyShortage => "energy_shortage",
    RefugeeCrisis => "refugee_crisis",
    BorderSkirmish => "border_skirmish",
    GovernmentCollapse => "government_collapse",
    Hyperinflation => "hyperinflation",
    SupplyChainDisruption => "supply_chain_disruption",
    Drought => "drought",
    IndustrialAccident => "industrial_accident",
    SeparatistMovement => "separatist_movement",
    KarmaRetaliation => "karma_retaliation",
    KarmaBoycott => "karma_boycott",
    KarmaInsurgency => "karma_insurgency",
    HostileSanctions => "hostile_sanctions",
    HostileProxyInsurgency => "hostile_proxy_insurgency",
    HostileDiplomaticExpulsion => "hostile_diplomatic_expulsion",
    HostileCyberRetaliation => "hostile_cyber_retaliation",
    EconomicBoom => "economic_boom",
    ResourceDiscovery => "resource_discovery",
    TechnologicalBreakthrough => "technological_breakthrough",
    TradeSurge => "trade_surge",
    DiplomaticBreakthrough => "diplomatic_breakthrough",
    CulturalRenaissance => "cultural_renaissance",
    InfrastructureCompletion => "infrastructure_completion",
    ForeignInvestment => "foreign_investment",
    BumperHarvest => "bumper_harvest",
    TourismBoom => "tourism_boom",
    AntiCorruptionDrive => "anti_corruption_drive",
    PeaceAccord => "peace_accord",
    EnergyIndependence => "energy_independence",
    MedicalAdvance => "medical_advance",
    EducationReform => "education_reform",
    StockMarketRally => "stock_market_rally",
    SpaceProgramSuccess => "space_program_success",
    NationalUnity => "national_unity",
    KarmaSympathy => "karma_sympathy",
    KarmaReconciliation => "karma_reconciliation",
    InternationalRelief => "international_relief",
    StabilizationPackage => "stabilization_package",
    Contagion => "contagion",
    MutualAid => "mutual_aid",
    Conquest => "conquest",
    Rebellion => "rebellion",
    ActionResult => "action_result",
});

impl EventKind {
    pub fn polarity(self) -> Polarity {
        use EventKind::*;
        match self {
            EconomicCrisis | PoliticalScandal | GeneralStrike | CivilUnrest | Earthquake
            | PandemicOutbreak | CyberAttackWave | CurrencyCollapse | BankingCrisis
            | CropFailure | TerroristAttack | MassProtests | CorruptionScandal | EnergyShortage
            | RefugeeCrisis | BorderSkirmish | GovernmentCollapse | Hyperinflation
            | SupplyChainDisruption | Drought | IndustrialAccident | SeparatistMovement
            | KarmaRetaliation | KarmaBoycott | KarmaInsurgency | HostileSanctions
            | HostileProxyInsurgency | HostileDiplomaticExpulsion | HostileCyberRetaliation
            | Contagion | Rebellion => Polarity::Negative,
            EconomicBoom | ResourceDiscovery | TechnologicalBreakthrough | TradeSurge
            | DiplomaticBreakthrough | CulturalRenaissance | InfrastructureCompletion
            | ForeignInvestment | BumperHarvest | TourismBoom | AntiCorruptionDrive
            | PeaceAccord | EnergyIndependence | MedicalAdvance | EducationReform
            | StockMarketRally | SpaceProgramSuccess | NationalUnity | KarmaSympathy
            | KarmaReconciliation | InternationalRelief | StabilizationPackage | MutualAid => {
                Polarity::Positive
            }
            Conquest | ActionResult => Polarity::Neutral,
        }
    }

    /// Templates whose magnitude grows with the target's karma score.
    pub fn is_karma_scaled(self) -> bool {
        self.as_str().starts_with("karma_")
    }

    pub fn is_hostile_act(self) -> bool {
        matches!(
            self,
            EventKind::HostileSanctions
                | EventKind::HostileProxyInsurgency
                | EventKind::HostileDiplomaticExpulsion
                | EventKind::HostileCyberRetaliation
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceDelta {
    pub resource: String,
    pub amount: f64,
}

/// Change applied to one country when an event lands.
///
/// `economy` and `population` are percentages of the current value,
/// `stability` and `debt` are absolute points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryDelta {
    pub country_id: CountryId,
    #[serde(default)]
    pub stability: f64,
    #[serde(default)]
    pub economy: f64,
    #[serde(default)]
    pub population: f64,
    #[serde(default)]
    pub debt: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceDelta>,
}

impl CountryDelta {
    pub fn new(country_id: &str) -> Self {
        Self {
            country_id: country_id.to_string(),
            stability: 0.0,
            economy: 0.0,
            population: 0.0,
            debt: 0.0,
            resource: None,
        }
    }

    pub fn stability(mut self, v: f64) -> Self {
        self.stability = v;
        self
    }

    pub fn economy(mut self, v: f64) -> Self {
        self.economy = v;
        self
    }

    pub fn population(mut self, v: f64) -> Self {
        self.population = v;
        self
    }

    pub fn debt(mut self, v: f64) -> Self {
        self.debt = v;
        self
    }

    pub fn resource(mut self, resource: &str, amount: f64) -> Self {
        self.resource = Some(ResourceDelta {
            resource: resource.to_string(),
            amount,
        });
        self
    }

    /// Same delta re-addressed to `country_id` with every magnitude multiplied by `factor`.
    pub fn scaled_for(&self, country_id: &str, factor: f64) -> Self {
        Self {
            country_id: country_id.to_string(),
            stability: self.stability * factor,
            economy: self.economy * factor,
            population: self.population * factor,
            debt: self.debt * factor,
            resource: self.resource.as_ref().map(|r| ResourceDelta {
                resource: r.resource.clone(),
                amount: r.amount * factor,
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stability == 0.0
            && self.economy == 0.0
            && self.population == 0.0
            && self.debt == 0.0
            && self.resource.is_none()
    }
}

/// A world event. Never mutated after creation; the log is append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEvent {
    pub id: u64,
    pub kind: EventKind,
    pub category: EventCategory,
    pub title: String,
    /// Narrative lines shown to the player.
    pub effects: Vec<String>,
    pub deltas: Vec<CountryDelta>,
    pub timestamp: SimTime,
    pub triggered_by_player: bool,
    pub targeted_country_id: Option<CountryId>,
    pub chaos_level_at_creation: u8,
    /// Set on action audit events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionKind>,
    /// The event this one was derived from (contagion).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caused_by: Option<u64>,
}

impl GameEvent {
    pub fn is_negative(&self) -> bool {
        self.kind.polarity() == Polarity::Negative
    }

    pub fn is_positive(&self) -> bool {
        self.kind.polarity() == Polarity::Positive
    }

    pub fn targets(&self, country_id: &str) -> bool {
        self.targeted_country_id.as_deref() == Some(country_id)
    }

    pub fn delta_for(&self, country_id: &str) -> Option<&CountryDelta> {
        self.deltas.iter().find(|d| d.country_id == country_id)
    }

    /// The delta applied to the targeted country, if any.
    pub fn primary_delta(&self) -> Option<&CountryDelta> {
        self.targeted_country_id
            .as_deref()
            .and_then(|id| self.delta_for(id))
    }
}
