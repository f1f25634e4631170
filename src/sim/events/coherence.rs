//! Narrative coherence: a template may not contradict either of the last two
//! events that hit the same country.

use crate::model::EventKind as K;
use crate::model::{CountryId, EventKind, GameEvent};

/// How many of a country's latest events a new template is checked against.
pub const COHERENCE_DEPTH: usize = 2;

/// Pairs that cannot follow one another. Lookups are symmetric.
static CONTRADICTIONS: &[(EventKind, EventKind)] = &[
    (K::EconomicCrisis, K::EconomicBoom),
    (K::EconomicCrisis, K::ResourceDiscovery),
    (K::EconomicCrisis, K::TechnologicalBreakthrough),
    (K::EconomicCrisis, K::StockMarketRally),
    (K::EconomicCrisis, K::ForeignInvestment),
    (K::CurrencyCollapse, K::StockMarketRally),
    (K::CurrencyCollapse, K::EconomicBoom),
    (K::CurrencyCollapse, K::ForeignInvestment),
    (K::BankingCrisis, K::StockMarketRally),
    (K::BankingCrisis, K::ForeignInvestment),
    (K::Hyperinflation, K::EconomicBoom),
    (K::Hyperinflation, K::StockMarketRally),
    (K::GeneralStrike, K::EconomicBoom),
    (K::CivilUnrest, K::NationalUnity),
    (K::CivilUnrest, K::CulturalRenaissance),
    (K::MassProtests, K::NationalUnity),
    (K::SeparatistMovement, K::NationalUnity),
    (K::GovernmentCollapse, K::NationalUnity),
    (K::GovernmentCollapse, K::AntiCorruptionDrive),
    (K::PoliticalScandal, K::AntiCorruptionDrive),
    (K::CorruptionScandal, K::AntiCorruptionDrive),
    (K::CropFailure, K::BumperHarvest),
    (K::Drought, K::BumperHarvest),
    (K::EnergyShortage, K::EnergyIndependence),
    (K::PandemicOutbreak, K::MedicalAdvance),
    (K::PandemicOutbreak, K::TourismBoom),
    (K::TerroristAttack, K::TourismBoom),
    (K::BorderSkirmish, K::PeaceAccord),
    (K::CyberAttackWave, K::TechnologicalBreakthrough),
    (K::SupplyChainDisruption, K::TradeSurge),
    (K::KarmaBoycott, K::TradeSurge),
    (K::KarmaRetaliation, K::KarmaReconciliation),
    (K::KarmaRetaliation, K::DiplomaticBreakthrough),
    (K::HostileSanctions, K::TradeSurge),
    (K::HostileSanctions, K::ForeignInvestment),
    (K::HostileDiplomaticExpulsion, K::DiplomaticBreakthrough),
];

pub fn contradicts(a: EventKind, b: EventKind) -> bool {
    CONTRADICTIONS
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Kinds of the latest events that targeted `country_id`, newest first.
pub fn recent_kinds(history: &[GameEvent], country_id: &CountryId) -> Vec<EventKind> {
    history
        .iter()
        .rev()
        .filter(|e| e.targets(country_id))
        .take(COHERENCE_DEPTH)
        .map(|e| e.kind)
        .collect()
}

/// Whether `kind` is consistent with every kind in `recent`.
pub fn is_coherent(kind: EventKind, recent: &[EventKind]) -> bool {
    !recent.iter().any(|&r| contradicts(kind, r))
}
